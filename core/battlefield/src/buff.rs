//! 單位 buff 清單
//!
//! 每個單位獨佔一份有序清單。`BuffType` 是效果分類，`BuffKind` 是實作類別，
//! 兩者目前一一對應的情況很多，但查詢時刻意分開。

use crate::alias::{BuffID, ID, UnitID};
use crate::logic::id_generator::generate_unique_id;
use crate::presenter::Presenter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum_macros::{Display, EnumIter, EnumString};

/// 效果分類
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum BuffType {
    /// 攻擊傷害百分比加成
    Attack,
    /// 受到傷害的減免百分比
    Defense,
    /// 移動力加減
    Movement,
}

/// 實作類別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum BuffKind {
    /// 技能或道具給予的數值修正
    StatModifier,
    /// 友軍光環
    Aura,
    /// 地形效果
    Terrain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    /// 由 [`BuffList::add`] 分配
    pub id: BuffID,
    pub kind: BuffKind,
    pub buff_type: BuffType,
    pub value: i32,
    /// None=永久，Some(n)=剩餘 n 回合
    pub duration: Option<u32>,
}

impl Buff {
    pub fn new(kind: BuffKind, buff_type: BuffType, value: i32, duration: Option<u32>) -> Self {
        Self {
            id: 0,
            kind,
            buff_type,
            value,
            duration,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct BuffList {
    buffs: Vec<Buff>,
    // 含已移除、已過期的 buff，id 不會重複使用
    used_ids: HashSet<ID>,
}

impl BuffList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter()
    }

    pub fn get(&self, id: BuffID) -> Option<&Buff> {
        self.buffs.iter().find(|b| b.id == id)
    }

    /// 附加到清單尾端並通知 presenter，回傳分配的 id
    pub fn add(&mut self, owner: UnitID, mut buff: Buff, presenter: &mut dyn Presenter) -> BuffID {
        buff.id = generate_unique_id(&mut self.used_ids);
        presenter.buff_added(owner, &buff);
        let id = buff.id;
        self.buffs.push(buff);
        id
    }

    /// 移除單一 buff，不存在時回傳 None 且不通知
    pub fn remove(
        &mut self,
        owner: UnitID,
        id: BuffID,
        presenter: &mut dyn Presenter,
    ) -> Option<Buff> {
        let index = self.buffs.iter().position(|b| b.id == id)?;
        let buff = self.buffs.remove(index);
        presenter.buff_removed(owner, &buff);
        Some(buff)
    }

    /// 移除所有指定分類的 buff
    pub fn remove_all_of_type(
        &mut self,
        owner: UnitID,
        buff_type: BuffType,
        presenter: &mut dyn Presenter,
    ) -> Vec<Buff> {
        let ids: Vec<BuffID> = self
            .buffs_of_type(buff_type)
            .into_iter()
            .map(|b| b.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.remove(owner, id, presenter))
            .collect()
    }

    pub fn buffs_of_type(&self, buff_type: BuffType) -> Vec<&Buff> {
        self.buffs_matching(|b| b.buff_type == buff_type)
    }

    /// 與 `other` 同一實作類別的 buff（不看效果分類）
    pub fn buffs_of_class(&self, other: &Buff) -> Vec<&Buff> {
        self.buffs_matching(|b| b.kind == other.kind)
    }

    pub fn buffs_matching(&self, predicate: impl Fn(&Buff) -> bool) -> Vec<&Buff> {
        self.buffs.iter().filter(|b| predicate(*b)).collect()
    }

    /// 指定分類的數值總和，飽和在 i32 範圍內
    pub fn total_value(&self, buff_type: BuffType) -> i32 {
        self.buffs
            .iter()
            .filter(|b| b.buff_type == buff_type)
            .fold(0i32, |total, b| total.saturating_add(b.value))
    }

    /// 回合開始時扣一回合，歸零的 buff 移除並通知
    pub fn tick_durations(&mut self, owner: UnitID, presenter: &mut dyn Presenter) -> Vec<Buff> {
        let mut expired = Vec::new();
        for buff in &mut self.buffs {
            if let Some(turns) = buff.duration.as_mut() {
                *turns = turns.saturating_sub(1);
                if *turns == 0 {
                    expired.push(buff.id);
                }
            }
        }
        expired
            .into_iter()
            .filter_map(|id| self.remove(owner, id, presenter))
            .collect()
    }
}
