//! 單位資料與狀態
//!
//! 只負責屬性、生命值、回合旗標與 buff 清單。
//! 移動範圍見 `logic::movement`，戰鬥判定見 `logic::battle`。

use crate::alias::{BuffID, Health, MovementCost, UnitID};
use crate::buff::{Buff, BuffList, BuffType};
use crate::core_types::VisualState;
use crate::presenter::Presenter;
use crate::terrain::{ArmorType, MoveType};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// 單位原型，決定戰鬥公式與攻擊範圍
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
pub enum UnitKind {
    Swordsman,
    Cavalry,
    Archer,
}

/// 生成時固定的屬性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub armor: ArmorType,
    pub move_type: MoveType,
    pub max_health: Health,
    pub move_distance: MovementCost,
}

impl UnitKind {
    pub fn default_stats(self) -> UnitStats {
        match self {
            UnitKind::Swordsman => UnitStats {
                armor: ArmorType::Medium,
                move_type: MoveType::Infantry,
                max_health: 100,
                move_distance: 3,
            },
            UnitKind::Cavalry => UnitStats {
                armor: ArmorType::Medium,
                move_type: MoveType::Mounted,
                max_health: 100,
                move_distance: 5,
            },
            UnitKind::Archer => UnitStats {
                armor: ArmorType::Light,
                move_type: MoveType::Infantry,
                max_health: 80,
                move_distance: 3,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitID,
    pub kind: UnitKind,
    pub has_moved_this_turn: bool,
    // 生成後固定
    armor: ArmorType,
    move_type: MoveType,
    max_health: Health,
    move_distance: MovementCost,
    health: Health,
    has_attacked_this_turn: bool,
    buffs: BuffList,
}

impl Unit {
    /// 以滿血、回合旗標清空的狀態建立
    pub fn new(id: UnitID, kind: UnitKind, stats: UnitStats) -> Self {
        let max_health = stats.max_health.max(1);
        Self {
            id,
            kind,
            armor: stats.armor,
            move_type: stats.move_type,
            max_health,
            move_distance: stats.move_distance,
            has_moved_this_turn: false,
            health: max_health,
            has_attacked_this_turn: false,
            buffs: BuffList::new(),
        }
    }

    pub fn armor(&self) -> ArmorType {
        self.armor
    }

    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    /// 至少為 1
    pub fn max_health(&self) -> Health {
        self.max_health
    }

    /// 基礎移動力，不含 buff
    pub fn move_distance(&self) -> MovementCost {
        self.move_distance
    }

    pub fn health(&self) -> Health {
        self.health
    }

    /// 設定生命值（限制在 0..=max_health）並通知 presenter
    pub fn set_health(&mut self, health: Health, presenter: &mut dyn Presenter) {
        self.health = health.clamp(0, self.max_health);
        presenter.set_health(self.id, self.health);
    }

    /// 扣血，回傳扣完的生命值
    pub fn apply_damage(&mut self, damage: Health, presenter: &mut dyn Presenter) -> Health {
        self.set_health(self.health.saturating_sub(damage.max(0)), presenter);
        self.health
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// 基礎移動力加上 Movement buff，最少為 0
    pub fn effective_move_distance(&self) -> MovementCost {
        let bonus = i64::from(self.buffs.total_value(BuffType::Movement));
        let total = self.move_distance as i64 + bonus;
        total.max(0) as MovementCost
    }

    pub fn has_attacked_this_turn(&self) -> bool {
        self.has_attacked_this_turn
    }

    /// 已攻擊 → 灰階，否則恢復
    pub fn set_has_attacked_this_turn(&mut self, attacked: bool, presenter: &mut dyn Presenter) {
        self.has_attacked_this_turn = attacked;
        let state = if attacked {
            VisualState::Greyed
        } else {
            VisualState::Normal
        };
        presenter.set_visual_state(self.id, state);
    }

    /// 新回合：清除移動與攻擊旗標
    pub fn reset_turn(&mut self, presenter: &mut dyn Presenter) {
        self.has_moved_this_turn = false;
        self.set_has_attacked_this_turn(false, presenter);
    }

    pub fn buffs(&self) -> &BuffList {
        &self.buffs
    }

    pub fn add_buff(&mut self, buff: Buff, presenter: &mut dyn Presenter) -> BuffID {
        self.buffs.add(self.id, buff, presenter)
    }

    pub fn remove_buff(&mut self, id: BuffID, presenter: &mut dyn Presenter) -> Option<Buff> {
        self.buffs.remove(self.id, id, presenter)
    }

    pub fn remove_buffs_of_type(
        &mut self,
        buff_type: BuffType,
        presenter: &mut dyn Presenter,
    ) -> Vec<Buff> {
        self.buffs.remove_all_of_type(self.id, buff_type, presenter)
    }

    pub fn tick_buffs(&mut self, presenter: &mut dyn Presenter) -> Vec<Buff> {
        self.buffs.tick_durations(self.id, presenter)
    }
}
