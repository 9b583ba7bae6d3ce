//! 渲染/UI 協作者介面
//!
//! 核心只透過這些窄 setter 推送狀態，從不回頭查詢顯示狀態。
//! 材質、shader 等資源由實作端依 [`Faction`] / [`VisualState`] 自行對應。

use crate::alias::{Health, UnitID};
use crate::buff::Buff;
use crate::core_types::{Faction, VisualState};

pub trait Presenter {
    fn set_health(&mut self, _unit_id: UnitID, _health: Health) {}
    fn set_faction(&mut self, _unit_id: UnitID, _faction: Faction) {}
    fn buff_added(&mut self, _unit_id: UnitID, _buff: &Buff) {}
    fn buff_removed(&mut self, _unit_id: UnitID, _buff: &Buff) {}
    fn set_visual_state(&mut self, _unit_id: UnitID, _state: VisualState) {}
    /// 單位被擊敗並移出棋盤
    fn unit_removed(&mut self, _unit_id: UnitID) {}
}

/// 不做任何事的 presenter（無介面環境、AI 模擬）
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}
