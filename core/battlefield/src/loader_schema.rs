//! Loader 相關的資料結構定義
//!
//! 關卡資料只是唯讀輸入，核心不會回寫。

use crate::alias::{ID, MovementCost};
use crate::core_types::Position;
use crate::terrain::{MoveType, TerrainType};
use crate::unit::UnitKind;
use serde::{Deserialize, Serialize};

// ============================================================================
// 移動成本表
// ============================================================================

/// 覆寫單一 (地形, 移動類型) 的成本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    pub terrain: TerrainType,
    pub move_type: MoveType,
    pub cost: MovementCost,
}

/// 套用在預設表之上的覆寫
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostTableToml {
    #[serde(default)]
    pub costs: Vec<CostEntry>,
}

// ============================================================================
// 關卡系統 (Level System)
// ============================================================================

/// 勝利條件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectiveType {
    /// 擊敗所有敵軍
    #[default]
    Rout,
    /// 撐過指定回合數
    Survive { turns: u32 },
    /// 佔領目標位置
    Capture,
}

/// 單位配置（關卡中的單位放置）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub kind: UnitKind,
    pub faction: ID,
    pub position: Position,
}

/// 關卡定義
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelInfo {
    pub name: String,
    /// 每列一個字串，符號以空白分隔（同 ASCII 棋盤）
    pub terrain: Vec<String>,
    #[serde(default)]
    pub objective: ObjectiveType,
    #[serde(default)]
    pub goal_positions: Vec<Position>,
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
}
