//! 遊戲常數定義

use crate::alias::{MovementCost, Percent};

/// 基礎移動成本
pub const BASIC_MOVEMENT_COST: MovementCost = 1;

/// 無法通過的移動成本
pub const IMPASSABLE_MOVEMENT_COST: MovementCost = MovementCost::MAX;

/// 防禦減傷上限（百分比）
pub const MAX_DAMAGE_REDUCTION: Percent = 100;

/// 近戰攻擊距離
pub const MELEE_RANGE: usize = 1;

/// 弓兵射程（曼哈頓距離，含兩端）
pub const ARCHER_MIN_RANGE: usize = 2;
pub const ARCHER_MAX_RANGE: usize = 3;
