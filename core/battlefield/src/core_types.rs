//! 基本資料類型定義

use crate::alias::{Coord, ID};
use serde::{Deserialize, Serialize};

/// 棋盤位置（座標）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// 曼哈頓距離
    pub fn distance(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// 陣營（操控方），用於區分友軍/敵軍
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Faction(pub ID);

/// 單位外觀狀態，由 `has_attacked_this_turn` 決定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisualState {
    #[default]
    Normal,
    /// 本回合已攻擊，灰階顯示
    Greyed,
}
