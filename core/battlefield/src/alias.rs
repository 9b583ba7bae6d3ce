//! 型別別名

/// 棋盤座標軸
pub type Coord = usize;
pub type ID = u32;
pub type UnitID = ID;
pub type BuffID = ID;
pub type MovementCost = usize;
/// 生命值與傷害共用
pub type Health = i32;
/// 百分比（100 = 原值）
pub type Percent = i32;
