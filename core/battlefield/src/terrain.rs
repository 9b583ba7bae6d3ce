//! 地形與移動成本表

use crate::alias::{MovementCost, Percent};
use crate::constants::{BASIC_MOVEMENT_COST, IMPASSABLE_MOVEMENT_COST};
use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// 地形類型
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum TerrainType {
    #[default]
    Plain,
    Road,
    Forest,
    Hill,
    Mountain,
    ShallowWater,
    DeepWater,
    /// 架在其他地形之上的橋
    Bridge,
    Wall,
}

/// 移動類型（地形成本的索引）
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum MoveType {
    #[default]
    Infantry,
    Mounted,
    Heavy,
    Flying,
}

/// 護甲類型（戰鬥傷害公式的索引）
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum ArmorType {
    #[default]
    Light,
    Medium,
    Heavy,
}

impl TerrainType {
    /// 站在此地形上的減傷百分比
    pub fn defense(self) -> Percent {
        match self {
            TerrainType::Plain => 10,
            TerrainType::Road | TerrainType::Bridge => 0,
            TerrainType::Forest => 20,
            TerrainType::Hill => 30,
            TerrainType::Mountain => 40,
            TerrainType::ShallowWater | TerrainType::DeepWater => 0,
            TerrainType::Wall => 0,
        }
    }

    /// ASCII 棋盤符號
    pub fn symbol(self) -> &'static str {
        match self {
            TerrainType::Plain => ".",
            TerrainType::Road => "=",
            TerrainType::Forest => "f",
            TerrainType::Hill => "h",
            TerrainType::Mountain => "m",
            TerrainType::ShallowWater => "~",
            TerrainType::DeepWater => "w",
            TerrainType::Bridge => "b",
            TerrainType::Wall => "#",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        TerrainType::iter().find(|t| t.symbol() == symbol)
    }
}

/// 預設移動成本
pub fn default_movement_cost(terrain: TerrainType, move_type: MoveType) -> MovementCost {
    use MoveType::*;
    const X: MovementCost = IMPASSABLE_MOVEMENT_COST;
    match (terrain, move_type) {
        (TerrainType::Plain | TerrainType::Road | TerrainType::Bridge, _) => BASIC_MOVEMENT_COST,
        (TerrainType::Forest, Infantry | Heavy) => 2,
        (TerrainType::Forest, Mounted) => 3,
        (TerrainType::Hill, Infantry) => 2,
        (TerrainType::Hill, Mounted | Heavy) => 3,
        (TerrainType::Mountain, Infantry) => 3,
        (TerrainType::Mountain, Mounted | Heavy) => X,
        (TerrainType::ShallowWater, Infantry) => 2,
        (TerrainType::ShallowWater, Mounted) => 3,
        (TerrainType::ShallowWater, Heavy) => X,
        (TerrainType::DeepWater, Infantry | Mounted | Heavy) => X,
        (TerrainType::Forest | TerrainType::Hill, Flying) => 1,
        (TerrainType::Mountain | TerrainType::ShallowWater | TerrainType::DeepWater, Flying) => 1,
        (TerrainType::Wall, _) => X,
    }
}

/// (地形, 移動類型) → 移動成本
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainCostTable {
    costs: HashMap<(TerrainType, MoveType), MovementCost>,
}

impl Default for TerrainCostTable {
    fn default() -> Self {
        Self::from_fn(default_movement_cost)
    }
}

impl TerrainCostTable {
    pub fn from_fn(f: impl Fn(TerrainType, MoveType) -> MovementCost) -> Self {
        let costs = TerrainType::iter()
            .flat_map(|t| MoveType::iter().map(move |m| (t, m)))
            .map(|(t, m)| ((t, m), f(t, m)))
            .collect();
        Self { costs }
    }

    /// 所有組合相同成本，測試用
    pub fn uniform(cost: MovementCost) -> Self {
        Self::from_fn(|_, _| cost)
    }

    /// 查表，缺少的組合視為無法通過
    pub fn cost(&self, terrain: TerrainType, move_type: MoveType) -> MovementCost {
        self.costs
            .get(&(terrain, move_type))
            .copied()
            .unwrap_or(IMPASSABLE_MOVEMENT_COST)
    }

    /// 覆寫單一組合，成本為 0 會讓同一格可被無限次經過，拒絕
    pub fn set(
        &mut self,
        terrain: TerrainType,
        move_type: MoveType,
        cost: MovementCost,
    ) -> Result<()> {
        if cost == 0 {
            return Err(LoadError::InvalidCost {
                terrain: terrain.to_string(),
                move_type: move_type.to_string(),
                cost,
            }
            .into());
        }
        self.costs.insert((terrain, move_type), cost);
        Ok(())
    }
}

/// 單層地形
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: TerrainType,
}

impl Tile {
    pub fn new(terrain: TerrainType) -> Self {
        Self { terrain }
    }

    pub fn cost(&self, move_type: MoveType, table: &TerrainCostTable) -> MovementCost {
        table.cost(self.terrain, move_type)
    }

    pub fn defense(&self) -> Percent {
        self.terrain.defense()
    }
}
