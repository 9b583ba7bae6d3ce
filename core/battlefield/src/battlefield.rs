//! 棋盤模型
//!
//! 同時維護兩個視圖，任何變動都必須讓兩者一起更新：
//! - 佔據格（`occupancy`）：每格最多一個單位
//! - 陣營歸屬（`faction_units`）：每個單位恰屬一個陣營
//!
//! 另有 `unit_positions` 反查索引，與佔據格保持同步。

use crate::alias::{Coord, ID, MovementCost, UnitID};
use crate::core_types::{Faction, Position};
use crate::error::{BoardError, Result, UnitError};
use crate::logic::id_generator::generate_unique_id;
use crate::presenter::Presenter;
use crate::terrain::{MoveType, TerrainCostTable, TerrainType, Tile};
use crate::unit::{Unit, UnitKind, UnitStats};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct Battlefield {
    width: Coord,
    height: Coord,
    cost_table: TerrainCostTable,
    // [y][x]，每格至少一層，最上層為有效地形
    tiles: Vec<Vec<Vec<Tile>>>,
    occupancy: Vec<Vec<Option<UnitID>>>,
    unit_positions: HashMap<UnitID, Position>,
    units: HashMap<UnitID, Unit>,
    faction_units: BTreeMap<Faction, BTreeSet<UnitID>>,
    // 含已擊敗的單位，擊敗後 id 不會再被使用
    used_ids: HashSet<ID>,
}

impl Battlefield {
    /// 建立全部為 `terrain` 的棋盤
    pub fn new(
        width: Coord,
        height: Coord,
        terrain: TerrainType,
        cost_table: TerrainCostTable,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidDimensions { width, height }.into());
        }
        Ok(Self {
            width,
            height,
            cost_table,
            tiles: vec![vec![vec![Tile::new(terrain)]; width]; height],
            occupancy: vec![vec![None; width]; height],
            unit_positions: HashMap::new(),
            units: HashMap::new(),
            faction_units: BTreeMap::new(),
            used_ids: HashSet::new(),
        })
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    pub fn cost_table(&self) -> &TerrainCostTable {
        &self.cost_table
    }

    /// 驗證位置是否在棋盤邊界內
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.is_valid_position(pos) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            }
            .into())
        }
    }

    /// 所有位置（逐列）
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position { x, y }))
    }

    /// 與 `center` 曼哈頓距離介於 `min..=max` 的棋盤內位置
    pub fn positions_in_range(&self, center: Position, min: usize, max: usize) -> Vec<Position> {
        let x_range = center.x.saturating_sub(max)..=(center.x + max).min(self.width - 1);
        let y_range = center.y.saturating_sub(max)..=(center.y + max).min(self.height - 1);
        y_range
            .flat_map(|y| x_range.clone().map(move |x| Position { x, y }))
            .filter(|pos| {
                let d = center.distance(*pos);
                d >= min && d <= max
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // 地形
    // ------------------------------------------------------------------

    /// 由下而上的地形堆疊
    pub fn tile_stack(&self, pos: Position) -> Result<&[Tile]> {
        self.check_bounds(pos)?;
        Ok(&self.tiles[pos.y][pos.x])
    }

    pub fn top_tile(&self, pos: Position) -> Result<&Tile> {
        let stack = self.tile_stack(pos)?;
        // 堆疊永遠非空，見 pop_tile
        Ok(&stack[stack.len() - 1])
    }

    pub fn push_tile(&mut self, pos: Position, tile: Tile) -> Result<()> {
        self.check_bounds(pos)?;
        self.tiles[pos.y][pos.x].push(tile);
        Ok(())
    }

    /// 移除最上層，最後一層不可移除
    pub fn pop_tile(&mut self, pos: Position) -> Result<Tile> {
        self.check_bounds(pos)?;
        let stack = &mut self.tiles[pos.y][pos.x];
        if stack.len() <= 1 {
            return Err(BoardError::LastTileInStack { pos }.into());
        }
        match stack.pop() {
            Some(tile) => Ok(tile),
            None => Err(BoardError::LastTileInStack { pos }.into()),
        }
    }

    /// 以單層地形取代整個堆疊
    pub fn set_terrain(&mut self, pos: Position, terrain: TerrainType) -> Result<()> {
        self.check_bounds(pos)?;
        self.tiles[pos.y][pos.x] = vec![Tile::new(terrain)];
        Ok(())
    }

    /// 進入該格的成本（看最上層地形）
    pub fn movement_cost(&self, pos: Position, move_type: MoveType) -> Result<MovementCost> {
        Ok(self.top_tile(pos)?.cost(move_type, &self.cost_table))
    }

    // ------------------------------------------------------------------
    // 單位查詢
    // ------------------------------------------------------------------

    pub fn unit_at(&self, pos: Position) -> Result<Option<UnitID>> {
        self.check_bounds(pos)?;
        Ok(self.occupancy[pos.y][pos.x])
    }

    pub fn unit(&self, unit_id: UnitID) -> Result<&Unit> {
        self.units
            .get(&unit_id)
            .ok_or_else(|| UnitError::UnitNotFound { unit_id }.into())
    }

    pub fn unit_mut(&mut self, unit_id: UnitID) -> Result<&mut Unit> {
        self.units
            .get_mut(&unit_id)
            .ok_or_else(|| UnitError::UnitNotFound { unit_id }.into())
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn position_of(&self, unit_id: UnitID) -> Result<Position> {
        self.unit_positions
            .get(&unit_id)
            .copied()
            .ok_or_else(|| UnitError::UnitNotFound { unit_id }.into())
    }

    /// 單位所屬陣營，不在任何陣營代表雙視圖不一致
    pub fn faction_of(&self, unit_id: UnitID) -> Result<Faction> {
        let found = self
            .faction_units
            .iter()
            .find(|(_, ids)| ids.contains(&unit_id))
            .map(|(faction, _)| *faction);
        match found {
            Some(faction) => Ok(faction),
            None => {
                tracing::warn!(unit_id, "unit is not owned by any faction");
                Err(UnitError::NoFaction { unit_id }.into())
            }
        }
    }

    /// 該位置單位的陣營，空格回傳 None
    pub fn faction_at(&self, pos: Position) -> Result<Option<Faction>> {
        match self.unit_at(pos)? {
            Some(unit_id) => Ok(Some(self.faction_of(unit_id)?)),
            None => Ok(None),
        }
    }

    /// 陣營持有的單位，未登記的陣營視為空集合
    pub fn units_of(&self, faction: Faction) -> impl Iterator<Item = UnitID> + '_ {
        self.faction_units
            .get(&faction)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    pub fn factions(&self) -> impl Iterator<Item = Faction> + '_ {
        self.faction_units.keys().copied()
    }

    /// 登記陣營（可以沒有單位）
    pub fn add_faction(&mut self, faction: Faction) {
        self.faction_units.entry(faction).or_default();
    }

    // ------------------------------------------------------------------
    // 單位變動（雙視圖同步）
    // ------------------------------------------------------------------

    /// 以原型預設屬性生成單位
    pub fn spawn_unit(
        &mut self,
        kind: UnitKind,
        faction: Faction,
        pos: Position,
        presenter: &mut dyn Presenter,
    ) -> Result<UnitID> {
        self.spawn_unit_with_stats(kind, kind.default_stats(), faction, pos, presenter)
    }

    pub fn spawn_unit_with_stats(
        &mut self,
        kind: UnitKind,
        stats: UnitStats,
        faction: Faction,
        pos: Position,
        presenter: &mut dyn Presenter,
    ) -> Result<UnitID> {
        self.ensure_empty(pos)?;
        let unit_id = generate_unique_id(&mut self.used_ids);
        let unit = Unit::new(unit_id, kind, stats);
        presenter.set_faction(unit_id, faction);
        presenter.set_health(unit_id, unit.health());

        self.occupancy[pos.y][pos.x] = Some(unit_id);
        self.unit_positions.insert(unit_id, pos);
        self.faction_units.entry(faction).or_default().insert(unit_id);
        self.units.insert(unit_id, unit);
        tracing::debug!(unit_id, ?kind, ?faction, ?pos, "unit spawned");
        Ok(unit_id)
    }

    /// 直接搬移單位，不檢查移動力（移動範圍由 `logic::movement` 負責）
    pub fn move_unit(&mut self, unit_id: UnitID, to: Position) -> Result<()> {
        let from = self.position_of(unit_id)?;
        if from == to {
            return Ok(());
        }
        self.ensure_empty(to)?;
        self.occupancy[from.y][from.x] = None;
        self.occupancy[to.y][to.x] = Some(unit_id);
        self.unit_positions.insert(unit_id, to);
        tracing::debug!(unit_id, ?from, ?to, "unit moved");
        Ok(())
    }

    /// 轉移單位到另一陣營
    pub fn transfer_unit(
        &mut self,
        unit_id: UnitID,
        faction: Faction,
        presenter: &mut dyn Presenter,
    ) -> Result<()> {
        let current = self.faction_of(unit_id)?;
        if current == faction {
            return Ok(());
        }
        if let Some(ids) = self.faction_units.get_mut(&current) {
            ids.remove(&unit_id);
        }
        self.faction_units.entry(faction).or_default().insert(unit_id);
        presenter.set_faction(unit_id, faction);
        Ok(())
    }

    /// 擊敗單位：自佔據格、陣營、單位表一併移除，回傳被移除的單位
    pub fn defeat_unit(&mut self, unit_id: UnitID, presenter: &mut dyn Presenter) -> Result<Unit> {
        let pos = self.position_of(unit_id)?;
        let faction = self.faction_of(unit_id)?;

        let Some(unit) = self.units.remove(&unit_id) else {
            return Err(UnitError::UnitNotFound { unit_id }.into());
        };
        self.occupancy[pos.y][pos.x] = None;
        self.unit_positions.remove(&unit_id);
        if let Some(ids) = self.faction_units.get_mut(&faction) {
            ids.remove(&unit_id);
        }
        presenter.unit_removed(unit_id);
        tracing::info!(unit_id, ?faction, ?pos, "unit defeated");
        Ok(unit)
    }

    fn ensure_empty(&self, pos: Position) -> Result<()> {
        match self.unit_at(pos)? {
            Some(occupant) => Err(BoardError::CellOccupied { pos, occupant }.into()),
            None => Ok(()),
        }
    }
}
