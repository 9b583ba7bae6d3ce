//! 移動邏輯

use crate::alias::{MovementCost, UnitID};
use crate::battlefield::Battlefield;
use crate::constants::IMPASSABLE_MOVEMENT_COST;
use crate::core_types::{Faction, Position};
use crate::error::{BoardError, Result};
use crate::terrain::MoveType;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// 移動方向（四方向，不可斜走）
#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// 計算從當前位置往指定方向移動一格後的位置，檢查棋盤邊界
///
/// 返回 `None` 當新位置超出棋盤邊界
pub fn step_in_direction(
    battlefield: &Battlefield,
    pos: Position,
    direction: Direction,
) -> Option<Position> {
    let new_pos = match direction {
        Direction::Up => Position {
            x: pos.x,
            y: pos.y.checked_sub(1)?,
        },
        Direction::Down => Position {
            x: pos.x,
            y: pos.y + 1,
        },
        Direction::Left => Position {
            x: pos.x.checked_sub(1)?,
            y: pos.y,
        },
        Direction::Right => Position {
            x: pos.x + 1,
            y: pos.y,
        },
    };

    if battlefield.is_valid_position(new_pos) {
        Some(new_pos)
    } else {
        None
    }
}

/// 移動者（位置 + 移動類型 + 陣營）
#[derive(Debug, Clone, Copy)]
pub struct Mover {
    pub pos: Position,
    pub move_type: MoveType,
    pub faction: Faction,
}

/// 可到達位置的資訊（含成本與前驅節點）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReachableInfo {
    pub cost: MovementCost,
    pub prev: Position, // 上一個位置（可能是起點或友軍格）
}

/// 優先佇列項目，只存在於一次搜尋之內
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MoveCandidate {
    cost: MovementCost,
    pos: Position,
}

/// 目標格的佔據關係
enum Occupancy {
    Empty,
    Allied,
    Hostile,
}

fn occupancy(battlefield: &Battlefield, pos: Position, mover: Faction) -> Result<Occupancy> {
    Ok(match battlefield.faction_at(pos)? {
        None => Occupancy::Empty,
        Some(faction) if faction == mover => Occupancy::Allied,
        Some(_) => Occupancy::Hostile,
    })
}

/// 一次搜尋的結果
#[derive(Debug, Clone, Default)]
pub struct ReachableArea {
    pub origin: Position,
    /// 可停留的位置（不含起點）
    pub destinations: HashMap<Position, ReachableInfo>,
    /// 只能穿越的友軍格
    pub passthrough: HashMap<Position, ReachableInfo>,
}

impl ReachableArea {
    pub fn empty(origin: Position) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.destinations.contains_key(&pos)
    }

    pub fn positions(&self) -> HashSet<Position> {
        self.destinations.keys().copied().collect()
    }

    /// 從起點走到 `to` 的每一步（含起點與終點，可能經過友軍格）
    pub fn path_to(&self, to: Position) -> Result<Vec<Position>> {
        if !self.contains(to) {
            return Err(BoardError::NotReachable { pos: to }.into());
        }
        let mut path = vec![to];
        let mut current = to;
        while current != self.origin {
            let info = self
                .destinations
                .get(&current)
                .or_else(|| self.passthrough.get(&current))
                .ok_or(BoardError::NotReachable { pos: to })?;
            current = info.prev;
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }
}

/// 計算給定移動力預算內可到達的所有位置
///
/// 以成本排序的洪水填充：
/// 1. 從起點開始擴展，每次取出累積成本最小的項目
/// 2. 往四個方向查看最上層地形的進入成本
/// 3. 超出預算、無法通過或已造訪的位置略過
/// 4. 空格：標記造訪並繼續擴展
/// 5. 友軍：繼續擴展但不標記（可穿越、不可停留）
/// 6. 敵軍：不可進入也不可穿越
///
/// 起點永遠不在結果中。
///
/// # Fail fast 驗證：
/// - 起點必須在棋盤內
pub fn reachable_positions(
    battlefield: &Battlefield,
    mover: Mover,
    budget: MovementCost,
) -> Result<ReachableArea> {
    let from = mover.pos;
    battlefield.check_bounds(from)?;

    let mut area = ReachableArea::empty(from);
    let mut queue: BinaryHeap<Reverse<MoveCandidate>> = BinaryHeap::new();
    queue.push(Reverse(MoveCandidate { cost: 0, pos: from }));

    while let Some(Reverse(current)) = queue.pop() {
        // 友軍格可能被更便宜的路徑重新排入，跳過過時的項目
        if let Some(best) = area.passthrough.get(&current.pos) {
            if current.cost > best.cost {
                continue;
            }
        }

        for direction in DIRECTIONS {
            let Some(next) = step_in_direction(battlefield, current.pos, direction) else {
                continue;
            };
            if next == from || area.destinations.contains_key(&next) {
                continue;
            }
            let step = battlefield.movement_cost(next, mover.move_type)?;
            if step == IMPASSABLE_MOVEMENT_COST {
                continue;
            }
            let cost = current.cost.saturating_add(step);
            if cost > budget {
                continue;
            }

            let info = ReachableInfo {
                cost,
                prev: current.pos,
            };
            match occupancy(battlefield, next, mover.faction)? {
                Occupancy::Empty => {
                    area.destinations.insert(next, info);
                    queue.push(Reverse(MoveCandidate { cost, pos: next }));
                }
                Occupancy::Allied => {
                    // 只在成本更低時重新排入，避免零成本循環
                    let improves = area
                        .passthrough
                        .get(&next)
                        .is_none_or(|best| cost < best.cost);
                    if improves {
                        area.passthrough.insert(next, info);
                        queue.push(Reverse(MoveCandidate { cost, pos: next }));
                    }
                }
                Occupancy::Hostile => {}
            }
        }
    }

    tracing::debug!(
        ?from,
        budget,
        reachable = area.destinations.len(),
        "reachable positions computed"
    );
    Ok(area)
}

/// 只取可到達位置集合
pub fn compute_reachable_tiles(
    battlefield: &Battlefield,
    mover: Mover,
    budget: MovementCost,
) -> Result<HashSet<Position>> {
    Ok(reachable_positions(battlefield, mover, budget)?.positions())
}

/// 單位本回合的可移動範圍，已移動過回傳空範圍
pub fn valid_move_area(battlefield: &Battlefield, unit_id: UnitID) -> Result<ReachableArea> {
    let unit = battlefield.unit(unit_id)?;
    let pos = battlefield.position_of(unit_id)?;
    if unit.has_moved_this_turn {
        return Ok(ReachableArea::empty(pos));
    }
    let mover = Mover {
        pos,
        move_type: unit.move_type(),
        faction: battlefield.faction_of(unit_id)?,
    };
    reachable_positions(battlefield, mover, unit.effective_move_distance())
}

pub fn valid_moves(battlefield: &Battlefield, unit_id: UnitID) -> Result<HashSet<Position>> {
    Ok(valid_move_area(battlefield, unit_id)?.positions())
}
