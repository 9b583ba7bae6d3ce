//! 測試輔助：LevelBuilder、ASCII 佈陣與記錄用 presenter
//!
//! 提供用 ASCII art 視覺化定義關卡的工具，取代手寫 TOML 字串。

use crate::alias::{Health, ID, UnitID};
use crate::battlefield::Battlefield;
use crate::buff::Buff;
use crate::core_types::{Faction, Position, VisualState};
use crate::error::{LoadError, Result};
use crate::loader::load_from_ascii;
use crate::loader_schema::{LevelInfo, ObjectiveType, UnitPlacement};
use crate::presenter::{NullPresenter, Presenter};
use crate::terrain::{TerrainCostTable, TerrainType};
use crate::unit::UnitKind;
use std::collections::HashMap;

// ============================================================================
// RecordingPresenter
// ============================================================================

/// presenter 收到的一次通知
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Health(UnitID, Health),
    Faction(UnitID, Faction),
    BuffAdded(UnitID, Buff),
    BuffRemoved(UnitID, Buff),
    Visual(UnitID, VisualState),
    Removed(UnitID),
}

/// 依序記錄所有通知
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定單位收到的通知
    pub fn events_for(&self, unit_id: UnitID) -> Vec<&PresenterEvent> {
        self.events
            .iter()
            .filter(|event| match event {
                PresenterEvent::Health(id, _)
                | PresenterEvent::Faction(id, _)
                | PresenterEvent::BuffAdded(id, _)
                | PresenterEvent::BuffRemoved(id, _)
                | PresenterEvent::Visual(id, _)
                | PresenterEvent::Removed(id) => *id == unit_id,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Presenter for RecordingPresenter {
    fn set_health(&mut self, unit_id: UnitID, health: Health) {
        self.events.push(PresenterEvent::Health(unit_id, health));
    }

    fn set_faction(&mut self, unit_id: UnitID, faction: Faction) {
        self.events.push(PresenterEvent::Faction(unit_id, faction));
    }

    fn buff_added(&mut self, unit_id: UnitID, buff: &Buff) {
        self.events
            .push(PresenterEvent::BuffAdded(unit_id, buff.clone()));
    }

    fn buff_removed(&mut self, unit_id: UnitID, buff: &Buff) {
        self.events
            .push(PresenterEvent::BuffRemoved(unit_id, buff.clone()));
    }

    fn set_visual_state(&mut self, unit_id: UnitID, state: VisualState) {
        self.events.push(PresenterEvent::Visual(unit_id, state));
    }

    fn unit_removed(&mut self, unit_id: UnitID) {
        self.events.push(PresenterEvent::Removed(unit_id));
    }
}

// ============================================================================
// ASCII 佈陣
// ============================================================================

/// 以 ASCII 建立棋盤，並依 `(標記, 單位種類, 陣營)` 生成單位
///
/// 回傳棋盤與標記映射；單位 ID 可用 `unit_at(標記位置)` 取回。
pub fn battlefield_from_ascii(
    ascii: &str,
    cost_table: TerrainCostTable,
    units: &[(&str, UnitKind, ID)],
) -> Result<(Battlefield, HashMap<String, Vec<Position>>)> {
    let (mut battlefield, markers) = load_from_ascii(ascii, cost_table)?;
    for (marker, kind, faction) in units {
        let Some(positions) = markers.get(*marker) else {
            return Err(LoadError::ParseError(format!("找不到標記 {marker}")).into());
        };
        for pos in positions {
            battlefield.spawn_unit(*kind, Faction(*faction), *pos, &mut NullPresenter)?;
        }
    }
    Ok((battlefield, markers))
}

/// 取得唯一標記的位置
pub fn marker_pos(markers: &HashMap<String, Vec<Position>>, marker: &str) -> Position {
    match markers.get(marker).map(Vec::as_slice) {
        Some([pos]) => *pos,
        other => panic!("標記 {marker} 應恰好出現一次，實際: {other:?}"),
    }
}

// ============================================================================
// LevelBuilder
// ============================================================================

struct UnitMarkerDef {
    marker: String,
    kind: UnitKind,
    faction: ID,
}

/// 用 ASCII art 建立關卡 TOML 字串
///
/// # 使用範例
///
/// ```ignore
/// let level_toml = LevelBuilder::from_ascii("
///   G . f . .
///   . . ~ . .
///   . . . . W
/// ")
/// .unit("W", UnitKind::Swordsman, 1)
/// .goal("G")
/// .to_toml();
/// ```
pub struct LevelBuilder {
    ascii: String,
    name: String,
    objective: ObjectiveType,
    unit_markers: Vec<UnitMarkerDef>,
    goal_marker: Option<String>,
}

impl LevelBuilder {
    /// 以 ASCII art 初始化 builder
    pub fn from_ascii(ascii: &str) -> Self {
        LevelBuilder {
            ascii: ascii.to_string(),
            name: "test-level".to_string(),
            objective: ObjectiveType::Rout,
            unit_markers: Vec::new(),
            goal_marker: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn objective(mut self, objective: ObjectiveType) -> Self {
        self.objective = objective;
        self
    }

    /// 設定標記為目標位置
    pub fn goal(mut self, marker: &str) -> Self {
        self.goal_marker = Some(marker.to_string());
        self
    }

    /// 設定標記對應的單位種類與陣營
    pub fn unit(mut self, marker: &str, kind: UnitKind, faction: ID) -> Self {
        self.unit_markers.push(UnitMarkerDef {
            marker: marker.to_string(),
            kind,
            faction,
        });
        self
    }

    /// 組裝關卡資料，標記位置一律還原為平原
    pub fn build(self) -> Result<LevelInfo> {
        let (_, markers) = load_from_ascii(&self.ascii, TerrainCostTable::default())?;

        let terrain: Vec<String> = self
            .ascii
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| {
                l.split_whitespace()
                    .map(|cell| match TerrainType::from_symbol(cell) {
                        Some(_) => cell,
                        None => TerrainType::Plain.symbol(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let goal_positions = self
            .goal_marker
            .as_ref()
            .and_then(|marker| markers.get(marker))
            .cloned()
            .unwrap_or_default();

        let units = self
            .unit_markers
            .iter()
            .flat_map(|def| {
                markers
                    .get(&def.marker)
                    .map(|positions| {
                        positions
                            .iter()
                            .map(|pos| UnitPlacement {
                                kind: def.kind,
                                faction: def.faction,
                                position: *pos,
                            })
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .collect();

        Ok(LevelInfo {
            name: self.name,
            objective: self.objective,
            terrain,
            goal_positions,
            units,
        })
    }

    /// 組裝完整 TOML 字串
    pub fn to_toml(self) -> Result<String> {
        let level = self.build()?;
        toml::to_string_pretty(&level).map_err(|e| {
            LoadError::SerializeError {
                format: "level".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
