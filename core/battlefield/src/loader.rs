//! 棋盤載入器

use crate::battlefield::Battlefield;
use crate::core_types::{Faction, Position};
use crate::error::{Context, LoadError, Result};
use crate::loader_schema::{CostTableToml, LevelInfo};
use crate::presenter::Presenter;
use crate::terrain::{TerrainCostTable, TerrainType, Tile};
use std::collections::HashMap;

/// 解析後的格子：地形堆疊（由下而上）與可選標記
struct ParsedCell {
    stack: Vec<TerrainType>,
    marker: Option<String>,
}

fn parse_cell(cell: &str) -> ParsedCell {
    match TerrainType::from_symbol(cell) {
        // 橋一定架在深水上
        Some(TerrainType::Bridge) => ParsedCell {
            stack: vec![TerrainType::DeepWater, TerrainType::Bridge],
            marker: None,
        },
        Some(terrain) => ParsedCell {
            stack: vec![terrain],
            marker: None,
        },
        None => ParsedCell {
            stack: vec![TerrainType::Plain],
            marker: Some(cell.to_string()),
        },
    }
}

fn parse_rows<'a>(rows: impl Iterator<Item = &'a str>) -> Result<Vec<Vec<ParsedCell>>> {
    let rows: Vec<Vec<ParsedCell>> = rows
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.split_whitespace().map(parse_cell).collect())
        .collect();

    let Some(first) = rows.first() else {
        return Err(LoadError::ParseError("棋盤為空".to_string()).into());
    };
    let width = first.len();
    for (y, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(LoadError::ParseError(format!(
                "第 {y} 列寬度 {} 與第一列 {width} 不同",
                row.len()
            ))
            .into());
        }
    }
    Ok(rows)
}

fn build_terrain(
    rows: Vec<Vec<ParsedCell>>,
    cost_table: TerrainCostTable,
) -> Result<(Battlefield, HashMap<String, Vec<Position>>)> {
    let width = rows[0].len();
    let height = rows.len();
    let mut battlefield = Battlefield::new(width, height, TerrainType::Plain, cost_table)?;
    let mut markers: HashMap<String, Vec<Position>> = HashMap::new();

    for (y, row) in rows.into_iter().enumerate() {
        for (x, cell) in row.into_iter().enumerate() {
            let pos = Position { x, y };
            let mut stack = cell.stack.into_iter();
            if let Some(base) = stack.next() {
                battlefield.set_terrain(pos, base)?;
            }
            for layer in stack {
                battlefield.push_tile(pos, Tile::new(layer))?;
            }
            if let Some(marker) = cell.marker {
                markers.entry(marker).or_default().push(pos);
            }
        }
    }
    Ok((battlefield, markers))
}

/// 從 ASCII 格式載入棋盤
///
/// ASCII 格式：每行用空格分隔的符號
/// - `.` 平原、`=` 道路、`f` 森林、`h` 丘陵、`m` 山地
/// - `~` 淺水、`w` 深水、`b` 深水上的橋、`#` 牆
/// - 其他字符串（`S`、`E` 等）= 平原上的標記位置
/// - 相同的標記會全部收集成 Vec
///
/// 返回：(棋盤, 標記映射)
///
/// 例如：
/// ```text
/// S . f
/// ~ b ~
/// . . E
/// ```
pub fn load_from_ascii(
    ascii: &str,
    cost_table: TerrainCostTable,
) -> Result<(Battlefield, HashMap<String, Vec<Position>>)> {
    let rows = parse_rows(ascii.lines())?;
    build_terrain(rows, cost_table)
}

/// 反序列化移動成本覆寫，套用在預設表之上
pub fn load_cost_table(cost_toml: &str) -> Result<TerrainCostTable> {
    let parsed: CostTableToml =
        toml::from_str(cost_toml).map_err(|e| LoadError::DeserializeError {
            format: "costs.toml".to_string(),
            reason: e.to_string(),
        })?;

    let mut table = TerrainCostTable::default();
    for entry in parsed.costs {
        table.set(entry.terrain, entry.move_type, entry.cost)?;
    }
    Ok(table)
}

/// 反序列化關卡
pub fn load_level(level_toml: &str, level_name: &str) -> Result<LevelInfo> {
    toml::from_str(level_toml).map_err(|e| {
        LoadError::DeserializeError {
            format: level_name.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// 依關卡資料建立棋盤並放置所有單位
pub fn build_battlefield(
    level: &LevelInfo,
    cost_table: TerrainCostTable,
    presenter: &mut dyn Presenter,
) -> Result<Battlefield> {
    let rows = parse_rows(level.terrain.iter().map(String::as_str))
        .context(format!("解析關卡 {} 地形", level.name))?;
    let (mut battlefield, markers) = build_terrain(rows, cost_table)?;
    if let Some(marker) = markers.keys().next() {
        return Err(LoadError::ParseError(format!("關卡地形含未知符號: {marker}")).into());
    }

    for pos in &level.goal_positions {
        battlefield
            .check_bounds(*pos)
            .context(format!("關卡 {} 目標位置", level.name))?;
    }
    for placement in &level.units {
        battlefield
            .spawn_unit(
                placement.kind,
                Faction(placement.faction),
                placement.position,
                presenter,
            )
            .context(format!(
                "關卡 {} 放置 {} 於 {:?}",
                level.name, placement.kind, placement.position
            ))?;
    }
    tracing::info!(level = %level.name, units = level.units.len(), "level loaded");
    Ok(battlefield)
}

/// 反序列化並生成關卡
pub fn spawn_level(
    level_toml: &str,
    level_name: &str,
    cost_table: TerrainCostTable,
    presenter: &mut dyn Presenter,
) -> Result<(LevelInfo, Battlefield)> {
    let level = load_level(level_toml, level_name)?;
    let battlefield = build_battlefield(&level, cost_table, presenter)?;
    Ok((level, battlefield))
}
