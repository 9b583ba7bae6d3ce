//! 棋盤模型測試：地形堆疊與雙視圖同步

use battlefield::alias::UnitID;
use battlefield::battlefield::Battlefield;
use battlefield::constants::IMPASSABLE_MOVEMENT_COST;
use battlefield::core_types::{Faction, Position};
use battlefield::error::{BoardError, ErrorKind, UnitError};
use battlefield::presenter::NullPresenter;
use battlefield::terrain::{MoveType, TerrainCostTable, TerrainType, Tile};
use battlefield::test_helpers::{PresenterEvent, RecordingPresenter};
use battlefield::unit::UnitKind;
use std::collections::HashSet;

fn field(width: usize, height: usize) -> Battlefield {
    Battlefield::new(width, height, TerrainType::Plain, TerrainCostTable::default())
        .expect("Battlefield::new 應成功")
}

/// 佔據格與陣營歸屬必須描述同一組單位
fn assert_views_consistent(battlefield: &Battlefield) {
    let on_grid: HashSet<UnitID> = battlefield
        .positions()
        .filter_map(|p| battlefield.unit_at(p).unwrap())
        .collect();
    let mut owned = HashSet::new();
    for faction in battlefield.factions() {
        for id in battlefield.units_of(faction) {
            assert!(owned.insert(id), "單位 {id} 屬於多個陣營");
        }
    }
    assert_eq!(on_grid, owned);
    for id in &on_grid {
        let pos = battlefield.position_of(*id).unwrap();
        assert_eq!(battlefield.unit_at(pos).unwrap(), Some(*id));
    }
}

#[test]
fn test_tile_stack() {
    let mut battlefield = field(3, 3);
    let pos = Position::new(1, 1);
    assert!(matches!(
        battlefield.pop_tile(pos).unwrap_err().kind(),
        ErrorKind::Board(BoardError::LastTileInStack { .. })
    ));

    battlefield.set_terrain(pos, TerrainType::DeepWater).unwrap();
    assert_eq!(
        battlefield.movement_cost(pos, MoveType::Infantry).unwrap(),
        IMPASSABLE_MOVEMENT_COST
    );
    battlefield.push_tile(pos, Tile::new(TerrainType::Bridge)).unwrap();
    assert_eq!(battlefield.tile_stack(pos).unwrap().len(), 2);
    assert_eq!(battlefield.top_tile(pos).unwrap().terrain, TerrainType::Bridge);
    assert_eq!(battlefield.movement_cost(pos, MoveType::Infantry).unwrap(), 1);

    assert_eq!(battlefield.pop_tile(pos).unwrap().terrain, TerrainType::Bridge);
    assert_eq!(battlefield.top_tile(pos).unwrap().terrain, TerrainType::DeepWater);
}

#[test]
fn test_out_of_bounds_is_rejected() {
    let mut battlefield = field(3, 2);
    let outside = Position::new(3, 0);
    assert!(battlefield.top_tile(outside).is_err());
    assert!(battlefield.unit_at(outside).is_err());
    assert!(battlefield.push_tile(outside, Tile::default()).is_err());
    let err = battlefield
        .spawn_unit(UnitKind::Archer, Faction(0), outside, &mut NullPresenter)
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Board(BoardError::OutOfBounds { width: 3, height: 2, .. })
    ));
    assert_eq!(battlefield.units().count(), 0);
}

#[test]
fn test_spawn_notifies_and_registers() {
    let mut battlefield = field(3, 3);
    let mut presenter = RecordingPresenter::new();
    let pos = Position::new(2, 2);
    let id = battlefield
        .spawn_unit(UnitKind::Cavalry, Faction(2), pos, &mut presenter)
        .unwrap();

    assert_ne!(id, 0);
    assert_eq!(
        presenter.events,
        vec![
            PresenterEvent::Faction(id, Faction(2)),
            PresenterEvent::Health(id, 100),
        ]
    );
    assert_eq!(battlefield.unit_at(pos).unwrap(), Some(id));
    assert_eq!(battlefield.faction_at(pos).unwrap(), Some(Faction(2)));
    assert_eq!(battlefield.unit(id).unwrap().kind, UnitKind::Cavalry);

    let err = battlefield
        .spawn_unit(UnitKind::Archer, Faction(1), pos, &mut presenter)
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Board(BoardError::CellOccupied { occupant, .. }) if *occupant == id
    ));
    assert_views_consistent(&battlefield);
}

#[test]
fn test_views_stay_consistent_through_mutations() {
    let mut battlefield = field(4, 4);
    let mut ids = Vec::new();
    for (i, kind) in [UnitKind::Swordsman, UnitKind::Archer, UnitKind::Cavalry]
        .into_iter()
        .enumerate()
    {
        let id = battlefield
            .spawn_unit(kind, Faction(i as u32 % 2), Position::new(i, i), &mut NullPresenter)
            .unwrap();
        ids.push(id);
    }
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3, "id 不重複");
    assert_views_consistent(&battlefield);

    battlefield.move_unit(ids[0], Position::new(3, 0)).unwrap();
    assert_views_consistent(&battlefield);

    let err = battlefield.move_unit(ids[0], Position::new(1, 1)).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Board(BoardError::CellOccupied { .. })
    ));
    assert_eq!(battlefield.position_of(ids[0]).unwrap(), Position::new(3, 0));

    let mut presenter = RecordingPresenter::new();
    battlefield
        .transfer_unit(ids[1], Faction(0), &mut presenter)
        .unwrap();
    assert_eq!(battlefield.faction_of(ids[1]).unwrap(), Faction(0));
    assert_eq!(presenter.events, vec![PresenterEvent::Faction(ids[1], Faction(0))]);
    assert_eq!(battlefield.units_of(Faction(1)).count(), 0);
    assert_views_consistent(&battlefield);

    let removed = battlefield.defeat_unit(ids[2], &mut presenter).unwrap();
    assert_eq!(removed.id, ids[2]);
    assert_eq!(battlefield.unit_at(Position::new(2, 2)).unwrap(), None);
    assert!(matches!(
        battlefield.position_of(ids[2]).unwrap_err().kind(),
        ErrorKind::Unit(UnitError::UnitNotFound { .. })
    ));
    assert!(presenter.events.contains(&PresenterEvent::Removed(ids[2])));
    assert_views_consistent(&battlefield);
}

#[test]
fn test_factions() {
    let mut battlefield = field(2, 2);
    battlefield.add_faction(Faction(5));
    assert_eq!(battlefield.factions().collect::<Vec<_>>(), vec![Faction(5)]);
    assert_eq!(battlefield.units_of(Faction(5)).count(), 0);
    assert_eq!(battlefield.units_of(Faction(9)).count(), 0);
    assert_eq!(battlefield.faction_at(Position::new(0, 0)).unwrap(), None);
}
