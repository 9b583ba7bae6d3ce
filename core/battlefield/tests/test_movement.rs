//! 可移動範圍測試

use battlefield::alias::MovementCost;
use battlefield::battlefield::Battlefield;
use battlefield::buff::{Buff, BuffKind, BuffType};
use battlefield::core_types::{Faction, Position};
use battlefield::error::{BoardError, ErrorKind};
use battlefield::loader::load_from_ascii;
use battlefield::logic::movement::{
    Direction, Mover, compute_reachable_tiles, reachable_positions, step_in_direction,
    valid_move_area, valid_moves,
};
use battlefield::presenter::NullPresenter;
use battlefield::terrain::{MoveType, TerrainCostTable, TerrainType};
use battlefield::test_helpers::{battlefield_from_ascii, marker_pos};
use battlefield::unit::UnitKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const PLAYER: Faction = Faction(0);
const ENEMY: Faction = Faction(1);

const OPEN_5X5: &str = "
. . . . .
. . . . .
. . . . .
. . . . .
. . . . .
";

fn uniform_board(ascii: &str) -> Battlefield {
    let (battlefield, _) =
        load_from_ascii(ascii, TerrainCostTable::uniform(1)).expect("load_from_ascii 應成功");
    battlefield
}

fn mover_at(x: usize, y: usize) -> Mover {
    Mover {
        pos: Position::new(x, y),
        move_type: MoveType::Infantry,
        faction: PLAYER,
    }
}

fn within(center: Position, max: usize, battlefield: &Battlefield) -> HashSet<Position> {
    battlefield
        .positions()
        .filter(|p| *p != center && p.distance(center) <= max)
        .collect()
}

fn pos_set(positions: &[(usize, usize)]) -> HashSet<Position> {
    positions.iter().map(|&(x, y)| Position::new(x, y)).collect()
}

#[test]
fn test_step_in_direction() {
    let battlefield = uniform_board(
        "
. . .
. . .
",
    );
    let test_data = [
        ((0, 0), Direction::Up, None),
        ((0, 0), Direction::Left, None),
        ((0, 0), Direction::Right, Some((1, 0))),
        ((0, 0), Direction::Down, Some((0, 1))),
        ((2, 1), Direction::Right, None),
        ((2, 1), Direction::Down, None),
        ((2, 1), Direction::Up, Some((2, 0))),
    ];
    for (from, direction, expected) in test_data {
        let result = step_in_direction(&battlefield, Position::new(from.0, from.1), direction);
        assert_eq!(
            result,
            expected.map(|(x, y)| Position::new(x, y)),
            "{from:?} 往 {direction:?}"
        );
    }
}

#[test]
fn test_open_grid_budget_two() {
    let battlefield = uniform_board(OPEN_5X5);
    let result = compute_reachable_tiles(&battlefield, mover_at(2, 2), 2).unwrap();
    assert_eq!(result.len(), 12);
    assert_eq!(result, within(Position::new(2, 2), 2, &battlefield));
}

#[test]
fn test_enemy_blocks_cell_and_shadow() {
    let (battlefield, markers) = battlefield_from_ascii(
        "
. . . . .
. . . . .
. . S . .
. . E . .
. . . . .
",
        TerrainCostTable::uniform(1),
        &[("S", UnitKind::Swordsman, 0), ("E", UnitKind::Swordsman, 1)],
    )
    .unwrap();
    let start = marker_pos(&markers, "S");
    let mover = Mover {
        pos: start,
        move_type: MoveType::Infantry,
        faction: PLAYER,
    };

    let result = compute_reachable_tiles(&battlefield, mover, 2).unwrap();
    let open = within(start, 2, &battlefield);
    let excluded: HashSet<Position> = open.difference(&result).copied().collect();
    // 敵人本身，以及只能穿過敵人才到得了的 (2,4)
    assert_eq!(excluded, pos_set(&[(2, 3), (2, 4)]));
    assert_eq!(result.len(), 10);
}

#[test]
fn test_ally_is_passable_but_not_a_destination() {
    let (battlefield, markers) = battlefield_from_ascii(
        "
. . . . .
. . . . .
. . S A .
. . . . .
. . . . .
",
        TerrainCostTable::uniform(1),
        &[("S", UnitKind::Swordsman, 0), ("A", UnitKind::Archer, 0)],
    )
    .unwrap();
    let start = marker_pos(&markers, "S");
    let mover = Mover {
        pos: start,
        move_type: MoveType::Infantry,
        faction: PLAYER,
    };

    let area = reachable_positions(&battlefield, mover, 2).unwrap();
    assert!(!area.contains(Position::new(3, 2)));
    assert!(area.contains(Position::new(4, 2)));
    assert!(area.passthrough.contains_key(&Position::new(3, 2)));
    assert_eq!(
        area.path_to(Position::new(4, 2)).unwrap(),
        vec![Position::new(2, 2), Position::new(3, 2), Position::new(4, 2)]
    );
}

#[test]
fn test_terrain_costs() {
    let (battlefield, _) = load_from_ascii(
        "
. f . .
. ~ . .
. # . .
",
        TerrainCostTable::default(),
    )
    .unwrap();

    // 步兵從 (0,0)：森林 2、淺水 2、牆不可通過
    let infantry = compute_reachable_tiles(&battlefield, mover_at(0, 0), 2).unwrap();
    assert_eq!(
        infantry,
        pos_set(&[(1, 0), (0, 1), (0, 2)]),
        "森林和淺水各花 2，牆略過"
    );

    let cavalry = Mover {
        move_type: MoveType::Mounted,
        ..mover_at(0, 0)
    };
    let result = compute_reachable_tiles(&battlefield, cavalry, 2).unwrap();
    assert_eq!(result, pos_set(&[(0, 1), (0, 2)]), "騎兵進森林要 3");

    let flyer = Mover {
        move_type: MoveType::Flying,
        ..mover_at(0, 0)
    };
    let result = compute_reachable_tiles(&battlefield, flyer, 1).unwrap();
    assert_eq!(result, pos_set(&[(1, 0), (0, 1)]));
    let result = compute_reachable_tiles(&battlefield, flyer, 3).unwrap();
    assert!(!result.contains(&Position::new(1, 2)), "牆連飛行都擋");
}

#[test]
fn test_bridge_over_deep_water() {
    let (battlefield, _) = load_from_ascii(
        "
. w .
. b .
. w .
",
        TerrainCostTable::default(),
    )
    .unwrap();
    assert_eq!(
        battlefield
            .tile_stack(Position::new(1, 1))
            .unwrap()
            .iter()
            .map(|t| t.terrain)
            .collect::<Vec<_>>(),
        vec![TerrainType::DeepWater, TerrainType::Bridge]
    );

    let result = compute_reachable_tiles(&battlefield, mover_at(0, 1), 2).unwrap();
    assert!(result.contains(&Position::new(1, 1)), "只看最上層的橋");
    assert!(result.contains(&Position::new(2, 1)));
    assert!(!result.contains(&Position::new(1, 0)));
    assert!(!result.contains(&Position::new(1, 2)));
}

#[test]
fn test_cheapest_path_is_kept() {
    let (battlefield, _) = load_from_ascii(
        "
. m m .
. . . .
",
        TerrainCostTable::default(),
    )
    .unwrap();
    let area = reachable_positions(&battlefield, mover_at(0, 0), 5).unwrap();
    let target = Position::new(3, 0);
    assert_eq!(area.destinations[&target].cost, 5, "繞過山地比翻山便宜");
    assert_eq!(
        area.path_to(target).unwrap(),
        vec![
            Position::new(0, 0),
            Position::new(0, 1),
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(3, 1),
            Position::new(3, 0),
        ]
    );
    assert!(matches!(
        area.path_to(Position::new(0, 0)).unwrap_err().kind(),
        ErrorKind::Board(BoardError::NotReachable { .. })
    ));
}

#[test]
fn test_zero_budget_and_out_of_bounds() {
    let battlefield = uniform_board(OPEN_5X5);
    assert!(
        compute_reachable_tiles(&battlefield, mover_at(0, 0), 0)
            .unwrap()
            .is_empty()
    );

    let err = compute_reachable_tiles(&battlefield, mover_at(5, 0), 2).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Board(BoardError::OutOfBounds { x: 5, y: 0, .. })
    ));
}

#[test]
fn test_valid_moves_uses_unit_state() {
    let (mut battlefield, markers) = battlefield_from_ascii(
        OPEN_5X5.replacen('.', "S", 1).as_str(),
        TerrainCostTable::uniform(1),
        &[("S", UnitKind::Swordsman, 0)],
    )
    .unwrap();
    let start = marker_pos(&markers, "S");
    let unit_id = battlefield.unit_at(start).unwrap().unwrap();

    assert_eq!(
        valid_moves(&battlefield, unit_id).unwrap(),
        within(start, 3, &battlefield)
    );

    let unit = battlefield.unit_mut(unit_id).unwrap();
    unit.add_buff(
        Buff::new(BuffKind::StatModifier, BuffType::Movement, -2, Some(1)),
        &mut NullPresenter,
    );
    assert_eq!(
        valid_moves(&battlefield, unit_id).unwrap(),
        within(start, 1, &battlefield)
    );

    battlefield.unit_mut(unit_id).unwrap().has_moved_this_turn = true;
    assert!(valid_moves(&battlefield, unit_id).unwrap().is_empty());
    assert_eq!(valid_move_area(&battlefield, unit_id).unwrap().origin, start);
}

#[test]
fn test_random_boards_properties() {
    let symbols = [".", ".", ".", "f", "h", "~", "w", "m", "#"];
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..40 {
        let width = rng.random_range(1..8);
        let height = rng.random_range(1..8);
        let ascii: String = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| symbols[rng.random_range(0..symbols.len())])
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");
        let (mut battlefield, _) = load_from_ascii(&ascii, TerrainCostTable::default()).unwrap();

        let mut hostile = HashSet::new();
        for _ in 0..rng.random_range(0..4) {
            let pos = Position::new(rng.random_range(0..width), rng.random_range(0..height));
            let faction = if rng.random_bool(0.5) { PLAYER } else { ENEMY };
            if battlefield
                .spawn_unit(UnitKind::Swordsman, faction, pos, &mut NullPresenter)
                .is_ok()
                && faction == ENEMY
            {
                hostile.insert(pos);
            }
        }

        let origin = Position::new(rng.random_range(0..width), rng.random_range(0..height));
        let mover = Mover {
            pos: origin,
            move_type: MoveType::Infantry,
            faction: PLAYER,
        };

        let mut previous: HashSet<Position> = HashSet::new();
        for budget in 0..6 as MovementCost {
            let result = compute_reachable_tiles(&battlefield, mover, budget).unwrap();
            assert!(result.iter().all(|p| battlefield.is_valid_position(*p)));
            assert!(!result.contains(&origin));
            assert!(result.iter().all(|p| battlefield.unit_at(*p).unwrap().is_none()));
            assert!(result.is_disjoint(&hostile));
            assert!(previous.is_subset(&result), "預算增加不應縮小範圍");
            assert_eq!(
                result,
                compute_reachable_tiles(&battlefield, mover, budget).unwrap()
            );
            previous = result;
        }
    }
}
