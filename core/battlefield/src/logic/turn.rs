//! 回合層的提交操作
//!
//! 先以唯讀的求解器驗證，再透過 [`Battlefield`] 的方法一次更新兩個視圖。

use crate::alias::UnitID;
use crate::battlefield::Battlefield;
use crate::core_types::{Faction, Position};
use crate::error::{BoardError, Result, UnitError};
use crate::logic::battle::BattleOutcome;
use crate::logic::movement::valid_move_area;
use crate::presenter::Presenter;

/// 沿合法路徑移動單位並標記本回合已移動，回傳走過的路徑
pub fn commit_move(
    battlefield: &mut Battlefield,
    unit_id: UnitID,
    to: Position,
) -> Result<Vec<Position>> {
    if battlefield.unit(unit_id)?.has_moved_this_turn {
        return Err(UnitError::AlreadyMoved { unit_id }.into());
    }
    let area = valid_move_area(battlefield, unit_id)?;
    let path = area.path_to(to)?;
    battlefield.move_unit(unit_id, to)?;
    battlefield.unit_mut(unit_id)?.has_moved_this_turn = true;
    Ok(path)
}

/// 攻擊 `target` 上的敵方單位
///
/// 結算後標記攻擊者本回合已攻擊，並移除所有生命歸零的參戰單位。
pub fn commit_attack(
    battlefield: &mut Battlefield,
    attacker_id: UnitID,
    target: Position,
    presenter: &mut dyn Presenter,
) -> Result<BattleOutcome> {
    let attacker = battlefield.unit(attacker_id)?;
    if attacker.has_attacked_this_turn() {
        return Err(UnitError::AlreadyAttacked {
            unit_id: attacker_id,
        }
        .into());
    }
    let archetype = attacker.kind.archetype();
    let pos = battlefield.position_of(attacker_id)?;
    let faction = battlefield.faction_of(attacker_id)?;
    if !archetype.targets(battlefield, pos, faction)?.contains(&target) {
        return Err(UnitError::InvalidTarget {
            unit_id: attacker_id,
            pos: target,
        }
        .into());
    }
    let enemy_id = battlefield
        .unit_at(target)?
        .ok_or(BoardError::EmptyCell { pos: target })?;

    let outcome = archetype.do_battle_with(battlefield, attacker_id, enemy_id, presenter)?;
    tracing::debug!(attacker_id, enemy_id, ?outcome, "battle resolved");

    battlefield
        .unit_mut(attacker_id)?
        .set_has_attacked_this_turn(true, presenter);
    if outcome.enemy_destroyed {
        battlefield.defeat_unit(enemy_id, presenter)?;
    }
    if outcome.attacker_destroyed {
        battlefield.defeat_unit(attacker_id, presenter)?;
    }
    Ok(outcome)
}

/// 陣營回合開始：清除回合旗標、扣除 buff 持續回合
pub fn begin_turn(
    battlefield: &mut Battlefield,
    faction: Faction,
    presenter: &mut dyn Presenter,
) -> Result<()> {
    if !battlefield.factions().any(|f| f == faction) {
        return Err(UnitError::FactionNotFound { faction }.into());
    }
    let unit_ids: Vec<UnitID> = battlefield.units_of(faction).collect();
    for unit_id in unit_ids {
        let unit = battlefield.unit_mut(unit_id)?;
        unit.reset_turn(presenter);
        unit.tick_buffs(presenter);
    }
    tracing::debug!(?faction, "turn started");
    Ok(())
}
