//! 戰鬥判定
//!
//! 每種單位原型實作 [`Archetype`]，負責傷害計算、戰鬥結算與攻擊範圍。
//! 傷害為確定性整數公式，預覽（`battle_damage`）與實際結算必須一致：
//!
//! ```text
//! raw     = base_attack * armor_modifier(enemy.armor) / 100
//! boosted = raw * (100 + 攻擊 buff) / 100
//! scaled  = boosted * attacker.health / attacker.max_health
//! damage  = scaled * (100 - clamp(地形防禦 + 防禦 buff, 0, 100)) / 100
//! ```

use crate::alias::{Health, Percent, UnitID};
use crate::battlefield::Battlefield;
use crate::buff::BuffType;
use crate::constants::{ARCHER_MAX_RANGE, ARCHER_MIN_RANGE, MAX_DAMAGE_REDUCTION, MELEE_RANGE};
use crate::core_types::{Faction, Position};
use crate::error::Result;
use crate::logic::movement::{Mover, compute_reachable_tiles};
use crate::presenter::Presenter;
use crate::terrain::{ArmorType, Tile};
use crate::unit::{Unit, UnitKind};
use std::collections::HashSet;

/// 一次戰鬥的結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattleOutcome {
    pub damage_dealt: Health,
    /// 敵方反擊造成的傷害，沒有反擊為 0
    pub counter_damage: Health,
    pub enemy_destroyed: bool,
    pub attacker_destroyed: bool,
}

pub trait Archetype {
    fn base_attack(&self) -> Health;

    /// 對不同護甲的傷害倍率（百分比）
    fn armor_modifier(&self, armor: ArmorType) -> Percent;

    /// 預覽傷害，不造成任何副作用（AI 評估用）
    fn battle_damage(&self, attacker: &Unit, enemy: &Unit, enemy_tile: &Tile) -> Health {
        if attacker.is_defeated() {
            return 0;
        }
        // 以 i64 計算，極端的 buff 或生命值只會讓結果飽和在 Health::MAX
        let attack_bonus = i64::from(attacker.buffs().total_value(BuffType::Attack));
        let defense_bonus = i64::from(enemy.buffs().total_value(BuffType::Defense));

        let raw = i64::from(self.base_attack())
            .saturating_mul(i64::from(self.armor_modifier(enemy.armor())))
            / 100;
        let boosted = raw.saturating_mul((100 + attack_bonus).max(0)) / 100;
        let Some(scaled) = boosted
            .saturating_mul(i64::from(attacker.health()))
            .checked_div(i64::from(attacker.max_health()))
        else {
            return 0;
        };
        let reduction = (i64::from(enemy_tile.defense()) + defense_bonus)
            .clamp(0, i64::from(MAX_DAMAGE_REDUCTION));
        let damage = (scaled.saturating_mul(100 - reduction) / 100).max(0);
        Health::try_from(damage).unwrap_or(Health::MAX)
    }

    /// 結算戰鬥：扣除敵方生命，存活且攻擊者在其攻擊範圍內時反擊
    ///
    /// 不移除被擊敗的單位，由回合層依結果處理。
    fn do_battle_with(
        &self,
        battlefield: &mut Battlefield,
        attacker_id: UnitID,
        enemy_id: UnitID,
        presenter: &mut dyn Presenter,
    ) -> Result<BattleOutcome> {
        let attacker_pos = battlefield.position_of(attacker_id)?;
        let enemy_pos = battlefield.position_of(enemy_id)?;
        let attacker_tile = *battlefield.top_tile(attacker_pos)?;
        let enemy_tile = *battlefield.top_tile(enemy_pos)?;

        let damage = self.battle_damage(
            battlefield.unit(attacker_id)?,
            battlefield.unit(enemy_id)?,
            &enemy_tile,
        );
        let enemy_health = battlefield
            .unit_mut(enemy_id)?
            .apply_damage(damage, presenter);

        let mut outcome = BattleOutcome {
            damage_dealt: damage,
            enemy_destroyed: enemy_health <= 0,
            ..Default::default()
        };
        if outcome.enemy_destroyed {
            return Ok(outcome);
        }

        let enemy_archetype = battlefield.unit(enemy_id)?.kind.archetype();
        if !enemy_archetype
            .attack_zone(battlefield, enemy_pos)
            .contains(&attacker_pos)
        {
            return Ok(outcome);
        }
        let counter = enemy_archetype.battle_damage(
            battlefield.unit(enemy_id)?,
            battlefield.unit(attacker_id)?,
            &attacker_tile,
        );
        let attacker_health = battlefield
            .unit_mut(attacker_id)?
            .apply_damage(counter, presenter);
        outcome.counter_damage = counter;
        outcome.attacker_destroyed = attacker_health <= 0;
        Ok(outcome)
    }

    /// 幾何攻擊範圍（不看佔據），只含棋盤內位置
    fn attack_zone(&self, battlefield: &Battlefield, pos: Position) -> Vec<Position>;

    /// 威脅範圍顯示用，已去重
    fn total_attack_zone(
        &self,
        battlefield: &Battlefield,
        unit: &Unit,
        pos: Position,
        faction: Faction,
    ) -> Result<HashSet<Position>>;

    /// 攻擊範圍內有敵方單位的位置
    fn targets(
        &self,
        battlefield: &Battlefield,
        pos: Position,
        faction: Faction,
    ) -> Result<Vec<Position>> {
        let mut targets = Vec::new();
        for cell in self.attack_zone(battlefield, pos) {
            match battlefield.faction_at(cell)? {
                Some(other) if other != faction => targets.push(cell),
                _ => {}
            }
        }
        Ok(targets)
    }
}

/// 近戰原型共用：原地與每個可移動位置的攻擊範圍聯集
fn attack_zone_after_moving(
    archetype: &(impl Archetype + ?Sized),
    battlefield: &Battlefield,
    unit: &Unit,
    pos: Position,
    faction: Faction,
) -> Result<HashSet<Position>> {
    let mut zone: HashSet<Position> = archetype.attack_zone(battlefield, pos).into_iter().collect();
    if unit.has_moved_this_turn {
        return Ok(zone);
    }
    let mover = Mover {
        pos,
        move_type: unit.move_type(),
        faction,
    };
    for reachable in compute_reachable_tiles(battlefield, mover, unit.effective_move_distance())? {
        zone.extend(archetype.attack_zone(battlefield, reachable));
    }
    Ok(zone)
}

/// 劍士：步兵近戰
#[derive(Debug, Clone, Copy)]
pub struct Swordsman;

impl Archetype for Swordsman {
    fn base_attack(&self) -> Health {
        55
    }

    fn armor_modifier(&self, armor: ArmorType) -> Percent {
        match armor {
            ArmorType::Light => 110,
            ArmorType::Medium => 100,
            ArmorType::Heavy => 70,
        }
    }

    fn attack_zone(&self, battlefield: &Battlefield, pos: Position) -> Vec<Position> {
        battlefield.positions_in_range(pos, MELEE_RANGE, MELEE_RANGE)
    }

    fn total_attack_zone(
        &self,
        battlefield: &Battlefield,
        unit: &Unit,
        pos: Position,
        faction: Faction,
    ) -> Result<HashSet<Position>> {
        attack_zone_after_moving(self, battlefield, unit, pos, faction)
    }
}

/// 騎兵：騎乘近戰，對輕甲特別有效
#[derive(Debug, Clone, Copy)]
pub struct Cavalry;

impl Archetype for Cavalry {
    fn base_attack(&self) -> Health {
        65
    }

    fn armor_modifier(&self, armor: ArmorType) -> Percent {
        match armor {
            ArmorType::Light => 120,
            ArmorType::Medium => 100,
            ArmorType::Heavy => 80,
        }
    }

    fn attack_zone(&self, battlefield: &Battlefield, pos: Position) -> Vec<Position> {
        battlefield.positions_in_range(pos, MELEE_RANGE, MELEE_RANGE)
    }

    fn total_attack_zone(
        &self,
        battlefield: &Battlefield,
        unit: &Unit,
        pos: Position,
        faction: Faction,
    ) -> Result<HashSet<Position>> {
        attack_zone_after_moving(self, battlefield, unit, pos, faction)
    }
}

/// 弓兵：遠程，無法移動後射擊，相鄰格打不到
#[derive(Debug, Clone, Copy)]
pub struct Archer;

impl Archetype for Archer {
    fn base_attack(&self) -> Health {
        45
    }

    fn armor_modifier(&self, armor: ArmorType) -> Percent {
        match armor {
            ArmorType::Light => 120,
            ArmorType::Medium => 90,
            ArmorType::Heavy => 60,
        }
    }

    fn attack_zone(&self, battlefield: &Battlefield, pos: Position) -> Vec<Position> {
        battlefield.positions_in_range(pos, ARCHER_MIN_RANGE, ARCHER_MAX_RANGE)
    }

    fn total_attack_zone(
        &self,
        battlefield: &Battlefield,
        _unit: &Unit,
        pos: Position,
        _faction: Faction,
    ) -> Result<HashSet<Position>> {
        Ok(self.attack_zone(battlefield, pos).into_iter().collect())
    }
}

impl UnitKind {
    pub fn archetype(self) -> &'static dyn Archetype {
        match self {
            UnitKind::Swordsman => &Swordsman,
            UnitKind::Cavalry => &Cavalry,
            UnitKind::Archer => &Archer,
        }
    }
}
