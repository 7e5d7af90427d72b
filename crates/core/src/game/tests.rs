use std::time::Duration;

use super::*;
use crate::agent::{Behavior, DecisionContext, DecisionOracle, PassiveDrainer};
use crate::clock::{ManualClock, NoAnimations};
use crate::combat::CombatStats;
use crate::error::{GameError, OracleError};
use crate::grid::Grid;
use crate::quest::{Quest, QuestCondition};
use crate::shout::{ShoutWorker, TemplateShouts};
use crate::test_support::add_monster;
use crate::types::{ActionTag, DialogueOutcome, Direction, EntityId, PlayerCommand, Pos, Species};

fn duel(rows: &[&str], player: Pos, stats: CombatStats, config: BalanceConfig) -> Game {
    let world = World::with_player_stats(Grid::from_rows(rows), player, stats);
    Game::with_world(3, config, world)
}

fn heavy_hitter() -> CombatStats {
    CombatStats::new(30, 1, 50, 60, 4)
}

fn tick_until(game: &mut Game, stop: impl Fn(&TickOutcome) -> bool) -> TickOutcome {
    let clock = ManualClock::new();
    let mut animations = NoAnimations::default();
    for _ in 0..100 {
        let outcome = game.tick(&clock, &mut animations);
        if stop(&outcome) {
            return outcome;
        }
        clock.advance(game.config().pacing_delay());
    }
    panic!("tick budget exhausted");
}

fn phase_over(outcome: &TickOutcome) -> bool {
    matches!(outcome, TickOutcome::PhaseEnded | TickOutcome::PlayerDefeated)
}

#[test]
fn commands_are_checked_against_the_phase() {
    let mut game = duel(&["....."], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default());
    assert_eq!(
        game.apply(PlayerCommand::ConcludeDialogue(DialogueOutcome::Peaceful)),
        Err(GameError::NoDialoguePending)
    );
    game.apply(PlayerCommand::EndTurn).unwrap();
    assert_eq!(game.apply(PlayerCommand::Move(Direction::Right)), Err(GameError::NotPlayerPhase));
    assert_eq!(game.apply(PlayerCommand::EndTurn), Err(GameError::NotPlayerPhase));
}

#[test]
fn moves_spend_ap_and_stop_when_it_runs_out() {
    let mut game = duel(&["#......"], Pos { y: 0, x: 1 }, heavy_hitter(), BalanceConfig::default());
    game.apply(PlayerCommand::Move(Direction::Left)).unwrap();
    assert_eq!(game.world().player_stats().ap(), 4, "walking into a wall costs nothing");

    for _ in 0..5 {
        game.apply(PlayerCommand::Move(Direction::Right)).unwrap();
    }
    assert_eq!(game.world().player_pos(), Pos { y: 0, x: 5 });
    assert_eq!(game.world().player_stats().ap(), 0);
}

#[test]
fn stepping_onto_items_picks_them_up() {
    let mut game = duel(&["...."], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default());
    game.world_mut().place_item(Pos { y: 0, x: 1 }, GroundItem { name: "lantern".into() });
    game.apply(PlayerCommand::Move(Direction::Right)).unwrap();
    assert_eq!(game.inventory(), &[GroundItem { name: "lantern".into() }]);
    assert!(game.log().contains(&LogEvent::ItemPickedUp { name: "lantern".into() }));
}

#[test]
fn killing_a_monster_leaves_remains_loot_and_quest_progress() {
    let mut game = duel(&["....."], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default());
    let goblin = add_monster(game.world_mut(), Species::Goblin, Pos { y: 0, x: 1 });
    let quest = game.quests_mut().add(Quest::new(
        "Cull the greenskins",
        vec![QuestCondition::new("Slay greenskins", &["greenskin"], 2)],
    ));
    game.quests_mut().start(quest);

    game.apply(PlayerCommand::Attack(Direction::Right)).unwrap();

    assert!(game.world().entity(goblin).is_none());
    assert!(game.log().contains(&LogEvent::EntityKilled {
        entity: goblin,
        species: Some(Species::Goblin)
    }));
    assert_eq!(game.quests().quest(quest).unwrap().conditions[0].current(), 1);
    assert_eq!(game.world().pending_respawns().len(), 1);
    assert_eq!(game.world().pending_respawns()[0].due_round, 8);

    game.apply(PlayerCommand::Move(Direction::Right)).unwrap();
    assert_eq!(game.world().player_pos(), Pos { y: 0, x: 1 }, "remains do not block");
    assert_eq!(game.inventory(), &[GroundItem { name: "rusty knife".into() }]);
}

#[test]
fn attacking_empty_ground_or_a_bystander_spends_nothing() {
    let mut game = duel(&["....."], Pos { y: 0, x: 1 }, heavy_hitter(), BalanceConfig::default());
    game.world_mut().spawn_npc("Warden", Pos { y: 0, x: 0 });
    game.apply(PlayerCommand::Attack(Direction::Right)).unwrap();
    game.apply(PlayerCommand::Attack(Direction::Left)).unwrap();
    assert_eq!(game.world().player_stats().ap(), 4);
    assert!(game.log().is_empty());
}

#[test]
fn wounded_berserker_may_rage() {
    let config = BalanceConfig { berserker_buff_chance: 1.0, ..BalanceConfig::default() };
    let mut game = duel(&["....."], Pos { y: 0, x: 0 }, CombatStats::new(30, 1, 5, 5, 4), config);
    let orc = add_monster(game.world_mut(), Species::OrcBerserker, Pos { y: 0, x: 1 });

    game.apply(PlayerCommand::Attack(Direction::Right)).unwrap();

    let rage = game.log().iter().find_map(|event| match event {
        LogEvent::BerserkerRage { entity, healed } if *entity == orc => Some(*healed),
        _ => None,
    });
    assert!(rage.is_some_and(|healed| healed > 0));
    assert_eq!(game.world().monster(orc).unwrap().stats.armor(), 3);
}

#[test]
fn attacked_monsters_turn_hostile() {
    let stats = CombatStats::new(30, 1, 1, 1, 4);
    let mut game = duel(&["....."], Pos { y: 0, x: 0 }, stats, BalanceConfig::default());
    let bandit = add_monster(game.world_mut(), Species::Bandit, Pos { y: 0, x: 1 });
    game.world_mut().monster_mut(bandit).hostile = false;
    game.apply(PlayerCommand::Attack(Direction::Right)).unwrap();
    assert!(game.world().monster(bandit).unwrap().hostile);
}

fn open_dialogue(game: &mut Game, speaker: EntityId) {
    game.world_mut().monster_mut(speaker).dialogue_chance = 1.0;
    game.apply(PlayerCommand::EndTurn).unwrap();
    let outcome = tick_until(game, |outcome| matches!(outcome, TickOutcome::DialogueStarted(_)));
    assert_eq!(outcome, TickOutcome::DialogueStarted(speaker));
}

#[test]
fn provoking_a_dryad_transforms_it_once() {
    let rows = ["..T....", "......."];
    let mut game = duel(&rows, Pos { y: 1, x: 6 }, heavy_hitter(), BalanceConfig::default());
    let dryad = add_monster(game.world_mut(), Species::Dryad, Pos { y: 0, x: 3 });
    open_dialogue(&mut game, dryad);

    game.apply(PlayerCommand::ConcludeDialogue(DialogueOutcome::Provoked)).unwrap();

    let stats = &game.world().monster(dryad).unwrap().stats;
    assert_eq!(stats.max_hp(), 24);
    assert!(game.log().contains(&LogEvent::LureTransformed { entity: dryad }));
    assert!(game.log().contains(&LogEvent::DialogueConcluded {
        entity: dryad,
        outcome: DialogueOutcome::Provoked
    }));
    assert_eq!(game.phase(), Phase::Monster);
    assert!(phase_over(&tick_until(&mut game, phase_over)));
}

#[test]
fn provoking_a_pacified_spirit_keeps_it_calm() {
    let mut game = duel(&["......."], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default());
    let wisp = add_monster(game.world_mut(), Species::Wisp, Pos { y: 0, x: 4 });
    let monster = game.world_mut().monster_mut(wisp);
    monster.behavior = Behavior::PassiveDrainer(PassiveDrainer::restore(true));
    monster.hostile = false;
    open_dialogue(&mut game, wisp);

    game.apply(PlayerCommand::ConcludeDialogue(DialogueOutcome::Provoked)).unwrap();

    assert!(!game.world().monster(wisp).unwrap().hostile, "pacified spirit turned hostile");
    assert!(phase_over(&tick_until(&mut game, phase_over)));
    assert!(
        !game.log().iter().any(|event| matches!(
            event,
            LogEvent::MonsterActed { entity, .. } | LogEvent::Drained { drainer: entity, .. }
                if *entity == wisp
        )),
        "pacified spirit acted after being provoked"
    );
}

#[test]
fn peaceful_dialogue_advances_the_narrative() {
    let mut game = duel(&["......."], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default());
    let bandit = add_monster(game.world_mut(), Species::Bandit, Pos { y: 0, x: 6 });
    open_dialogue(&mut game, bandit);
    game.apply(PlayerCommand::ConcludeDialogue(DialogueOutcome::Peaceful)).unwrap();
    assert_eq!(game.world().narrative_progress(), 1);
}

#[test]
fn defeat_ends_the_run() {
    let stats = CombatStats::new(1, 0, 1, 1, 4);
    let mut game = duel(&["....."], Pos { y: 0, x: 0 }, stats, BalanceConfig::default());
    add_monster(game.world_mut(), Species::Goblin, Pos { y: 0, x: 1 });
    game.apply(PlayerCommand::EndTurn).unwrap();

    assert_eq!(tick_until(&mut game, phase_over), TickOutcome::PlayerDefeated);
    assert_eq!(game.outcome(), Some(RunOutcome::Defeat));
    assert_eq!(game.apply(PlayerCommand::EndTurn), Err(GameError::RunFinished));
}

#[test]
fn slain_monsters_return_when_due() {
    let config = BalanceConfig { respawn_after_rounds: 1, ..BalanceConfig::default() };
    let mut game = duel(&["........"], Pos { y: 0, x: 0 }, heavy_hitter(), config);
    add_monster(game.world_mut(), Species::Wolf, Pos { y: 0, x: 1 });
    game.apply(PlayerCommand::Attack(Direction::Right)).unwrap();
    game.apply(PlayerCommand::EndTurn).unwrap();

    assert_eq!(tick_until(&mut game, phase_over), TickOutcome::PhaseEnded);
    assert_eq!(game.round(), 1);
    let returned = game.log().iter().find_map(|event| match event {
        LogEvent::Respawned { entity, species: Species::Wolf } => Some(*entity),
        _ => None,
    });
    let returned = returned.expect("wolf respawned");
    assert_eq!(game.world().entity(returned).unwrap().pos(), Pos { y: 0, x: 1 });
    assert!(game.world().pending_respawns().is_empty());
}

#[test]
fn same_seed_and_commands_give_the_same_hash() {
    let script = [
        PlayerCommand::Move(Direction::Up),
        PlayerCommand::Move(Direction::Up),
        PlayerCommand::EndTurn,
    ];
    let run = || {
        let mut game = Game::new(77, BalanceConfig::default());
        for command in script {
            game.apply(command).unwrap();
        }
        tick_until(&mut game, |outcome| {
            phase_over(outcome) || matches!(outcome, TickOutcome::DialogueStarted(_))
        });
        game.snapshot_hash()
    };
    assert_eq!(run(), run());
    let fresh = |seed| Game::new(seed, BalanceConfig::default()).snapshot_hash();
    assert_ne!(fresh(77), fresh(78));
}

#[test]
fn battle_shouts_reach_the_log() {
    let mut game = duel(&["......"], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default())
        .with_shouts(ShoutWorker::spawn(TemplateShouts::new(&["Grr!"])));
    let goblin = add_monster(game.world_mut(), Species::Goblin, Pos { y: 0, x: 4 });
    game.apply(PlayerCommand::EndTurn).unwrap();
    tick_until(&mut game, phase_over);

    assert!(game.shouts.as_ref().unwrap().wait_idle(Duration::from_secs(5)));
    let clock = ManualClock::new();
    game.tick(&clock, &mut NoAnimations::default());
    assert!(game.log().contains(&LogEvent::Shout { entity: goblin, text: "Grr!".into() }));
}

struct Unreachable;

impl DecisionOracle for Unreachable {
    fn decide(&self, _: EntityId, _: &DecisionContext<'_>) -> Result<ActionTag, OracleError> {
        Err(OracleError::Unavailable("no model loaded".into()))
    }
}

#[test]
fn oracle_outage_falls_back_to_behavior() {
    let mut game = duel(&["......"], Pos { y: 0, x: 0 }, heavy_hitter(), BalanceConfig::default())
        .with_oracle(Box::new(Unreachable));
    let goblin = add_monster(game.world_mut(), Species::Goblin, Pos { y: 0, x: 3 });
    game.world_mut().monster_mut(goblin).oracle_driven = true;
    game.apply(PlayerCommand::EndTurn).unwrap();
    tick_until(&mut game, phase_over);

    assert!(game.log().contains(&LogEvent::OracleFallback { entity: goblin }));
    assert!(game.log().contains(&LogEvent::MonsterActed {
        entity: goblin,
        action: ActionTag::Approach
    }));
}
