//! Monster phases always drain: every seed, every round, within the AP each monster holds.

use grove_core::autopilot::next_command;
use grove_core::clock::{ManualClock, NoAnimations};
use grove_core::{BalanceConfig, Game, Phase, PlayerCommand, TickOutcome};

const SEEDS: u64 = 24;
const COMMANDS_PER_RUN: usize = 150;

/// Upper bound on scheduler opportunities for one phase: each AP point can pay for at most
/// one spending action, and each monster gets one extra opportunity that spends nothing.
fn opportunity_budget(game: &Game) -> u64 {
    game.world()
        .roster()
        .filter_map(|entity| entity.monster())
        .filter(|monster| monster.stats.is_alive())
        .map(|monster| u64::from(monster.stats.max_ap()) + 1)
        .sum()
}

#[test]
fn every_phase_ends_within_its_action_budget() {
    let config = BalanceConfig::default();
    for seed in 0..SEEDS {
        let mut game = Game::new(seed, config.clone());
        let clock = ManualClock::new();
        let mut animations = NoAnimations::default();

        for _ in 0..COMMANDS_PER_RUN {
            if game.outcome().is_some() {
                break;
            }
            let command = next_command(&game);
            let ends_turn = command == PlayerCommand::EndTurn;
            let budget = if ends_turn { opportunity_budget(&game) } else { 0 };
            game.apply(command).unwrap();

            let mut acted = 0_u64;
            let mut ticks = 0_u32;
            loop {
                ticks += 1;
                assert!(ticks < 10_000, "seed {seed}: phase stalled");
                match game.tick(&clock, &mut animations) {
                    TickOutcome::Acted { .. } => acted += 1,
                    TickOutcome::Idle
                    | TickOutcome::PhaseEnded
                    | TickOutcome::PlayerDefeated
                    | TickOutcome::DialogueStarted(_) => break,
                    TickOutcome::Waiting | TickOutcome::Skipped(_) => {}
                }
                clock.advance(config.pacing_delay());
            }
            if ends_turn {
                assert!(acted <= budget, "seed {seed}: {acted} actions against budget {budget}");
            }
            if game.outcome().is_none() {
                assert!(matches!(game.phase(), Phase::Player | Phase::Suspended { .. }));
            }
        }
    }
}
