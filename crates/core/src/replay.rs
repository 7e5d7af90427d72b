//! Headless re-execution of a recorded run.
//! Monster phases are driven with a manual clock and no animations, which changes timing
//! only; every roll comes from the seeded session stream, so the result is reproducible.
//! Runs that consulted a decision oracle are not reproducible this way.

use crate::clock::{AnimationGate, ManualClock, NoAnimations};
use crate::config::BalanceConfig;
use crate::error::ReplayError;
use crate::game::Game;
use crate::journal::InputJournal;
use crate::scheduler::TickOutcome;
use crate::types::RunOutcome;

/// Tick budget for one monster phase before a replay is declared stuck.
pub const MAX_PHASE_TICKS: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_round: u64,
    pub outcome: Option<RunOutcome>,
    pub final_snapshot_hash: u64,
    pub applied_inputs: usize,
}

/// Ticks until the game needs the player again: the phase ended, the player fell, a
/// conversation opened, or there was no monster phase running in the first place.
pub fn drive_until_input(
    game: &mut Game,
    clock: &ManualClock,
    animations: &mut dyn AnimationGate,
    max_ticks: u32,
) -> Result<TickOutcome, ReplayError> {
    for _ in 0..max_ticks {
        let outcome = game.tick(clock, animations);
        match outcome {
            TickOutcome::Idle
            | TickOutcome::PhaseEnded
            | TickOutcome::PlayerDefeated
            | TickOutcome::DialogueStarted(_) => return Ok(outcome),
            TickOutcome::Waiting | TickOutcome::Skipped(_) | TickOutcome::Acted { .. } => {
                clock.advance(game.config().pacing_delay());
            }
        }
    }
    Err(ReplayError::Stalled(max_ticks))
}

pub fn replay_to_end(
    journal: &InputJournal,
    config: &BalanceConfig,
) -> Result<ReplayResult, ReplayError> {
    let mut game = Game::new(journal.seed, config.clone());
    let clock = ManualClock::new();
    let mut animations = NoAnimations::default();

    for record in &journal.inputs {
        game.apply(record.command)
            .map_err(|source| ReplayError::Rejected { seq: record.seq, source })?;
        drive_until_input(&mut game, &clock, &mut animations, MAX_PHASE_TICKS)?;
    }

    Ok(ReplayResult {
        final_round: game.round(),
        outcome: game.outcome(),
        final_snapshot_hash: game.snapshot_hash(),
        applied_inputs: journal.inputs.len(),
    })
}

#[cfg(test)]
mod tests;
