use super::*;
use crate::autopilot::next_command;
use crate::error::GameError;
use crate::types::{DialogueOutcome, PlayerCommand};

const MAX_TEST_COMMANDS: usize = 2_000;

fn record_run(seed: u64, rounds: u64) -> (Game, InputJournal) {
    let config = BalanceConfig::default();
    let mut game = Game::new(seed, config);
    let mut journal = InputJournal::new(seed);
    let clock = ManualClock::new();
    let mut animations = NoAnimations::default();

    for _ in 0..MAX_TEST_COMMANDS {
        if game.round() >= rounds || game.outcome().is_some() {
            break;
        }
        let command = next_command(&game);
        game.apply(command).unwrap();
        journal.append(command);
        drive_until_input(&mut game, &clock, &mut animations, MAX_PHASE_TICKS).unwrap();
    }
    (game, journal)
}

#[test]
fn replay_matches_the_recorded_run() {
    for seed in [1, 777, 4242] {
        let (game, journal) = record_run(seed, 6);
        let result = replay_to_end(&journal, &BalanceConfig::default()).unwrap();
        assert_eq!(result.final_snapshot_hash, game.snapshot_hash(), "seed {seed}");
        assert_eq!(result.final_round, game.round());
        assert_eq!(result.outcome, game.outcome());
        assert_eq!(result.applied_inputs, journal.inputs.len());
    }
}

#[test]
fn replay_survives_a_json_round_trip() {
    let (game, journal) = record_run(99, 3);
    let reloaded = InputJournal::from_json(&journal.to_json().unwrap()).unwrap();
    let result = replay_to_end(&reloaded, &BalanceConfig::default()).unwrap();
    assert_eq!(result.final_snapshot_hash, game.snapshot_hash());
}

#[test]
fn out_of_phase_input_is_rejected_with_its_sequence_number() {
    let mut journal = InputJournal::new(5);
    journal.append(PlayerCommand::ConcludeDialogue(DialogueOutcome::Peaceful));
    assert_eq!(
        replay_to_end(&journal, &BalanceConfig::default()),
        Err(ReplayError::Rejected { seq: 0, source: GameError::NoDialoguePending })
    );
}

#[test]
fn empty_journal_replays_to_the_starting_state() {
    let journal = InputJournal::new(8);
    let result = replay_to_end(&journal, &BalanceConfig::default()).unwrap();
    assert_eq!(result.final_round, 0);
    assert_eq!(result.outcome, None);
    assert_eq!(
        result.final_snapshot_hash,
        Game::new(8, BalanceConfig::default()).snapshot_hash()
    );
}
