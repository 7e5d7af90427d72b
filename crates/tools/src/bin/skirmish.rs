use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use grove_core::autopilot::next_command;
use grove_core::clock::{ManualClock, NoAnimations};
use grove_core::journal_file::JournalWriter;
use grove_core::rolls::RollSource;
use grove_core::shout::{ShoutWorker, TemplateShouts};
use grove_core::{
    BalanceConfig, Direction, Game, InputJournal, LogEvent, MAX_PHASE_TICKS, Phase,
    PlayerCommand, drive_until_input,
};
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Plays a seeded arena run with the autopilot and checks world invariants")]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Stop once this many rounds have been played
    #[arg(short, long, default_value_t = 20)]
    rounds: u64,
    /// Hard cap on player commands
    #[arg(long, default_value_t = 5_000)]
    max_commands: usize,
    /// Probability of replacing the autopilot's command with a random move or attack
    #[arg(long, default_value_t = 0.0)]
    chaos: f32,
    /// Balance overrides in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Record accepted commands to a hash-chained `.jsonl` journal
    #[arg(long)]
    record: Option<PathBuf>,
    /// Also write the pretty JSON journal here
    #[arg(long)]
    journal_json: Option<PathBuf>,
    /// Run the background shout worker with canned battle cries
    #[arg(long)]
    shouts: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn chaos_command(rng: &mut ChaCha8Rng) -> PlayerCommand {
    let direction = Direction::ALL[rng.range_inclusive(0, 3) as usize];
    if rng.chance(0.5) { PlayerCommand::Move(direction) } else { PlayerCommand::Attack(direction) }
}

fn check_invariants(game: &Game) -> Result<()> {
    let world = game.world();
    for entity in world.roster() {
        if let Some(stats) = entity.stats() {
            ensure!(
                (0..=stats.max_hp()).contains(&stats.hp()),
                "{:?} has {} of {} HP",
                entity.id,
                stats.hp(),
                stats.max_hp()
            );
            ensure!(stats.ap() <= stats.max_ap(), "{:?} holds more AP than its pool", entity.id);
        }
        if entity.is_blocking() {
            let passable = world.grid().terrain(entity.pos()).is_some_and(|t| t.is_passable());
            let placed = world.grid().blocker_at(entity.pos()) == Some(entity.id);
            ensure!(passable && placed, "{:?} is misplaced at {:?}", entity.id, entity.pos());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    ensure!((0.0..=1.0).contains(&args.chaos), "--chaos must be within [0, 1]");

    let config = match &args.config {
        Some(path) => BalanceConfig::load(path)
            .with_context(|| format!("failed to load balance config {}", path.display()))?,
        None => BalanceConfig::default(),
    };
    let mut game = Game::new(args.seed, config);
    if args.shouts {
        game = game.with_shouts(ShoutWorker::spawn(TemplateShouts::default()));
    }
    let mut journal = InputJournal::new(args.seed);
    let mut writer = match &args.record {
        Some(path) => Some(
            JournalWriter::create(path, args.seed)
                .with_context(|| format!("failed to create journal {}", path.display()))?,
        ),
        None => None,
    };
    let mut chaos = ChaCha8Rng::seed_from_u64(args.seed ^ 0x5eed);
    let clock = ManualClock::new();
    let mut animations = NoAnimations::default();

    info!(seed = args.seed, rounds = args.rounds, "skirmish started");
    let mut commands = 0;
    while commands < args.max_commands && game.round() < args.rounds && game.outcome().is_none() {
        let mut command = next_command(&game);
        if game.phase() == Phase::Player && args.chaos > 0.0 && chaos.chance(args.chaos) {
            command = chaos_command(&mut chaos);
        }
        game.apply(command).with_context(|| format!("command {command:?} was rejected"))?;
        journal.append(command);
        if let Some(writer) = writer.as_mut() {
            writer.append(game.round(), &command).context("failed to append to journal")?;
        }
        commands += 1;

        drive_until_input(&mut game, &clock, &mut animations, MAX_PHASE_TICKS)
            .context("monster phase did not finish")?;
        check_invariants(&game)?;
    }
    if commands == args.max_commands {
        warn!(commands, "command cap reached before the round limit");
    }

    if let Some(path) = &args.journal_json {
        journal.save(path).with_context(|| format!("failed to write {}", path.display()))?;
    }

    let kills = game
        .log()
        .iter()
        .filter(|event| matches!(event, LogEvent::EntityKilled { species: Some(_), .. }))
        .count();
    let shouts = game.log().iter().filter(|event| matches!(event, LogEvent::Shout { .. })).count();
    println!("Skirmish finished after {} rounds and {commands} commands.", game.round());
    println!("Outcome: {:?}", game.outcome());
    println!("Player HP: {}", game.world().player_stats().hp());
    println!("Monsters slain: {kills}");
    if args.shouts {
        println!("Battle cries heard: {shouts}");
    }
    println!("Items carried: {}", game.inventory().len());
    for quest in game.quests().quests() {
        let progress: Vec<String> = quest
            .conditions
            .iter()
            .map(|condition| format!("{}/{}", condition.current(), condition.required))
            .collect();
        println!("Quest {:?} [{:?}]: {}", quest.name, quest.status, progress.join(", "));
    }
    println!("Snapshot hash: {}", game.snapshot_hash());
    Ok(())
}
