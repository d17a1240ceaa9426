//! Headless Battle Runner
//!
//! Runs AI vs AI battles and prints the terminal report.

use clap::Parser;
use hex_battle::battle::{
    run_to_completion, Aptitude, AutoController, BattleSetup, BattleState, Officer, RunStop,
    SideSetup, UnitType,
};
use hex_battle::core::types::{CityId, FactionId, OfficerId};
use hex_battle::core::BattleConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Headless Battle Runner - AI vs AI battles
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Resolve an AI vs AI hex battle and print the result")]
struct Args {
    /// Battle config file (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<String>,

    /// Random seed for deterministic runs; overrides the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Contested city id. Nonzero makes the battle a siege.
    #[arg(long, default_value_t = 0)]
    city: u32,

    /// Number of attacking officers
    #[arg(long, default_value_t = 5)]
    attackers: u32,

    /// Number of defending officers
    #[arg(long, default_value_t = 4)]
    defenders: u32,

    /// Maximum unit turns before giving up
    #[arg(long, default_value_t = 20_000)]
    max_actions: usize,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print the battle log to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BattleConfig::load(path),
        None => Ok(BattleConfig::default()),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(|| rand::random());
    config.seed = Some(seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let attacker = SideSetup::new(FactionId(1), create_roster(1, args.attackers, &mut rng))
        .with_morale(80)
        .with_training(60);
    let defender = SideSetup::new(FactionId(2), create_roster(101, args.defenders, &mut rng));
    let attacker = with_mixed_types(attacker);
    let defender = with_mixed_types(defender);

    let setup = BattleSetup::new(attacker, defender, CityId(args.city));
    let mut state = match BattleState::new(setup, config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to start battle: {e}");
            std::process::exit(1);
        }
    };

    let stop = run_to_completion(&mut state, &mut AutoController::new(), args.max_actions);
    if stop != RunStop::Finished {
        eprintln!("Battle did not finish: {stop:?}");
    }

    if args.verbose {
        for event in &state.battle_log {
            eprintln!("  [day {}] {}", event.day, event.description);
        }
        eprintln!();
    }

    let report = state.report();
    match args.format.as_str() {
        "text" => print_text(&state, seed),
        other => {
            if other != "json" {
                eprintln!("Unknown format '{other}', defaulting to json");
            }
            match report.to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Failed to serialize report: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn print_text(state: &BattleState, seed: u64) {
    let report = state.report();
    println!("Battle Result");
    println!("=============");
    println!("Outcome: {:?}", report.outcome);
    println!("Days: {}", report.days);
    println!("Siege: {}", state.is_siege);
    println!();
    println!("{}", state.map.render_ascii());
    for unit in &report.units {
        println!(
            "  faction {} officer {:>3}: {:>5}/{:<5} {:?}",
            unit.faction.0, unit.officer.0, unit.troops, unit.max_troops, unit.status
        );
    }
    println!();
    println!("Captured: {:?}", report.captured_officers);
    println!("Routed: {:?}", report.routed_officers);
    println!("Seed: {seed}");
}

/// Generic officers with rolled stats and the occasional aptitude
fn create_roster(first_id: u32, count: u32, rng: &mut StdRng) -> Vec<Officer> {
    const APTITUDES: [Aptitude; 5] = [
        Aptitude::Fire,
        Aptitude::Confusion,
        Aptitude::Taunt,
        Aptitude::Ambush,
        Aptitude::FalseReport,
    ];

    (0..count)
        .map(|i| {
            let id = first_id + i;
            let mut officer = Officer::new(OfficerId(id), format!("Officer {id}"))
                .with_stats(
                    rng.gen_range(40..=90),
                    rng.gen_range(40..=90),
                    rng.gen_range(30..=90),
                    rng.gen_range(30..=80),
                )
                .with_troops(rng.gen_range(20..=60) * 100);
            if rng.gen_bool(0.3) {
                officer = officer.with_aptitude(APTITUDES[rng.gen_range(0..APTITUDES.len())]);
            }
            officer
        })
        .collect()
}

/// Mix cavalry and archers in among the infantry
fn with_mixed_types(side: SideSetup) -> SideSetup {
    let types = (0..side.officers.len())
        .map(|i| match i % 4 {
            1 => UnitType::Cavalry,
            3 => UnitType::Archer,
            _ => UnitType::Infantry,
        })
        .collect();
    side.with_unit_types(types)
}
