//! Resolves one action against the bundled content and prints the report.
//!
//! Run with: `cargo run -p runtime --bin battle-sim -- --skill 1 --seed 7`

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::{CatalogLoader, TablesLoader};
use battle_core::env::CatalogOracle;
use battle_core::state::{ElementId, SkillId, StatBlock};
use battle_core::{
    ActionReport, ActionRequest, BattleEnv, Battlefield, Catalog, Combatant, CombatTables, PcgRng,
};
use clap::Parser;
use runtime::{Driver, FixedRatePacer, InstantPacer, TracingScene};
use tracing_subscriber::EnvFilter;

/// Combat resolution sandbox
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Resolve one skill between two combatants", long_about = None)]
#[command(version)]
struct Cli {
    /// Skill id to use (0 is the default attack)
    #[arg(short, long, default_value_t = 0)]
    skill: u32,

    /// Seed for the random stream
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 10)]
    user_level: u32,

    #[arg(long, default_value_t = 10)]
    target_level: u32,

    /// Element ids of the user
    #[arg(long, value_delimiter = ',')]
    user_elements: Vec<u16>,

    /// Element ids of the target
    #[arg(long, value_delimiter = ',')]
    target_elements: Vec<u16>,

    /// Catalog directory (defaults to the embedded content)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Tables file (defaults to the embedded tables)
    #[arg(long, value_name = "FILE")]
    tables: Option<PathBuf>,

    /// Play back at this frame rate instead of instantly
    #[arg(long)]
    fps: Option<u32>,

    /// Frames each sound or visual takes to finish
    #[arg(long, default_value_t = 0)]
    signal_frames: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let catalog = match &cli.data_dir {
        Some(dir) => CatalogLoader::load_dir(dir)?,
        None => CatalogLoader::load_embedded()?,
    };
    let tables = match &cli.tables {
        Some(path) => TablesLoader::load(path)?,
        None => TablesLoader::load_embedded()?,
    };

    let skill = SkillId(cli.skill);
    let skill_name = catalog
        .skill(skill)
        .map(|data| data.name.clone())
        .with_context(|| format!("{} is not in the catalog", skill))?;

    let report = simulate(&cli, &catalog, &tables, skill).await?;
    print_report(&skill_name, &report);
    Ok(())
}

async fn simulate(
    cli: &Cli,
    catalog: &Catalog,
    tables: &CombatTables,
    skill: SkillId,
) -> Result<ActionReport> {
    let mut field = Battlefield::new();
    let user = field.spawn(
        Combatant::new("Challenger", cli.user_level, 80, StatBlock::new(22, 16, 22, 16, 14))
            .with_elements(cli.user_elements.iter().copied().map(ElementId))
            .with_skills([skill]),
    ).context("battlefield has no room for another combatant")?;
    let target = field.spawn(
        Combatant::new("Defender", cli.target_level, 80, StatBlock::new(18, 18, 18, 18, 12))
            .with_elements(cli.target_elements.iter().copied().map(ElementId)),
    ).context("battlefield has no room for another combatant")?;

    let env = BattleEnv::new(catalog, tables);
    let mut scene = TracingScene::with_signal_frames(cli.signal_frames);
    let mut rng = PcgRng::new(cli.seed);
    let request = ActionRequest::skill(user, target, 0);

    let report = match cli.fps {
        Some(fps) => {
            Driver::new(FixedRatePacer::from_fps(fps))
                .run(env, &mut field, &mut scene, &mut rng, request)
                .await?
        }
        None => {
            Driver::new(InstantPacer::new())
                .run(env, &mut field, &mut scene, &mut rng, request)
                .await?
        }
    };
    Ok(report)
}

fn print_report(skill_name: &str, report: &ActionReport) {
    println!("{} ({} -> {})", skill_name, report.user, report.target);
    if report.fizzled {
        println!("  fizzled");
    }
    for (index, strike) in report.strikes.iter().enumerate() {
        let critical = if strike.critical { " critical" } else { "" };
        println!(
            "  strike {}: {}{} damage={} healed={}",
            index + 1,
            strike.result,
            critical,
            strike.damage,
            strike.healed
        );
    }
    println!(
        "  total: damage={} healed={} hits={}",
        report.total_damage,
        report.total_healed,
        report.hits()
    );
}

/// Logs go to stderr so the report on stdout stays clean.
fn setup_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
