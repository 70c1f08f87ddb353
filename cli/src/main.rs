//! `kiosk` CLI: scenario runs, packet replay, dataset ranking, config checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kiosk_core::{FeatureCollection, KioskConfig, RankingEngine};
use sim::replay::{load_replay, save_replay, ReplayLog};
use sim::scenarios::{Scenario, ScenarioKind};
use sim::setup::RunReport;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kiosk", about = "Tangible-marker kiosk CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario through a touchscreen session and report the outcome.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output the run report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the full replay log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Load and replay a previously recorded packet log.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        /// Output the run report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Rank the sites of a GeoJSON dataset against a target.
    Rank {
        /// Kiosk configuration (config.json)
        #[arg(long)]
        config: PathBuf,
        /// GeoJSON FeatureCollection of sites
        #[arg(long)]
        sites: PathBuf,
        /// Target weight, repeatable: `--target green=0.8`
        #[arg(long = "target", value_parser = parse_target)]
        targets: Vec<(String, f64)>,
        /// Number of sites to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Validate a kiosk configuration file.
    CheckConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            output,
            save_replay: save_path,
        } => {
            run_scenario(scenario, seed, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Replay { input, output } => {
            run_replay(&input, output.as_deref())?;
        }
        Commands::Rank {
            config,
            sites,
            targets,
            top,
        } => {
            rank(&config, &sites, &targets, top)?;
        }
        Commands::CheckConfig { path } => {
            check_config(&path)?;
        }
    }

    Ok(())
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    output_path: Option<&Path>,
    replay_path: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.1}s, {} markers)...",
        scenario.name,
        seed,
        scenario.duration,
        scenario.markers.len()
    );

    let start = std::time::Instant::now();
    let packets = scenario.generate_packets();
    let report = scenario.setup.run(&packets)?;
    let elapsed = start.elapsed();
    print_report(&report, elapsed.as_secs_f64());

    if let Some(rpath) = replay_path {
        save_replay(&ReplayLog::record(&scenario, packets), rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    if let Some(opath) = output_path {
        write_report(&scenario.name, seed, &report, opath)?;
        println!("Report saved to {}", opath.display());
    }

    Ok(())
}

fn run_replay(input: &Path, output_path: Option<&Path>) -> Result<()> {
    let log = load_replay(input).with_context(|| format!("reading {}", input.display()))?;
    println!(
        "Replaying '{}' ({} packets)...",
        log.scenario_name,
        log.packets.len()
    );

    let start = std::time::Instant::now();
    let report = log.setup.run(&log.packets)?;
    print_report(&report, start.elapsed().as_secs_f64());

    if let Some(opath) = output_path {
        write_report(&log.scenario_name, log.seed, &report, opath)?;
    }

    Ok(())
}

fn rank(config_path: &Path, sites_path: &Path, targets: &[(String, f64)], top: usize) -> Result<()> {
    let config = KioskConfig::load(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let sites = FeatureCollection::load(sites_path)
        .with_context(|| format!("reading {}", sites_path.display()))?;

    let mut engine = RankingEngine::new(&config);
    let loaded = engine.load_features(&sites.features)?;
    engine.calculate_max_values();
    for (key, value) in targets {
        engine.update_target_criteria(key, *value)?;
    }

    println!("{loaded} sites, target:");
    for axis in &engine.target().axes {
        println!("  {:<16} {:.3}", axis.display_name, axis.value);
    }
    println!("{:>4}  {:<16} {:>10}", "rank", "site", "distance");
    for (i, (feature, distance)) in engine.ranked(top)?.iter().enumerate() {
        println!("{:>4}  {:<16} {:>10.4}", i + 1, feature.id.to_string(), distance);
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = KioskConfig::load(path).with_context(|| format!("reading {}", path.display()))?;
    let base = config.base_layers()?;
    let topic = config.topic_layers()?;
    config.sites_layer()?;
    let source = config.default_source()?;

    println!(
        "OK: {} base layers, {} topic layers, {} criteria, source '{}'",
        base.len(),
        topic.len(),
        config.search_criteria.len(),
        source
    );
    println!(
        "markers: progress={} selection={} parameters=[{}]",
        config.progress_marker_id,
        config.selection_marker_id,
        config
            .search_criteria
            .iter()
            .map(|c| format!("{}:{}", c.key, c.marker_id))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn print_report(report: &RunReport, elapsed_s: f64) {
    let m = &report.metrics;
    println!(
        "Done: {} packets ({} processed, {} duplicate), {} events, elapsed={:.2}s",
        m.packets,
        m.processed_packets,
        m.duplicate_packets,
        m.total_events(),
        elapsed_s,
    );
    println!(
        "Step: {:?}, best match: {:?}, locked: {:?}, handler errors: {}",
        report.step,
        report.best_match.as_ref().map(|id| id.to_string()),
        report.locked.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        report.errors.len(),
    );
}

fn write_report(name: &str, seed: u64, report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::json!({
        "scenario": name,
        "seed": seed,
        "report": report,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

fn parse_target(s: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad weight for '{key}': {e}"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("weight for '{key}' must be within [0, 1]"));
    }
    Ok((key.trim().to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_arguments() {
        assert_eq!(parse_target("green=0.8"), Ok(("green".to_string(), 0.8)));
        assert!(parse_target("green").is_err());
        assert!(parse_target("green=lots").is_err());
        assert!(parse_target("green=1.5").is_err());
    }

    #[test]
    fn cli_parses_rank_targets() {
        let cli = Cli::try_parse_from([
            "kiosk", "rank", "--config", "c.json", "--sites", "s.json", "--target", "a=0.5",
            "--target", "b=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Rank { targets, top, .. } => {
                assert_eq!(targets.len(), 2);
                assert_eq!(top, 5);
            }
            _ => panic!("expected rank"),
        }
    }
}
