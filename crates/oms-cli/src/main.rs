//! `oms-migrate` - offline migration planner
//!
//! Loads a JSON snapshot of legacy component records, runs the naming engine
//! over it without writing anything, and prints the resulting report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use oms_migrate::{MemoryStore, MigrationConfig, MigrationReport, MigrationRun};
use oms_naming::ComponentKind;

fn cli() -> Command {
    Command::new("oms-migrate")
        .version(oms_migrate::VERSION)
        .about("OmniStudio name migration planner")
        .subcommand_required(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("plain")
                .value_parser(["plain", "json"])
                .help("Log output format"),
        )
        .subcommand(
            Command::new("plan")
                .about("Resolve names and rewrite references without writing")
                .arg(
                    Arg::new("records")
                        .long("records")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of source records"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML run configuration"),
                )
                .arg(
                    Arg::new("all-versions")
                        .long("all-versions")
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(ComponentKind))
                        .help("Keep every version of these kinds"),
                )
                .arg(
                    Arg::new("fail-on-manual")
                        .long("fail-on-manual")
                        .action(ArgAction::SetTrue)
                        .help("Fail when any record needs manual intervention"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn init_tracing(format: &str) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Configuration for `plan`: file first, then flags on top; always a dry run
fn plan_config(args: &ArgMatches) -> Result<MigrationConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => MigrationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MigrationConfig::default(),
    };
    if let Some(kinds) = args.get_many::<ComponentKind>("all-versions") {
        for kind in kinds {
            config = config.with_all_versions(*kind);
        }
    }
    if args.get_flag("fail-on-manual") {
        config = config.with_fail_on_manual_intervention(true);
    }
    Ok(config.with_dry_run(true))
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading records {}", path.display()))?;
    MemoryStore::from_json(&json).with_context(|| format!("parsing records {}", path.display()))
}

fn run_plan(args: &ArgMatches) -> Result<MigrationReport> {
    let config = plan_config(args)?;
    let records = args
        .get_one::<PathBuf>("records")
        .context("--records is required")?;
    let mut store = load_store(records)?;

    tracing::info!(
        records = store.records().len(),
        kinds = config.kinds.len(),
        "planning migration"
    );
    let report = MigrationRun::new(config).execute(&mut store)?;
    Ok(report)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let log_format = matches
        .get_one::<String>("log-format")
        .map_or("plain", String::as_str);
    init_tracing(log_format);

    match matches.subcommand() {
        Some(("plan", args)) => {
            let report = run_plan(args)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
            if !report.is_clean() {
                std::process::exit(1);
            }
        }
        _ => unreachable!("subcommand required"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_snapshot(dir: &Path) -> PathBuf {
        let path = dir.join("records.json");
        fs::write(&path, oms_test_utils::sample_snapshot()).unwrap();
        path
    }

    fn plan_args(argv: &[&str]) -> ArgMatches {
        let matches = cli().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("plan").unwrap().clone()
    }

    #[test]
    fn plan_requires_records() {
        assert!(cli().try_get_matches_from(["oms-migrate", "plan"]).is_err());
    }

    #[test]
    fn all_versions_flag_parses_aliases() {
        let args = plan_args(&[
            "oms-migrate", "plan", "--records", "r.json", "--all-versions", "fc", "OmniScript",
        ]);
        let config = plan_config(&args).unwrap();
        assert_eq!(config.all_versions, vec![ComponentKind::FlexCard, ComponentKind::OmniScript]);
        assert!(config.dry_run);
    }

    #[test]
    fn unknown_kind_rejected() {
        let result = cli().try_get_matches_from([
            "oms-migrate", "plan", "--records", "r.json", "--all-versions", "Widget",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn plan_runs_snapshot_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let records = write_snapshot(dir.path());
        let config = dir.path().join("run.toml");
        fs::write(&config, "kinds = [\"DataMapper\", \"FlexCard\"]\ndry_run = false\n").unwrap();

        let args = plan_args(&[
            "oms-migrate",
            "plan",
            "--records",
            records.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        let report = run_plan(&args).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.records.len(), 3);
        assert!(report.records.iter().all(|r| r.migrated_id.is_none()));
        assert!(report.is_clean());
    }

    #[test]
    fn missing_records_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let args = plan_args(&["oms-migrate", "plan", "--records", missing.to_str().unwrap()]);

        let err = run_plan(&args).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
