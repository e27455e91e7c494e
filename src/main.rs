use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use pingsweep::{
    config::SweepConfig,
    output::{OutputConfig, OutputFormat, OutputManager, ProgressDisplay},
    scanner::ScanEngine,
    utils::file_input::{prompt_for_input_path, targets_from_file, targets_from_list},
    utils::Logger,
};

fn build_cli() -> Command {
    Command::new("pingsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ping every host in a list of IP ranges and report who answered")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("File with one IP address or CIDR range per line (prompted for when omitted)")
                .index(1),
        )
        .arg(
            Arg::new("targets")
                .short('T')
                .long("targets")
                .value_name("LIST")
                .help("Comma-separated targets instead of an input file")
                .conflicts_with("input"),
        )
        .arg(
            Arg::new("concurrency")
                .short('c')
                .long("concurrency")
                .value_name("N")
                .help("Maximum probes in flight per range [default: 100]")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("MS")
                .help("Per-probe timeout in milliseconds [default: 1000]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-hosts")
                .long("max-hosts")
                .value_name("N")
                .help("Skip ranges with more usable hosts than this [default: 65536]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Output directory (csv) or file (json, text)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Report format: csv, json, text")
                .default_value("csv"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file (defaults to ~/.pingsweep.toml)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Do not draw progress bars")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose logging (repeat for more)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

fn log_level(matches: &ArgMatches) -> log::LevelFilter {
    if matches.get_flag("quiet") {
        return log::LevelFilter::Error;
    }
    match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Config file first, then command-line overrides
fn load_config(matches: &ArgMatches) -> anyhow::Result<SweepConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SweepConfig::from_toml_file(path)?,
        None => SweepConfig::load_default_config(),
    };

    if let Some(&concurrency) = matches.get_one::<usize>("concurrency") {
        config = config.with_concurrency(concurrency);
    }
    if let Some(&timeout) = matches.get_one::<u64>("timeout") {
        config = config.with_timeout(timeout);
    }
    if let Some(&max_hosts) = matches.get_one::<u64>("max-hosts") {
        config = config.with_max_hosts(max_hosts);
    }

    config.validate()?;
    Ok(config)
}

fn load_targets(matches: &ArgMatches) -> anyhow::Result<Vec<String>> {
    if let Some(list) = matches.get_one::<String>("targets") {
        return Ok(targets_from_list(list));
    }

    let path = match matches.get_one::<String>("input") {
        Some(path) => path.clone(),
        None => prompt_for_input_path()?,
    };
    targets_from_file(&path)
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = load_config(&matches)?;
    let targets = load_targets(&matches)?;
    if targets.is_empty() {
        anyhow::bail!("No targets to scan");
    }

    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<OutputFormat>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or(OutputFormat::Csv);

    let progress = Arc::new(ProgressDisplay::new(!matches.get_flag("no-progress")));
    let engine = ScanEngine::with_icmp(config)?.with_observer(progress);

    let cancel = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let report = engine.run(&targets).await;

    let manager = OutputManager::new(OutputConfig {
        format,
        path: matches.get_one::<PathBuf>("output").cloned(),
        colored: !matches.get_flag("no-color"),
    });
    let written = manager.write_report(&report).context("Failed to write results")?;

    if let Some(path) = written {
        println!(
            "\n{} {}",
            "Scan complete! Results saved to:".green(),
            path.display().to_string().bold()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    if matches.get_flag("no-color") {
        colored::control::set_override(false);
    }
    Logger::init(log_level(&matches));

    if let Err(e) = run(matches).await {
        eprintln!("{} {:#}", "[!]".bright_red(), e);
        process::exit(1);
    }
}
