use clap::{Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::io;
use std::path::PathBuf;

use treemirror::action_log::echo_line;
use treemirror::logging::*;
use treemirror::utils::{setup_signal_handlers, ShutdownSignal};
use treemirror::{
	scheduler, validation, HashFailurePolicy, MirrorConfig, PassReport, TreeSynchronizer,
	TypeConflictPolicy,
};

fn cli() -> Command {
	Command::new("treemirror")
		.version(env!("CARGO_PKG_VERSION"))
		.about("One-way periodic directory mirror")
		.arg(Arg::new("source").value_name("SOURCE").help("Directory to mirror from"))
		.arg(Arg::new("replica").value_name("REPLICA").help("Directory to mirror onto"))
		.arg(
			Arg::new("log")
				.short('l')
				.long("log")
				.value_name("FILE")
				.help("Action log file (appended)"),
		)
		.arg(
			Arg::new("interval")
				.short('i')
				.long("interval")
				.value_name("SECS")
				.value_parser(clap::value_parser!(u64))
				.help("Seconds between passes"),
		)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help("TOML config file; command line flags take precedence"),
		)
		.arg(
			Arg::new("exclude")
				.short('e')
				.long("exclude")
				.value_name("GLOB")
				.action(ArgAction::Append)
				.help("Skip matching relative paths on both sides"),
		)
		.arg(
			Arg::new("hash-failure")
				.long("hash-failure")
				.value_name("POLICY")
				.value_parser(|s: &str| s.parse::<HashFailurePolicy>())
				.help("conservative | treat-as-equal"),
		)
		.arg(
			Arg::new("type-conflict")
				.long("type-conflict")
				.value_name("POLICY")
				.value_parser(|s: &str| s.parse::<TypeConflictPolicy>())
				.help("replace | ignore"),
		)
		.arg(
			Arg::new("once")
				.long("once")
				.action(ArgAction::SetTrue)
				.help("Run a single pass and exit"),
		)
		.arg(
			Arg::new("json")
				.long("json")
				.action(ArgAction::SetTrue)
				.help("Print each pass report as JSON"),
		)
		.arg(
			Arg::new("quiet")
				.short('q')
				.long("quiet")
				.action(ArgAction::SetTrue)
				.help("Do not echo action log lines to stdout"),
		)
}

/// Defaults, then the config file, then command line flags
fn build_config(matches: &ArgMatches) -> Result<MirrorConfig, Box<dyn Error>> {
	let mut config = match matches.get_one::<String>("config") {
		Some(path) => MirrorConfig::from_file(&PathBuf::from(path))?,
		None => MirrorConfig::default(),
	};

	if let Some(source) = matches.get_one::<String>("source") {
		config.source = PathBuf::from(source);
	}
	if let Some(replica) = matches.get_one::<String>("replica") {
		config.replica = PathBuf::from(replica);
	}
	if let Some(log) = matches.get_one::<String>("log") {
		config.log_file = PathBuf::from(log);
	}
	if let Some(interval) = matches.get_one::<u64>("interval") {
		config.interval_secs = *interval;
	}
	if let Some(patterns) = matches.get_many::<String>("exclude") {
		config.exclude_patterns.extend(patterns.cloned());
	}
	if let Some(policy) = matches.get_one::<HashFailurePolicy>("hash-failure") {
		config.hash_failure_policy = *policy;
	}
	if let Some(policy) = matches.get_one::<TypeConflictPolicy>("type-conflict") {
		config.type_conflict_policy = *policy;
	}
	if matches.get_flag("quiet") || matches.get_flag("json") {
		config.echo_actions = false;
	}

	config.check()?;
	Ok(config)
}

fn print_report(report: &PassReport, json: bool) {
	if !json {
		return;
	}
	match serde_json::to_string(report) {
		Ok(line) => {
			if let Err(e) = echo_line(io::stdout().lock(), &line) {
				warn!("Cannot print pass report: {}", e);
			}
		}
		Err(e) => error!("Cannot serialize pass report: {}", e),
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	treemirror::logging::init_tracing("info");

	let matches = cli().get_matches();
	let json = matches.get_flag("json");

	let config = build_config(&matches)?;
	validation::validate_roots(&config.source, &config.replica)?;

	info!(
		"Mirroring {} -> {} every {}s, log: {}",
		config.source.display(),
		config.replica.display(),
		config.interval_secs,
		config.log_file.display()
	);

	let interval = config.interval();
	let shutdown = ShutdownSignal::new();
	let synchronizer = TreeSynchronizer::new(config)?.with_shutdown(shutdown.clone());
	setup_signal_handlers(shutdown.clone());

	let max_passes = if matches.get_flag("once") { Some(1) } else { None };
	scheduler::run_periodic(synchronizer, interval, shutdown, max_passes, |report| {
		print_report(report, json)
	})
	.await?;

	Ok(())
}

// vim: ts=4
