use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::core::config::MIN_INTERVAL_MS;
use crate::core::system_monitor::RankingRequest;

/// Flags shared by every command that samples.
fn sampling_args() -> Vec<Arg> {
    vec![
        Arg::new("metrics")
            .short('m')
            .long("metrics")
            .value_name("LIST")
            .help("Comma-separated system metrics to chart (see 'taskpulse metrics')"),
        Arg::new("rank")
            .short('r')
            .long("rank")
            .value_name("METRIC[:top|bottom]")
            .help("Rank processes by a field; repeat for several views")
            .action(ArgAction::Append),
        Arg::new("preset")
            .short('p')
            .long("preset")
            .value_name("NAME")
            .help("Process view preset (high-cpu, busy-cpu, running, all, ...)"),
        Arg::new("count")
            .short('n')
            .long("count")
            .value_name("N")
            .help(format!(
                "Processes per ranked view ({}-{})",
                RankingRequest::MIN_COUNT,
                RankingRequest::MAX_COUNT
            ))
            .value_parser(clap::value_parser!(usize)),
        Arg::new("status")
            .short('s')
            .long("status")
            .value_name("LIST")
            .help("Only rank processes in these states (running, sleeping, ...)"),
        Arg::new("interval-ms")
            .short('i')
            .long("interval-ms")
            .value_name("MS")
            .help(format!("Refresh interval in milliseconds (min {})", MIN_INTERVAL_MS))
            .value_parser(clap::value_parser!(u64)),
        Arg::new("log-csv")
            .long("log-csv")
            .value_name("PATH")
            .help("Append CPU and memory usage to a CSV file every tick")
            .value_parser(clap::value_parser!(PathBuf)),
    ]
}

pub fn build_cli() -> Command {
    Command::new("taskpulse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal task manager with live charts and process rankings")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("monitor")
                .about("Interactive dashboard: charts and ranked processes")
                .args(sampling_args()),
        )
        .subcommand(
            Command::new("stream")
                .about("Print samples and rankings as JSON lines until Ctrl-C")
                .args(sampling_args())
                .arg(
                    Arg::new("ticks")
                        .short('t')
                        .long("ticks")
                        .value_name("N")
                        .help("Stop after N ticks")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(
            Command::new("top")
                .about("Take one sample and print the ranked process table")
                .args(sampling_args()),
        )
        .subcommand(Command::new("metrics").about("List metrics, ranking fields and presets"))
        .subcommand(
            Command::new("config")
                .about("Show or change the saved configuration")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the current configuration"))
                .subcommand(Command::new("path").about("Print the configuration file path"))
                .subcommand(Command::new("reset").about("Restore default settings"))
                .subcommand(
                    Command::new("set")
                        .about("Set one configuration key")
                        .arg(
                            Arg::new("key")
                                .help("metrics, rank, preset, count, status, interval_ms or log_csv")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("value")
                                .help("New value; lists are comma-separated")
                                .required(true)
                                .index(2),
                        ),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("bash, zsh, fish, powershell or elvish")
                        .required(true)
                        .index(1),
                ),
        )
}
