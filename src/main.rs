use anyhow::Result;
use log::LevelFilter;

use taskpulse::cli::build_cli;
use taskpulse::commands;

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Log lines would tear the dashboard, so keep it quiet by default
    let default_level = match (matches.get_count("verbose"), matches.subcommand_name()) {
        (0, Some("monitor")) => LevelFilter::Warn,
        (0, _) => LevelFilter::Info,
        (1, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    taskpulse::init_logging(default_level);

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor::execute(sub_matches),
        Some(("stream", sub_matches)) => commands::stream::execute(sub_matches),
        Some(("top", sub_matches)) => commands::top::execute(sub_matches),
        Some(("metrics", _)) => commands::metrics::execute(),
        Some(("config", sub_matches)) => commands::config::execute(sub_matches),
        Some(("completions", sub_matches)) => {
            let mut cli = build_cli();
            commands::completions::execute(sub_matches, &mut cli)
        }
        _ => {
            println!("Use 'taskpulse --help' for more information.");
            Ok(())
        }
    }
}
