use crate::core::Config;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("path", _)) => path(),
        Some(("reset", _)) => reset(),
        Some(("set", sub_matches)) => set(sub_matches),
        _ => {
            println!("Use 'taskpulse config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    if let Err(e) = config.resolve() {
        println!();
        println!("{} {}", "Warning:".yellow().bold(), e);
    }
    Ok(())
}

fn path() -> Result<()> {
    println!("{}", Config::get_config_path()?.display());
    Ok(())
}

fn reset() -> Result<()> {
    Config::default().save()?;
    println!("{} Configuration reset to defaults", "✓".green());
    Ok(())
}

fn set(matches: &clap::ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load()?;
    config
        .set(key, value)
        .with_context(|| format!("Failed to set '{}'", key))?;
    config.save()?;

    println!("{} {} = {}", "✓".green(), key.bold(), value.cyan());
    Ok(())
}
