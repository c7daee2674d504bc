//! umake - dependency scanner and build-order planner for C++ headers
//! and modules.
//!
//! This is the CLI entry point. It owns every concern the core
//! pipeline (`umake::run`) does not: argument parsing, colored
//! terminal output, structured logging, and deciding what "fatal"
//! means for a given error (print the config for reproducibility,
//! delete the cache, exit non-zero).
use clap::Parser;
use colored::*;
use std::process;
use umake::cache::{self, Cache};
use umake::config::{Cli, Config, TargetMode, CONFIG_FILE_NAME, DEFAULT_MANIFEST_NAME};

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "umake=warn",
        1 => "umake=info",
        2 => "umake=debug",
        _ => "umake=trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(err) = run(&cli) {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> umake::error::Result<()> {
    let config = Config::from_cli(cli)?;

    if cli.save_config {
        let path = config.root.join(CONFIG_FILE_NAME);
        config.save(&path)?;
        log::info!("saved configuration to {}", path.display());
    }

    match umake::run(&config) {
        Ok(outcome) => {
            for (importer, missing) in &outcome.missing {
                log::warn!("{importer}: missing module '{missing}'");
            }
            if !outcome.missing.is_empty() {
                eprintln!(
                    "{} {} unresolved module import(s):",
                    "warning:".yellow().bold(),
                    outcome.missing.len()
                );
                for (importer, missing) in &outcome.missing {
                    eprintln!("  {importer}: '{missing}' is not provided by any scanned file");
                }
            }

            if config.log_update && !outcome.log_lines.is_empty() {
                append_log(&config, &outcome.log_lines)?;
            }

            match config.target {
                TargetMode::InfoOnly => {
                    println!("{}", outcome.manifest);
                }
                TargetMode::Cmake | TargetMode::CmakeStore => {
                    let output_path = config
                        .output
                        .clone()
                        .unwrap_or_else(|| config.root.join(DEFAULT_MANIFEST_NAME));
                    std::fs::write(&output_path, &outcome.manifest)?;
                    log::info!("wrote manifest to {}", output_path.display());

                    if config.target == TargetMode::CmakeStore && !config.no_cache {
                        let cache_path = config.root.join(cache::CACHE_FILE_NAME);
                        outcome.cache.save(&cache_path)?;
                        log::debug!("persisted scan cache to {}", cache_path.display());
                    }
                }
            }

            Ok(())
        }
        Err(err) => {
            // A fatal error may leave the cache out of sync with what's
            // actually on disk; delete it rather than risk poisoning
            // the next run, and print the config so the failure is
            // reproducible without re-deriving the argument set.
            eprintln!("{} {config:#?}", "config:".dimmed());
            if !config.no_cache {
                Cache::delete(&config.root.join(cache::CACHE_FILE_NAME));
            }
            Err(err)
        }
    }
}

fn append_log(config: &Config, lines: &[String]) -> umake::error::Result<()> {
    use std::io::Write;
    let path = config.root.join("umakeLog.txt");
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    Ok(())
}
