// ABOUTME: Entry point for the endrun CLI application.
// ABOUTME: Merges config file and flags, then runs the remote command.

mod cli;

use clap::Parser;
use cli::Cli;
use endrun::config::Config;
use endrun::error::{Error, Result};
use endrun::runner::{self, RunOptions, RunOutcome};
use endrun::ssh::KeyProvider;
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    match run(cli).await {
        Ok(RunOutcome::Completed(status)) => std::process::exit(status as i32),
        Ok(RunOutcome::SshUnavailable) => {
            eprintln!("Error: server does not advertise an SSH endpoint");
            std::process::exit(255);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?.unwrap_or_default();

    let url = cli.url.or(config.url).ok_or(Error::MissingUrl)?;
    let user = cli
        .user
        .or(config.user)
        .or_else(|| env::var("USER").ok())
        .ok_or(Error::MissingUser)?;

    let key_paths = if cli.keys.is_empty() {
        config.keys
    } else {
        cli.keys
    };
    let provider = KeyProvider::from_paths(key_paths);

    let opts = RunOptions {
        strict_host_key: cli.strict_host_key || config.strict_host_key,
        known_hosts_path: cli.known_hosts.or(config.known_hosts),
        auth_timeout: cli
            .auth_timeout
            .map(Duration::from_secs)
            .unwrap_or(config.auth_timeout),
        exec_timeout: match cli.exec_timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.exec_timeout,
        },
    };

    runner::run(&url, &user, &cli.args, &provider, &opts).await
}
