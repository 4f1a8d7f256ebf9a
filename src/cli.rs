// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines connection flags and the trailing remote command.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "endrun")]
#[command(about = "Run a command over the SSH endpoint advertised by a server")]
#[command(version)]
pub struct Cli {
    /// Base URL of the server advertising the SSH endpoint
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Remote username (defaults to $USER)
    #[arg(short = 'l', long)]
    pub user: Option<String>,

    /// Private key file, may be repeated; keys are offered in order
    #[arg(short = 'i', long = "key")]
    pub keys: Vec<PathBuf>,

    /// Reject unknown host keys instead of trusting them on first use
    #[arg(long)]
    pub strict_host_key: bool,

    /// Path to the known_hosts file (defaults to ~/.ssh/known_hosts)
    #[arg(long)]
    pub known_hosts: Option<PathBuf>,

    /// Authentication deadline in seconds
    #[arg(long, value_name = "SECONDS")]
    pub auth_timeout: Option<u64>,

    /// Remote completion deadline in seconds (0 waits indefinitely)
    #[arg(long, value_name = "SECONDS")]
    pub exec_timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command and arguments to run on the remote side
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
