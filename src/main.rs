mod armor;
mod classify;
mod commands;
mod config;
mod crypto;
mod error;
mod filter;
mod git;
mod keyring;
mod merge;
mod resolve;
mod walk;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Config;

#[derive(Parser)]
#[command(name = "coffer")]
#[command(version)]
#[command(about = "Transparent file encryption in git", long_about = None)]
struct Cli {
    /// Keyring file (default: .coffer_keyring under $COFFER_HOME or $HOME)
    #[arg(long, global = true, value_name = "PATH")]
    keyring: Option<PathBuf>,

    /// Identity file (default: .coffer_identity under $COFFER_HOME or $HOME)
    #[arg(long, global = true, value_name = "PATH")]
    identity_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure git for coffer use
    GitConfig,

    /// Generate a new key and add it to the keyring
    GenKey {
        /// Human-readable name for the key
        description: String,
    },

    /// Generate a new identity and add it to the identity file
    GenIdentity {
        /// Human-readable name for the identity
        description: String,
    },

    /// Decrypt a single file with an explicit key, or a tree with --recursive
    Decrypt {
        /// Key to decrypt with (base64); optional with --recursive
        #[arg(long, required_unless_present = "recursive")]
        key: Option<String>,

        /// Recursively decrypt all files under the given directory
        #[arg(long)]
        recursive: bool,

        /// File to decrypt (stdin if omitted), or tree root with --recursive
        path: Option<PathBuf>,
    },

    /// Clean filter (used internally by git)
    Clean { path: PathBuf },

    /// Smudge filter (used internally by git)
    Smudge { path: PathBuf },

    /// Diff textconv (used internally by git)
    Diff { path: PathBuf },

    /// Merge driver (used internally by git)
    #[command(name = "merge-file")]
    MergeFile {
        /// The eight driver arguments: %O %A %B %L %P %S %X %Y
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() {
    // stdout carries filter output; all diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("coffer: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    let cfg = Config::resolve(cli.keyring, cli.identity_file)
        .context("unable to resolve key material locations")?;

    match cli.command {
        Commands::GitConfig => commands::git_config()?,
        Commands::GenKey { description } => commands::gen_key(&description, &cfg)?,
        Commands::GenIdentity { description } => commands::gen_identity(&description, &cfg)?,
        Commands::Decrypt {
            key,
            recursive,
            path,
        } => commands::decrypt(path.as_deref(), key.as_deref(), recursive, &cfg)?,
        Commands::Clean { path } => commands::clean(&path, &cfg)?,
        Commands::Smudge { path } => commands::smudge(&path, &cfg)?,
        Commands::Diff { path } => commands::diff(&path, &cfg)?,
        Commands::MergeFile { args } => return Ok(commands::merge_file(&args, &cfg)?),
    }

    Ok(0)
}
