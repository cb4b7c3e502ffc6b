//! CLI for the vdl download tool.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use vdl_core::config::{self, QueryParam};

use commands::{run_completions, run_get, run_url};

/// Top-level CLI for the vdl download tool.
#[derive(Debug, Parser)]
#[command(name = "vdl")]
#[command(about = "vdl: authenticated streaming file downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file to one or more local paths.
    Get {
        /// Numeric id of the file to download.
        file_id: u64,

        /// Auth token; falls back to $VDL_AUTH_TOKEN.
        #[arg(long)]
        token: Option<String>,

        /// Specific file version to download (default: latest).
        #[arg(long, value_name = "ID")]
        file_version: Option<u64>,

        /// Extra query parameter, appended in the order given (repeatable).
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Destination path (repeatable; default: <file_id>.bin).
        #[arg(short, long = "output", value_name = "PATH")]
        outputs: Vec<PathBuf>,
    },

    /// Print the download URL without performing the request.
    Url {
        /// Numeric id of the file.
        file_id: u64,

        /// Auth token; falls back to $VDL_AUTH_TOKEN.
        #[arg(long)]
        token: Option<String>,

        /// Specific file version (default: latest).
        #[arg(long, value_name = "ID")]
        file_version: Option<u64>,

        /// Extra query parameter, appended in the order given (repeatable).
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },

    /// Emit a shell completion script to stdout.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get {
                file_id,
                token,
                file_version,
                params,
                outputs,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let token = resolve_auth_token(token)?;
                let params = parse_query_params(&params)?;
                run_get(&cfg, token, file_id, file_version, params, outputs).await?;
            }
            CliCommand::Url {
                file_id,
                token,
                file_version,
                params,
            } => {
                let cfg = config::load_or_init()?;
                let token = resolve_auth_token(token)?;
                let params = parse_query_params(&params)?;
                run_url(&cfg, token, file_id, file_version, params).await?;
            }
            CliCommand::Completions { shell } => run_completions(shell).await?,
        }

        Ok(())
    }
}

fn resolve_auth_token(flag: Option<String>) -> Result<String> {
    if let Some(token) = flag {
        return Ok(token);
    }
    std::env::var("VDL_AUTH_TOKEN").context("no auth token: pass --token or set VDL_AUTH_TOKEN")
}

fn parse_query_params(raw: &[String]) -> Result<Vec<QueryParam>> {
    raw.iter()
        .map(|s| {
            s.split_once('=')
                .map(|(name, value)| QueryParam {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .ok_or_else(|| anyhow::anyhow!("invalid query parameter {s:?}, expected NAME=VALUE"))
        })
        .collect()
}
