//! Command-line interface for lexsim.
//!
//! Provides an interactive court session, one-shot phase generation,
//! and diagnostics.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::warn;

use crate::adapters::{GeminiGateway, ModelGateway};
use crate::config::{self, API_KEY_ENV};
use crate::core::{AppState, Court};
use crate::domain::{CaseContext, CourtPhase, ModelOutput, Speaker};

pub mod session;

/// lexsim - Mock court simulator backed by a hosted language model
#[derive(Parser, Debug)]
#[command(name = "lexsim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive court session
    Session {
        /// Case facts file (uses the demo case if not provided)
        #[arg(short, long)]
        case: Option<PathBuf>,

        /// Role to speak as in chat
        #[arg(short, long, value_enum, default_value = "plaintiff")]
        role: RoleArg,
    },

    /// Generate the content of one phase and print it
    Phase {
        /// Phase id (e.g. dispute_focus) or tab number
        phase: String,

        /// Case facts file (uses the demo case if not provided)
        #[arg(short, long)]
        case: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the court phases
    Phases,

    /// Show resolved configuration (debug)
    Config,
}

/// Speaking role for CLI (maps to Speaker)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Judge,
    Plaintiff,
    Defendant,
}

impl From<RoleArg> for Speaker {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Judge => Speaker::Judge,
            RoleArg::Plaintiff => Speaker::Plaintiff,
            RoleArg::Defendant => Speaker::Defendant,
        }
    }
}

/// JSON output of `lexsim phase --json`
#[derive(Debug, Serialize)]
struct PhaseReport<'a> {
    phase: CourtPhase,
    label: &'static str,
    model: &'a str,
    output: &'a ModelOutput,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Session { case, role } => run_session(case, role.into()).await,
            Commands::Phase { phase, case, json } => run_phase(&phase, case, json).await,
            Commands::Phases => {
                list_phases();
                Ok(())
            }
            Commands::Config => show_config(),
        }
    }
}

/// Build the gateway from configuration
fn build_gateway() -> Result<Arc<dyn ModelGateway>> {
    let config = config::config()?;
    if config.api_key.is_none() {
        warn!("{} is not set; model calls will fail", API_KEY_ENV);
    }
    Ok(Arc::new(GeminiGateway::from_config(config)?))
}

/// Read a case facts file
pub fn read_case_file(path: &Path) -> Result<CaseContext> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file: {}", path.display()))?;
    CaseContext::new(text).with_context(|| format!("Case file is empty: {}", path.display()))
}

/// Initial state for a case file, or the demo case
fn initial_state(case: Option<PathBuf>) -> Result<AppState> {
    match case {
        Some(path) => Ok(AppState::with_case(read_case_file(&path)?)),
        None => Ok(AppState::demo()),
    }
}

/// Run the interactive session on stdin/stdout
async fn run_session(case: Option<PathBuf>, role: Speaker) -> Result<()> {
    let court = Court::with_state(build_gateway()?, initial_state(case)?);
    court.select_role(role);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session::run(&court, stdin, std::io::stdout()).await
}

/// Generate one phase and print it
async fn run_phase(selector: &str, case: Option<PathBuf>, json: bool) -> Result<()> {
    let phase = CourtPhase::parse_selector(selector)
        .with_context(|| format!("Unknown phase: {}", selector))?;
    if !phase.is_generated() {
        anyhow::bail!("Phase '{}' is interactive; use `lexsim session`", phase);
    }

    let court = Court::with_state(build_gateway()?, initial_state(case)?);
    for notice in court.activate(phase).await {
        eprintln!("[{}]", notice);
    }

    let output = court
        .phase_output(phase)
        .context("Phase produced no result")?;

    if json {
        let report = PhaseReport {
            phase,
            label: phase.label(),
            model: court.gateway().model(),
            output: &output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", output.display_text());
    }

    if let Some(reason) = output.failure_reason() {
        eprintln!("\n[Generation failed: {}]", reason);
        std::process::exit(1);
    }

    Ok(())
}

/// List phases in tab order
fn list_phases() {
    println!("{:<4} {:<22} {}", "#", "PHASE", "LABEL");
    println!("{}", "-".repeat(60));
    for (idx, phase) in CourtPhase::ALL.iter().enumerate() {
        println!("{:<4} {:<22} {}", idx + 1, phase.id(), phase.label());
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("lexsim Configuration");
    println!("====================\n");
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("Model:       {}", config.model);
    println!("API base:    {}", config.api_base);
    println!("API key:     {}", config.redacted_key());
    match config.timeout {
        Some(timeout) => println!("Timeout:     {}s", timeout.as_secs()),
        None => println!("Timeout:     (none)"),
    }
    println!("Language:    {}", config.language);

    Ok(())
}
