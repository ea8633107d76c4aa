//! Command-line interface definition for Chatty
//!
//! This module defines the CLI structure using clap's derive API,
//! providing an interactive chat command and a one-shot ask command.

use clap::{Parser, Subcommand};

/// Chatty - terminal chat client for the Gemini API
///
/// Each prompt is sent on its own; earlier turns are shown but never
/// replayed to the model.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatty")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Gemini API key (never written to disk or logs)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatty
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single prompt and print the answer
    Ask {
        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,

        /// Prompt text
        prompt: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Model override given on whichever subcommand was selected
    pub fn model_override(&self) -> Option<&str> {
        match &self.command {
            Commands::Chat { model } | Commands::Ask { model, .. } => model.as_deref(),
        }
    }
}
