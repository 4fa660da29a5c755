//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::session::ControllerOptions;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "cook-along")]
#[command(about = "Cook-along timer service that keeps a recipe video in step with a cooking session")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// JSON recipe catalog; the built-in breakfast recipes are served when omitted
    #[arg(short, long)]
    pub recipes: Option<PathBuf>,

    /// Stop the cook-along session when the recipe video ends
    #[arg(long)]
    pub stop_on_end: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Controller options derived from the flags
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            stop_on_media_end: self.stop_on_end,
            ..ControllerOptions::default()
        }
    }
}
