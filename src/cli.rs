//! Command-line argument parsing
//!
//! Supports:
//! - Checking a script for overflowing blocks
//! - Rendering one block to PNG
//! - Exporting, showing or installing the effective settings profile

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PreviewConfig;

/// Textbox preview and overflow checker for game scripts
#[derive(Parser, Debug)]
#[command(name = "boxfit", version, about = "Check translated script text against textbox limits")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Preview every block and report which ones overflow
    Check {
        /// Script file to check
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Settings profile (JSON export)
        #[arg(short, long, value_name = "PROFILE")]
        settings: Option<PathBuf>,

        /// Original script for per-line byte budgets
        #[arg(short, long, value_name = "ORIG")]
        reference: Option<PathBuf>,

        /// List only overflowing blocks
        #[arg(long)]
        overflowing: bool,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render one block as a PNG of the configured box
    Render {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Block index (0-based, as printed by `check`)
        #[arg(short, long, value_name = "N")]
        block: usize,

        /// Output PNG path
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        #[arg(short, long, value_name = "PROFILE")]
        settings: Option<PathBuf>,

        #[arg(short, long, value_name = "ORIG")]
        reference: Option<PathBuf>,
    },

    /// Inspect the effective settings profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,

        #[arg(short, long, value_name = "PROFILE", global = true)]
        settings: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProfileAction {
    /// Write the profile as pretty JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the profile
    Show,
    /// Copy the profile into the profiles directory under a bare name
    Install {
        #[arg(value_name = "NAME")]
        name: String,

        /// Also make it the default profile in config.yaml
        #[arg(long)]
        default: bool,
    },
}

/// Output format of `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Check {
        script: PathBuf,
        reference: Option<PathBuf>,
        only_overflowing: bool,
        format: ReportFormat,
    },
    Render {
        script: PathBuf,
        reference: Option<PathBuf>,
        block: usize,
        out: PathBuf,
    },
    ExportProfile {
        out: Option<PathBuf>,
    },
    InstallProfile {
        name: String,
        make_default: bool,
    },
}

/// Configuration derived from CLI arguments and the persisted config
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: RunMode,
    /// Explicit `--settings`, else the configured default profile
    pub settings: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve parsed arguments against the persisted config
    pub fn into_config(self, config: &PreviewConfig) -> Result<RunConfig, String> {
        let (mode, settings) = match self.command {
            Command::Check {
                script,
                settings,
                reference,
                overflowing,
                json,
            } => {
                let format = if json {
                    ReportFormat::Json
                } else {
                    ReportFormat::Text
                };
                let mode = RunMode::Check {
                    script,
                    reference,
                    only_overflowing: overflowing || config.only_overflowing,
                    format,
                };
                (mode, settings)
            }
            Command::Render {
                script,
                block,
                out,
                settings,
                reference,
            } => {
                if out.extension().is_some_and(|e| !e.eq_ignore_ascii_case("png")) {
                    return Err(format!("Output must be a .png file: {}", out.display()));
                }
                let mode = RunMode::Render {
                    script,
                    reference,
                    block,
                    out,
                };
                (mode, settings)
            }
            Command::Profile { action, settings } => {
                let mode = match action {
                    ProfileAction::Export { out } => RunMode::ExportProfile { out },
                    ProfileAction::Show => RunMode::ExportProfile { out: None },
                    ProfileAction::Install { name, default } => {
                        if !is_bare_name(&name) {
                            return Err(format!("Profile name must be a bare name: {}", name));
                        }
                        RunMode::InstallProfile {
                            name,
                            make_default: default,
                        }
                    }
                };
                (mode, settings)
            }
        };

        Ok(RunConfig {
            mode,
            settings: settings.or_else(|| config.default_profile_path()),
        })
    }
}

impl RunConfig {
    /// Script and reference paths the mode reads, if any
    pub fn script_paths(&self) -> Option<(&PathBuf, Option<&PathBuf>)> {
        match &self.mode {
            RunMode::Check {
                script, reference, ..
            }
            | RunMode::Render {
                script, reference, ..
            } => Some((script, reference.as_ref())),
            RunMode::ExportProfile { .. } | RunMode::InstallProfile { .. } => None,
        }
    }
}

/// A profile name usable as a file stem inside the profiles directory
fn is_bare_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.ends_with(".json")
}
