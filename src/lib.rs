//! boxfit - textbox preview and overflow checking for game scripts
//!
//! This crate provides the layout and overflow-detection engine plus the
//! Elm-style session model used by the `boxfit` binary.

pub mod budget;
pub mod cli;
pub mod color;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod glyph;
pub mod layout;
pub mod messages;
pub mod model;
pub mod overflow;
pub mod preview;
pub mod render;
pub mod resource;
pub mod script;
pub mod settings;
pub mod tags;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::PreviewConfig;
pub use messages::Msg;
pub use model::AppModel;
pub use preview::{BlockPreview, PreviewEngine};
pub use settings::AppSettings;
