//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use serde_json::Value;

use crate::resource::FontResources;
use crate::settings::AppSettings;

/// Script loading and editing
#[derive(Debug, Clone)]
pub enum ScriptMsg {
    /// Load the script to check, replacing the current one
    Load { name: String, text: String },
    /// Load the original script that byte budgets are compared against
    LoadReference { name: String, text: String },
    /// Replace one block's content
    EditBlock { index: usize, content: String },
    /// Fold block edits back into the script text
    CommitEdits,
    /// Drop the script and the reference
    Clear,
}

/// Settings changes; each produces a new snapshot
#[derive(Debug, Clone)]
pub enum SettingsMsg {
    /// Top-level key, e.g. `("previewWidth", 256)`
    Set { key: String, value: Value },
    /// Nested key, e.g. `("bitmapFont", "zoom", 2)`
    SetNested {
        parent: String,
        child: String,
        value: Value,
    },
    /// Import a JSON profile, merging it over the defaults
    ImportProfile(String),
    /// Replace the whole snapshot
    Replace(Box<AppSettings>),
}

/// Results of resource loading performed by the host
#[derive(Debug, Clone)]
pub enum ResourceMsg {
    Loaded(Box<FontResources>),
    /// Some resources failed; the rest of `Loaded` still applies
    Failed(Vec<String>),
}

/// View filters
#[derive(Debug, Clone, Copy)]
pub enum ViewMsg {
    ShowOnlyOverflowing(bool),
    SelectBlock(Option<usize>),
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    Script(ScriptMsg),
    Settings(SettingsMsg),
    Resource(ResourceMsg),
    View(ViewMsg),
}
