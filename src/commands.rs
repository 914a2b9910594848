//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

use std::path::PathBuf;

/// Side effects requested by `update`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Preview results changed and should be shown again
    Redraw,
    /// (Re)load the font and image resources the settings refer to.
    /// The host answers with `Msg::Resource`.
    LoadResources { base_dir: Option<PathBuf> },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Whether this command asks for the preview to be shown again
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::Redraw => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            _ => false,
        }
    }

    /// Combine two optional commands
    pub fn merge(a: Option<Cmd>, b: Option<Cmd>) -> Option<Cmd> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(Cmd::None), b) => b,
            (a, Some(Cmd::None)) => a,
            (Some(Cmd::Batch(mut cmds)), Some(b)) => {
                cmds.push(b);
                Some(Cmd::Batch(cmds))
            }
            (Some(a), Some(b)) => Some(Cmd::Batch(vec![a, b])),
        }
    }

    /// Flatten into individual commands, dropping `None`
    pub fn into_vec(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::into_vec).collect(),
            cmd => vec![cmd],
        }
    }
}
