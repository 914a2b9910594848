//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions. Preview results
//! are recomputed synchronously whenever a message changes an input.

mod script;
mod settings;

use crate::commands::Cmd;
use crate::messages::{Msg, ResourceMsg, ViewMsg};
use crate::model::AppModel;

#[cfg(any(debug_assertions, feature = "profile-tracing"))]
use crate::messages::{ScriptMsg, SettingsMsg};
#[cfg(any(debug_assertions, feature = "profile-tracing"))]
use tracing::{debug, span, Level};

pub use script::update_script;
pub use settings::update_settings;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds (or with `profile-tracing`), this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    #[cfg(any(debug_assertions, feature = "profile-tracing"))]
    {
        update_traced(model, msg)
    }
    #[cfg(not(any(debug_assertions, feature = "profile-tracing")))]
    {
        update_inner(model, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Script(m) => script::update_script(model, m),
        Msg::Settings(m) => settings::update_settings(model, m),
        Msg::Resource(m) => update_resource(model, m),
        Msg::View(m) => update_view(model, m),
    }
}

/// Handle results of resource loading
pub fn update_resource(model: &mut AppModel, msg: ResourceMsg) -> Option<Cmd> {
    match msg {
        ResourceMsg::Loaded(resources) => {
            model.resources = *resources;
            model.rebuild_engine();
            model.refresh();
            Some(Cmd::Redraw)
        }
        ResourceMsg::Failed(errors) => {
            for error in &errors {
                tracing::warn!("Resource unavailable: {}", error);
            }
            None
        }
    }
}

/// Handle view filter changes
pub fn update_view(model: &mut AppModel, msg: ViewMsg) -> Option<Cmd> {
    match msg {
        ViewMsg::ShowOnlyOverflowing(only) => {
            if model.only_overflowing == only {
                return None;
            }
            model.only_overflowing = only;
        }
        ViewMsg::SelectBlock(index) => {
            let valid = match (index, &model.script) {
                (None, _) => true,
                (Some(i), Some(script)) => i < script.blocks.len(),
                (Some(_), None) => false,
            };
            if !valid {
                tracing::debug!("Ignoring selection of missing block {:?}", index);
                return None;
            }
            model.selected_block = index;
        }
    }
    Some(Cmd::Redraw)
}

/// Traced update wrapper (debug builds only)
#[cfg(any(debug_assertions, feature = "profile-tracing"))]
fn update_traced(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    let msg_name = msg_type_name(&msg);
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();

    debug!(target: "message", msg = %msg_name, "processing");
    let before = model.overflowing_count();

    let result = update_inner(model, msg);

    let after = model.overflowing_count();
    if before != after {
        debug!(target: "overflow", before, after, "overflowing blocks changed");
    }

    result
}

/// Get a display name for a message type
///
/// Script payloads are summarized instead of printed in full.
#[cfg(any(debug_assertions, feature = "profile-tracing"))]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Script(ScriptMsg::Load { name, text }) => {
            format!("Script::Load({}, {} bytes)", name, text.len())
        }
        Msg::Script(ScriptMsg::LoadReference { name, text }) => {
            format!("Script::LoadReference({}, {} bytes)", name, text.len())
        }
        Msg::Script(ScriptMsg::EditBlock { index, .. }) => format!("Script::EditBlock({})", index),
        Msg::Script(m) => format!("Script::{:?}", m),
        Msg::Settings(SettingsMsg::ImportProfile(json)) => {
            format!("Settings::ImportProfile({} bytes)", json.len())
        }
        Msg::Settings(SettingsMsg::Replace(_)) => "Settings::Replace".to_string(),
        Msg::Settings(m) => format!("Settings::{:?}", m),
        Msg::Resource(ResourceMsg::Loaded(_)) => "Resource::Loaded".to_string(),
        Msg::Resource(m) => format!("Resource::{:?}", m),
        Msg::View(m) => format!("View::{:?}", m),
    }
}
