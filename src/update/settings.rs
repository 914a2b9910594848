//! Settings message handlers
//!
//! Every change builds a new snapshot. If segmentation changed, the loaded
//! scripts are re-split (after folding in edits with the old mode); if a
//! resource reference changed, the host is asked to reload resources.

use crate::commands::Cmd;
use crate::messages::SettingsMsg;
use crate::model::AppModel;
use crate::settings::AppSettings;

/// Everything in the settings that names an external resource
fn resource_refs(settings: &AppSettings) -> (Option<&str>, &str, u16, Option<&str>, Vec<&str>) {
    (
        settings.system_font.source.as_deref(),
        settings.system_font.family.as_str(),
        settings.system_font.weight,
        settings.bitmap_font.image.as_deref(),
        settings.image_tags.iter().map(|t| t.image_url.as_str()).collect(),
    )
}

pub fn update_settings(model: &mut AppModel, msg: SettingsMsg) -> Option<Cmd> {
    let mut next = (*model.settings).clone();
    let result = match msg {
        SettingsMsg::Set { key, value } => next.set(&key, value),
        SettingsMsg::SetNested {
            parent,
            child,
            value,
        } => next.set_nested(&parent, &child, value),
        SettingsMsg::ImportProfile(json) => AppSettings::from_json(&json).map(|s| next = s),
        SettingsMsg::Replace(settings) => {
            next = (*settings).sanitized();
            Ok(())
        }
    };
    if let Err(e) = result {
        tracing::warn!("Settings change rejected: {}", e);
        return None;
    }
    if next == *model.settings {
        return None;
    }

    let old_mode = model.settings.segmentation_mode();
    let new_mode = next.segmentation_mode();
    let reload = resource_refs(&next) != resource_refs(&model.settings);

    if old_mode != new_mode {
        for script in [model.script.as_mut(), model.reference.as_mut()]
            .into_iter()
            .flatten()
        {
            script.commit_edits(&old_mode);
            script.resegment(&new_mode);
        }
        model.selected_block = None;
    }

    model.apply_settings(next);
    model.refresh();

    let redraw = Some(Cmd::Redraw);
    if reload {
        Cmd::merge(
            redraw,
            Some(Cmd::LoadResources {
                base_dir: model.resource_dir.clone(),
            }),
        )
    } else {
        redraw
    }
}
