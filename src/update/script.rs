//! Script message handlers (load, edit, clear)

use crate::commands::Cmd;
use crate::messages::ScriptMsg;
use crate::model::AppModel;
use crate::script::Script;

pub fn update_script(model: &mut AppModel, msg: ScriptMsg) -> Option<Cmd> {
    let mode = model.settings.segmentation_mode();
    match msg {
        ScriptMsg::Load { name, text } => {
            let id = model.next_script_id();
            model.script = Some(Script::new(id, name, text, &mode));
            model.selected_block = None;
            let count = model.refresh();
            tracing::info!("Script loaded, {} blocks overflow", count);
        }

        ScriptMsg::LoadReference { name, text } => {
            let id = model.next_script_id();
            model.reference = Some(Script::new(id, name, text, &mode));
            model.refresh();
        }

        ScriptMsg::EditBlock { index, content } => {
            let script = model.script.as_mut()?;
            if !script.edit_block(index, content) {
                tracing::debug!("Edit of missing block {} ignored", index);
                return None;
            }
            // Only the edited block's inputs changed
            let reference = model
                .reference
                .as_ref()
                .and_then(|r| r.block(index))
                .map(|b| b.content.clone());
            let preview = script
                .block(index)
                .map(|b| model.engine.preview_text(&b.content, reference.as_deref()))?;
            if let Some(block) = script.blocks.get_mut(index) {
                block.set_overflow(preview.overflow.kinds);
            }
        }

        ScriptMsg::CommitEdits => {
            model.script.as_mut()?.commit_edits(&mode);
            return None;
        }

        ScriptMsg::Clear => {
            if model.script.is_none() && model.reference.is_none() {
                return None;
            }
            model.script = None;
            model.reference = None;
            model.selected_block = None;
        }
    }
    Some(Cmd::Redraw)
}
