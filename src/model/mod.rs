//! Session state for the Elm-style architecture
//!
//! `AppModel` owns the current settings snapshot, the preview engine built
//! from it, loaded resources and the scripts being checked. Everything is
//! mutated only through [`crate::update::update`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::preview::{BlockPreview, PreviewEngine};
use crate::resource::FontResources;
use crate::script::{Block, Script, ScriptId};
use crate::settings::AppSettings;

pub struct AppModel {
    pub settings: Arc<AppSettings>,
    pub engine: PreviewEngine,
    pub resources: FontResources,
    pub script: Option<Script>,
    /// Original script used for byte budgets
    pub reference: Option<Script>,
    pub only_overflowing: bool,
    pub selected_block: Option<usize>,
    /// Relative resource paths resolve against this directory
    pub resource_dir: Option<PathBuf>,
    next_script_id: u64,
}

impl AppModel {
    pub fn new(settings: AppSettings) -> Self {
        let settings = Arc::new(settings);
        let resources = FontResources::default();
        Self {
            engine: PreviewEngine::new(Arc::clone(&settings), &resources),
            settings,
            resources,
            script: None,
            reference: None,
            only_overflowing: false,
            selected_block: None,
            resource_dir: None,
            next_script_id: 1,
        }
    }

    pub fn next_script_id(&mut self) -> ScriptId {
        let id = ScriptId(self.next_script_id);
        self.next_script_id += 1;
        id
    }

    /// Install a new settings snapshot and rebuild the engine
    pub fn apply_settings(&mut self, settings: AppSettings) {
        self.settings = Arc::new(settings);
        self.rebuild_engine();
    }

    pub fn rebuild_engine(&mut self) {
        self.engine = PreviewEngine::new(Arc::clone(&self.settings), &self.resources);
    }

    /// Recompute overflow flags on the loaded script
    pub fn refresh(&mut self) -> usize {
        match self.script.as_mut() {
            Some(script) => self.engine.refresh_script(script, self.reference.as_ref()),
            None => 0,
        }
    }

    /// Blocks shown under the current filter
    pub fn visible_blocks(&self) -> Vec<&Block> {
        let Some(script) = &self.script else {
            return Vec::new();
        };
        script
            .blocks
            .iter()
            .filter(|b| !self.only_overflowing || b.is_overflowing)
            .collect()
    }

    pub fn overflowing_count(&self) -> usize {
        self.script.as_ref().map_or(0, Script::overflowing_count)
    }

    /// Full preview of one block of the loaded script
    pub fn preview_block(&self, index: usize) -> Option<BlockPreview> {
        let block = self.script.as_ref()?.block(index)?;
        let reference = self
            .reference
            .as_ref()
            .and_then(|r| r.block(index))
            .map(|b| b.content.as_str());
        Some(self.engine.preview_text(&block.content, reference))
    }

    /// Preview of the selected block
    pub fn selected_preview(&self) -> Option<BlockPreview> {
        self.preview_block(self.selected_block?)
    }
}
