use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, Sender};

use boxfit::cli::{CliArgs, ReportFormat, RunConfig, RunMode};
use boxfit::commands::Cmd;
use boxfit::config::{install_profile, PreviewConfig};
use boxfit::config_paths;
use boxfit::messages::{Msg, ResourceMsg, ScriptMsg, ViewMsg};
use boxfit::model::AppModel;
use boxfit::render::{render_block, RenderOptions};
use boxfit::resource::FontResources;
use boxfit::settings::AppSettings;
use boxfit::update::update;

/// One row of the `check --json` report
#[derive(Debug, Serialize)]
struct BlockRow<'a> {
    index: usize,
    overflowing: bool,
    kinds: Vec<&'static str>,
    /// Offending line indices (layout lines in pixel mode)
    lines: Vec<usize>,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    script: &'a str,
    total_blocks: usize,
    overflowing_blocks: usize,
    blocks: Vec<BlockRow<'a>>,
}

struct App {
    model: AppModel,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
}

impl App {
    fn new(settings: AppSettings, resource_dir: Option<PathBuf>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let mut model = AppModel::new(settings);
        model.resource_dir = resource_dir;
        Self {
            model,
            msg_tx,
            msg_rx,
        }
    }

    /// Dispatch a message and run every command it produces
    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        if let Some(cmd) = update(&mut self.model, msg) {
            self.process_cmd(cmd)?;
        }
        self.process_pending_messages()
    }

    /// Execute a command. Results come back through the message channel.
    fn process_cmd(&self, cmd: Cmd) -> Result<()> {
        match cmd {
            Cmd::None | Cmd::Redraw => {}
            Cmd::LoadResources { base_dir } => {
                let (resources, errors) =
                    FontResources::load(&self.model.settings, base_dir.as_deref());
                if !errors.is_empty() {
                    let errors = errors.iter().map(ToString::to_string).collect();
                    self.send(Msg::Resource(ResourceMsg::Failed(errors)))?;
                }
                self.send(Msg::Resource(ResourceMsg::Loaded(Box::new(resources))))?;
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd)?;
                }
            }
        }
        Ok(())
    }

    fn send(&self, msg: Msg) -> Result<()> {
        self.msg_tx
            .send(msg)
            .map_err(|_| anyhow!("Message channel closed"))
    }

    fn process_pending_messages(&mut self) -> Result<()> {
        while let Ok(msg) = self.msg_rx.try_recv() {
            if let Some(cmd) = update(&mut self.model, msg) {
                self.process_cmd(cmd)?;
            }
        }
        Ok(())
    }

    fn load_scripts(&mut self, script: &Path, reference: Option<&Path>) -> Result<()> {
        if let Some(reference) = reference {
            let text = read_script(reference)?;
            self.dispatch(Msg::Script(ScriptMsg::LoadReference {
                name: display_name(reference),
                text,
            }))?;
        }
        let text = read_script(script)?;
        self.dispatch(Msg::Script(ScriptMsg::Load {
            name: display_name(script),
            text,
        }))
    }
}

fn read_script(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read script {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_settings(path: Option<&Path>) -> Result<AppSettings> {
    match path {
        Some(path) => AppSettings::load_profile(path)
            .with_context(|| format!("Failed to load settings profile {}", path.display())),
        None => Ok(AppSettings::default()),
    }
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}

fn run_check(app: &App, format: ReportFormat) -> Result<bool> {
    let model = &app.model;
    let Some(script) = &model.script else {
        return Err(anyhow!("No script loaded"));
    };

    let overflowing = model.overflowing_count();
    match format {
        ReportFormat::Text => {
            for block in model.visible_blocks() {
                let kinds = block.overflow.labels();
                let status = if kinds.is_empty() {
                    "ok".to_string()
                } else {
                    kinds.join(",")
                };
                println!("{:>5}  {:<24} {}", block.index, status, first_line(&block.content));
            }
            println!("{} of {} blocks overflow", overflowing, script.blocks.len());
        }
        ReportFormat::Json => {
            let blocks = model
                .visible_blocks()
                .into_iter()
                .map(|block| BlockRow {
                    index: block.index,
                    overflowing: block.is_overflowing,
                    kinds: block.overflow.labels(),
                    lines: if block.is_overflowing {
                        model
                            .preview_block(block.index)
                            .map(|p| p.overflow.lines)
                            .unwrap_or_default()
                    } else {
                        Vec::new()
                    },
                    text: &block.content,
                })
                .collect();
            let report = CheckReport {
                script: &script.name,
                total_blocks: script.blocks.len(),
                overflowing_blocks: overflowing,
                blocks,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(overflowing > 0)
}

fn run_render(app: &App, block: usize, out: &Path) -> Result<()> {
    let model = &app.model;
    let preview = model
        .preview_block(block)
        .ok_or_else(|| anyhow!("Block {} does not exist", block))?;
    let options = RenderOptions::from_settings(&model.settings);
    let image = render_block(&preview, &model.engine, &model.resources, &options);
    image
        .save(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    tracing::info!(
        "Rendered block {} ({}x{}) to {}",
        block,
        image.width(),
        image.height(),
        out.display()
    );
    Ok(())
}

fn run(config: RunConfig) -> Result<ExitCode> {
    let settings = load_settings(config.settings.as_deref())?;

    if let RunMode::ExportProfile { out } = &config.mode {
        match out {
            Some(path) => settings
                .save_profile(path)
                .with_context(|| format!("Failed to export profile to {}", path.display()))?,
            None => println!("{}", settings.to_json()?),
        }
        return Ok(ExitCode::SUCCESS);
    }

    if let RunMode::InstallProfile { name, make_default } = &config.mode {
        let dir = config_paths::ensure_profiles_dir().map_err(|e| anyhow!(e))?;
        let path = install_profile(&settings, &dir, name)
            .with_context(|| format!("Failed to install profile '{}'", name))?;
        println!("Installed profile to {}", path.display());
        if *make_default {
            let mut stored = PreviewConfig::load();
            stored.default_profile = Some(name.clone());
            stored.save().map_err(|e| anyhow!(e))?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Relative font and image paths resolve next to the profile
    let resource_dir = config
        .settings
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);
    let mut app = App::new(settings, resource_dir.clone());
    app.process_cmd(Cmd::LoadResources {
        base_dir: resource_dir,
    })?;
    app.process_pending_messages()?;

    if let Some((script, reference)) = config.script_paths() {
        app.load_scripts(script, reference.map(PathBuf::as_path))?;
    }

    match config.mode {
        RunMode::Check {
            only_overflowing,
            format,
            ..
        } => {
            app.dispatch(Msg::View(ViewMsg::ShowOnlyOverflowing(only_overflowing)))?;
            let any = run_check(&app, format)?;
            Ok(if any {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        RunMode::Render { block, out, .. } => {
            run_render(&app, block, &out)?;
            Ok(ExitCode::SUCCESS)
        }
        RunMode::ExportProfile { .. } | RunMode::InstallProfile { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> Result<ExitCode> {
    boxfit::tracing::init();

    let stored = PreviewConfig::load();
    let config = CliArgs::parse()
        .into_config(&stored)
        .map_err(|e| anyhow!(e))?;

    run(config)
}
