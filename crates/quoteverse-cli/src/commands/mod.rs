//! Command implementations

mod config;
mod explore;
mod load;
mod search;

use crate::backend::build_backend;
use crate::cli::{Cli, Commands, ViewportArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;
use quoteverse_core::config::EngineSettings;
use quoteverse_engine::{SceneRenderer, Session};
use quoteverse_view::{Coord, Rect};
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(cli.config.as_deref(), cli.config_overrides())?;
    let offline = cli.offline.as_deref();

    match cli.command {
        Commands::Config => config::execute(&config, &output),
        Commands::Load(args) => load::execute(args, &config.settings(), offline, &output).await,
        Commands::Search(args) => search::execute(args, &config.settings(), offline, &output).await,
        Commands::Explore(args) => explore::execute(args, &config.settings(), offline, &output).await,
    }
}

/// Session over a headless scene sized like the requested viewport
fn headless_session(
    settings: &EngineSettings,
    offline: Option<&Path>,
    viewport: ViewportArgs,
) -> Result<(Session, SceneRenderer)> {
    let backend = build_backend(settings, offline)?;
    let scene = SceneRenderer::new();
    let container = Rect::new(
        Coord { x: 0.0, y: 0.0 },
        Coord {
            x: viewport.width,
            y: viewport.height,
        },
    );
    let session = Session::new(settings.clone(), backend, Box::new(scene.clone()), container);
    Ok((session, scene))
}
