//! Load command implementation

use crate::cli::LoadArgs;
use crate::output::OutputWriter;
use crate::output_types::{LoadOutput, PointItem};
use crate::progress::{finish_error, finish_success, spinner_for};
use anyhow::{Context, Result};
use quoteverse_core::config::EngineSettings;
use std::path::Path;
use tabled::Tabled;

use super::headless_session;

pub async fn execute(
    args: LoadArgs,
    settings: &EngineSettings,
    offline: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let (mut session, scene) = headless_session(settings, offline, args.viewport)?;

    let spinner = spinner_for(output.is_json(), "Fetching quotes...");
    let loaded = match session.load_initial().await {
        Ok(count) => {
            finish_success(&spinner, &format!("Fetched {} quotes", count));
            count
        }
        Err(e) => {
            finish_error(&spinner, &e.user_message());
            return Err(e).context("Failed to load quotes");
        }
    };

    let store = session.store();
    let primitives = scene.primitives();
    let points: Vec<PointItem> = primitives
        .iter()
        .take(args.limit)
        .map(|p| PointItem::new(p, store.get(&p.id).as_ref()))
        .collect();

    let result = LoadOutput {
        backend: offline.map_or_else(|| settings.base_url.clone(), |p| p.display().to_string()),
        loaded,
        plotted: primitives.len(),
        unplaced: loaded - primitives.len(),
        scale: session.viewport().scale(),
        points,
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Quote Map");
    output.kv("Backend", &result.backend);
    output.kv("Loaded", result.loaded);
    output.kv("Plotted", result.plotted);
    if result.unplaced > 0 {
        output.warning(format!("{} quotes have no coordinates and were not plotted", result.unplaced));
    }
    output.kv("Scale", format!("{} px/unit", result.scale));

    #[derive(Tabled)]
    struct PointRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Pixel")]
        pixel: String,
        #[tabled(rename = "Author")]
        author: String,
    }

    output.section(format!("First {} points", result.points.len()));
    let rows: Vec<PointRow> = result
        .points
        .into_iter()
        .map(|p| PointRow {
            id: p.id,
            pixel: format!("({:.1}, {:.1})", p.x, p.y),
            author: p.author,
        })
        .collect();
    output.table(rows);

    Ok(())
}
