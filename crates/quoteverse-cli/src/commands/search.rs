//! Search command implementation

use crate::cli::SearchArgs;
use crate::output::{truncate, OutputWriter};
use crate::output_types::{ResultItem, SearchOutput};
use crate::progress::spinner_for;
use anyhow::{bail, Context, Result};
use quoteverse_core::config::EngineSettings;
use quoteverse_engine::Reconciled;
use std::path::Path;
use std::time::Instant;
use tabled::Tabled;

use super::headless_session;

pub async fn execute(
    args: SearchArgs,
    settings: &EngineSettings,
    offline: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let (mut session, _scene) = headless_session(settings, offline, args.viewport)?;

    if args.with_map {
        session.load_initial().await.context("Failed to load quotes")?;
    }

    let now = Instant::now();
    session.set_mode(args.mode, now);
    session.set_input(&args.query, now);
    let immediate = session.submit(now);

    let spinner = spinner_for(output.is_json(), "Searching...");
    let outcome = session.drive().await.or(immediate);
    spinner.finish_and_clear();

    // `None`: nothing was sent, e.g. a blank query; the session message says why
    let added = match outcome {
        Some(Reconciled::Applied { added, .. }) => added,
        Some(Reconciled::Failed(message)) => bail!(message),
        Some(Reconciled::Stale) => bail!("Search was superseded before it completed"),
        None => 0,
    };

    let result = SearchOutput {
        query: args.query.trim().to_string(),
        mode: args.mode.to_string(),
        added,
        points: session.store().len(),
        message: session.message().map(str::to_string),
        results: ResultItem::from_ranked(session.results()),
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section(args.mode.label());
    output.kv("Query", &result.query);
    if let Some(message) = &result.message {
        output.info(message);
        return Ok(());
    }
    if args.with_map {
        output.success(format!("{} new points on the map", result.added));
    }

    #[derive(Tabled)]
    struct ResultRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "Distance")]
        distance: String,
        #[tabled(rename = "Author")]
        author: String,
        #[tabled(rename = "Quote")]
        text: String,
    }

    let rows: Vec<ResultRow> = result
        .results
        .into_iter()
        .map(|r| ResultRow {
            rank: r.rank,
            distance: r.distance.map(|d| format!("{:.3}", d)).unwrap_or_else(|| "-".to_string()),
            author: r.author,
            text: truncate(&r.text, 72),
        })
        .collect();
    output.table(rows);

    Ok(())
}
