//! Explore command implementation
//!
//! A line-oriented stand-in for the browser front end: each line typed is
//! submitted as the search input, and `:`-prefixed lines drive the mode and
//! the viewport.

use crate::cli::ExploreArgs;
use crate::output::OutputWriter;
use crate::output_types::{ResultItem, StatusOutput};
use anyhow::{anyhow, bail, Result};
use dialoguer::Input;
use quoteverse_core::config::EngineSettings;
use quoteverse_core::models::SearchMode;
use quoteverse_engine::{Session, SessionEvent};
use quoteverse_view::{Coord, Rect, ViewEvent};
use std::path::Path;
use std::time::Instant;

use super::headless_session;

const HELP: &str = "Type text to search. Commands: :mode <quote|author|book>, \
:zoom <in|out> [x y], :pan <dx> <dy>, :resize <w> <h>, :results, :status, :quit";

#[derive(Debug, Clone, PartialEq)]
enum ExploreCommand {
    Query(String),
    Mode(SearchMode),
    Zoom { zoom_in: bool, at: Option<Coord<f64>> },
    Pan(Coord<f64>),
    Resize { width: f64, height: f64 },
    Results,
    Status,
    Help,
    Quit,
}

pub async fn execute(
    args: ExploreArgs,
    settings: &EngineSettings,
    offline: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let (mut session, scene) = headless_session(settings, offline, args.viewport)?;

    match session.load_initial().await {
        Ok(count) => output.success(format!("Loaded {} quotes ({} plotted)", count, scene.len())),
        Err(e) => output.warning(format!("{} Starting with an empty map.", e.user_message())),
    }
    session.handle_event(SessionEvent::SetMode(args.mode), Instant::now());
    output.info(HELP);

    loop {
        let prompt = session.coordinator().mode().placeholder().to_string();
        let Some(line) = read_line(prompt).await else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                output.error(e);
                continue;
            }
        };

        match command {
            ExploreCommand::Quit => break,
            ExploreCommand::Help => output.info(HELP),
            ExploreCommand::Query(text) => {
                let now = Instant::now();
                session.handle_event(SessionEvent::Input(text), now);
                session.handle_event(SessionEvent::Submit, now);
                session.drive().await;
                print_results(&session, args.limit, output)?;
            }
            ExploreCommand::Mode(mode) => {
                session.handle_event(SessionEvent::SetMode(mode), Instant::now());
                output.info(mode.label());
                session.drive().await;
                if !session.coordinator().input().trim().is_empty() {
                    print_results(&session, args.limit, output)?;
                }
            }
            ExploreCommand::Results => print_results(&session, args.limit, output)?,
            ExploreCommand::Status => print_status(&session, output)?,
            view => {
                let center = session.viewport().center();
                for event in view_events(&view, center) {
                    session.handle_event(SessionEvent::View(event), Instant::now());
                }
                let offset = session.viewport().offset();
                output.kv(
                    "Viewport",
                    format!("scale {:.1}, offset ({:.1}, {:.1})", session.viewport().scale(), offset.x, offset.y),
                );
            }
        }
    }

    tracing::debug!(status = ?session.status(), "explore finished");
    Ok(())
}

/// Read one line from the terminal; `None` on end of input
async fn read_line(prompt: String) -> Option<String> {
    let read = tokio::task::spawn_blocking(move || {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await;

    match read {
        Ok(Ok(line)) => Some(line),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "input closed");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "input task failed");
            None
        }
    }
}

fn print_results(session: &Session, limit: usize, output: &OutputWriter) -> Result<()> {
    let items: Vec<ResultItem> = ResultItem::from_ranked(session.results())
        .into_iter()
        .take(limit)
        .collect();

    if output.is_json() {
        return output.result(serde_json::json!({
            "message": session.message(),
            "results": items,
        }));
    }

    if let Some(message) = session.message() {
        output.info(message);
    }
    output.ranked(&items, 72);
    Ok(())
}

fn print_status(session: &Session, output: &OutputWriter) -> Result<()> {
    let status = StatusOutput::from(session.status());
    if output.is_json() {
        return output.result(status);
    }
    output.section("Session");
    output.kv("Points", status.points);
    output.kv("Highlighted", status.highlighted);
    output.kv("Results", status.results);
    output.kv("Mode", &status.mode);
    output.kv("State", &status.state);
    output.kv(
        "Cache",
        format!("{} entries, {} hits, {} misses", status.cache_entries, status.cache_hits, status.cache_misses),
    );
    output.kv("Scale", format!("{:.1}", status.scale));
    Ok(())
}

fn parse_line(line: &str) -> Result<ExploreCommand> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Ok(ExploreCommand::Query(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("q" | "quit" | "exit", []) => Ok(ExploreCommand::Quit),
        ("h" | "help", []) => Ok(ExploreCommand::Help),
        ("results", []) => Ok(ExploreCommand::Results),
        ("status", []) => Ok(ExploreCommand::Status),
        ("mode", [mode]) => Ok(ExploreCommand::Mode(mode.parse()?)),
        ("zoom", [direction, rest @ ..]) => {
            let zoom_in = match *direction {
                "in" | "+" => true,
                "out" | "-" => false,
                other => bail!("Zoom direction must be 'in' or 'out', got '{}'", other),
            };
            let at = match rest {
                [] => None,
                [x, y] => Some(Coord {
                    x: number(x)?,
                    y: number(y)?,
                }),
                _ => bail!("Usage: :zoom <in|out> [x y]"),
            };
            Ok(ExploreCommand::Zoom { zoom_in, at })
        }
        ("pan", [dx, dy]) => Ok(ExploreCommand::Pan(Coord {
            x: number(dx)?,
            y: number(dy)?,
        })),
        ("resize", [w, h]) => {
            let (width, height) = (number(w)?, number(h)?);
            if width <= 0.0 || height <= 0.0 {
                bail!("Viewport size must be positive");
            }
            Ok(ExploreCommand::Resize { width, height })
        }
        _ => Err(anyhow!("Unknown command ':{}'. {}", rest, HELP)),
    }
}

fn number(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| anyhow!("'{}' is not a number", raw))
}

/// Pointer events equivalent to a viewport command
fn view_events(command: &ExploreCommand, center: Coord<f64>) -> Vec<ViewEvent> {
    match *command {
        ExploreCommand::Zoom { zoom_in, at } => vec![ViewEvent::Wheel {
            delta_y: if zoom_in { -1.0 } else { 1.0 },
            cursor: at.unwrap_or(center),
        }],
        ExploreCommand::Pan(delta) => vec![
            ViewEvent::DragStart(center),
            ViewEvent::DragMove(center + delta),
            ViewEvent::DragEnd,
        ],
        ExploreCommand::Resize { width, height } => vec![ViewEvent::Resize(Rect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: width, y: height },
        ))],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_query() {
        assert_eq!(
            parse_line("  the unexamined life ").unwrap(),
            ExploreCommand::Query("  the unexamined life ".to_string())
        );
        assert_eq!(parse_line("").unwrap(), ExploreCommand::Query(String::new()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line(":quit").unwrap(), ExploreCommand::Quit);
        assert_eq!(parse_line(":mode book").unwrap(), ExploreCommand::Mode(SearchMode::Book));
        assert_eq!(
            parse_line(":zoom in 10 20").unwrap(),
            ExploreCommand::Zoom {
                zoom_in: true,
                at: Some(Coord { x: 10.0, y: 20.0 })
            }
        );
        assert_eq!(
            parse_line(":pan -5 12.5").unwrap(),
            ExploreCommand::Pan(Coord { x: -5.0, y: 12.5 })
        );
        assert_eq!(
            parse_line(":resize 640 480").unwrap(),
            ExploreCommand::Resize {
                width: 640.0,
                height: 480.0
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line(":mode poem").is_err());
        assert!(parse_line(":zoom sideways").is_err());
        assert!(parse_line(":pan 1").is_err());
        assert!(parse_line(":resize 0 100").is_err());
        assert!(parse_line(":teleport").is_err());
    }

    #[test]
    fn test_pan_becomes_drag() {
        let center = Coord { x: 100.0, y: 100.0 };
        let events = view_events(&ExploreCommand::Pan(Coord { x: 5.0, y: -5.0 }), center);
        assert_eq!(
            events,
            vec![
                ViewEvent::DragStart(center),
                ViewEvent::DragMove(Coord { x: 105.0, y: 95.0 }),
                ViewEvent::DragEnd,
            ]
        );
    }

    #[test]
    fn test_zoom_defaults_to_center() {
        let center = Coord { x: 320.0, y: 240.0 };
        let events = view_events(
            &ExploreCommand::Zoom {
                zoom_in: false,
                at: None,
            },
            center,
        );
        assert_eq!(
            events,
            vec![ViewEvent::Wheel {
                delta_y: 1.0,
                cursor: center
            }]
        );
    }
}
