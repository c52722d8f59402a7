use crate::output_types::ResultItem;
use console::{style, StyledObject};
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

/// One-line status notices. Warnings and errors go to stderr.
#[derive(Debug, Clone, Copy)]
enum Notice {
    Success,
    Warning,
    Error,
}

impl Notice {
    fn status(self) -> &'static str {
        match self {
            Notice::Success => "success",
            Notice::Warning => "warning",
            Notice::Error => "error",
        }
    }

    fn symbol(self) -> StyledObject<&'static str> {
        match self {
            Notice::Success => style("✓").green().bold(),
            Notice::Warning => style("⚠").yellow().bold(),
            Notice::Error => style("✗").red().bold(),
        }
    }

    fn to_stderr(self) -> bool {
        !matches!(self, Notice::Success)
    }
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    fn notice(&self, kind: Notice, message: impl Display) {
        let line = match self.format {
            OutputFormat::Human => format!("{} {}", kind.symbol(), message),
            OutputFormat::Json => {
                let envelope = serde_json::json!({
                    "status": kind.status(),
                    "message": message.to_string(),
                });
                serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| envelope.to_string())
            }
        };
        if kind.to_stderr() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, message: impl Display) {
        self.notice(Notice::Success, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.notice(Notice::Warning, message);
    }

    pub fn error(&self, message: impl Display) {
        self.notice(Notice::Error, message);
    }

    /// Informational line; suppressed in JSON mode so stdout stays parseable
    pub fn info(&self, message: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    pub fn section(&self, title: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    /// Render rows as a table. Human mode only; JSON callers use [`result`](Self::result).
    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        if let OutputFormat::Human = self.format {
            if rows.is_empty() {
                println!("{}", style("(nothing to show)").dim());
                return;
            }
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }

    /// Compact numbered listing of ranked quotes, one per line
    pub fn ranked(&self, items: &[ResultItem], width: usize) {
        if let OutputFormat::Human = self.format {
            for item in items {
                let distance = match item.distance {
                    Some(d) => style(format!("{:.3}", d)).cyan(),
                    None => style("  -  ".to_string()).dim(),
                };
                println!(
                    "{:>3}. {} {} {}",
                    item.rank,
                    distance,
                    truncate(&item.text, width),
                    style(format!("({})", item.author)).dim()
                );
            }
        }
    }

    /// Structured payload: wrapped as `{status, data}` in JSON mode, pretty-printed otherwise
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let rendered = match self.format {
            OutputFormat::Human => serde_json::to_string_pretty(&data)?,
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "status": "success",
                "data": data,
            }))?,
        };
        println!("{}", rendered);
        Ok(())
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
