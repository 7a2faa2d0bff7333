//! Everything the commands print to stdout.
//!
//! Diagnostics go through `tracing` to stderr; this module only handles
//! results: status lines, tables and JSON documents.

use std::io::{self, IsTerminal};

use console::{Term, measure_text_width};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// The `--output-format` flag wins, then `output.format` from the config,
    /// then stdout detection.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => format_from_config(&config.output.format),
            explicit => explicit,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    /// Plain line; nothing in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status(Status::Success, msg)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status(Status::Warning, msg)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status(Status::Info, msg)
    }

    fn status(&self, status: Status, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let symbol = status.symbol();
        let line = match (self.no_color, status) {
            (true, _) => format!("{symbol} {msg}"),
            (false, Status::Success) => format!("{} {}", symbol.green().bold(), msg.green()),
            (false, Status::Warning) => format!("{} {}", symbol.yellow().bold(), msg.yellow()),
            (false, Status::Info) => format!("{} {}", symbol.blue().bold(), msg),
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Left-aligned columns with a header row.
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        for line in render_table(headers, rows) {
            let line = match (&line, self.no_color) {
                (TableLine::Header(text), false) => text.bold().to_string(),
                (TableLine::Header(text) | TableLine::Row(text), _) => text.clone(),
            };
            self.term.write_line(line.trim_end())?;
        }
        Ok(())
    }

    /// Pretty JSON on stdout. Written even in quiet mode so pipes keep working.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    /// Whether ANSI colors may be written to stdout.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Warning,
    Info,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Self::Success => "\u{2713}",
            Self::Warning => "\u{26a0}",
            Self::Info => "\u{2139}",
        }
    }
}

/// `output.format` from the config file; unknown values mean `auto`.
fn format_from_config(raw: &str) -> OutputFormat {
    match raw.trim().to_ascii_lowercase().as_str() {
        "human" => OutputFormat::Human,
        "plain" => OutputFormat::Plain,
        "json" => OutputFormat::Json,
        _ => OutputFormat::Auto,
    }
}

enum TableLine {
    Header(String),
    Row(String),
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<TableLine> {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(measure_text_width(cell));
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(TableLine::Header(pad_row(headers.iter().copied(), &widths)));
    for row in rows {
        lines.push(TableLine::Row(pad_row(row.iter().map(String::as_str), &widths)));
    }
    lines
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let fill = width.saturating_sub(measure_text_width(cell));
            format!("{cell}{}", " ".repeat(fill))
        })
        .collect::<Vec<_>>()
        .join("  ")
}
