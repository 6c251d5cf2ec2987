use clap::ValueEnum;
use comfy_table::{Attribute, Cell, Table};
use media_catalog_core::CanonicalItem;
use media_catalog_models::{HistoryRecord, ItemRecord};
use owo_colors::OwoColorize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", msg.as_ref(), |m| println!("{} {}", "✓".green(), m));
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.message("info", msg.as_ref(), |m| println!("{}", m));
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", msg.as_ref(), |m| println!("{} {}", "⚠".yellow(), m));
    }

    fn message(&self, kind: &str, msg: &str, human: impl FnOnce(&str)) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => human(msg),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": kind, "message": msg }));
            }
        }
    }

    /// Items with their history and watchlist overlay.
    pub fn items(&self, title: &str, items: &[Arc<CanonicalItem>]) {
        if self.quiet {
            return;
        }

        if self.format != OutputFormat::Human {
            let views: Vec<_> = items.iter().map(|item| item.view()).collect();
            self.print_json(&json!({ "type": "items", "title": title, "items": views }));
            return;
        }

        if items.is_empty() {
            println!("{}", format!("{}: nothing found", title).dimmed());
            return;
        }

        let mut table = styled_table(vec!["ID", "Name", "Type", "Source", "Channel", "Progress", "Watchlist"]);
        for item in items {
            let view = item.view();
            let progress = view
                .history
                .as_ref()
                .map(format_progress)
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(&view.record.id),
                Cell::new(&view.record.name),
                Cell::new(format!("{:?}", view.record.item_type)),
                Cell::new(&view.record.source),
                Cell::new(view.record.channel_number.as_deref().unwrap_or("")),
                Cell::new(progress),
                Cell::new(if view.is_on_watchlist { "★" } else { "" }),
            ]);
        }
        println!("{}", title.bright_cyan().bold());
        println!("{}", table);
    }

    pub fn item(&self, item: &CanonicalItem) {
        if self.quiet {
            return;
        }

        let view = item.view();
        if self.format != OutputFormat::Human {
            self.print_json(&json!({ "type": "item", "item": view }));
            return;
        }

        let mut table = styled_table(vec!["Field", "Value"]);
        let record = &view.record;
        table.add_row(vec!["ID", record.id.as_str()]);
        table.add_row(vec!["Name", record.name.as_str()]);
        table.add_row(vec!["Type".to_string(), format!("{:?}", record.item_type)]);
        table.add_row(vec!["Source", record.source.as_str()]);
        if !record.subtitle.is_empty() {
            table.add_row(vec!["Subtitle", record.subtitle.as_str()]);
        }
        if !record.synopsis.is_empty() {
            table.add_row(vec!["Synopsis", record.synopsis.as_str()]);
        }
        if let Some(channel) = &record.channel_number {
            table.add_row(vec!["Channel", channel.as_str()]);
        }
        if let Some(history) = &view.history {
            table.add_row(vec!["Progress".to_string(), format_progress(history)]);
        }
        table.add_row(vec!["On watchlist", if view.is_on_watchlist { "yes" } else { "no" }]);
        println!("{}", table);
    }

    pub fn history(&self, records: &[HistoryRecord]) {
        if self.quiet {
            return;
        }

        if self.format != OutputFormat::Human {
            self.print_json(&json!({ "type": "history", "records": records }));
            return;
        }

        if records.is_empty() {
            println!("{}", "No watch history".dimmed());
            return;
        }

        let mut table = styled_table(vec!["ID", "Progress", "Last watched"]);
        for record in records {
            table.add_row(vec![
                record.id().to_string(),
                format_progress(record),
                record.last_watched().format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }
        println!("{}", table);
    }

    /// What continuous playback decided after a stream ended.
    pub fn next_up(&self, next: Option<&ItemRecord>) {
        if self.quiet {
            return;
        }

        match (self.format, next) {
            (OutputFormat::Human, Some(record)) => {
                println!("{} {} ({})", "▶".green(), record.name.bold(), record.id);
            }
            (OutputFormat::Human, None) => println!("{}", "exit".yellow()),
            (_, Some(record)) => self.print_json(&json!({ "type": "next", "action": "play", "item": record })),
            (_, None) => self.print_json(&json!({ "type": "next", "action": "exit" })),
        }
    }

    pub fn table(&self, table: &Table) {
        if !self.quiet {
            println!("{}", table);
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet {
            return;
        }
        self.print_json(data);
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            OutputFormat::Human => println!("{}", data),
        }
    }
}

pub fn styled_table<T: Into<Cell>>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table.set_header(
        header
            .into_iter()
            .map(|h| {
                let cell: Cell = h.into();
                cell.add_attribute(Attribute::Bold)
            })
            .collect::<Vec<_>>(),
    );
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn format_progress(history: &HistoryRecord) -> String {
    if history.is_finished() {
        return "finished".to_string();
    }
    format!(
        "{} / {} ({:.0}%)",
        format_seconds(history.last_position()),
        format_seconds(history.duration()),
        history.progress() * 100.0
    )
}

fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(59.4), "0:59");
        assert_eq!(format_seconds(600.0), "10:00");
        assert_eq!(format_seconds(5400.0), "1:30:00");
        assert_eq!(format_seconds(-3.0), "0:00");
    }

    #[test]
    fn test_progress_text() {
        let now = chrono::Utc::now();
        assert_eq!(format_progress(&HistoryRecord::new("a", 290.0, 300.0, now)), "finished");
        assert_eq!(format_progress(&HistoryRecord::new("b", 150.0, 300.0, now)), "2:30 / 5:00 (50%)");
    }
}
