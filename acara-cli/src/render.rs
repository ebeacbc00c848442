//! Terminal rendering for core types.
//!
//! Extension traits that add colored terminal output to acara-core types
//! using owo_colors; the core stays presentation-free.

use acara_core::{Dresscode, Event};
use chrono::{Local, TimeZone};
use owo_colors::OwoColorize;

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Dresscode {
    fn render(&self) -> String {
        match self {
            Dresscode::Formal => self.label().blue().to_string(),
            Dresscode::SemiFormal => self.label().magenta().to_string(),
            Dresscode::Casual => self.label().green().to_string(),
            Dresscode::Tradisional => self.label().yellow().to_string(),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let waktu = if self.waktu.is_empty() {
            "--:--"
        } else {
            self.waktu.as_str()
        };

        let mut line = format!(
            "{}  {} {}  {}",
            self.id.dimmed(),
            self.tanggal,
            waktu,
            self.nama_acara.bold(),
        );
        if !self.lokasi.is_empty() {
            line.push_str(&format!("  @ {}", self.lokasi));
        }
        if let Some(dresscode) = self.dresscode {
            line.push_str(&format!("  [{}]", dresscode.render()));
        }
        line
    }
}

/// Multi-line detail view for a single event.
pub fn render_detail(event: &Event) -> String {
    let mut lines = vec![
        event.nama_acara.bold().to_string(),
        format!("  Id:        {}", event.id),
        format!("  Date:      {} {}", event.tanggal, event.waktu),
        format!("  Location:  {}", event.lokasi),
    ];
    if let Some(dresscode) = event.dresscode {
        lines.push(format!("  Dresscode: {}", dresscode.render()));
    }
    if !event.note.is_empty() {
        lines.push(format!("  Note:      {}", event.note));
    }
    if let Some(row) = event.row_number {
        lines.push(format!("  Row:       {row}").dimmed().to_string());
    }
    lines.join("\n")
}

/// Format an epoch-millis instant for display, in local time.
pub fn render_instant(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%d %b %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
