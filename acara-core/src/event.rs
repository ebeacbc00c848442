//! The event model.
//!
//! An event is what the webhook stores: a title, a date and time, a
//! location, an optional dress code and note. Records fetched from the
//! remote carry a server-side row index; locally created ones do not.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One scheduled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// 6-digit numeric identifier, assigned client-side for new events.
    pub id: String,
    /// Event title.
    pub nama_acara: String,
    /// Date in `YYYY-MM-DD` form.
    pub tanggal: String,
    /// Time in `HH:mm` (24-hour) form.
    pub waktu: String,
    /// Free-text address.
    pub lokasi: String,
    /// Dress code, if one was set.
    pub dresscode: Option<Dresscode>,
    /// Optional free-text note.
    pub note: String,
    /// Server-side row index, present only on records fetched from the remote.
    pub row_number: Option<i64>,
}

impl Event {
    /// Create a locally authored event with a freshly drawn id.
    pub fn new(
        nama_acara: String,
        tanggal: String,
        waktu: String,
        lokasi: String,
        dresscode: Option<Dresscode>,
        note: String,
    ) -> Self {
        Self {
            id: event_id(),
            nama_acara,
            tanggal,
            waktu,
            lokasi,
            dresscode,
            note,
            row_number: None,
        }
    }

    /// Composite date-time used for ordering.
    ///
    /// Combines `tanggal` and `waktu`, with `00:00` standing in for a
    /// missing time. Unparseable composites yield `None` and order before
    /// every parseable instant.
    pub fn sort_key(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(&self.tanggal, "%Y-%m-%d").ok()?;
        let waktu = if self.waktu.is_empty() {
            "00:00"
        } else {
            self.waktu.as_str()
        };
        let time = NaiveTime::parse_from_str(waktu, "%H:%M").ok()?;
        Some(date.and_time(time))
    }
}

/// Generate a random 6-digit event id.
///
/// A bare uniform draw over [100000, 999999]; uniqueness is not checked
/// against the existing collection.
pub fn event_id() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Whether a date/time pair lies at or after `now`.
///
/// Unparseable input counts as past. Used as a form-level guard before
/// submitting a new event.
pub fn is_upcoming(tanggal: &str, waktu: &str, now: NaiveDateTime) -> bool {
    let Ok(date) = NaiveDate::parse_from_str(tanggal, "%Y-%m-%d") else {
        return false;
    };
    let Ok(time) = NaiveTime::parse_from_str(waktu, "%H:%M") else {
        return false;
    };
    date.and_time(time) >= now
}

/// Closed set of dress codes an event may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dresscode {
    Formal,
    #[serde(rename = "Semi-Formal")]
    SemiFormal,
    Casual,
    Tradisional,
}

impl Dresscode {
    /// All dress codes, in the order forms present them.
    pub const ALL: [Dresscode; 4] = [
        Dresscode::Formal,
        Dresscode::SemiFormal,
        Dresscode::Casual,
        Dresscode::Tradisional,
    ];

    /// The wire/display label.
    pub fn label(&self) -> &'static str {
        match self {
            Dresscode::Formal => "Formal",
            Dresscode::SemiFormal => "Semi-Formal",
            Dresscode::Casual => "Casual",
            Dresscode::Tradisional => "Tradisional",
        }
    }

    /// Parse a wire label. Unknown or empty labels map to `None`.
    pub fn parse(label: &str) -> Option<Dresscode> {
        match label {
            "Formal" => Some(Dresscode::Formal),
            "Semi-Formal" => Some(Dresscode::SemiFormal),
            "Casual" => Some(Dresscode::Casual),
            "Tradisional" => Some(Dresscode::Tradisional),
            _ => None,
        }
    }
}

impl fmt::Display for Dresscode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
