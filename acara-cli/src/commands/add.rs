use std::sync::Arc;

use acara_core::auth::AuthService;
use acara_core::cache::EventCache;
use acara_core::event::{self, Dresscode, Event};
use acara_core::storage::Storage;
use acara_core::store::EventStore;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

use crate::utils::tui;

#[derive(clap::Args)]
pub struct AddArgs {
    /// Event title
    #[arg(long)]
    pub title: Option<String>,

    /// Date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,

    /// Time, HH:mm
    #[arg(long)]
    pub time: Option<String>,

    /// Address
    #[arg(long)]
    pub location: Option<String>,

    /// Formal, Semi-Formal, Casual, or Tradisional
    #[arg(long)]
    pub dresscode: Option<String>,

    /// Free-text note
    #[arg(long)]
    pub note: Option<String>,
}

pub async fn run(
    cache: &EventCache,
    auth: &AuthService,
    storage: Arc<dyn Storage>,
    args: AddArgs,
) -> Result<()> {
    if !auth.is_authenticated() {
        anyhow::bail!("Not logged in. Run `acara login` first.");
    }

    let interactive = args.title.is_none() || args.date.is_none() || args.time.is_none();

    // --- Title ---
    let title = match args.title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        Some(_) => anyhow::bail!("Title must not be empty"),
        None => prompt_nonempty("  Title")?,
    };

    // --- Date & time ---
    let (tanggal, waktu) = match (&args.date, &args.time) {
        (Some(date), Some(time)) => {
            let tanggal = parse_date(date)?;
            let waktu = parse_time(time)?;
            if !event::is_upcoming(&tanggal, &waktu, Local::now().naive_local()) {
                anyhow::bail!("Event date/time must not be in the past");
            }
            (tanggal, waktu)
        }
        (date, time) => loop {
            let tanggal = match date {
                Some(d) => parse_date(d)?,
                None => prompt_with_retry("  Date (YYYY-MM-DD)", parse_date)?,
            };
            let waktu = match time {
                Some(t) => parse_time(t)?,
                None => prompt_with_retry("  Time (HH:mm)", parse_time)?,
            };
            if event::is_upcoming(&tanggal, &waktu, Local::now().naive_local()) {
                break (tanggal, waktu);
            }
            eprintln!("  {}", "That date/time is already past".red());
        },
    };

    // --- Location ---
    let lokasi = match args.location {
        Some(loc) if !loc.trim().is_empty() => loc.trim().to_string(),
        Some(_) => anyhow::bail!("Location must not be empty"),
        None if interactive => prompt_nonempty("  Where?")?,
        None => anyhow::bail!("Location must not be empty"),
    };

    // --- Dresscode ---
    let dresscode = match args.dresscode {
        Some(label) if label.is_empty() => None,
        Some(label) => match Dresscode::parse(&label) {
            Some(code) => Some(code),
            None => anyhow::bail!(
                "Unknown dresscode \"{label}\". Options: Formal, Semi-Formal, Casual, Tradisional"
            ),
        },
        None if interactive => prompt_dresscode()?,
        None => None,
    };

    // --- Note ---
    let note = match args.note {
        Some(n) => n,
        None if interactive => Input::new()
            .with_prompt("  Note (skip)")
            .default(String::new())
            .show_default(false)
            .interact_text()?,
        None => String::new(),
    };

    let event = Event::new(title, tanggal, waktu, lokasi, dresscode, note);

    // Seed the store before the submit so its mirror write below matches
    // what the cache persisted.
    let mut store = EventStore::new(storage);

    let spinner = tui::spinner("Submitting event");
    let result = cache.submit_event(&event).await;
    spinner.finish_and_clear();
    result.context("Could not submit the event")?;

    store.add_local(event.clone());

    if interactive {
        println!();
    }
    println!(
        "{}",
        format!("  Created: {} ({})", event.nama_acara, event.id).green()
    );

    Ok(())
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry<F>(prompt: &str, parse: F) -> Result<String>
where
    F: Fn(&str) -> Result<String>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Prompt until the user enters something non-blank.
fn prompt_nonempty(prompt: &str) -> Result<String> {
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        eprintln!("  {}", "This field is required".red());
    }
}

fn prompt_dresscode() -> Result<Option<Dresscode>> {
    let mut items = vec!["(none)"];
    items.extend(Dresscode::ALL.iter().map(|d| d.label()));

    let selection = Select::new()
        .with_prompt("  Dresscode")
        .items(&items)
        .default(0)
        .interact()?;

    Ok((selection > 0).then(|| Dresscode::ALL[selection - 1]))
}

fn parse_date(input: &str) -> Result<String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| anyhow::anyhow!("Could not parse date: \"{input}\" (expected YYYY-MM-DD)"))
}

fn parse_time(input: &str) -> Result<String> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| anyhow::anyhow!("Could not parse time: \"{input}\" (expected HH:mm)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- parse_date / parse_time ---

    #[test]
    fn parse_date_normalizes_valid_input() {
        assert_eq!(parse_date("2026-05-01").unwrap(), "2026-05-01");
        assert_eq!(parse_date(" 2026-05-01 ").unwrap(), "2026-05-01");
    }

    #[test]
    fn parse_date_rejects_other_layouts() {
        assert!(parse_date("01-05-2026").is_err());
        assert!(parse_date("2026/05/01").is_err());
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn parse_time_normalizes_valid_input() {
        assert_eq!(parse_time("09:30").unwrap(), "09:30");
        assert_eq!(parse_time("23:59").unwrap(), "23:59");
    }

    #[test]
    fn parse_time_rejects_other_layouts() {
        assert!(parse_time("9.30").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
    }
}
