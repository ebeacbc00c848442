use acara_core::cache::EventCache;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::render_instant;
use crate::utils::tui;

pub async fn run(cache: &EventCache, force: bool) -> Result<()> {
    let spinner = tui::spinner("Syncing events");
    let outcome = cache.fetch_events(force).await;
    spinner.finish_and_clear();

    let outcome = outcome?;

    let origin = if outcome.from_cache {
        "from cache".dimmed().to_string()
    } else {
        "synced from webhook".green().to_string()
    };
    println!("{} event(s) {}", outcome.events.len(), origin);

    if let Some(last_sync) = outcome.last_sync {
        println!("Last sync: {}", render_instant(last_sync));
    }
    if outcome.next_sync_in > 0 {
        println!("Next sync in {} minute(s)", outcome.next_sync_in);
    }

    Ok(())
}
