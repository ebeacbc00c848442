use std::sync::Arc;
use std::time::Duration;

use acara_core::auth::AuthService;
use acara_core::cache::EventCache;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::render_instant;

pub async fn run(cache: &EventCache, auth: &Arc<AuthService>, watch: bool) -> Result<()> {
    print_status(cache, auth);

    if !watch {
        return Ok(());
    }

    // The watcher clears the session in the background once it lapses; the
    // loop here only re-reads and re-renders.
    let _watcher = auth.spawn_expiry_watcher();
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    interval.tick().await;
    loop {
        interval.tick().await;
        println!();
        print_status(cache, auth);
    }
}

fn print_status(cache: &EventCache, auth: &AuthService) {
    if auth.is_authenticated() {
        let expiry = auth
            .session_expiry()
            .map(render_instant)
            .unwrap_or_default();
        println!(
            "Session: {} (expires {}, {} minute(s) left)",
            "active".green(),
            expiry,
            auth.session_minutes_remaining()
        );
    } else if auth.otp_sent() {
        println!("Session: {} (OTP pending)", "logged out".yellow());
    } else {
        println!("Session: {}", "logged out".dimmed());
    }

    let events = cache.load_cached();
    match cache.last_sync_millis() {
        Some(last_sync) => {
            let freshness = if cache.is_cache_valid() {
                format!(
                    "fresh, next sync in {} minute(s)",
                    cache.minutes_until_next_sync()
                )
                .green()
                .to_string()
            } else {
                "stale".yellow().to_string()
            };
            println!(
                "Cache:   {} event(s), last sync {} ({})",
                events.len(),
                render_instant(last_sync),
                freshness
            );
        }
        None => println!("Cache:   {} event(s), never synced", events.len()),
    }
}
