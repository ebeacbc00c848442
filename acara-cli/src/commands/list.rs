use std::sync::Arc;

use acara_core::storage::Storage;
use acara_core::store::{EventStore, SortOrder};
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(
    storage: Arc<dyn Storage>,
    search: Option<String>,
    sort: SortOrder,
    page: usize,
) -> Result<()> {
    let mut store = EventStore::new(storage);
    if let Some(query) = search {
        store.set_search_query(query);
    }
    store.set_sort_order(sort);
    store.set_page(page);

    let total_pages = store.total_pages();
    if total_pages == 0 {
        if store.search_query().is_empty() {
            println!("No events cached. Run `acara sync` first.");
        } else {
            println!("No events match \"{}\".", store.search_query());
        }
        return Ok(());
    }

    for event in store.paginated() {
        println!("{}", event.render());
    }

    println!(
        "{}",
        format!("Page {} of {}", store.current_page(), total_pages).dimmed()
    );

    Ok(())
}
