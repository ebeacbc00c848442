use std::sync::Arc;

use acara_core::storage::Storage;
use acara_core::store::EventStore;
use anyhow::Result;

use crate::render::render_detail;

pub fn run(storage: Arc<dyn Storage>, id: &str) -> Result<()> {
    let mut store = EventStore::new(storage);

    let Some(event) = store.events().iter().find(|e| e.id == id).cloned() else {
        anyhow::bail!("Event {id} not found in the local cache. Try `acara sync` first.");
    };

    store.open_detail(event);
    if let Some(selected) = store.selected() {
        println!("{}", render_detail(selected));
    }

    Ok(())
}
