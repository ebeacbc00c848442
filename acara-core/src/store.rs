//! In-memory event collection with derived list views.
//!
//! The store owns the collection consumers render from: search, sort, and
//! pagination are computed views over it, and selection/modal flags live
//! here so presentational code stays stateless. Every mutation mirrors the
//! collection back to storage; storage is only read once, at construction.

use std::sync::Arc;

use crate::event::Event;
use crate::storage::{self, Storage, keys};

/// Events shown per page.
pub const PAGE_SIZE: usize = 10;

/// Ordering over the composite date-time key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

pub struct EventStore {
    storage: Arc<dyn Storage>,
    events: Vec<Event>,
    search_query: String,
    sort_order: SortOrder,
    current_page: usize,
    selected: Option<Event>,
    detail_open: bool,
    edit_mode: bool,
    form_open: bool,
    loading: bool,
    error: Option<String>,
}

impl EventStore {
    /// Build a store seeded from the persisted collection.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let events = storage::read_json(storage.as_ref(), keys::EVENTS).unwrap_or_default();
        Self {
            storage,
            events,
            search_query: String::new(),
            sort_order: SortOrder::default(),
            current_page: 1,
            selected: None,
            detail_open: false,
            edit_mode: false,
            form_open: false,
            loading: false,
            error: None,
        }
    }

    fn persist(&self) {
        storage::write_json(self.storage.as_ref(), keys::EVENTS, &self.events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // --- Mutations (each mirrors the collection to storage) ---

    /// Prepend a locally created event. No network call.
    pub fn add_local(&mut self, event: Event) {
        self.events.insert(0, event);
        self.persist();
    }

    /// Replace the whole collection after a sync.
    pub fn replace_all(&mut self, events: Vec<Event>) {
        self.events = events;
        self.persist();
    }

    /// Replace an event by id. Reserved: no remote endpoint routes here.
    pub fn update_local(&mut self, updated: Event) {
        for event in &mut self.events {
            if event.id == updated.id {
                *event = updated.clone();
            }
        }
        self.persist();
    }

    /// Drop an event by id. Reserved: no remote endpoint routes here.
    pub fn remove_local(&mut self, event_id: &str) {
        self.events.retain(|e| e.id != event_id);
        self.persist();
    }

    // --- Query / sort / pagination ---

    /// Set the search query. Resets pagination to the first page.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.current_page = 1;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// The collection filtered by the search query and sorted by the
    /// composite date-time key. Ties keep their original relative order.
    pub fn filtered(&self) -> Vec<Event> {
        let mut filtered: Vec<Event> = if self.search_query.trim().is_empty() {
            self.events.clone()
        } else {
            let query = self.search_query.to_lowercase();
            self.events
                .iter()
                .filter(|e| {
                    e.nama_acara.to_lowercase().contains(&query)
                        || e.lokasi.to_lowercase().contains(&query)
                        || e.id.contains(&query)
                })
                .cloned()
                .collect()
        };

        match self.sort_order {
            SortOrder::Ascending => filtered.sort_by(|a, b| a.sort_key().cmp(&b.sort_key())),
            SortOrder::Descending => filtered.sort_by(|a, b| b.sort_key().cmp(&a.sort_key())),
        }

        filtered
    }

    /// The current page of [`filtered`](Self::filtered).
    pub fn paginated(&self) -> Vec<Event> {
        let start = (self.current_page - 1) * PAGE_SIZE;
        self.filtered().into_iter().skip(start).take(PAGE_SIZE).collect()
    }

    /// Number of pages; 0 when the filtered collection is empty.
    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(PAGE_SIZE)
    }

    // --- Selection / modal state ---

    pub fn open_detail(&mut self, event: Event) {
        self.selected = Some(event);
        self.edit_mode = false;
        self.detail_open = true;
    }

    pub fn open_edit(&mut self, event: Event) {
        self.selected = Some(event);
        self.edit_mode = true;
        self.detail_open = true;
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
        self.edit_mode = false;
        self.detail_open = false;
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
    }

    pub fn selected(&self) -> Option<&Event> {
        self.selected.as_ref()
    }

    pub fn is_detail_open(&self) -> bool {
        self.detail_open
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    // --- Transient request state ---

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
