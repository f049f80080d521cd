use crate::catalog::ImageCatalog;
use crate::config::Config;
use crate::events::InventoryEvent;
use crate::expiry;
use crate::models::{Item, NewItem, SortOrder, StorageGroups, ViewMode};
use crate::notify::{NotificationScheduler, NotificationService};
use crate::snapshot::SnapshotCodec;
use crate::Result;
use chrono::{DateTime, Local, Utc};
use freshnyam_store::KeyValueStore;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ITEMS_KEY: &str = "items";
pub const CATEGORIES_KEY: &str = "categories";
pub const VIEW_MODE_KEY: &str = "viewMode";

const EVENT_CAPACITY: usize = 64;

/// Categories a fresh install starts with
pub fn default_categories() -> Vec<String> {
    ["Fruit", "Vegetable", "Dairy", "Meat", "Seafood", "Beverage", "Other"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Handle for sharing one manager between tasks. The mutex makes each
/// read-modify-persist-schedule sequence atomic.
pub type SharedItemManager = Arc<Mutex<ItemManager>>;

/// What an import did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub replaced: usize,
}

/// Owner of the item collection and everything hanging off it
///
/// Every mutation updates memory, writes the affected key to the store,
/// then brings reminders in line. Store and notification failures are
/// logged and never undo the in-memory change.
pub struct ItemManager {
    items: Vec<Item>,
    categories: Vec<String>,
    view_mode: ViewMode,
    catalog: ImageCatalog,
    store: Box<dyn KeyValueStore>,
    scheduler: NotificationScheduler,
    soon_threshold_days: i64,
    events: broadcast::Sender<InventoryEvent>,
}

impl ItemManager {
    /// Build a manager from whatever the store holds
    ///
    /// Missing or undecodable keys fall back to defaults, so a cold start
    /// and a corrupted store both come up clean.
    pub fn new<S>(store: S, notifier: Arc<dyn NotificationService>, config: &Config) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let store: Box<dyn KeyValueStore> = Box::new(store);

        let items: Vec<Item> = load_json(store.as_ref(), ITEMS_KEY).unwrap_or_default();
        let categories: Vec<String> =
            load_json(store.as_ref(), CATEGORIES_KEY).unwrap_or_else(default_categories);
        let view_mode = load_view_mode(store.as_ref());

        info!(
            "Loaded {} items, {} categories, {} view",
            items.len(),
            categories.len(),
            view_mode
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            items,
            categories,
            view_mode,
            catalog: ImageCatalog::builtin(),
            store,
            scheduler: NotificationScheduler::new(notifier, &config.notifications),
            soon_threshold_days: config.expiry.soon_threshold_days,
            events,
        }
    }

    pub fn into_shared(self) -> SharedItemManager {
        Arc::new(Mutex::new(self))
    }

    /// Receive an event for every mutation from now on
    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.events.subscribe()
    }

    // ---- items -------------------------------------------------------

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Add a new item and schedule its reminder
    ///
    /// No validation: empty names and unknown categories are accepted.
    pub async fn add_item(&mut self, new_item: NewItem) -> Item {
        let item = new_item.into_item(Uuid::new_v4(), Utc::now());

        self.items.push(item.clone());
        self.save_items();
        self.scheduler.schedule(&item).await;

        info!("Added {} ({})", item.name, item.id);
        self.emit(InventoryEvent::ItemAdded(item.clone()));
        item
    }

    /// Replace the stored item with the same id
    ///
    /// Unknown ids are ignored and return `false`. The reminder is
    /// rescheduled even if the expiry date did not change.
    pub async fn update_item(&mut self, item: Item) -> bool {
        let Some(slot) = self.items.iter_mut().find(|i| i.id == item.id) else {
            debug!("Ignoring update for unknown item {}", item.id);
            return false;
        };

        *slot = item.clone();
        self.save_items();
        self.scheduler.reschedule(&item).await;

        info!("Updated {} ({})", item.name, item.id);
        self.emit(InventoryEvent::ItemUpdated(item));
        true
    }

    pub async fn delete_item(&mut self, id: Uuid) -> Option<Item> {
        self.delete_items(&[id]).await.pop()
    }

    /// Remove every item whose id is listed and cancel their reminders
    ///
    /// Returns the removed items. Unknown ids are skipped.
    pub async fn delete_items(&mut self, ids: &[Uuid]) -> Vec<Item> {
        let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| ids.contains(&item.id));
        self.items = kept;

        if removed.is_empty() {
            debug!("Nothing to delete for {} id(s)", ids.len());
            return removed;
        }

        self.save_items();
        for item in &removed {
            self.scheduler.cancel(item.id).await;
        }

        info!("Deleted {} item(s)", removed.len());
        self.emit(InventoryEvent::ItemsDeleted(
            removed.iter().map(|i| i.id).collect(),
        ));
        removed
    }

    /// Items partitioned by storage location
    pub fn grouped_by_storage(&self) -> StorageGroups {
        StorageGroups::from_items(&self.items)
    }

    /// Stable ascending sort; equal keys keep collection order
    pub fn sorted_items(&self, order: SortOrder) -> Vec<Item> {
        let mut items = self.items.clone();
        match order {
            SortOrder::Name => items.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::ExpiryDate => items.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date)),
            SortOrder::Category => items.sort_by(|a, b| a.category.cmp(&b.category)),
        }
        items
    }

    /// Case-sensitive substring match on the name, empty query matches all
    pub fn search_items(&self, query: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| query.is_empty() || item.name.contains(query))
            .collect()
    }

    pub fn items_in_category(&self, category: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Items within `days` of expiry (already expired included), soonest first
    pub fn expiring_within(&self, days: i64, now: DateTime<Utc>) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| expiry::is_expiring_soon(item.expiry_date, now, days))
            .collect();
        items.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date));
        items
    }

    /// `expiring_within` using the configured threshold
    pub fn expiring_soon(&self, now: DateTime<Utc>) -> Vec<&Item> {
        self.expiring_within(self.soon_threshold_days, now)
    }

    // ---- categories --------------------------------------------------

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Append a category. Duplicates are allowed.
    pub fn add_category(&mut self, name: impl Into<String>) {
        self.categories.push(name.into());
        self.categories_changed();
    }

    pub fn delete_category(&mut self, index: usize) -> Option<String> {
        if index >= self.categories.len() {
            debug!("No category at index {}", index);
            return None;
        }
        let removed = self.categories.remove(index);
        self.categories_changed();
        Some(removed)
    }

    /// Remove the categories at the given indices. Items keep whatever
    /// category string they had.
    pub fn delete_categories(&mut self, indices: &[usize]) -> usize {
        let before = self.categories.len();
        let mut index = 0;
        self.categories.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });

        let removed = before - self.categories.len();
        if removed > 0 {
            self.categories_changed();
        }
        removed
    }

    /// Rename the first category equal to `old`. Items are not touched.
    pub fn update_category(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.categories.iter_mut().find(|c| c.as_str() == old) {
            Some(slot) => {
                *slot = new.into();
                self.categories_changed();
                true
            }
            None => {
                debug!("No category named {}", old);
                false
            }
        }
    }

    /// Move the categories at `from` so they form a block starting at
    /// index `to` of the reordered list
    ///
    /// Moved entries keep their relative order, and so does everything
    /// else. `to` past the end appends. Out-of-range indices are ignored.
    pub fn move_category(&mut self, from: &[usize], to: usize) {
        let mut moving = Vec::new();
        let mut rest = Vec::with_capacity(self.categories.len());
        for (index, category) in std::mem::take(&mut self.categories).into_iter().enumerate() {
            if from.contains(&index) {
                moving.push(category);
            } else {
                rest.push(category);
            }
        }

        if moving.is_empty() {
            self.categories = rest;
            return;
        }

        let at = to.min(rest.len());
        rest.splice(at..at, moving);
        self.categories = rest;
        self.categories_changed();
    }

    fn categories_changed(&self) {
        self.persist(CATEGORIES_KEY, &self.categories);
        self.emit(InventoryEvent::CategoriesChanged(self.categories.clone()));
    }

    // ---- view mode ---------------------------------------------------

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        if let Err(e) = self.store.set(VIEW_MODE_KEY, mode.as_str().as_bytes()) {
            warn!("Failed to save view mode: {}", e);
        }
        self.emit(InventoryEvent::ViewModeChanged(mode));
    }

    // ---- catalog -----------------------------------------------------

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    // ---- import / export ---------------------------------------------

    pub fn export_snapshot(&self) -> Result<Vec<u8>> {
        SnapshotCodec::export_snapshot(&self.items)
    }

    /// Write the collection to `target` (file, directory, or the default
    /// file name in the working directory). Returns the path written.
    pub fn export_to_file(&self, target: Option<&Path>) -> Result<PathBuf> {
        let path = SnapshotCodec::resolve_export_path(target, Local::now());
        SnapshotCodec::write_file(&self.items, &path)?;
        info!("Exported {} items to {:?}", self.items.len(), path);
        Ok(path)
    }

    /// Replace the whole collection with a snapshot
    ///
    /// Decode failures leave memory and store untouched. On success every
    /// previously known id is cancelled and every imported item gets a
    /// fresh reminder.
    pub async fn import_snapshot(&mut self, bytes: &[u8]) -> Result<ImportSummary> {
        let imported = SnapshotCodec::import_snapshot(bytes)?;
        let previous = std::mem::replace(&mut self.items, imported);
        self.save_items();

        for item in &previous {
            self.scheduler.cancel(item.id).await;
        }
        for item in &self.items {
            self.scheduler.schedule(item).await;
        }

        let summary = ImportSummary {
            imported: self.items.len(),
            replaced: previous.len(),
        };
        info!(
            "Imported {} items, replaced {}",
            summary.imported, summary.replaced
        );
        self.emit(InventoryEvent::SnapshotImported {
            imported: summary.imported,
            replaced: summary.replaced,
        });
        Ok(summary)
    }

    pub async fn import_from_reader<R: Read>(&mut self, mut reader: R) -> Result<ImportSummary> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.import_snapshot(&bytes).await
    }

    pub async fn import_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary> {
        let bytes = std::fs::read(path.as_ref())?;
        self.import_snapshot(&bytes).await
    }

    // ---- persistence -------------------------------------------------

    fn save_items(&self) {
        self.persist(ITEMS_KEY, &self.items);
    }

    /// Write `value` under `key`, logging instead of failing
    fn persist<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.save_json(key, value) {
            warn!("Failed to save {}: {}", key, e);
        }
    }

    fn save_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)?;
        Ok(())
    }

    fn emit(&self, event: InventoryEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored {} is unreadable, using defaults: {}", key, e);
                None
            }
        },
        Ok(None) => {
            debug!("Nothing stored under {}", key);
            None
        }
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}

fn load_view_mode(store: &dyn KeyValueStore) -> ViewMode {
    match store.get(VIEW_MODE_KEY) {
        Ok(Some(bytes)) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(ViewMode::from_str_opt)
            .unwrap_or_else(|| {
                warn!("Stored view mode is unreadable, using default");
                ViewMode::default()
            }),
        Ok(None) => ViewMode::default(),
        Err(e) => {
            warn!("Failed to read view mode: {}", e);
            ViewMode::default()
        }
    }
}
