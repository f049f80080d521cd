// Core of FreshNyam - items, categories, reminders, snapshots
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod expiry;
pub mod manager;
pub mod models;
pub mod notify;
pub mod snapshot;

pub use catalog::ImageCatalog;
pub use config::Config;
pub use error::Error;
pub use events::InventoryEvent;
pub use manager::{ImportSummary, ItemManager, SharedItemManager};
pub use models::{Item, NewItem, SortOrder, StorageGroups, StorageLocation, ViewMode};
pub use notify::{
    InMemoryNotifier, LogNotifier, NotificationRequest, NotificationScheduler,
    NotificationService,
};
pub use snapshot::SnapshotCodec;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
