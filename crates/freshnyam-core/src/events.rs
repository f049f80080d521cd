use crate::models::{Item, ViewMode};
use uuid::Uuid;

/// Change notifications published by `ItemManager`
///
/// Front-ends subscribe instead of watching fields. Every event is sent
/// after the in-memory state changed and the store write was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemAdded(Item),
    ItemUpdated(Item),
    ItemsDeleted(Vec<Uuid>),
    CategoriesChanged(Vec<String>),
    ViewModeChanged(ViewMode),
    SnapshotImported { imported: usize, replaced: usize },
}

impl InventoryEvent {
    pub fn description(&self) -> String {
        match self {
            InventoryEvent::ItemAdded(item) => format!("Added {}", item.name),
            InventoryEvent::ItemUpdated(item) => format!("Updated {}", item.name),
            InventoryEvent::ItemsDeleted(ids) => format!("Deleted {} item(s)", ids.len()),
            InventoryEvent::CategoriesChanged(categories) => {
                format!("{} categories", categories.len())
            }
            InventoryEvent::ViewModeChanged(mode) => format!("View mode set to {}", mode),
            InventoryEvent::SnapshotImported { imported, replaced } => {
                format!("Imported {} items, replaced {}", imported, replaced)
            }
        }
    }
}
