use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A perishable thing sitting somewhere in the house
///
/// Field order here is the field order of exported snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    /// Should name a known category, but nothing enforces it
    pub category: String,
    pub storage: StorageLocation,
    pub expiry_date: DateTime<Utc>,
    pub added_date: DateTime<Utc>,
    /// Icon from the image catalog, empty means no icon
    pub image_name: String,
}

/// Caller-supplied fields for a new item; the manager fills in the rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub storage: StorageLocation,
    pub expiry_date: DateTime<Utc>,
    pub image_name: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        storage: StorageLocation,
        expiry_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            storage,
            expiry_date,
            image_name: String::new(),
        }
    }

    pub fn with_image(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = image_name.into();
        self
    }

    pub(crate) fn into_item(self, id: Uuid, added_date: DateTime<Utc>) -> Item {
        Item {
            id,
            name: self.name,
            category: self.category,
            storage: self.storage,
            expiry_date: self.expiry_date,
            added_date,
            image_name: self.image_name,
        }
    }
}

/// Where an item is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageLocation {
    Fridge,
    Freezer,
    RoomTemp,
}

impl StorageLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocation::Fridge => "fridge",
            StorageLocation::Freezer => "freezer",
            StorageLocation::RoomTemp => "roomTemp",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fridge" => Some(StorageLocation::Fridge),
            "freezer" => Some(StorageLocation::Freezer),
            "roomtemp" | "room-temp" | "room_temp" => Some(StorageLocation::RoomTemp),
            _ => None,
        }
    }

    pub fn all() -> Vec<StorageLocation> {
        vec![
            StorageLocation::Fridge,
            StorageLocation::Freezer,
            StorageLocation::RoomTemp,
        ]
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageLocation::Fridge => write!(f, "Fridge"),
            StorageLocation::Freezer => write!(f, "Freezer"),
            StorageLocation::RoomTemp => write!(f, "Room temperature"),
        }
    }
}

/// How the item list is laid out. Persisted as its raw string value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort keys for `ItemManager::sorted_items`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Name,
    #[default]
    ExpiryDate,
    Category,
}

impl SortOrder {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(SortOrder::Name),
            "expiry" | "expirydate" | "expiry-date" => Some(SortOrder::ExpiryDate),
            "category" => Some(SortOrder::Category),
            _ => None,
        }
    }
}

/// Items partitioned by storage location
///
/// Absent locations read as an empty slice. Order inside a group follows
/// the collection order but callers should not rely on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageGroups {
    groups: BTreeMap<StorageLocation, Vec<Item>>,
}

impl StorageGroups {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut groups: BTreeMap<StorageLocation, Vec<Item>> = BTreeMap::new();
        for item in items {
            groups.entry(item.storage).or_default().push(item.clone());
        }
        Self { groups }
    }

    pub fn get(&self, location: StorageLocation) -> &[Item] {
        self.groups
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, location: StorageLocation) -> bool {
        self.groups.contains_key(&location)
    }

    /// Non-empty groups in `StorageLocation` order
    pub fn iter(&self) -> impl Iterator<Item = (StorageLocation, &[Item])> {
        self.groups.iter().map(|(loc, items)| (*loc, items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
