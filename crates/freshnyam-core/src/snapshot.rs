use crate::{models::Item, Error, Result};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON codec for whole-collection snapshots (export/import)
pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Serialize the collection as indented JSON
    ///
    /// An empty collection encodes as `[]`.
    pub fn export_snapshot(items: &[Item]) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec_pretty(items)?;
        debug!("Encoded {} items into {} bytes", items.len(), bytes.len());
        Ok(bytes)
    }

    /// Parse a snapshot. Either every item decodes or nothing does.
    pub fn import_snapshot(bytes: &[u8]) -> Result<Vec<Item>> {
        let items: Vec<Item> = serde_json::from_slice(bytes).map_err(Error::Decode)?;
        Self::check_unique_ids(&items)?;
        debug!("Decoded {} items from snapshot", items.len());
        Ok(items)
    }

    pub fn import_from_reader<R: Read>(mut reader: R) -> Result<Vec<Item>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::import_snapshot(&bytes)
    }

    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<Item>> {
        let file = File::open(path.as_ref())?;
        Self::import_from_reader(file)
    }

    /// Write a snapshot to `path`, creating or truncating it
    pub fn write_file<P: AsRef<Path>>(items: &[Item], path: P) -> Result<()> {
        let content = Self::export_snapshot(items)?;

        let mut file = File::create(path.as_ref())?;
        file.write_all(&content)?;

        Ok(())
    }

    /// `items_<yyyy-MM-dd_HH-mm-ss>.json`
    pub fn default_file_name(now: DateTime<Local>) -> String {
        format!("items_{}.json", now.format("%Y-%m-%d_%H-%M-%S"))
    }

    /// Where an export should go
    ///
    /// No target means the default file name in the current directory; a
    /// directory target gets the default file name inside it; anything
    /// else is used verbatim.
    pub fn resolve_export_path(target: Option<&Path>, now: DateTime<Local>) -> PathBuf {
        match target {
            Some(path) if path.is_dir() => path.join(Self::default_file_name(now)),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(Self::default_file_name(now)),
        }
    }

    fn check_unique_ids(items: &[Item]) -> Result<()> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id) {
                return Err(Error::DuplicateId(item.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewItem, StorageLocation};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn create_test_items() -> Vec<Item> {
        let added = Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap();
        vec![
            NewItem::new(
                "Tomato",
                "Vegetable",
                StorageLocation::Fridge,
                Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap(),
            )
            .with_image("tomato")
            .into_item(Uuid::new_v4(), added),
            NewItem::new(
                "Ice cream",
                "Frozen",
                StorageLocation::Freezer,
                Utc.with_ymd_and_hms(2027, 1, 5, 0, 0, 0).unwrap(),
            )
            .into_item(Uuid::new_v4(), added),
        ]
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let items = create_test_items();
        let bytes = SnapshotCodec::export_snapshot(&items).unwrap();
        let decoded = SnapshotCodec::import_snapshot(&bytes).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_export_is_indented_with_stable_field_order() {
        let items = create_test_items();
        let json = String::from_utf8(SnapshotCodec::export_snapshot(&items[..1]).unwrap()).unwrap();

        assert!(json.contains("\n  {\n    \"id\""));
        let positions: Vec<usize> = [
            "\"id\"",
            "\"name\"",
            "\"category\"",
            "\"storage\"",
            "\"expiryDate\"",
            "\"addedDate\"",
            "\"imageName\"",
        ]
        .iter()
        .map(|field| json.find(field).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_collection() {
        let bytes = SnapshotCodec::export_snapshot(&[]).unwrap();
        assert_eq!(bytes, b"[]");
        assert!(SnapshotCodec::import_snapshot(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            SnapshotCodec::import_snapshot(b"[{\"name\": "),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            SnapshotCodec::import_snapshot(b"{\"items\": []}"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_missing_field_rejects_whole_snapshot() {
        let items = create_test_items();
        let mut value: serde_json::Value =
            serde_json::from_slice(&SnapshotCodec::export_snapshot(&items).unwrap()).unwrap();
        value[1].as_object_mut().unwrap().remove("imageName");

        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            SnapshotCodec::import_snapshot(&bytes),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut items = create_test_items();
        items[1].id = items[0].id;
        let bytes = SnapshotCodec::export_snapshot(&items).unwrap();

        assert!(matches!(
            SnapshotCodec::import_snapshot(&bytes),
            Err(Error::DuplicateId(id)) if id == items[0].id
        ));
    }

    #[test]
    fn test_default_file_name() {
        let now = Local.with_ymd_and_hms(2026, 10, 16, 7, 5, 9).unwrap();
        assert_eq!(
            SnapshotCodec::default_file_name(now),
            "items_2026-10-16_07-05-09.json"
        );
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let now = Local.with_ymd_and_hms(2026, 10, 16, 7, 5, 9).unwrap();
        let path = SnapshotCodec::resolve_export_path(Some(temp_dir.path()), now);
        assert_eq!(path, temp_dir.path().join("items_2026-10-16_07-05-09.json"));

        let items = create_test_items();
        SnapshotCodec::write_file(&items, &path).unwrap();
        assert_eq!(SnapshotCodec::read_file(&path).unwrap(), items);
    }
}
