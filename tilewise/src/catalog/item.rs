//! Catalog item model.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A downloadable file attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            media_type: None,
            title: None,
            roles: Vec::new(),
        }
    }
}

/// One scene in a catalog.
///
/// Properties are kept as free-form JSON; the accessors cover the keys the
/// pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: None,
            bbox: None,
            geometry: None,
            properties: Map::new(),
            assets: BTreeMap::new(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_asset(mut self, key: impl Into<String>, asset: Asset) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// String property; numbers are rendered without quotes.
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Acquisition time from the `datetime` property.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let raw = self.properties.get("datetime")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// EPSG code from the `proj:epsg` property.
    pub fn epsg(&self) -> Option<i64> {
        self.properties.get("proj:epsg")?.as_i64()
    }
}

/// Ordered, id-unique list of items.
///
/// The first item seen with a given id wins; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCollection {
    items: Vec<CatalogItem>,
    ids: HashSet<String>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item unless its id is already present. Returns true if
    /// the item was added.
    pub fn push(&mut self, item: CatalogItem) -> bool {
        if self.ids.contains(&item.id) {
            return false;
        }
        self.ids.insert(item.id.clone());
        self.items.push(item);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Item ids in order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    /// Keeps only the items for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&CatalogItem) -> bool) {
        let ids = &mut self.ids;
        self.items.retain(|item| {
            let kept = keep(item);
            if !kept {
                ids.remove(&item.id);
            }
            kept
        });
    }

    /// Mutable access to every item. Ids must not be changed through it.
    pub(crate) fn items_mut(&mut self) -> std::slice::IterMut<'_, CatalogItem> {
        self.items.iter_mut()
    }

    pub fn into_items(self) -> Vec<CatalogItem> {
        self.items
    }
}

impl FromIterator<CatalogItem> for ItemCollection {
    fn from_iter<I: IntoIterator<Item = CatalogItem>>(iter: I) -> Self {
        let mut collection = ItemCollection::new();
        collection.extend(iter);
        collection
    }
}

impl Extend<CatalogItem> for ItemCollection {
    fn extend<I: IntoIterator<Item = CatalogItem>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl IntoIterator for ItemCollection {
    type Item = CatalogItem;
    type IntoIter = std::vec::IntoIter<CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemCollection {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_keeps_first_duplicate() {
        let mut items = ItemCollection::new();
        assert!(items.push(CatalogItem::new("a").with_property("n", 1)));
        assert!(items.push(CatalogItem::new("b")));
        assert!(!items.push(CatalogItem::new("a").with_property("n", 2)));

        assert_eq!(items.ids(), vec!["a", "b"]);
        assert_eq!(items.get("a").unwrap().property("n"), Some(&Value::from(1)));
    }

    #[test]
    fn test_retain_forgets_removed_ids() {
        let mut items: ItemCollection = ["a", "b", "c"].into_iter().map(CatalogItem::new).collect();
        items.retain(|item| item.id != "b");
        assert_eq!(items.ids(), vec!["a", "c"]);
        assert!(!items.contains("b"));
        assert!(items.push(CatalogItem::new("b")));
        assert_eq!(items.ids(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_item_deserializes_from_stac_json() {
        let json = r#"{
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": "LC08_L2SP_073072_20230101_02_T1",
            "collection": "landsat-c2-l2",
            "bbox": [178.1, -18.9, 179.9, -16.8],
            "geometry": null,
            "properties": {
                "datetime": "2023-01-01T21:50:00Z",
                "proj:epsg": 32660,
                "landsat:wrs_path": "073"
            },
            "assets": {
                "red": {"href": "https://example.com/red.tif", "type": "image/tiff", "roles": ["data"]}
            },
            "links": []
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.collection.as_deref(), Some("landsat-c2-l2"));
        assert_eq!(item.epsg(), Some(32660));
        assert_eq!(item.property_str("landsat:wrs_path").as_deref(), Some("073"));
        assert_eq!(item.datetime().unwrap().to_rfc3339(), "2023-01-01T21:50:00+00:00");
        assert_eq!(item.assets["red"].href, "https://example.com/red.tif");
        assert_eq!(item.assets["red"].media_type.as_deref(), Some("image/tiff"));
    }

    #[test]
    fn test_property_str_renders_numbers() {
        let item = CatalogItem::new("x").with_property("row", 72);
        assert_eq!(item.property_str("row").as_deref(), Some("72"));
        assert_eq!(item.property_str("missing"), None);
    }
}
