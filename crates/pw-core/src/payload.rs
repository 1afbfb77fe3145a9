use std::collections::{HashMap, HashSet};

use pw_script::Value;

use crate::id::PropertyId;
use crate::model::Tile;

/// The mutable data an event carries.
///
/// Entries are only ever added or overwritten, never dropped by a merge.
/// Stamps record which properties have already handled the event and are
/// keyed by property identity.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    data: HashMap<String, Value>,
    location: Option<Tile>,
    stamps: HashSet<PropertyId>,
}

impl Payload {
    /// An empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// A payload seeded with entries.
    pub fn with_data(data: HashMap<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Set the location.
    pub fn with_location(mut self, tile: Tile) -> Self {
        self.location = Some(tile);
        self
    }

    /// Insert or overwrite one entry.
    pub fn patch(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Insert or overwrite several entries. Keys not in `entries` are kept.
    pub fn patch_all(&mut self, entries: impl IntoIterator<Item = (String, Value)>) {
        self.data.extend(entries);
    }

    /// Return `true` if `key` has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// The entry for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Where the event happens, if anywhere.
    #[doc(alias = "where")]
    pub fn location(&self) -> Option<&Tile> {
        self.location.as_ref()
    }

    /// Replace the location.
    pub fn set_location(&mut self, tile: Option<Tile>) {
        self.location = tile;
    }

    /// Column of the location.
    pub fn x(&self) -> Option<i32> {
        self.location.as_ref().map(|t| t.position().x)
    }

    /// Row of the location.
    pub fn y(&self) -> Option<i32> {
        self.location.as_ref().map(|t| t.position().y)
    }

    /// Mark the payload as handled by `property`.
    pub fn stamp(&mut self, property: PropertyId) {
        self.stamps.insert(property);
    }

    /// Remove the mark left by `property`.
    pub fn unstamp(&mut self, property: PropertyId) {
        self.stamps.remove(&property);
    }

    /// Return `true` if `property` has stamped the payload.
    pub fn stamp_exists(&self, property: PropertyId) -> bool {
        self.stamps.contains(&property)
    }

    /// A copy of the entries. Location and stamps are not included.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.data.clone()
    }
}
