//! Ordered entity cache keyed by uuid

use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::models::Identified;

/// Local copy of server entities.
///
/// Entries are only ever swapped for the authoritative value the server
/// returned; two versions of an entity are never merged field by field.
#[derive(Debug)]
pub struct EntityCache<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for EntityCache<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Identified + Clone> EntityCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the cached copy in place, or append when the entity is new
    pub fn replace(&self, entity: T) {
        let mut items = self.items.write();
        let uuid = entity.uuid();
        match items.iter_mut().find(|item| item.uuid() == uuid) {
            Some(slot) => *slot = entity,
            None => items.push(entity),
        }
    }

    pub fn remove(&self, uuid: Uuid) -> Option<T> {
        let mut items = self.items.write();
        let index = items.iter().position(|item| item.uuid() == uuid)?;
        Some(items.remove(index))
    }

    /// Install a freshly fetched page, dropping whatever was cached before
    pub fn replace_all(&self, entities: Vec<T>) {
        *self.items.write() = entities;
    }

    pub fn get(&self, uuid: Uuid) -> Option<T> {
        self.items
            .read()
            .iter()
            .find(|item| item.uuid() == uuid)
            .cloned()
    }

    pub fn items(&self) -> Vec<T> {
        self.items.read().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }
}
