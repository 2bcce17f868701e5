//! Object identity and address collections.
//!
//! Every catalog object, and every sub-component of one such as a column,
//! is identified by the triple `(class_id, object_id, sub_id)`. A `sub_id`
//! of zero names the whole object; the whole-object address subsumes all of
//! its sub-objects for membership and scan purposes.

use crate::class::{ObjectClass, class_oid};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog object identifier.
pub type Oid = u32;

/// Immutable identity of a catalog object or sub-object.
///
/// `sub_id` is unsigned, so the derived ordering sorts the whole-object
/// address (`sub_id == 0`) before any of its sub-objects. The duplicate
/// elimination in [`ObjectAddresses::dedup`] depends on that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectAddress {
    pub class_id: Oid,
    pub object_id: Oid,
    pub sub_id: u32,
}

impl ObjectAddress {
    pub fn new(class_id: Oid, object_id: Oid, sub_id: u32) -> Self {
        Self {
            class_id,
            object_id,
            sub_id,
        }
    }

    /// Address of a whole object (`sub_id == 0`).
    pub fn whole(class_id: Oid, object_id: Oid) -> Self {
        Self::new(class_id, object_id, 0)
    }

    pub fn is_whole_object(&self) -> bool {
        self.sub_id == 0
    }

    /// Whether this address covers `other`: the same triple, or this is the
    /// whole-object super-object of `other`.
    pub fn covers(&self, other: &ObjectAddress) -> bool {
        self.class_id == other.class_id
            && self.object_id == other.object_id
            && (self.sub_id == other.sub_id || self.sub_id == 0)
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub_id == 0 {
            write!(f, "{}/{}", self.class_id, self.object_id)
        } else {
            write!(f, "{}/{}.{}", self.class_id, self.object_id, self.sub_id)
        }
    }
}

/// Expandable, order-preserving collection of object addresses.
///
/// Membership uses subsumption: a stored whole-object entry matches a query
/// for any of its sub-objects. Insertion order is preserved except across
/// [`dedup`](Self::dedup).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectAddresses {
    items: Vec<ObjectAddress>,
}

impl ObjectAddresses {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(32),
        }
    }

    /// Append an address exactly as given, duplicates and all.
    pub fn add(&mut self, address: ObjectAddress) {
        self.items.push(address);
    }

    /// Append an address built from a class tag, translating the tag to its
    /// catalog class oid.
    pub fn add_object(&mut self, class: ObjectClass, object_id: Oid, sub_id: u32) {
        self.add(ObjectAddress::new(class_oid(class), object_id, sub_id));
    }

    /// Membership with whole-object subsumption: a stored `(c, o, 0)` entry
    /// matches a query for `(c, o, k)` with any `k`.
    pub fn contains(&self, query: &ObjectAddress) -> bool {
        self.items.iter().any(|stored| stored.covers(query))
    }

    /// Sort and eliminate duplicates. A whole-object entry followed by a
    /// partial entry for the same object collapses to the partial entry:
    /// the surviving partial reference already keeps the object alive, and
    /// sub-object granularity is the more precise record.
    pub fn dedup(&mut self) {
        self.items.sort_unstable();
        self.items = std::mem::take(&mut self.items)
            .into_iter()
            .coalesce(|prior, this| {
                if prior.class_id == this.class_id && prior.object_id == this.object_id {
                    if prior.sub_id == this.sub_id {
                        return Ok(prior);
                    }
                    if prior.sub_id == 0 {
                        // The whole-object entry sorts first; absorb it into
                        // the partial entry that follows.
                        return Ok(this);
                    }
                }
                Err((prior, this))
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectAddress> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ObjectAddress] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a ObjectAddresses {
    type Item = &'a ObjectAddress;
    type IntoIter = std::slice::Iter<'a, ObjectAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<ObjectAddress> for ObjectAddresses {
    fn from_iter<I: IntoIterator<Item = ObjectAddress>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
