// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The native model: storage for every resource a handle can refer to.
//!
//! The [`NativeModel`] plays the part of the host geometry engine. Entities
//! and typed values live in slot maps with generational keys, and every
//! entity records who owns it:
//!
//! - [`Owner::Detached`]: nobody but the caller holding the handle. The caller
//!   must release it exactly once.
//! - [`Owner::Model`]: the model itself. Releasing it is an error.
//! - [`Owner::Entity`]: another entity (a dictionary attached to an entity, a
//!   loop bounding a face). Released together with its owner.
//!
//! Every release call is written to a ledger so callers can verify that each
//! resource they owned was released exactly once.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::*;
use crate::value::TypedValueRecord;

/// Who is responsible for releasing an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Detached,
    Model,
    Entity(EntityKey),
}

/// Data stored for an attribute dictionary.
#[derive(Debug, Clone, Default)]
pub struct DictionaryData {
    pub name: String,
    /// Entries in insertion order; keys are unique.
    pub entries: Vec<(String, crate::value::Payload)>,
}

/// Data stored for a vertex: a point in 3D space.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Data stored for an edge: a line segment between two vertices.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: EntityKey,
    pub end: EntityKey,
}

/// Data stored for a loop: an ordered, closed chain of edges.
#[derive(Debug, Clone)]
pub struct LoopData {
    pub edges: Vec<EntityKey>,
    /// `true` if edge[i] is traversed forward (start→end), `false` if reversed.
    pub orientations: Vec<bool>,
}

/// Data stored for a face: a planar region bounded by one outer loop.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer_loop: EntityKey,
}

/// Kind-specific entity data.
#[derive(Debug, Clone)]
pub enum EntityData {
    Generic,
    Dictionary(DictionaryData),
    Vertex(VertexData),
    Edge(EdgeData),
    Loop(LoopData),
    Face(FaceData),
}

impl EntityData {
    pub fn ref_type(&self) -> RefType {
        match self {
            EntityData::Generic => RefType::Entity,
            EntityData::Dictionary(_) => RefType::AttributeDictionary,
            EntityData::Vertex(_) => RefType::Vertex,
            EntityData::Edge(_) => RefType::Edge,
            EntityData::Loop(_) => RefType::Loop,
            EntityData::Face(_) => RefType::Face,
        }
    }
}

/// One entity in the model.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    /// Host-assigned identifier, unique within the model.
    pub id: i32,
    pub owner: Owner,
    /// Attached attribute dictionaries, in the order they were added.
    pub dictionaries: Vec<EntityKey>,
    pub data: EntityData,
}

/// The central store that owns all native resources.
///
/// # Example
///
/// ```
/// use geowrap_native::NativeModel;
///
/// let mut model = NativeModel::new();
/// let entity = model.create_entity();
/// let dict = model.entity_dictionary_or_create(entity, "meta").unwrap();
///
/// assert_eq!(model.dictionary_name(dict).unwrap(), "meta");
/// model.release_entity(entity).unwrap();
/// assert_eq!(model.outstanding(), 0);
/// ```
#[derive(Debug)]
pub struct NativeModel {
    pub(crate) entities: SlotMap<EntityKey, EntityRecord>,
    pub(crate) typed_values: SlotMap<TypedValueKey, TypedValueRecord>,
    next_id: i32,

    // Release ledger
    releases: FxHashMap<NativeRef, u32>,
    pub(crate) rejected_releases: usize,
}

impl NativeModel {
    /// Creates a new, empty model.
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            typed_values: SlotMap::with_key(),
            next_id: 1,
            releases: FxHashMap::default(),
            rejected_releases: 0,
        }
    }

    // --- Entity operations ---

    /// Creates a fresh, detached generic entity owned by the caller.
    pub fn create_entity(&mut self) -> EntityKey {
        self.insert_entity(EntityData::Generic, Owner::Detached)
    }

    /// Hands a detached entity over to the model.
    pub fn attach_to_model(&mut self, key: EntityKey) -> Result<()> {
        let record = self.record_mut(key)?;
        if record.owner != Owner::Detached {
            return Err(Error::Attached(key.into()));
        }
        record.owner = Owner::Model;
        Ok(())
    }

    /// Returns the entity record for the given key.
    pub fn entity(&self, key: EntityKey) -> Result<&EntityRecord> {
        self.entities
            .get(key)
            .ok_or_else(|| self.missing(key.into()))
    }

    /// Returns the host-assigned identifier of an entity.
    pub fn entity_id(&self, key: EntityKey) -> Result<i32> {
        self.entity(key).map(|r| r.id)
    }

    /// Returns the kind of an entity.
    pub fn entity_type(&self, key: EntityKey) -> Result<RefType> {
        self.entity(key).map(|r| r.data.ref_type())
    }

    /// Returns the owner of an entity.
    pub fn entity_owner(&self, key: EntityKey) -> Result<Owner> {
        self.entity(key).map(|r| r.owner)
    }

    /// Returns the number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the number of live typed values, array items included.
    pub fn live_typed_values(&self) -> usize {
        self.typed_values.len()
    }

    /// Returns `true` if the handle resolves to a live resource.
    pub fn contains(&self, native: NativeRef) -> bool {
        match native {
            NativeRef::Entity(k) => self.entities.contains_key(k),
            NativeRef::TypedValue(k) => self.typed_values.contains_key(k),
        }
    }

    /// Releases a detached entity and everything it owns.
    ///
    /// Fails with [`Error::Attached`] if the model or another entity owns it,
    /// and with [`Error::AlreadyReleased`] on a second call.
    pub fn release_entity(&mut self, key: EntityKey) -> Result<()> {
        let native = NativeRef::from(key);
        let Some(record) = self.entities.get(key) else {
            return Err(self.reject_release(native));
        };
        if record.owner != Owner::Detached {
            self.rejected_releases += 1;
            return Err(Error::Attached(native));
        }
        self.drop_entity(key);
        self.record_release(native);
        tracing::trace!(?key, "released entity");
        Ok(())
    }

    /// Deep-copies a detached generic entity or attribute dictionary,
    /// including its attribute dictionaries. The copy is detached.
    pub fn duplicate_entity(&mut self, key: EntityKey) -> Result<EntityKey> {
        let record = self.entity(key)?;
        let data = match &record.data {
            EntityData::Generic => EntityData::Generic,
            EntityData::Dictionary(d) => EntityData::Dictionary(d.clone()),
            other => return Err(Error::NotDuplicable(other.ref_type())),
        };
        let dictionaries: Vec<DictionaryData> = record
            .dictionaries
            .iter()
            .filter_map(|&d| self.dictionary_data(d).ok().cloned())
            .collect();

        let copy = self.insert_entity(data, Owner::Detached);
        for dict in dictionaries {
            let dk = self.insert_entity(EntityData::Dictionary(dict), Owner::Entity(copy));
            self.record_mut(copy)?.dictionaries.push(dk);
        }
        Ok(copy)
    }

    // --- Ledger ---

    /// Number of successful release calls recorded for a handle (0 or 1).
    pub fn release_count(&self, native: NativeRef) -> u32 {
        self.releases.get(&native).copied().unwrap_or(0)
    }

    /// Number of release calls the model refused: double releases, releases
    /// of attached resources and releases of unknown handles.
    pub fn rejected_releases(&self) -> usize {
        self.rejected_releases
    }

    /// Number of caller-owned resources that are still alive: detached
    /// entities plus free-standing typed values. Zero means nothing leaked.
    pub fn outstanding(&self) -> usize {
        let entities = self
            .entities
            .values()
            .filter(|r| r.owner == Owner::Detached)
            .count();
        let values = self
            .typed_values
            .values()
            .filter(|r| r.parent.is_none())
            .count();
        entities + values
    }

    // --- Internal helpers ---

    pub(crate) fn insert_entity(&mut self, data: EntityData, owner: Owner) -> EntityKey {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.insert(EntityRecord {
            id,
            owner,
            dictionaries: Vec::new(),
            data,
        })
    }

    pub(crate) fn record_mut(&mut self, key: EntityKey) -> Result<&mut EntityRecord> {
        if !self.entities.contains_key(key) {
            return Err(self.missing(key.into()));
        }
        Ok(&mut self.entities[key])
    }

    /// Error for a handle that does not resolve.
    pub(crate) fn missing(&self, native: NativeRef) -> Error {
        if self.releases.contains_key(&native) {
            Error::AlreadyReleased(native)
        } else {
            Error::NotFound(native)
        }
    }

    pub(crate) fn reject_release(&mut self, native: NativeRef) -> Error {
        self.rejected_releases += 1;
        tracing::warn!(?native, "rejected release of a dead handle");
        self.missing(native)
    }

    pub(crate) fn record_release(&mut self, native: NativeRef) {
        *self.releases.entry(native).or_insert(0) += 1;
    }

    /// Removes an entity and everything it owns. No ledger entry.
    pub(crate) fn drop_entity(&mut self, key: EntityKey) {
        let Some(record) = self.entities.remove(key) else {
            return;
        };
        for dict in record.dictionaries {
            self.drop_entity(dict);
        }
        // A face owns its loop; edges and vertices stay with the model.
        if let EntityData::Face(face) = record.data {
            self.drop_entity(face.outer_loop);
        }
    }
}

impl Default for NativeModel {
    fn default() -> Self {
        Self::new()
    }
}
