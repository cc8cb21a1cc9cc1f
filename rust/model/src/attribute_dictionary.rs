// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named key/value stores attached to entities.

use geowrap_native::EntityKey;

use crate::entity::Entity;
use crate::host::Host;
use crate::ownership::{Ownership, OwnershipHandle};
use crate::typed_value::TypedValue;

/// A named map from string keys to [`TypedValue`]s.
///
/// The wrapper is a view: entries live in the model and every read goes
/// through it. A dictionary made with [`AttributeDictionary::new`] is
/// detached until it is passed to [`Entity::set_attribute_in`]; cloning a
/// detached dictionary copies its name and entries, while cloning an attached
/// one yields another view of the same dictionary.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct AttributeDictionary {
    entity: Entity,
}

impl AttributeDictionary {
    pub fn null() -> Self {
        Self::default()
    }

    /// Creates a detached dictionary. The name cannot be changed later.
    pub fn new(host: &Host, name: &str) -> Self {
        let handle = OwnershipHandle::allocate(host, |m| m.create_attribute_dictionary(name));
        Self {
            entity: Entity::from_handle(handle),
        }
    }

    /// Wraps a dictionary owned by an entity.
    pub fn from_native(host: &Host, key: EntityKey) -> Self {
        Self {
            entity: Entity::from_native(host, key),
        }
    }

    pub fn as_entity(&self) -> &Entity {
        &self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn is_valid(&self) -> bool {
        self.entity.is_valid()
    }

    pub fn ownership(&self) -> Ownership {
        self.entity.ownership()
    }

    pub fn mark_attached(&mut self) {
        self.entity.mark_attached();
    }

    /// The dictionary name, or an empty string for a null dictionary.
    pub fn name(&self) -> String {
        self.entity
            .handle()
            .read(|m, k| m.dictionary_name(k).map(str::to_string))
            .unwrap_or_default()
    }

    /// The value stored under `key`, or `default`.
    pub fn get_attribute(&self, key: &str, default: TypedValue) -> TypedValue {
        let Some(host) = self.entity.host() else {
            return default;
        };
        match self
            .entity
            .handle()
            .read(|m, k| m.dictionary_value(k, key).cloned())
        {
            Some(payload) => TypedValue::of(host, payload),
            None => default,
        }
    }

    /// The value stored under `key`, or a null value.
    pub fn get_value(&self, key: &str) -> TypedValue {
        self.get_attribute(key, TypedValue::null())
    }

    /// Stores a copy of `value` under `key`, replacing any previous value.
    /// Returns `false` if the dictionary or the value is null.
    pub fn set_attribute(&self, key: &str, value: &TypedValue) -> bool {
        if !value.is_valid() {
            return false;
        }
        let payload = value.payload();
        self.entity
            .handle()
            .write(|m, k| m.set_dictionary_value(k, key, payload))
            .is_some()
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entity
            .handle()
            .read(|m, k| m.dictionary_keys(k))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsRef<Entity> for AttributeDictionary {
    fn as_ref(&self) -> &Entity {
        &self.entity
    }
}
