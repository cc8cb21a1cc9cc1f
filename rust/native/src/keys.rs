// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opaque handle types issued by the native model.
//!
//! Handles are `slotmap` keys: once a resource is released its key never
//! resolves again, even if the slot is reused (generational indices). That is
//! what lets the model tell a double release apart from a release of a key it
//! never issued.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for any entity in the model: generic entities, attribute
    /// dictionaries, vertices, edges, loops and faces.
    pub struct EntityKey;

    /// Key for a typed value.
    pub struct TypedValueKey;
}

/// A key that can reference any native resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeRef {
    Entity(EntityKey),
    TypedValue(TypedValueKey),
}

impl From<EntityKey> for NativeRef {
    fn from(k: EntityKey) -> Self {
        NativeRef::Entity(k)
    }
}

impl From<TypedValueKey> for NativeRef {
    fn from(k: TypedValueKey) -> Self {
        NativeRef::TypedValue(k)
    }
}

/// Kind of a native object, as reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RefType {
    Unknown = 0,
    Entity = 1,
    AttributeDictionary = 2,
    Vertex = 3,
    Edge = 4,
    Loop = 5,
    Face = 6,
    TypedValue = 7,
}

impl RefType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::Unknown => "Unknown",
            RefType::Entity => "Entity",
            RefType::AttributeDictionary => "AttributeDictionary",
            RefType::Vertex => "Vertex",
            RefType::Edge => "Edge",
            RefType::Loop => "Loop",
            RefType::Face => "Face",
            RefType::TypedValue => "TypedValue",
        }
    }
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
