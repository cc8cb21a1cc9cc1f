// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The base wrapper: identity plus attribute access.
//!
//! Attributes live in named [`AttributeDictionary`] instances attached to an
//! entity. Reads return fresh [`TypedValue`] copies; writes store a copy of
//! the given value. Keys and dictionaries cannot be deleted.

use std::fmt;

use geowrap_native::{EntityKey, NativeModel, Payload, RefType};

use crate::attribute_dictionary::AttributeDictionary;
use crate::host::Host;
use crate::ownership::{Ownership, OwnershipHandle};
use crate::typed_value::TypedValue;

/// Wrapper around one native entity.
pub struct Entity {
    handle: OwnershipHandle<EntityKey>,
}

impl Entity {
    /// A placeholder with no native entity.
    pub fn null() -> Self {
        Self {
            handle: OwnershipHandle::invalid(),
        }
    }

    /// Creates a fresh generic entity that is not part of the model yet. The
    /// wrapper releases it on drop unless it is handed to
    /// [`Host::add_entity`].
    pub fn create(host: &Host) -> Self {
        Self {
            handle: OwnershipHandle::allocate(host, NativeModel::create_entity),
        }
    }

    /// Wraps an existing entity owned by the model.
    pub fn from_native(host: &Host, key: EntityKey) -> Self {
        Self {
            handle: OwnershipHandle::attached(host, key),
        }
    }

    pub(crate) fn from_handle(handle: OwnershipHandle<EntityKey>) -> Self {
        Self { handle }
    }

    pub(crate) fn handle(&self) -> &OwnershipHandle<EntityKey> {
        &self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn ownership(&self) -> Ownership {
        self.handle.state()
    }

    pub fn key(&self) -> Option<EntityKey> {
        self.handle.key()
    }

    pub fn host(&self) -> Option<&Host> {
        self.handle.host()
    }

    /// Records that something else now owns the native entity.
    pub fn mark_attached(&mut self) {
        self.handle.mark_attached();
    }

    /// Host-assigned identifier, or `0` for a null entity.
    pub fn entity_id(&self) -> i32 {
        self.handle.read(|m, k| m.entity_id(k)).unwrap_or(0)
    }

    /// The kind of native object, or [`RefType::Unknown`] for a null entity.
    pub fn entity_type(&self) -> RefType {
        self.handle
            .read(|m, k| m.entity_type(k))
            .unwrap_or(RefType::Unknown)
    }

    /// All attached dictionaries, in the order they were added.
    pub fn attribute_dictionaries(&self) -> Vec<AttributeDictionary> {
        let Some(host) = self.host() else {
            return Vec::new();
        };
        self.handle
            .read(|m, k| m.entity_dictionaries(k).map(<[EntityKey]>::to_vec))
            .unwrap_or_default()
            .into_iter()
            .map(|key| AttributeDictionary::from_native(host, key))
            .collect()
    }

    /// The dictionary called `name`, or a null dictionary.
    pub fn attribute_dictionary(&self, name: &str) -> AttributeDictionary {
        let found = self
            .handle
            .read(|m, k| m.entity_dictionary(k, name))
            .flatten();
        match (self.host(), found) {
            (Some(host), Some(key)) => AttributeDictionary::from_native(host, key),
            _ => AttributeDictionary::null(),
        }
    }

    /// The value of `key` in dictionary `dict_name`, or a null value.
    pub fn get_attribute(&self, dict_name: &str, key: &str) -> TypedValue {
        self.get_attribute_or(dict_name, key, TypedValue::null())
    }

    /// The value of `key` in dictionary `dict_name`, or `default`.
    pub fn get_attribute_or(&self, dict_name: &str, key: &str, default: TypedValue) -> TypedValue {
        self.attribute_dictionary(dict_name).get_attribute(key, default)
    }

    /// The value of `key` in `dict`, or a null value.
    pub fn get_attribute_in(&self, dict: &AttributeDictionary, key: &str) -> TypedValue {
        dict.get_value(key)
    }

    /// The value of `key` in `dict`, or `default`.
    pub fn get_attribute_in_or(
        &self,
        dict: &AttributeDictionary,
        key: &str,
        default: TypedValue,
    ) -> TypedValue {
        dict.get_attribute(key, default)
    }

    /// Stores a copy of `value` under `key` in the dictionary `dict_name`,
    /// creating the dictionary if needed.
    ///
    /// Returns `false` if the entity or the value is null, or if the model
    /// refuses the write.
    pub fn set_attribute(&self, dict_name: &str, key: &str, value: &TypedValue) -> bool {
        if !value.is_valid() {
            return false;
        }
        self.store(dict_name, key, value.payload())
    }

    /// Stores a copy of `value` under `key` in `dict`.
    ///
    /// A detached dictionary from the same model is linked to this entity
    /// first, which takes ownership of it; `dict` is marked attached. If the
    /// entity already has a dictionary with that name, or `dict` belongs to
    /// another model, the write goes to this entity's dictionary of the same
    /// name instead.
    pub fn set_attribute_in(
        &self,
        dict: &mut AttributeDictionary,
        key: &str,
        value: &TypedValue,
    ) -> bool {
        if !dict.is_valid() || !value.is_valid() {
            return false;
        }
        let name = dict.name();
        self.link_detached(dict, &name);
        self.store(&name, key, value.payload())
    }

    fn link_detached(&self, dict: &mut AttributeDictionary, name: &str) {
        let (Some(entity), Some(dict_key)) = (self.key(), dict.as_entity().key()) else {
            return;
        };
        let same_model = match (self.host(), dict.as_entity().host()) {
            (Some(a), Some(b)) => a.same_model(b),
            _ => false,
        };
        if dict.ownership() != Ownership::Owned || !same_model {
            return;
        }
        let linked = self.handle.write(|m, _| {
            if m.entity_dictionary(entity, name)?.is_some() {
                return Ok(false);
            }
            m.add_dictionary(entity, dict_key).map(|()| true)
        });
        if linked == Some(true) {
            dict.mark_attached();
            tracing::trace!(?entity, name, "linked detached dictionary");
        }
    }

    fn store(&self, dict_name: &str, key: &str, payload: Payload) -> bool {
        self.handle
            .write(|m, k| {
                let dict = m.entity_dictionary_or_create(k, dict_name)?;
                m.set_dictionary_value(dict, key, payload)
            })
            .is_some()
    }

    /// Copies every dictionary, key and value of `other` onto this entity.
    ///
    /// Same-named keys are overwritten and all other keys are kept, so the
    /// result is a merge rather than a replacement. Returns `false` if either
    /// entity is null or a write fails.
    pub fn copy_attributes_from(&self, other: &Entity) -> bool {
        if !self.is_valid() {
            return false;
        }
        let Some(source) = other.handle.read(dictionary_contents) else {
            return false;
        };

        self.handle
            .write(|m, k| {
                for (name, entries) in source {
                    let dict = m.entity_dictionary_or_create(k, &name)?;
                    for (key, value) in entries {
                        m.set_dictionary_value(dict, &key, value)?;
                    }
                }
                Ok(())
            })
            .is_some()
    }
}

/// Every dictionary of `entity` as a name plus its entries.
fn dictionary_contents(
    model: &NativeModel,
    entity: EntityKey,
) -> geowrap_native::Result<Vec<(String, Vec<(String, Payload)>)>> {
    let mut contents = Vec::new();
    for &dict in model.entity_dictionaries(entity)? {
        let mut entries = Vec::new();
        for key in model.dictionary_keys(dict)? {
            let value = model.dictionary_value(dict, &key)?.clone();
            entries.push((key, value));
        }
        contents.push((model.dictionary_name(dict)?.to_string(), entries));
    }
    Ok(contents)
}

/// A detached entity is deep-copied through the model; an attached one is
/// aliased.
impl Clone for Entity {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.duplicate(|m, k| m.duplicate_entity(k)),
        }
    }
}

/// Native identity, not attribute contents.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Entity {}

impl Default for Entity {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("Entity(null)");
        }
        f.debug_struct("Entity")
            .field("id", &self.entity_id())
            .field("type", &self.entity_type())
            .field("ownership", &self.ownership())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached_entity(host: &Host) -> Entity {
        let mut entity = Entity::create(host);
        assert!(host.add_entity(&mut entity));
        entity
    }

    #[test]
    fn null_entity_sentinels() {
        let entity = Entity::null();
        assert!(!entity.is_valid());
        assert_eq!(entity.entity_id(), 0);
        assert_eq!(entity.entity_type(), RefType::Unknown);
        assert!(entity.attribute_dictionaries().is_empty());
        assert!(!entity.attribute_dictionary("a").is_valid());
        assert!(!entity.get_attribute("a", "b").is_valid());
        assert!(!entity.set_attribute("a", "b", &TypedValue::null()));
        assert_eq!(Entity::null(), Entity::default());
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let host = Host::new();
        let a = Entity::create(&host);
        let b = Entity::create(&host);
        assert!(a.entity_id() > 0);
        assert_ne!(a.entity_id(), b.entity_id());
        assert_eq!(a.entity_type(), RefType::Entity);

        let id = a.entity_id();
        a.set_attribute("d", "k", &TypedValue::of(&host, 1));
        assert_eq!(a.entity_id(), id);
    }

    #[test]
    fn set_attribute_is_last_write_wins() {
        let host = Host::new();
        let entity = attached_entity(&host);

        assert!(entity.set_attribute("meta", "name", &TypedValue::of(&host, "first")));
        assert!(entity.set_attribute("meta", "name", &TypedValue::of(&host, "second")));

        assert_eq!(entity.get_attribute("meta", "name").string_value(), "second");
        assert_eq!(entity.attribute_dictionaries().len(), 1);
        assert_eq!(entity.attribute_dictionary("meta").keys(), vec!["name"]);
    }

    #[test]
    fn set_attribute_rejects_null_value() {
        let host = Host::new();
        let entity = attached_entity(&host);
        assert!(!entity.set_attribute("meta", "k", &TypedValue::null()));
        assert!(entity.attribute_dictionaries().is_empty());
    }

    #[test]
    fn get_attribute_falls_back_to_default() {
        let host = Host::new();
        let entity = attached_entity(&host);
        entity.set_attribute("meta", "present", &TypedValue::of(&host, 3));

        let fallback = entity.get_attribute_or("meta", "missing", TypedValue::of(&host, -1));
        assert_eq!(fallback.int32_value(), -1);
        let fallback = entity.get_attribute_or("nope", "present", TypedValue::of(&host, -2));
        assert_eq!(fallback.int32_value(), -2);
        assert!(!entity.get_attribute("meta", "missing").is_valid());
        assert_eq!(entity.get_attribute("meta", "present").int32_value(), 3);
    }

    #[test]
    fn stored_values_are_copies() {
        let host = Host::new();
        let entity = attached_entity(&host);
        let mut value = TypedValue::of(&host, 1);
        entity.set_attribute("d", "k", &value);
        value.set_int32(2);

        let read = entity.get_attribute("d", "k");
        assert_eq!(read.int32_value(), 1);
        assert_eq!(read.ownership(), Ownership::Owned);
    }

    #[test]
    fn copy_attributes_merges() {
        let host = Host::new();
        let source = attached_entity(&host);
        let target = attached_entity(&host);
        source.set_attribute("A", "k1", &TypedValue::of(&host, 1));
        source.set_attribute("B", "x", &TypedValue::of(&host, true));
        target.set_attribute("A", "k2", &TypedValue::of(&host, 2));

        assert!(target.copy_attributes_from(&source));

        let a = target.attribute_dictionary("A");
        assert_eq!(a.keys(), vec!["k2", "k1"]);
        assert_eq!(a.get_value("k1").int32_value(), 1);
        assert_eq!(a.get_value("k2").int32_value(), 2);
        assert!(target.get_attribute("B", "x").bool_value());
        // The source is untouched.
        assert_eq!(source.attribute_dictionary("A").keys(), vec!["k1"]);
    }

    #[test]
    fn copy_attributes_overwrites_same_keys() {
        let host = Host::new();
        let source = attached_entity(&host);
        let target = attached_entity(&host);
        source.set_attribute("A", "k", &TypedValue::of(&host, "new"));
        target.set_attribute("A", "k", &TypedValue::of(&host, "old"));

        assert!(target.copy_attributes_from(&source));
        assert_eq!(target.get_attribute("A", "k").string_value(), "new");
        assert!(!target.copy_attributes_from(&Entity::null()));
        assert!(!Entity::null().copy_attributes_from(&source));
    }

    #[test]
    fn copy_attributes_across_models() {
        let host = Host::new();
        let other = Host::new();
        let source = attached_entity(&other);
        source.set_attribute("A", "k", &TypedValue::of(&other, 9));

        let target = attached_entity(&host);
        assert!(target.copy_attributes_from(&source));
        assert_eq!(target.get_attribute("A", "k").int32_value(), 9);
    }

    #[test]
    fn set_attribute_in_links_detached_dictionary() {
        let host = Host::new();
        let entity = attached_entity(&host);
        let mut dict = AttributeDictionary::new(&host, "style");
        assert_eq!(dict.ownership(), Ownership::Owned);

        assert!(entity.set_attribute_in(&mut dict, "color", &TypedValue::of(&host, "red")));
        assert_eq!(dict.ownership(), Ownership::Attached);
        assert_eq!(entity.attribute_dictionary("style"), dict);
        assert_eq!(entity.get_attribute_in(&dict, "color").string_value(), "red");

        let key = dict.as_entity().key().unwrap();
        drop(dict);
        assert_eq!(host.with_model(|m| m.release_count(key.into())), 0);
        assert_eq!(entity.get_attribute("style", "color").string_value(), "red");
    }

    #[test]
    fn set_attribute_in_writes_by_name_on_conflict() {
        let host = Host::new();
        let entity = attached_entity(&host);
        entity.set_attribute("style", "width", &TypedValue::of(&host, 2));

        let mut dict = AttributeDictionary::new(&host, "style");
        assert!(entity.set_attribute_in(&mut dict, "color", &TypedValue::of(&host, "blue")));

        // The detached dictionary stays detached and untouched.
        assert_eq!(dict.ownership(), Ownership::Owned);
        assert!(dict.is_empty());
        let style = entity.attribute_dictionary("style");
        assert_eq!(style.keys(), vec!["width", "color"]);
        assert_eq!(
            entity.get_attribute_in_or(&style, "missing", TypedValue::of(&host, 0)).int32_value(),
            0
        );
    }

    #[test]
    fn clone_of_detached_entity_is_deep() {
        let host = Host::new();
        let entity = Entity::create(&host);
        entity.set_attribute("A", "k", &TypedValue::of(&host, 1));

        let copy = entity.clone();
        assert_eq!(copy.ownership(), Ownership::Owned);
        assert_ne!(copy, entity);
        assert_ne!(copy.entity_id(), entity.entity_id());
        assert_eq!(copy.get_attribute("A", "k").int32_value(), 1);

        copy.set_attribute("A", "k", &TypedValue::of(&host, 2));
        assert_eq!(entity.get_attribute("A", "k").int32_value(), 1);

        drop(copy);
        drop(entity);
        assert_eq!(host.with_model(|m| m.outstanding()), 0);
        assert_eq!(host.with_model(|m| m.rejected_releases()), 0);
    }

    #[test]
    fn clone_of_attached_entity_aliases() {
        let host = Host::new();
        let entity = attached_entity(&host);
        let alias = entity.clone();
        assert_eq!(alias, entity);
        assert_eq!(alias.ownership(), Ownership::Attached);

        alias.set_attribute("A", "k", &TypedValue::of(&host, 5));
        assert_eq!(entity.get_attribute("A", "k").int32_value(), 5);
    }
}
