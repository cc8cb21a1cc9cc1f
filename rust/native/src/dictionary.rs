// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute dictionaries: named key/value stores attached to entities.
//!
//! A dictionary is itself an entity. It is either created detached (and then
//! added to an entity, which takes ownership) or created on demand by name
//! directly on an entity. There is no call to remove a key or a dictionary.

use crate::error::{Error, Result};
use crate::keys::*;
use crate::model::{DictionaryData, EntityData, NativeModel, Owner};
use crate::value::Payload;

impl NativeModel {
    /// Creates a detached attribute dictionary owned by the caller.
    pub fn create_attribute_dictionary(&mut self, name: &str) -> EntityKey {
        self.insert_entity(
            EntityData::Dictionary(DictionaryData {
                name: name.to_string(),
                entries: Vec::new(),
            }),
            Owner::Detached,
        )
    }

    pub(crate) fn dictionary_data(&self, dict: EntityKey) -> Result<&DictionaryData> {
        match &self.entity(dict)?.data {
            EntityData::Dictionary(d) => Ok(d),
            other => Err(Error::WrongKind {
                expected: RefType::AttributeDictionary,
                found: other.ref_type(),
            }),
        }
    }

    fn dictionary_data_mut(&mut self, dict: EntityKey) -> Result<&mut DictionaryData> {
        match &mut self.record_mut(dict)?.data {
            EntityData::Dictionary(d) => Ok(d),
            other => Err(Error::WrongKind {
                expected: RefType::AttributeDictionary,
                found: other.ref_type(),
            }),
        }
    }

    /// Returns the name of a dictionary.
    pub fn dictionary_name(&self, dict: EntityKey) -> Result<&str> {
        self.dictionary_data(dict).map(|d| d.name.as_str())
    }

    /// Returns the keys of a dictionary in insertion order.
    pub fn dictionary_keys(&self, dict: EntityKey) -> Result<Vec<String>> {
        Ok(self
            .dictionary_data(dict)?
            .entries
            .iter()
            .map(|(k, _)| k.clone())
            .collect())
    }

    /// Returns the value stored under `key`.
    pub fn dictionary_value(&self, dict: EntityKey, key: &str) -> Result<&Payload> {
        self.dictionary_data(dict)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Stores a copy of `value` under `key`, replacing any previous value.
    pub fn set_dictionary_value(
        &mut self,
        dict: EntityKey,
        key: &str,
        value: Payload,
    ) -> Result<()> {
        let data = self.dictionary_data_mut(dict)?;
        match data.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => data.entries.push((key.to_string(), value)),
        }
        Ok(())
    }

    /// Returns the dictionaries attached to an entity, in the order they were
    /// added.
    pub fn entity_dictionaries(&self, entity: EntityKey) -> Result<&[EntityKey]> {
        self.entity(entity).map(|r| r.dictionaries.as_slice())
    }

    /// Looks up an entity's dictionary by name.
    pub fn entity_dictionary(&self, entity: EntityKey, name: &str) -> Result<Option<EntityKey>> {
        let record = self.entity(entity)?;
        Ok(record
            .dictionaries
            .iter()
            .copied()
            .find(|&d| self.dictionary_name(d).is_ok_and(|n| n == name)))
    }

    /// Looks up an entity's dictionary by name, creating it if missing.
    pub fn entity_dictionary_or_create(
        &mut self,
        entity: EntityKey,
        name: &str,
    ) -> Result<EntityKey> {
        if let Some(existing) = self.entity_dictionary(entity, name)? {
            return Ok(existing);
        }
        let dict = self.insert_entity(
            EntityData::Dictionary(DictionaryData {
                name: name.to_string(),
                entries: Vec::new(),
            }),
            Owner::Entity(entity),
        );
        self.record_mut(entity)?.dictionaries.push(dict);
        tracing::trace!(?entity, name, "created attribute dictionary");
        Ok(dict)
    }

    /// Attaches a detached dictionary to an entity, which takes ownership.
    ///
    /// Fails if the dictionary is already owned or if the entity already has
    /// a dictionary with the same name.
    pub fn add_dictionary(&mut self, entity: EntityKey, dict: EntityKey) -> Result<()> {
        if self.entity_owner(dict)? != Owner::Detached {
            return Err(Error::Attached(dict.into()));
        }
        let name = self.dictionary_name(dict)?.to_string();
        if self.entity_dictionary(entity, &name)?.is_some() {
            return Err(Error::DuplicateDictionary(name));
        }
        if entity == dict {
            return Err(Error::Attached(dict.into()));
        }

        self.record_mut(entity)?.dictionaries.push(dict);
        self.record_mut(dict)?.owner = Owner::Entity(entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_values() {
        let mut model = NativeModel::new();
        let dict = model.create_attribute_dictionary("meta");

        model.set_dictionary_value(dict, "name", Payload::from("origin")).unwrap();
        model.set_dictionary_value(dict, "weight", Payload::from(1.5f64)).unwrap();
        model.set_dictionary_value(dict, "id", Payload::from(42i32)).unwrap();

        assert_eq!(
            model.dictionary_value(dict, "name").unwrap(),
            &Payload::String("origin".to_string())
        );
        assert_eq!(model.dictionary_value(dict, "weight").unwrap(), &Payload::Double(1.5));
        assert_eq!(model.dictionary_keys(dict).unwrap(), vec!["name", "weight", "id"]);
    }

    #[test]
    fn last_write_wins_and_keeps_position() {
        let mut model = NativeModel::new();
        let dict = model.create_attribute_dictionary("d");
        model.set_dictionary_value(dict, "a", Payload::Int32(1)).unwrap();
        model.set_dictionary_value(dict, "b", Payload::Int32(2)).unwrap();
        model.set_dictionary_value(dict, "a", Payload::Int32(3)).unwrap();

        assert_eq!(model.dictionary_value(dict, "a").unwrap(), &Payload::Int32(3));
        assert_eq!(model.dictionary_keys(dict).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn missing_key() {
        let mut model = NativeModel::new();
        let dict = model.create_attribute_dictionary("d");
        assert!(matches!(
            model.dictionary_value(dict, "nope"),
            Err(Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn non_dictionary_is_wrong_kind() {
        let mut model = NativeModel::new();
        let entity = model.create_entity();
        assert!(matches!(
            model.dictionary_keys(entity),
            Err(Error::WrongKind {
                expected: RefType::AttributeDictionary,
                found: RefType::Entity
            })
        ));
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut model = NativeModel::new();
        let entity = model.create_entity();
        let a = model.entity_dictionary_or_create(entity, "A").unwrap();
        let again = model.entity_dictionary_or_create(entity, "A").unwrap();
        let b = model.entity_dictionary_or_create(entity, "B").unwrap();

        assert_eq!(a, again);
        assert_eq!(model.entity_dictionaries(entity).unwrap(), &[a, b]);
        assert_eq!(model.entity_owner(a).unwrap(), Owner::Entity(entity));
    }

    #[test]
    fn add_dictionary_transfers_ownership() {
        let mut model = NativeModel::new();
        let entity = model.create_entity();
        let dict = model.create_attribute_dictionary("A");
        assert_eq!(model.outstanding(), 2);

        model.add_dictionary(entity, dict).unwrap();
        assert_eq!(model.outstanding(), 1);
        assert!(matches!(model.release_entity(dict), Err(Error::Attached(_))));

        // Releasing the owner takes the dictionary with it.
        model.release_entity(entity).unwrap();
        assert!(!model.contains(dict.into()));
        assert_eq!(model.release_count(dict.into()), 0);
    }

    #[test]
    fn add_dictionary_rejects_duplicate_names() {
        let mut model = NativeModel::new();
        let entity = model.create_entity();
        model.entity_dictionary_or_create(entity, "A").unwrap();
        let dict = model.create_attribute_dictionary("A");

        assert!(matches!(
            model.add_dictionary(entity, dict),
            Err(Error::DuplicateDictionary(name)) if name == "A"
        ));
        assert_eq!(model.entity_owner(dict).unwrap(), Owner::Detached);
    }
}
