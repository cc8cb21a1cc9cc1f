// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of the model.
//!
//! Only what the model owns is persisted: generic entities handed to the
//! model and faces, each with its attribute dictionaries. Detached resources
//! belong to their callers and are skipped. Host-assigned ids are written
//! for reference but reassigned on load.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::*;
use crate::model::*;
use crate::value::Payload;

/// Serializable representation of the model.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: i32,
    pub kind: RefType,
    /// Outer loop positions, for faces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f64; 3]>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionaries: Vec<DictionarySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionarySnapshot {
    pub name: String,
    pub entries: Vec<(String, Payload)>,
}

impl NativeModel {
    /// Serializes the model to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot()?;
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Builds a new model from a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ModelSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Creates a serializable snapshot of everything the model owns.
    pub fn to_snapshot(&self) -> Result<ModelSnapshot> {
        let mut entities = Vec::new();

        for (key, record) in &self.entities {
            if record.owner != Owner::Model {
                continue;
            }
            let points = match &record.data {
                EntityData::Generic => None,
                EntityData::Face(face) => Some(
                    self.loop_points(face.outer_loop)?
                        .into_iter()
                        .map(|p| [p.x, p.y, p.z])
                        .collect(),
                ),
                _ => continue,
            };
            entities.push(EntitySnapshot {
                id: record.id,
                kind: record.data.ref_type(),
                points,
                dictionaries: self.dictionary_snapshots(key)?,
            });
        }

        entities.sort_by_key(|e| e.id);
        Ok(ModelSnapshot { entities })
    }

    fn dictionary_snapshots(&self, entity: EntityKey) -> Result<Vec<DictionarySnapshot>> {
        self.entity_dictionaries(entity)?
            .iter()
            .map(|&d| {
                let data = self.dictionary_data(d)?;
                Ok(DictionarySnapshot {
                    name: data.name.clone(),
                    entries: data.entries.clone(),
                })
            })
            .collect()
    }

    /// Rebuilds a model from a snapshot.
    pub fn from_snapshot(snapshot: &ModelSnapshot) -> Result<Self> {
        let mut model = NativeModel::new();

        for entity in &snapshot.entities {
            let key = match (entity.kind, &entity.points) {
                (RefType::Entity, _) => {
                    let key = model.create_entity();
                    model.attach_to_model(key)?;
                    key
                }
                (RefType::Face, Some(points)) => model.add_face_by_coords(points)?,
                (kind, _) => {
                    return Err(Error::Serialization(format!(
                        "entity {} of kind {kind} cannot be restored",
                        entity.id
                    )))
                }
            };

            for dict in &entity.dictionaries {
                let dk = model.entity_dictionary_or_create(key, &dict.name)?;
                for (k, v) in &dict.entries {
                    model.set_dictionary_value(dk, k, v.clone())?;
                }
            }
        }

        Ok(model)
    }
}
