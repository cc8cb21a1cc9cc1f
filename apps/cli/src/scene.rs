// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scenes: faces with attributes plus probe points, built into a model
//! and classified.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use geowrap::{Host, LoopInput, Payload, Point3, PointLoopClassify, TypedValue};
use geowrap_native::ModelSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input document.
#[derive(Debug, Deserialize)]
pub struct Scene {
    pub faces: Vec<FaceSpec>,
    #[serde(default)]
    pub points: Vec<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
pub struct FaceSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub points: Vec<[f64; 3]>,
    /// Dictionary name → key → value.
    #[serde(default)]
    pub attributes: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Output document.
#[derive(Debug, Serialize)]
pub struct SceneReport {
    pub faces: Vec<FaceReport>,
    /// Names of faces whose loop was degenerate.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ModelSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct FaceReport {
    pub name: String,
    pub id: i32,
    pub vertices: usize,
    /// Dictionary name → keys, in model order.
    pub dictionaries: BTreeMap<String, Vec<String>>,
    pub classifications: Vec<Classification>,
}

#[derive(Debug, Serialize)]
pub struct Classification {
    pub point: [f64; 3],
    pub result: PointLoopClassify,
}

/// Maps a JSON attribute value to a typed payload.
///
/// Integers that fit in 32 bits become `Int32`, other numbers `Double`.
/// Arrays map element-wise; `null` and objects are rejected.
pub fn payload_from_json(value: &Value) -> Result<Payload> {
    Ok(match value {
        Value::Bool(b) => Payload::Bool(*b),
        Value::String(s) => Payload::String(s.clone()),
        Value::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Payload::Int32(i),
            None => match n.as_f64() {
                Some(f) => Payload::Double(f),
                None => bail!("number {n} is not representable"),
            },
        },
        Value::Array(items) => Payload::Array(
            items
                .iter()
                .map(payload_from_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Null | Value::Object(_) => bail!("unsupported attribute value {value}"),
    })
}

/// Builds every face of `scene` into `host` and classifies each probe point
/// against each face loop.
pub fn run(host: &Host, scene: &Scene, with_snapshot: bool) -> Result<SceneReport> {
    let mut faces = Vec::new();
    let mut skipped = Vec::new();

    for (index, spec) in scene.faces.iter().enumerate() {
        let name = spec.name.clone().unwrap_or_else(|| format!("face-{index}"));
        let input: LoopInput = spec
            .points
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();

        let lp = host.add_face(&input);
        if !lp.is_valid() {
            tracing::warn!(face = %name, points = input.len(), "degenerate face skipped");
            skipped.push(name);
            continue;
        }

        let face = lp.face();
        for (dict_name, entries) in &spec.attributes {
            for (key, value) in entries {
                let value = TypedValue::of(host, payload_from_json(value)?);
                if !face.set_attribute(dict_name, key, &value) {
                    bail!("could not store attribute {dict_name}.{key} on {name}");
                }
            }
        }

        let classifications = scene
            .points
            .iter()
            .map(|&point| Classification {
                point,
                result: lp.classify_point(&Point3::from(point)),
            })
            .collect();

        let dictionaries = face
            .attribute_dictionaries()
            .into_iter()
            .map(|d| (d.name(), d.keys()))
            .collect();

        tracing::debug!(face = %name, id = face.entity_id(), "face built");
        faces.push(FaceReport {
            name,
            id: face.entity_id(),
            vertices: lp.size(),
            dictionaries,
            classifications,
        });
    }

    let snapshot = if with_snapshot {
        Some(host.with_model(|m| m.to_snapshot())?)
    } else {
        None
    };

    Ok(SceneReport {
        faces,
        skipped,
        snapshot,
    })
}
