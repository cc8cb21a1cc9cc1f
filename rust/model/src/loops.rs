// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face boundaries and loop descriptions.

use geowrap_native::{EntityKey, NativeModel};
use nalgebra::{Point3, Vector3};

use crate::classify::{classify_point, PointLoopClassify};
use crate::elements::{Edge, Vertex};
use crate::entity::Entity;
use crate::host::Host;

/// The closed boundary of a face.
///
/// Loops are owned by their face; a `Loop` is always a read-only view.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Loop {
    entity: Entity,
}

impl Loop {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn from_native(host: &Host, key: EntityKey) -> Self {
        Self {
            entity: Entity::from_native(host, key),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.entity.is_valid()
    }

    pub fn as_entity(&self) -> &Entity {
        &self.entity
    }

    /// The face that owns this loop, or a null entity.
    pub fn face(&self) -> Entity {
        let face = self.entity.handle().read(|m, k| m.loop_face(k));
        match (self.entity.host(), face) {
            (Some(host), Some(key)) => Entity::from_native(host, key),
            _ => Entity::null(),
        }
    }

    fn keys<T>(
        &self,
        query: impl FnOnce(&NativeModel, EntityKey) -> geowrap_native::Result<Vec<EntityKey>>,
        wrap: impl Fn(&Host, EntityKey) -> T,
    ) -> Vec<T> {
        let Some(host) = self.entity.host() else {
            return Vec::new();
        };
        self.entity
            .handle()
            .read(query)
            .unwrap_or_default()
            .into_iter()
            .map(|key| wrap(host, key))
            .collect()
    }

    /// Edges in loop order.
    pub fn edges(&self) -> Vec<Edge> {
        self.keys(|m, k| m.loop_edges(k).map(<[EntityKey]>::to_vec), Edge::from_native)
    }

    /// Vertices in traversal order; vertex `i` starts edge `i`.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.keys(|m, k| m.loop_vertices(k), Vertex::from_native)
    }

    /// Vertex positions in traversal order.
    pub fn points(&self) -> Vec<Point3<f64>> {
        self.entity
            .handle()
            .read(|m, k| m.loop_points(k))
            .unwrap_or_default()
    }

    /// Number of edges, which equals the number of vertices.
    pub fn size(&self) -> usize {
        self.entity
            .handle()
            .read(|m, k| m.loop_edges(k).map(<[EntityKey]>::len))
            .unwrap_or(0)
    }

    /// Unit normal following the loop's winding, if the loop is not
    /// degenerate.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.entity.handle().read(|m, k| m.loop_normal(k)).flatten()
    }

    /// Classifies `point` against this loop.
    pub fn classify_point(&self, point: &Point3<f64>) -> PointLoopClassify {
        Self::classify(&self.points(), point)
    }

    /// Classifies `point` against the loop through `points`.
    pub fn classify(points: &[Point3<f64>], point: &Point3<f64>) -> PointLoopClassify {
        classify_point(points, point)
    }

    /// A description of this loop that can build a new face.
    pub fn loop_input(&self) -> LoopInput {
        LoopInput::from(self.points())
    }
}

/// An ordered list of positions describing a loop to build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopInput {
    points: Vec<Point3<f64>>,
}

impl LoopInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, point: Point3<f64>) -> &mut Self {
        self.points.push(point);
        self
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn classify_point(&self, point: &Point3<f64>) -> PointLoopClassify {
        classify_point(&self.points, point)
    }
}

impl From<Vec<Point3<f64>>> for LoopInput {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point3<f64>> for LoopInput {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
