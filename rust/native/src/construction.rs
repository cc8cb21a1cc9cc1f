// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction of the geometry a loop query needs: vertices, edges, loops
//! and the faces that own them.
//!
//! Everything built here is attached from the start: vertices, edges and
//! faces belong to the model, a loop belongs to its face. None of it can be
//! released through a handle.

use crate::error::{Error, Result};
use crate::keys::*;
use crate::model::*;

impl NativeModel {
    /// Adds a vertex at the given 3D coordinates.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> EntityKey {
        self.insert_entity(EntityData::Vertex(VertexData { x, y, z }), Owner::Model)
    }

    /// Creates an edge between two existing vertices.
    pub fn add_edge(&mut self, start: EntityKey, end: EntityKey) -> Result<EntityKey> {
        self.expect_kind(start, RefType::Vertex)?;
        self.expect_kind(end, RefType::Vertex)?;
        Ok(self.insert_entity(EntityData::Edge(EdgeData { start, end }), Owner::Model))
    }

    /// Creates a face bounded by the closed polygon through `vertices`.
    ///
    /// An existing edge between two consecutive vertices is reused (in either
    /// direction) so neighbouring faces share their common edge. Fails with
    /// [`Error::DegenerateLoop`] for fewer than three distinct vertices or
    /// when they are all collinear.
    pub fn add_face_by_vertices(&mut self, vertices: &[EntityKey]) -> Result<EntityKey> {
        for &v in vertices {
            self.expect_kind(v, RefType::Vertex)?;
        }

        let mut ring: Vec<EntityKey> = Vec::with_capacity(vertices.len());
        for &v in vertices {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(Error::DegenerateLoop(ring.len()));
        }
        if self.polygon_normal(&ring)?.is_none() {
            return Err(Error::DegenerateLoop(ring.len()));
        }

        let mut edges = Vec::with_capacity(ring.len());
        let mut orientations = Vec::with_capacity(ring.len());
        for i in 0..ring.len() {
            let start = ring[i];
            let end = ring[(i + 1) % ring.len()];
            let (edge, forward) = match self.find_edge(start, end) {
                Some(found) => found,
                None => (self.add_edge(start, end)?, true),
            };
            edges.push(edge);
            orientations.push(forward);
        }

        let face = self.insert_entity(EntityData::Generic, Owner::Model);
        let outer_loop = self.insert_entity(
            EntityData::Loop(LoopData {
                edges,
                orientations,
            }),
            Owner::Entity(face),
        );
        self.record_mut(face)?.data = EntityData::Face(FaceData { outer_loop });
        tracing::trace!(?face, vertices = ring.len(), "added face");
        Ok(face)
    }

    /// Creates a face from coordinate triples, creating vertices as needed.
    pub fn add_face_by_coords(&mut self, coords: &[[f64; 3]]) -> Result<EntityKey> {
        if coords.len() < 3 {
            return Err(Error::DegenerateLoop(coords.len()));
        }

        let vertices: Vec<EntityKey> = coords
            .iter()
            .map(|c| self.add_vertex(c[0], c[1], c[2]))
            .collect();

        let built = self.add_face_by_vertices(&vertices);
        if built.is_err() {
            // Fresh vertices have no edges yet; a refused face leaves nothing.
            for v in vertices {
                self.drop_entity(v);
            }
        }
        built
    }

    /// Finds an edge joining `a` and `b`. The flag is `true` when the edge
    /// runs from `a` to `b`.
    fn find_edge(&self, a: EntityKey, b: EntityKey) -> Option<(EntityKey, bool)> {
        self.entities.iter().find_map(|(key, record)| match &record.data {
            EntityData::Edge(e) if e.start == a && e.end == b => Some((key, true)),
            EntityData::Edge(e) if e.start == b && e.end == a => Some((key, false)),
            _ => None,
        })
    }

    pub(crate) fn expect_kind(&self, key: EntityKey, expected: RefType) -> Result<&EntityRecord> {
        let record = self.entity(key)?;
        let found = record.data.ref_type();
        if found != expected {
            return Err(Error::WrongKind { expected, found });
        }
        Ok(record)
    }
}
