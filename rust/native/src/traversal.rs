// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal between faces, loops, edges and vertices.

use crate::error::{Error, Result};
use crate::keys::*;
use crate::model::*;

impl NativeModel {
    fn loop_data(&self, key: EntityKey) -> Result<&LoopData> {
        match &self.expect_kind(key, RefType::Loop)?.data {
            EntityData::Loop(lp) => Ok(lp),
            other => Err(Error::WrongKind {
                expected: RefType::Loop,
                found: other.ref_type(),
            }),
        }
    }

    /// Returns the outer loop of a face.
    pub fn face_outer_loop(&self, face: EntityKey) -> Result<EntityKey> {
        match &self.expect_kind(face, RefType::Face)?.data {
            EntityData::Face(f) => Ok(f.outer_loop),
            other => Err(Error::WrongKind {
                expected: RefType::Face,
                found: other.ref_type(),
            }),
        }
    }

    /// Returns the face that owns a loop.
    pub fn loop_face(&self, key: EntityKey) -> Result<EntityKey> {
        let record = self.expect_kind(key, RefType::Loop)?;
        match record.owner {
            Owner::Entity(face) => Ok(face),
            _ => Err(Error::NotFound(key.into())),
        }
    }

    /// Returns the edge keys of a loop, in loop order.
    pub fn loop_edges(&self, key: EntityKey) -> Result<&[EntityKey]> {
        self.loop_data(key).map(|lp| lp.edges.as_slice())
    }

    /// Returns the vertex keys of a loop in traversal order. Vertex `i` is
    /// the start of edge `i` as traversed by the loop.
    pub fn loop_vertices(&self, key: EntityKey) -> Result<Vec<EntityKey>> {
        let lp = self.loop_data(key)?;
        let mut vertices = Vec::with_capacity(lp.edges.len());

        for (i, &ek) in lp.edges.iter().enumerate() {
            let (start, end) = self.edge_vertices(ek)?;
            vertices.push(if lp.orientations[i] { start } else { end });
        }

        Ok(vertices)
    }

    /// Returns the start and end vertex keys of an edge.
    pub fn edge_vertices(&self, key: EntityKey) -> Result<(EntityKey, EntityKey)> {
        match &self.expect_kind(key, RefType::Edge)?.data {
            EntityData::Edge(e) => Ok((e.start, e.end)),
            other => Err(Error::WrongKind {
                expected: RefType::Edge,
                found: other.ref_type(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_round_trip() {
        let mut model = NativeModel::new();
        let face = model
            .add_face_by_coords(&[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ])
            .unwrap();
        let lp = model.face_outer_loop(face).unwrap();

        assert_eq!(model.loop_face(lp).unwrap(), face);
        assert_eq!(model.loop_edges(lp).unwrap().len(), 4);

        let vertices = model.loop_vertices(lp).unwrap();
        assert_eq!(vertices.len(), 4);
        let (start, end) = model.edge_vertices(model.loop_edges(lp).unwrap()[0]).unwrap();
        assert_eq!(start, vertices[0]);
        assert_eq!(end, vertices[1]);
    }

    #[test]
    fn wrong_kind_is_reported() {
        let mut model = NativeModel::new();
        let entity = model.create_entity();
        assert!(matches!(
            model.loop_edges(entity),
            Err(Error::WrongKind {
                expected: RefType::Loop,
                found: RefType::Entity
            })
        ));
        assert!(model.face_outer_loop(entity).is_err());
    }
}
