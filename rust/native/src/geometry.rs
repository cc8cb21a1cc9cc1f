// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex positions and loop normals.

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::keys::*;
use crate::model::*;

/// Normals shorter than this are treated as degenerate.
const NORMAL_EPSILON: f64 = 1e-15;

impl NativeModel {
    /// Returns the 3D position of a vertex.
    pub fn vertex_point(&self, key: EntityKey) -> Result<Point3<f64>> {
        match &self.expect_kind(key, RefType::Vertex)?.data {
            EntityData::Vertex(v) => Ok(Point3::new(v.x, v.y, v.z)),
            other => Err(Error::WrongKind {
                expected: RefType::Vertex,
                found: other.ref_type(),
            }),
        }
    }

    /// Returns the vertex positions of a loop in traversal order.
    pub fn loop_points(&self, key: EntityKey) -> Result<Vec<Point3<f64>>> {
        self.loop_vertices(key)?
            .into_iter()
            .map(|v| self.vertex_point(v))
            .collect()
    }

    /// Computes the unit normal of a loop using Newell's method, or `None`
    /// if the loop is degenerate.
    pub fn loop_normal(&self, key: EntityKey) -> Result<Option<Vector3<f64>>> {
        let vertices = self.loop_vertices(key)?;
        self.polygon_normal(&vertices)
    }

    /// Newell's method over an ordered ring of vertices. The normal follows
    /// the right-hand rule relative to the ring order.
    pub(crate) fn polygon_normal(&self, ring: &[EntityKey]) -> Result<Option<Vector3<f64>>> {
        if ring.len() < 3 {
            return Ok(None);
        }

        let mut normal = Vector3::new(0.0, 0.0, 0.0);
        let n = ring.len();

        for i in 0..n {
            let curr = self.vertex_point(ring[i])?;
            let next = self.vertex_point(ring[(i + 1) % n])?;

            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }

        let len = normal.norm();
        if len < NORMAL_EPSILON {
            return Ok(None);
        }

        Ok(Some(normal / len))
    }
}
