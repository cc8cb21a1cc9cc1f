// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex and edge views used by loops.

use geowrap_native::EntityKey;
use nalgebra::Point3;

use crate::entity::Entity;
use crate::host::Host;

/// A point of the model's boundary topology.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Vertex {
    entity: Entity,
}

impl Vertex {
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

    /// The vertex position, or the origin for a null vertex.
    pub fn position(&self) -> Point3<f64> {
        self.entity
            .handle()
            .read(|m, k| m.vertex_point(k))
            .unwrap_or_else(Point3::origin)
    }
}

/// A straight segment between two vertices.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Edge {
    entity: Entity,
}

impl Edge {
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

    fn vertex(&self, pick: impl FnOnce((EntityKey, EntityKey)) -> EntityKey) -> Vertex {
        let found = self.entity.handle().read(|m, k| m.edge_vertices(k));
        match (self.entity.host(), found) {
            (Some(host), Some(ends)) => Vertex::from_native(host, pick(ends)),
            _ => Vertex::default(),
        }
    }

    pub fn start(&self) -> Vertex {
        self.vertex(|(start, _)| start)
    }

    pub fn end(&self) -> Vertex {
        self.vertex(|(_, end)| end)
    }

    pub fn length(&self) -> f64 {
        (self.end().position() - self.start().position()).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geowrap_native::RefType;

    #[test]
    fn edge_ends_and_length() {
        let host = Host::new();
        let (edge, a) = host
            .write(|m| {
                let a = m.add_vertex(0.0, 0.0, 0.0);
                let b = m.add_vertex(3.0, 4.0, 0.0);
                (m.add_edge(a, b).unwrap(), a)
            })
            .unwrap();

        let edge = Edge::from_native(&host, edge);
        assert_eq!(edge.as_entity().entity_type(), RefType::Edge);
        assert_eq!(edge.start(), Vertex::from_native(&host, a));
        assert_eq!(edge.end().position(), Point3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(edge.length(), 5.0);
    }

    #[test]
    fn null_elements() {
        assert!(!Edge::default().start().is_valid());
        assert_eq!(Vertex::default().position(), Point3::origin());
        assert_relative_eq!(Edge::default().length(), 0.0);
    }

    #[test]
    fn wrong_kind_reads_as_default() {
        let host = Host::new();
        let mut entity = Entity::create(&host);
        host.add_entity(&mut entity);
        let vertex = Vertex::from_native(&host, entity.key().unwrap());
        assert_eq!(vertex.position(), Point3::origin());
    }
}
