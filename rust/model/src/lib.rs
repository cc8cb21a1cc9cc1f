// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # geowrap
//!
//! Object wrappers over the handle-based model in [`geowrap_native`].
//!
//! Every wrapper holds one native key and an [`Ownership`] state. A wrapper
//! that owns its resource releases it when dropped; once the resource has
//! been handed to the model (or to another resource) the wrapper only views
//! it. Failed native calls never surface as errors: reads fall back to null
//! or default values and writes report `false`.
//!
//! ```
//! use geowrap::{Entity, Host, Ownership, TypedValue};
//!
//! let host = Host::new();
//! let mut wall = Entity::create(&host);
//! wall.set_attribute("meta", "name", &TypedValue::of(&host, "north wall"));
//!
//! assert!(host.add_entity(&mut wall));
//! assert_eq!(wall.ownership(), Ownership::Attached);
//! assert_eq!(wall.get_attribute("meta", "name").string_value(), "north wall");
//! ```
//!
//! A model and all wrappers over it live on one thread.

pub mod attribute_dictionary;
pub mod classify;
pub mod elements;
pub mod entity;
pub mod host;
pub mod loops;
pub mod ownership;
pub mod tolerance;
pub mod typed_value;

pub use attribute_dictionary::AttributeDictionary;
pub use classify::{classify_point, PointLoopClassify};
pub use elements::{Edge, Vertex};
pub use entity::Entity;
pub use host::Host;
pub use loops::{Loop, LoopInput};
pub use ownership::{NativeResource, Ownership, OwnershipHandle};
pub use tolerance::TOLERANCE;
pub use typed_value::TypedValue;

pub use geowrap_native::{
    Color, EntityKey, NativeModel, NativeRef, Payload, RefType, TypedValueKey, TypedValueType,
};
pub use nalgebra::{Point3, Vector3};
