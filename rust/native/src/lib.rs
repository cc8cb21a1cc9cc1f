// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # geowrap-native
//!
//! An in-memory, handle-based geometry model with a C-style surface: every
//! object is reached through an opaque key, created by one call and released
//! by another.
//!
//! The model keeps a release ledger. Each successful release is counted per
//! handle, and every refused release (double release, release of an attached
//! resource, release of an unknown handle) is counted too, so wrappers built
//! on top can prove that they release each resource they own exactly once.

pub mod construction;
pub mod dictionary;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod model;
pub mod serialization;
pub mod traversal;
pub mod value;

pub use error::{Error, Result};
pub use keys::{EntityKey, NativeRef, RefType, TypedValueKey};
pub use model::{NativeModel, Owner};
pub use serialization::{DictionarySnapshot, EntitySnapshot, ModelSnapshot};
pub use value::{Color, Payload, TypedValueType};
