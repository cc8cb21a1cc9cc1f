// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for native model operations.

use crate::keys::{NativeRef, RefType};
use crate::value::TypedValueType;

/// Result type alias for native model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the native model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The handle does not resolve to a live resource.
    #[error("native resource not found: {0:?}")]
    NotFound(NativeRef),

    /// The handle was issued by this model and has already been released.
    #[error("native resource already released: {0:?}")]
    AlreadyReleased(NativeRef),

    /// The resource is owned by the model or by another resource and cannot
    /// be released or modified through this handle.
    #[error("native resource is attached to its owner: {0:?}")]
    Attached(NativeRef),

    /// The handle refers to an object of a different kind.
    #[error("expected {expected}, found {found}")]
    WrongKind { expected: RefType, found: RefType },

    /// An entity already has an attribute dictionary with this name.
    #[error("attribute dictionary already exists: {0}")]
    DuplicateDictionary(String),

    /// The dictionary has no value under this key.
    #[error("attribute key not found: {0}")]
    KeyNotFound(String),

    /// A typed value holds a different variant than the one requested.
    #[error("typed value holds {found:?}, requested {expected:?}")]
    TypeMismatch {
        expected: TypedValueType,
        found: TypedValueType,
    },

    /// A loop needs at least three non-collinear points.
    #[error("degenerate loop: {0} usable points")]
    DegenerateLoop(usize),

    /// The model cannot deep-copy objects of this kind.
    #[error("{0} objects cannot be duplicated")]
    NotDuplicable(RefType),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
