// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared access to the native model.
//!
//! Every wrapper keeps a [`Host`] next to its native key so it can reach the
//! model when it is read, written or dropped. A `Host` is a cheap,
//! reference-counted alias; all clones see the same model. It is neither
//! `Send` nor `Sync`: one model is used from one thread.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use geowrap_native::{NativeModel, NativeRef};

use crate::entity::Entity;
use crate::loops::{Loop, LoopInput};
use crate::ownership::Ownership;

#[derive(Default)]
struct Shared {
    model: RefCell<NativeModel>,
    /// Releases issued while the model was borrowed, in drop order.
    deferred: RefCell<Vec<NativeRef>>,
}

/// Handle to a native model shared by wrapper objects.
#[derive(Clone, Default)]
pub struct Host {
    shared: Rc<Shared>,
}

impl Host {
    /// Creates a host around a new, empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host around an existing model, e.g. one restored from a
    /// snapshot.
    pub fn from_model(model: NativeModel) -> Self {
        Self {
            shared: Rc::new(Shared {
                model: RefCell::new(model),
                deferred: RefCell::default(),
            }),
        }
    }

    /// Runs `f` with shared access to the model.
    ///
    /// Wrappers stay usable inside `f`: reads work, writes report failure,
    /// and releases from dropped wrappers are applied once the outermost
    /// `with_model` call returns.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a copy closure passed to
    /// [`OwnershipHandle::deep_copy`](crate::OwnershipHandle::deep_copy),
    /// which already holds the model mutably.
    pub fn with_model<R>(&self, f: impl FnOnce(&NativeModel) -> R) -> R {
        let result = f(&self.shared.model.borrow());
        self.flush_deferred();
        result
    }

    /// Returns `true` if both hosts share one model.
    pub fn same_model(&self, other: &Host) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Runs a read, or returns `None` while the model is mutably borrowed.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&NativeModel) -> R) -> Option<R> {
        let model = self.shared.model.try_borrow().ok()?;
        Some(f(&model))
    }

    /// Runs a write, or returns `None` while the model is borrowed.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut NativeModel) -> R) -> Option<R> {
        self.flush_deferred();
        let Ok(mut model) = self.shared.model.try_borrow_mut() else {
            tracing::debug!("model busy, write skipped");
            return None;
        };
        Some(f(&mut model))
    }

    /// Issues the release call for a caller-owned resource. If the model is
    /// borrowed the call is queued and issued by the next write or when the
    /// borrow ends.
    pub(crate) fn release(&self, native: NativeRef) {
        match self.shared.model.try_borrow_mut() {
            Ok(mut model) => release_native(&mut model, native),
            Err(_) => {
                tracing::debug!(?native, "model busy, release deferred");
                self.shared.deferred.borrow_mut().push(native);
            }
        }
    }

    fn flush_deferred(&self) {
        if self.shared.deferred.borrow().is_empty() {
            return;
        }
        let Ok(mut model) = self.shared.model.try_borrow_mut() else {
            return;
        };
        let pending = std::mem::take(&mut *self.shared.deferred.borrow_mut());
        for native in pending {
            release_native(&mut model, native);
        }
    }

    /// Hands a detached entity over to the model. On success the wrapper is
    /// marked attached and will no longer release the entity.
    pub fn add_entity(&self, entity: &mut Entity) -> bool {
        if entity.ownership() != Ownership::Owned {
            return false;
        }
        let Some(key) = entity.key() else {
            return false;
        };
        if !entity.host().is_some_and(|h| h.same_model(self)) {
            return false;
        }
        match self.write(|m| m.attach_to_model(key)) {
            Some(Ok(())) => {
                entity.mark_attached();
                true
            }
            Some(Err(err)) => {
                tracing::debug!(%err, "entity could not be added to the model");
                false
            }
            None => false,
        }
    }

    /// Builds a face from a loop description and returns the face's outer
    /// loop, or a null loop if the input is degenerate.
    pub fn add_face(&self, input: &LoopInput) -> Loop {
        let coords: Vec<[f64; 3]> = input.points().iter().map(|p| [p.x, p.y, p.z]).collect();
        let built = self.write(|m| {
            let face = m.add_face_by_coords(&coords)?;
            m.face_outer_loop(face)
        });
        match built {
            Some(Ok(key)) => Loop::from_native(self, key),
            Some(Err(err)) => {
                tracing::debug!(%err, "face could not be built");
                Loop::null()
            }
            None => Loop::null(),
        }
    }
}

fn release_native(model: &mut NativeModel, native: NativeRef) {
    let released = match native {
        NativeRef::Entity(key) => model.release_entity(key),
        NativeRef::TypedValue(key) => model.release_typed_value(key),
    };
    match released {
        Ok(()) => tracing::trace!(?native, "released"),
        Err(err) => tracing::warn!(?native, %err, "native release failed"),
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Host");
        match self.shared.model.try_borrow() {
            Ok(model) => s
                .field("entities", &model.entity_count())
                .field("typed_values", &model.live_typed_values())
                .finish(),
            Err(_) => s.finish_non_exhaustive(),
        }
    }
}
