// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resource ownership shared by every wrapper type.
//!
//! An [`OwnershipHandle`] pairs one native key with an [`Ownership`] state:
//!
//! | State      | Meaning                                  | On drop          |
//! |------------|------------------------------------------|------------------|
//! | `Owned`    | the wrapper is responsible for the key   | release it       |
//! | `Attached` | the model (or another resource) owns it  | nothing          |
//! | `Invalid`  | no native resource                       | nothing          |
//!
//! The only transition is `Owned → Attached` ([`OwnershipHandle::mark_attached`]).
//! The handle is not `Clone`: a copy either deep-copies the native resource
//! into a new `Owned` handle or aliases it as `Attached`, and each wrapper
//! type picks which one. Together these rules mean a native resource is
//! released exactly once if and only if some handle still owns it when that
//! handle is dropped. A drop that finds the model borrowed queues its release
//! on the [`Host`] instead of skipping it.

use std::fmt;

use geowrap_native::{EntityKey, NativeModel, NativeRef, TypedValueKey};

use crate::host::Host;

/// Who is responsible for releasing the native resource behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    Owned,
    Attached,
    Invalid,
}

/// A native key type that can be released through the [`Host`].
pub trait NativeResource: Copy + Eq + fmt::Debug {
    fn native_ref(self) -> NativeRef;
}

impl NativeResource for EntityKey {
    fn native_ref(self) -> NativeRef {
        NativeRef::Entity(self)
    }
}

impl NativeResource for TypedValueKey {
    fn native_ref(self) -> NativeRef {
        NativeRef::TypedValue(self)
    }
}

/// One native key plus the bookkeeping of who releases it.
pub struct OwnershipHandle<K: NativeResource> {
    native: Option<(Host, K)>,
    state: Ownership,
}

impl<K: NativeResource> OwnershipHandle<K> {
    /// A handle with no native resource.
    pub fn invalid() -> Self {
        Self {
            native: None,
            state: Ownership::Invalid,
        }
    }

    /// Wraps an existing key without allocating. Passing
    /// [`Ownership::Invalid`] yields an invalid handle.
    pub fn create(host: &Host, key: K, state: Ownership) -> Self {
        match state {
            Ownership::Invalid => Self::invalid(),
            _ => Self {
                native: Some((host.clone(), key)),
                state,
            },
        }
    }

    /// Wraps a key the caller must release.
    pub fn owned(host: &Host, key: K) -> Self {
        Self::create(host, key, Ownership::Owned)
    }

    /// Wraps a key owned by the model.
    pub fn attached(host: &Host, key: K) -> Self {
        Self::create(host, key, Ownership::Attached)
    }

    /// Allocates a resource the caller must release. Yields an invalid
    /// handle if the model is busy.
    pub(crate) fn allocate(host: &Host, alloc: impl FnOnce(&mut NativeModel) -> K) -> Self {
        match host.write(alloc) {
            Some(key) => Self::owned(host, key),
            None => Self::invalid(),
        }
    }

    pub fn state(&self) -> Ownership {
        self.state
    }

    /// Returns `true` if the handle refers to a resource that is still alive.
    /// A view turns invalid once its owner removes the resource.
    pub fn is_valid(&self) -> bool {
        self.native.as_ref().is_some_and(|(host, key)| {
            host.read(|m| m.contains(key.native_ref())).unwrap_or(false)
        })
    }

    pub fn key(&self) -> Option<K> {
        self.native.as_ref().map(|(_, k)| *k)
    }

    pub fn host(&self) -> Option<&Host> {
        self.native.as_ref().map(|(h, _)| h)
    }

    /// Records that the model has taken over the resource. Idempotent; a
    /// no-op unless the handle is `Owned`.
    pub fn mark_attached(&mut self) {
        if self.state == Ownership::Owned {
            self.state = Ownership::Attached;
            tracing::trace!(key = ?self.key(), "handle attached");
        }
    }

    /// An `Attached` alias of the same resource.
    pub fn share(&self) -> Self {
        match &self.native {
            Some((host, key)) => Self::attached(host, *key),
            None => Self::invalid(),
        }
    }

    /// A new `Owned` handle over a deep copy of the resource made by `copy`.
    /// Returns an invalid handle if the copy fails.
    pub fn deep_copy(
        &self,
        copy: impl FnOnce(&mut NativeModel, K) -> geowrap_native::Result<K>,
    ) -> Self {
        let Some((host, key)) = &self.native else {
            return Self::invalid();
        };
        match host.write(|m| copy(m, *key)) {
            Some(Ok(copied)) => Self::owned(host, copied),
            Some(Err(err)) => {
                tracing::debug!(?key, %err, "native copy failed");
                Self::invalid()
            }
            None => Self::invalid(),
        }
    }

    /// Copy rule for wrappers without reference counting: an owned resource
    /// is deep-copied, anything else is aliased.
    pub fn duplicate(
        &self,
        copy: impl FnOnce(&mut NativeModel, K) -> geowrap_native::Result<K>,
    ) -> Self {
        match self.state {
            Ownership::Owned => self.deep_copy(copy),
            _ => self.share(),
        }
    }

    /// Runs a native read. Failures (including an invalid handle or a busy
    /// model) are logged and come back as `None`.
    pub(crate) fn read<R>(
        &self,
        f: impl FnOnce(&NativeModel, K) -> geowrap_native::Result<R>,
    ) -> Option<R> {
        let (host, key) = self.native.as_ref()?;
        host.read(|m| f(m, *key))?
            .map_err(|err| tracing::debug!(?key, %err, "native read failed"))
            .ok()
    }

    /// Runs a native write. Failures are logged and come back as `None`.
    pub(crate) fn write<R>(
        &self,
        f: impl FnOnce(&mut NativeModel, K) -> geowrap_native::Result<R>,
    ) -> Option<R> {
        let (host, key) = self.native.as_ref()?;
        host.write(|m| f(m, *key))?
            .map_err(|err| tracing::debug!(?key, %err, "native write failed"))
            .ok()
    }
}

impl<K: NativeResource> Drop for OwnershipHandle<K> {
    fn drop(&mut self) {
        if self.state != Ownership::Owned {
            return;
        }
        if let Some((host, key)) = self.native.take() {
            host.release(key.native_ref());
        }
    }
}

/// Identity: same model, same key.
impl<K: NativeResource> PartialEq for OwnershipHandle<K> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.native, &other.native) {
            (Some((ha, ka)), Some((hb, kb))) => ka == kb && ha.same_model(hb),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<K: NativeResource> Eq for OwnershipHandle<K> {}

impl<K: NativeResource> Default for OwnershipHandle<K> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<K: NativeResource> fmt::Debug for OwnershipHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipHandle")
            .field("key", &self.key())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed_value(host: &Host) -> OwnershipHandle<TypedValueKey> {
        OwnershipHandle::allocate(host, NativeModel::create_typed_value)
    }

    fn outstanding(host: &Host) -> usize {
        host.with_model(NativeModel::outstanding)
    }

    fn release_count(host: &Host, native: impl Into<NativeRef>) -> u32 {
        host.with_model(|m| m.release_count(native.into()))
    }

    #[test]
    fn owned_handle_releases_on_drop() {
        let host = Host::new();
        let handle = typed_value(&host);
        let key = handle.key().unwrap();

        drop(handle);
        assert_eq!(release_count(&host, key), 1);
        assert_eq!(outstanding(&host), 0);
    }

    #[test]
    fn attach_then_drop_never_releases() {
        let host = Host::new();
        let key = host
            .write(|m| {
                let key = m.create_entity();
                m.attach_to_model(key).map(|_| key)
            })
            .unwrap()
            .unwrap();

        let mut handle = OwnershipHandle::owned(&host, key);
        handle.mark_attached();
        handle.mark_attached();
        assert_eq!(handle.state(), Ownership::Attached);
        drop(handle);

        assert_eq!(release_count(&host, key), 0);
        assert_eq!(host.with_model(NativeModel::rejected_releases), 0);
    }

    #[test]
    fn mark_attached_does_not_revive_invalid() {
        let mut handle = OwnershipHandle::<EntityKey>::invalid();
        handle.mark_attached();
        assert_eq!(handle.state(), Ownership::Invalid);
        assert!(!handle.is_valid());
    }

    #[test]
    fn create_with_invalid_state_drops_the_key() {
        let host = Host::new();
        let key = host.write(|m| m.create_typed_value()).unwrap();
        let handle = OwnershipHandle::create(&host, key, Ownership::Invalid);
        assert!(!handle.is_valid());
        assert_eq!(handle.key(), None);

        drop(handle);
        host.write(|m| m.release_typed_value(key)).unwrap().unwrap();
    }

    #[test]
    fn share_is_an_attached_alias() {
        let host = Host::new();
        let handle = typed_value(&host);
        let alias = handle.share();

        assert_eq!(alias, handle);
        assert_eq!(alias.state(), Ownership::Attached);

        let key = handle.key().unwrap();
        drop(alias);
        assert_eq!(release_count(&host, key), 0);
        drop(handle);
        assert_eq!(release_count(&host, key), 1);
    }

    #[test]
    fn duplicate_of_owned_is_a_new_resource() {
        let host = Host::new();
        let handle = typed_value(&host);
        let copy = handle.duplicate(|m, k| m.copy_typed_value(k));

        assert_eq!(copy.state(), Ownership::Owned);
        assert_ne!(copy, handle);
        assert_eq!(outstanding(&host), 2);

        drop(handle);
        drop(copy);
        assert_eq!(outstanding(&host), 0);
        assert_eq!(host.with_model(NativeModel::rejected_releases), 0);
    }

    #[test]
    fn failed_copy_is_invalid() {
        let host = Host::new();
        let key = host.write(|m| m.add_vertex(0.0, 0.0, 0.0)).unwrap();
        let handle = OwnershipHandle::owned(&host, key);
        let copy = handle.deep_copy(|m, k| m.duplicate_entity(k));
        assert!(!copy.is_valid());

        // Vertices belong to the model; keep the test handle from releasing.
        let mut handle = handle;
        handle.mark_attached();
    }

    #[test]
    fn identity_equality() {
        let host = Host::new();
        let a = typed_value(&host);
        let b = typed_value(&host);
        assert_ne!(a, b);
        assert_eq!(a, a.share());
        assert_eq!(
            OwnershipHandle::<TypedValueKey>::invalid(),
            OwnershipHandle::<TypedValueKey>::invalid()
        );
        assert_ne!(a, OwnershipHandle::invalid());
    }

    /// Operations applied to a working set of handles.
    #[derive(Debug, Clone, Copy)]
    enum Op {
        Duplicate,
        Share,
        Attach,
        DropLast,
    }

    fn apply(host: &Host, handles: &mut Vec<OwnershipHandle<EntityKey>>, op: Op) {
        let Some(last) = handles.last_mut() else {
            return;
        };
        match op {
            Op::Duplicate => {
                let copy = last.duplicate(|m, k| m.duplicate_entity(k));
                handles.push(copy);
            }
            Op::Share => {
                let alias = last.share();
                handles.push(alias);
            }
            Op::Attach => {
                if last.state() == Ownership::Owned {
                    let key = last.key().unwrap();
                    host.write(|m| m.attach_to_model(key)).unwrap().unwrap();
                }
                last.mark_attached();
            }
            Op::DropLast => {
                handles.pop();
            }
        }
    }

    #[test]
    fn every_sequence_releases_each_owned_resource_exactly_once() {
        const OPS: [Op; 4] = [Op::Duplicate, Op::Share, Op::Attach, Op::DropLast];

        // All sequences of up to four operations.
        let mut sequences: Vec<Vec<Op>> = vec![Vec::new()];
        let mut frontier = sequences.clone();
        for _ in 0..4 {
            frontier = frontier
                .iter()
                .flat_map(|seq| {
                    OPS.iter().map(move |&op| {
                        let mut longer = seq.clone();
                        longer.push(op);
                        longer
                    })
                })
                .collect();
            sequences.extend(frontier.iter().cloned());
        }

        for seq in &sequences {
            let host = Host::new();
            let mut handles = vec![OwnershipHandle::allocate(&host, NativeModel::create_entity)];
            for &op in seq {
                apply(&host, &mut handles, op);
            }

            // Every key still owned at the end must be released exactly once
            // by the drops below; every attached key never.
            let owned: Vec<EntityKey> = handles
                .iter()
                .filter(|h| h.state() == Ownership::Owned)
                .filter_map(|h| h.key())
                .collect();
            drop(handles);

            host.with_model(|model| {
                assert_eq!(model.rejected_releases(), 0, "sequence {seq:?}");
                assert_eq!(model.outstanding(), 0, "sequence {seq:?}");
                for key in owned {
                    assert_eq!(model.release_count(key.into()), 1, "sequence {seq:?}");
                }
            });
        }
    }
}
