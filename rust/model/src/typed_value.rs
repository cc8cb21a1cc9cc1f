// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged-union values stored in the native model.
//!
//! A [`TypedValue`] holds at most one variant at a time. Reading a variant
//! that is not active returns that type's default instead of reinterpreting
//! the stored bits; the only conversions are lossless widenings
//! (byte to int16/int32, int16 to int32, float to double).
//!
//! ```
//! use geowrap::{Host, TypedValue};
//!
//! let host = Host::new();
//! let mut value = TypedValue::of(&host, -42);
//! assert_eq!(value.int32_value(), -42);
//!
//! value.set_string("a");
//! assert_eq!(value.int32_value(), 0);
//! assert_eq!(value.string_value(), "a");
//! ```

use std::fmt;

use geowrap_native::{Color, NativeModel, Payload, TypedValueKey, TypedValueType};
use nalgebra::Vector3;

use crate::host::Host;
use crate::ownership::{Ownership, OwnershipHandle};

/// A single typed value.
pub struct TypedValue {
    handle: OwnershipHandle<TypedValueKey>,
}

impl TypedValue {
    /// The null value. Every getter returns its default and every setter is
    /// a no-op.
    pub fn null() -> Self {
        Self {
            handle: OwnershipHandle::invalid(),
        }
    }

    /// Creates an empty value owned by the caller.
    pub fn new(host: &Host) -> Self {
        Self {
            handle: OwnershipHandle::allocate(host, NativeModel::create_typed_value),
        }
    }

    /// Creates a value holding `value`.
    pub fn of(host: &Host, value: impl Into<Payload>) -> Self {
        let mut typed = Self::new(host);
        typed.set_payload(value.into());
        typed
    }

    /// Wraps a value owned by someone else, such as an array item.
    pub fn from_native(host: &Host, key: TypedValueKey) -> Self {
        Self {
            handle: OwnershipHandle::attached(host, key),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn ownership(&self) -> Ownership {
        self.handle.state()
    }

    pub fn key(&self) -> Option<TypedValueKey> {
        self.handle.key()
    }

    pub fn host(&self) -> Option<&Host> {
        self.handle.host()
    }

    /// Returns `true` if the value holds no variant. Null values are empty.
    pub fn is_empty(&self) -> bool {
        self.value_type() == TypedValueType::Empty
    }

    /// The active variant.
    pub fn value_type(&self) -> TypedValueType {
        self.handle
            .read(|m, k| m.typed_value_type(k))
            .unwrap_or(TypedValueType::Empty)
    }

    /// A copy of the stored payload.
    pub fn payload(&self) -> Payload {
        self.handle
            .read(|m, k| m.typed_value(k).cloned())
            .unwrap_or_default()
    }

    /// Replaces the payload, switching the active variant. Ignored on null
    /// values and array items.
    pub fn set_payload(&mut self, payload: Payload) -> &mut Self {
        self.handle.write(|m, k| m.set_typed_value(k, payload));
        self
    }

    fn get<T: Default>(&self, f: impl FnOnce(&Payload) -> geowrap_native::Result<T>) -> T {
        self.handle
            .read(|m, k| m.typed_value(k).and_then(f))
            .unwrap_or_default()
    }

    pub fn byte_value(&self) -> u8 {
        self.get(Payload::as_byte)
    }

    pub fn int16_value(&self) -> i16 {
        self.get(Payload::as_int16)
    }

    pub fn int32_value(&self) -> i32 {
        self.get(Payload::as_int32)
    }

    pub fn float_value(&self) -> f32 {
        self.get(Payload::as_float)
    }

    pub fn double_value(&self) -> f64 {
        self.get(Payload::as_double)
    }

    pub fn bool_value(&self) -> bool {
        self.get(Payload::as_bool)
    }

    /// Defaults to transparent black.
    pub fn color_value(&self) -> Color {
        self.get(Payload::as_color)
    }

    /// Seconds since the Unix epoch.
    pub fn time_value(&self) -> i64 {
        self.get(Payload::as_time)
    }

    pub fn string_value(&self) -> String {
        self.get(|p| p.as_str().map(str::to_string))
    }

    pub fn vector_value(&self) -> Vector3<f64> {
        let [x, y, z] = self.get(Payload::as_vector);
        Vector3::new(x, y, z)
    }

    /// Fresh, caller-owned copies of the array items.
    pub fn array_value(&self) -> Vec<TypedValue> {
        let Some(host) = self.host() else {
            return Vec::new();
        };
        let copies = self.handle.write(|m, k| {
            let items = m.typed_value_items(k)?.to_vec();
            items
                .into_iter()
                .map(|item| m.copy_typed_value(item))
                .collect::<geowrap_native::Result<Vec<_>>>()
        });
        copies
            .unwrap_or_default()
            .into_iter()
            .map(|key| TypedValue {
                handle: OwnershipHandle::owned(host, key),
            })
            .collect()
    }

    /// Read-only views of the array items. They stay valid until this value
    /// is set again or released.
    pub fn array_items(&self) -> Vec<TypedValue> {
        let Some(host) = self.host() else {
            return Vec::new();
        };
        self.handle
            .read(|m, k| m.typed_value_items(k).map(<[TypedValueKey]>::to_vec))
            .unwrap_or_default()
            .into_iter()
            .map(|key| TypedValue::from_native(host, key))
            .collect()
    }

    pub fn set_byte(&mut self, value: u8) -> &mut Self {
        self.set_payload(Payload::Byte(value))
    }

    pub fn set_int16(&mut self, value: i16) -> &mut Self {
        self.set_payload(Payload::Int16(value))
    }

    pub fn set_int32(&mut self, value: i32) -> &mut Self {
        self.set_payload(Payload::Int32(value))
    }

    pub fn set_float(&mut self, value: f32) -> &mut Self {
        self.set_payload(Payload::Float(value))
    }

    pub fn set_double(&mut self, value: f64) -> &mut Self {
        self.set_payload(Payload::Double(value))
    }

    pub fn set_bool(&mut self, value: bool) -> &mut Self {
        self.set_payload(Payload::Bool(value))
    }

    pub fn set_color(&mut self, value: Color) -> &mut Self {
        self.set_payload(Payload::Color(value))
    }

    pub fn set_time(&mut self, value: i64) -> &mut Self {
        self.set_payload(Payload::Time(value))
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.set_payload(Payload::String(value.into()))
    }

    pub fn set_vector(&mut self, value: Vector3<f64>) -> &mut Self {
        self.set_payload(Payload::Vector3D([value.x, value.y, value.z]))
    }

    /// Replaces the whole array. Null entries are stored as empty values.
    pub fn set_array(&mut self, values: &[TypedValue]) -> &mut Self {
        let items = values.iter().map(TypedValue::payload).collect();
        self.set_payload(Payload::Array(items))
    }
}

/// Deep copy: the clone is a new value owned by the caller.
impl Clone for TypedValue {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.deep_copy(|m, k| m.copy_typed_value(k)),
        }
    }
}

/// Compares the active variant and its value.
impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (true, true) => self.payload() == other.payload(),
            (false, false) => true,
            _ => false,
        }
    }
}

impl Default for TypedValue {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("TypedValue(null)");
        }
        f.debug_struct("TypedValue")
            .field("payload", &self.payload())
            .field("ownership", &self.ownership())
            .finish()
    }
}
