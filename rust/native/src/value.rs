// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed value payloads and their storage in the model.
//!
//! A typed value is a native resource like any other: it is created empty,
//! receives exactly one payload variant at a time and is released by whoever
//! owns it. Values nested in an array payload are materialized as child
//! resources owned by the array value; they are read-only and are released
//! together with their parent.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::{NativeRef, TypedValueKey};
use crate::model::NativeModel;

/// Four-channel byte color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 255)
    }
}

/// Discriminant for the variant a typed value currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedValueType {
    Empty = 0,
    Byte = 1,
    Int16 = 2,
    Int32 = 3,
    Float = 4,
    Double = 5,
    Bool = 6,
    Color = 7,
    Time = 8,
    String = 9,
    Vector3D = 10,
    Array = 11,
}

/// The data held by a typed value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Payload {
    #[default]
    Empty,
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Float(f32),
    Double(f64),
    Bool(bool),
    Color(Color),
    /// Seconds since the Unix epoch.
    Time(i64),
    String(String),
    Vector3D([f64; 3]),
    Array(Vec<Payload>),
}

impl Payload {
    /// Returns the variant discriminant.
    pub fn value_type(&self) -> TypedValueType {
        match self {
            Payload::Empty => TypedValueType::Empty,
            Payload::Byte(_) => TypedValueType::Byte,
            Payload::Int16(_) => TypedValueType::Int16,
            Payload::Int32(_) => TypedValueType::Int32,
            Payload::Float(_) => TypedValueType::Float,
            Payload::Double(_) => TypedValueType::Double,
            Payload::Bool(_) => TypedValueType::Bool,
            Payload::Color(_) => TypedValueType::Color,
            Payload::Time(_) => TypedValueType::Time,
            Payload::String(_) => TypedValueType::String,
            Payload::Vector3D(_) => TypedValueType::Vector3D,
            Payload::Array(_) => TypedValueType::Array,
        }
    }

    fn mismatch(&self, expected: TypedValueType) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.value_type(),
        }
    }

    pub fn as_byte(&self) -> Result<u8> {
        match *self {
            Payload::Byte(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Byte)),
        }
    }

    /// Int16 read; a byte widens losslessly.
    pub fn as_int16(&self) -> Result<i16> {
        match *self {
            Payload::Int16(v) => Ok(v),
            Payload::Byte(v) => Ok(i16::from(v)),
            _ => Err(self.mismatch(TypedValueType::Int16)),
        }
    }

    /// Int32 read; a byte or int16 widens losslessly.
    pub fn as_int32(&self) -> Result<i32> {
        match *self {
            Payload::Int32(v) => Ok(v),
            Payload::Int16(v) => Ok(i32::from(v)),
            Payload::Byte(v) => Ok(i32::from(v)),
            _ => Err(self.mismatch(TypedValueType::Int32)),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match *self {
            Payload::Float(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Float)),
        }
    }

    /// Double read; a float widens losslessly.
    pub fn as_double(&self) -> Result<f64> {
        match *self {
            Payload::Double(v) => Ok(v),
            Payload::Float(v) => Ok(f64::from(v)),
            _ => Err(self.mismatch(TypedValueType::Double)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match *self {
            Payload::Bool(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Bool)),
        }
    }

    pub fn as_color(&self) -> Result<Color> {
        match *self {
            Payload::Color(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Color)),
        }
    }

    pub fn as_time(&self) -> Result<i64> {
        match *self {
            Payload::Time(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Time)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Payload::String(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::String)),
        }
    }

    pub fn as_vector(&self) -> Result<[f64; 3]> {
        match *self {
            Payload::Vector3D(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Vector3D)),
        }
    }

    pub fn as_array(&self) -> Result<&[Payload]> {
        match self {
            Payload::Array(v) => Ok(v),
            _ => Err(self.mismatch(TypedValueType::Array)),
        }
    }
}

macro_rules! payload_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(v: $ty) -> Self {
                    Payload::$variant(v.into())
                }
            }
        )*
    };
}

payload_from! {
    u8 => Byte,
    i16 => Int16,
    i32 => Int32,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    Color => Color,
    i64 => Time,
    String => String,
    &str => String,
    [f64; 3] => Vector3D,
    Vec<Payload> => Array,
}

/// Storage record for one typed value.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypedValueRecord {
    pub payload: Payload,
    /// The array value this value was materialized from, if any.
    pub parent: Option<TypedValueKey>,
    /// Materialized array items, in order. Empty unless `payload` is an array.
    pub items: Vec<TypedValueKey>,
}

impl NativeModel {
    /// Creates a new, empty typed value owned by the caller.
    pub fn create_typed_value(&mut self) -> TypedValueKey {
        self.typed_values.insert(TypedValueRecord::default())
    }

    /// Creates a typed value holding a copy of another value's payload.
    pub fn copy_typed_value(&mut self, source: TypedValueKey) -> Result<TypedValueKey> {
        let payload = self.typed_value(source)?.clone();
        let key = self.create_typed_value();
        self.store_payload(key, payload);
        Ok(key)
    }

    /// Returns the payload of a typed value.
    pub fn typed_value(&self, key: TypedValueKey) -> Result<&Payload> {
        self.typed_values
            .get(key)
            .map(|r| &r.payload)
            .ok_or_else(|| self.missing(key.into()))
    }

    /// Returns the variant discriminant of a typed value.
    pub fn typed_value_type(&self, key: TypedValueKey) -> Result<TypedValueType> {
        self.typed_value(key).map(Payload::value_type)
    }

    /// Replaces the payload of a typed value.
    ///
    /// Array items are read-only: setting a value that was materialized from
    /// an array fails with [`Error::Attached`].
    pub fn set_typed_value(&mut self, key: TypedValueKey, payload: Payload) -> Result<()> {
        let record = self
            .typed_values
            .get(key)
            .ok_or_else(|| self.missing(key.into()))?;
        if record.parent.is_some() {
            return Err(Error::Attached(key.into()));
        }
        self.store_payload(key, payload);
        Ok(())
    }

    /// Returns the item handles of an array value. The items are owned by the
    /// array value and must not be released by the caller.
    pub fn typed_value_items(&self, key: TypedValueKey) -> Result<&[TypedValueKey]> {
        let record = self
            .typed_values
            .get(key)
            .ok_or_else(|| self.missing(key.into()))?;
        record.payload.as_array()?;
        Ok(&record.items)
    }

    /// Returns `true` if the value is owned by an array value.
    pub fn typed_value_is_attached(&self, key: TypedValueKey) -> Result<bool> {
        self.typed_values
            .get(key)
            .map(|r| r.parent.is_some())
            .ok_or_else(|| self.missing(key.into()))
    }

    /// Releases a caller-owned typed value together with its array items.
    pub fn release_typed_value(&mut self, key: TypedValueKey) -> Result<()> {
        let native = NativeRef::from(key);
        let Some(record) = self.typed_values.get(key) else {
            return Err(self.reject_release(native));
        };
        if record.parent.is_some() {
            self.rejected_releases += 1;
            return Err(Error::Attached(native));
        }
        self.drop_typed_value(key);
        self.record_release(native);
        Ok(())
    }

    /// Writes a payload and rebuilds the materialized array items.
    fn store_payload(&mut self, key: TypedValueKey, payload: Payload) {
        let old_items = match self.typed_values.get_mut(key) {
            Some(record) => std::mem::take(&mut record.items),
            None => return,
        };
        for item in old_items {
            self.drop_typed_value(item);
        }

        let mut items = Vec::new();
        if let Payload::Array(elements) = &payload {
            for element in elements {
                let item = self.typed_values.insert(TypedValueRecord {
                    parent: Some(key),
                    ..TypedValueRecord::default()
                });
                self.store_payload(item, element.clone());
                items.push(item);
            }
        }

        if let Some(record) = self.typed_values.get_mut(key) {
            record.payload = payload;
            record.items = items;
        }
    }

    /// Removes a value and, recursively, its items. No ledger entry.
    fn drop_typed_value(&mut self, key: TypedValueKey) {
        if let Some(record) = self.typed_values.remove(key) {
            for item in record.items {
                self.drop_typed_value(item);
            }
        }
    }
}
