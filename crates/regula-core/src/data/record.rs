//! Record capability: named numeric fields on an observation

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// A value read from a record field before numeric conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Floating point value
    Float(f64),
    /// Integer value
    Int(i64),
    /// Boolean value, read as 1.0 / 0.0
    Bool(bool),
    /// Text value, parsed as a float
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Get data type
    pub const fn dtype(&self) -> &'static str {
        match self {
            FieldValue::Float(_) => "float",
            FieldValue::Int(_) => "int",
            FieldValue::Bool(_) => "bool",
            FieldValue::Text(_) => "text",
        }
    }

    /// Convert to a float, `None` if the value is not numeric
    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Float(v) => Some(v),
            FieldValue::Int(v) => Some(v as f64),
            FieldValue::Bool(v) => Some(if v { 1.0 } else { 0.0 }),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Types that can be stored in a record field
pub trait AsFieldValue {
    /// View the value as a [`FieldValue`]
    fn as_field_value(&self) -> FieldValue<'_>;
}

impl AsFieldValue for f64 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(*self)
    }
}

impl AsFieldValue for f32 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(f64::from(*self))
    }
}

impl AsFieldValue for i64 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Int(*self)
    }
}

impl AsFieldValue for i32 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Int(i64::from(*self))
    }
}

impl AsFieldValue for u32 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Int(i64::from(*self))
    }
}

impl AsFieldValue for bool {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

impl AsFieldValue for str {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl AsFieldValue for String {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self.as_str())
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for &T {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

/// An observation exposing named fields
///
/// Field names are resolved to an [`Record::Accessor`] once per name; the
/// accessor is then used to read every row. Resolution returning `None`
/// means the record type has no such field at all.
pub trait Record {
    /// Resolved handle for one field
    type Accessor;

    /// Resolve a field name, `None` if the type has no such field
    fn accessor(name: &str) -> Option<Self::Accessor>;

    /// Read a field from this record, `None` if this row lacks it
    fn read(&self, accessor: &Self::Accessor) -> Option<FieldValue<'_>>;
}

/// Implement [`Record`] for a struct by listing its numeric fields
///
/// ```
/// use regula_core::impl_record;
///
/// struct Department {
///     lottery: f64,
///     literacy: i32,
/// }
///
/// impl_record!(Department {
///     lottery => "Lottery",
///     literacy => "Literacy",
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident => $name:literal),+ $(,)? }) => {
        impl $crate::data::Record for $ty {
            type Accessor = for<'r> fn(&'r $ty) -> $crate::data::FieldValue<'r>;

            fn accessor(name: &str) -> ::core::option::Option<Self::Accessor> {
                $(
                    if name == $name {
                        let accessor: Self::Accessor =
                            |record| $crate::data::AsFieldValue::as_field_value(&record.$field);
                        return ::core::option::Option::Some(accessor);
                    }
                )+
                ::core::option::Option::None
            }

            fn read(
                &self,
                accessor: &Self::Accessor,
            ) -> ::core::option::Option<$crate::data::FieldValue<'_>> {
                ::core::option::Option::Some(accessor(self))
            }
        }
    };
}

impl<V: AsFieldValue, S: BuildHasher> Record for HashMap<String, V, S> {
    type Accessor = String;

    fn accessor(name: &str) -> Option<Self::Accessor> {
        Some(name.to_string())
    }

    fn read(&self, key: &Self::Accessor) -> Option<FieldValue<'_>> {
        self.get(key).map(V::as_field_value)
    }
}

impl<V: AsFieldValue, S: BuildHasher> Record for IndexMap<String, V, S> {
    type Accessor = String;

    fn accessor(name: &str) -> Option<Self::Accessor> {
        Some(name.to_string())
    }

    fn read(&self, key: &Self::Accessor) -> Option<FieldValue<'_>> {
        self.get(key).map(V::as_field_value)
    }
}

impl<V: AsFieldValue> Record for BTreeMap<String, V> {
    type Accessor = String;

    fn accessor(name: &str) -> Option<Self::Accessor> {
        Some(name.to_string())
    }

    fn read(&self, key: &Self::Accessor) -> Option<FieldValue<'_>> {
        self.get(key).map(V::as_field_value)
    }
}
