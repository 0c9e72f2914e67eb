use core::any::Any;
use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{Decode, Items, Shape, Stream};

/// A string-keyed mapping of dynamic values, in insertion order.
pub type Map = IndexMap<String, Value>;

/// A dynamically-typed value, as found in the source map.
///
/// Scalars keep their width and signedness so converters can range-check them.
/// Anything that does not fit one of the built-in variants can ride along as a
/// [`Native`] value, for instance an already-typed `Vec<i32>` or a record.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// A boolean
    Bool(bool),
    /// An `i8`
    I8(i8),
    /// An `i16`
    I16(i16),
    /// An `i32`
    I32(i32),
    /// An `i64`
    I64(i64),
    /// An `isize`
    Isize(isize),
    /// A `u8`
    U8(u8),
    /// A `u16`
    U16(u16),
    /// A `u32`
    U32(u32),
    /// A `u64`
    U64(u64),
    /// A `usize`
    Usize(usize),
    /// An `f32`
    F32(f32),
    /// An `f64`
    F64(f64),
    /// A UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// A list of dynamic values
    Array(Vec<Value>),
    /// A nested string-keyed mapping
    Map(Map),
    /// A readable byte stream
    Stream(Stream),
    /// An already-typed value of any decodable type
    Native(Native),
}

impl Value {
    /// Wraps a typed value.
    pub fn native<T: Decode>(value: T) -> Self {
        Value::Native(Native::new(value))
    }

    /// Returns true for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime type held by this value, for diagnostics.
    pub fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Isize(_) => "isize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Usize(_) => "usize",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Vec<u8>",
            Value::Array(_) => "Vec<Value>",
            Value::Map(_) => "Map",
            Value::Stream(_) => "Stream",
            Value::Native(native) => return Cow::Owned(native.shape().to_string()),
        })
    }

    /// The payload of this value as `Any`, or `None` for null.
    ///
    /// The payload's type is the Rust type the variant wraps: `I32` holds an
    /// `i32`, `Array` holds a `Vec<Value>`, `Native` holds whatever it was built from.
    pub fn payload(&self) -> Option<&dyn Any> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(v) => v,
            Value::I8(v) => v,
            Value::I16(v) => v,
            Value::I32(v) => v,
            Value::I64(v) => v,
            Value::Isize(v) => v,
            Value::U8(v) => v,
            Value::U16(v) => v,
            Value::U32(v) => v,
            Value::U64(v) => v,
            Value::Usize(v) => v,
            Value::F32(v) => v,
            Value::F64(v) => v,
            Value::String(v) => v,
            Value::Bytes(v) => v,
            Value::Array(v) => v,
            Value::Map(v) => v,
            Value::Stream(v) => v,
            Value::Native(v) => v.as_any(),
        })
    }

    /// Returns the payload if its runtime type is exactly `T`.
    ///
    /// Asking for `Value` itself always succeeds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        if let Some(this) = (self as &dyn Any).downcast_ref::<T>() {
            return Some(this);
        }
        self.payload()?.downcast_ref::<T>()
    }

    /// Returns the nested map, if this is one.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            Value::Native(native) => native.as_any().downcast_ref::<Map>(),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a read view over the elements if this value is sequence-shaped.
    pub fn as_items(&self) -> Option<&dyn Items> {
        match self {
            Value::Array(items) => Some(items),
            Value::Bytes(bytes) => Some(bytes),
            Value::Native(native) => native.items(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::Isize(a), Value::Isize(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::Usize(a), Value::Usize(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<u8> => Bytes,
    Vec<Value> => Array,
    Map => Map,
    Stream => Stream,
    Native => Native,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Object-safe view of a typed value stored inside [`Value::Native`].
pub trait NativeValue: Any + fmt::Debug + Send + Sync {
    /// The value as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The shape of the value's type.
    fn shape(&self) -> &'static Shape;

    /// Element view, if the value is a sequence.
    fn items(&self) -> Option<&dyn Items>;
}

impl<T: Decode> NativeValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn items(&self) -> Option<&dyn Items> {
        Decode::as_items(self)
    }
}

/// A shared, already-typed value.
#[derive(Clone)]
pub struct Native(Arc<dyn NativeValue>);

impl Native {
    /// Wraps `value`.
    pub fn new<T: Decode>(value: T) -> Self {
        Native(Arc::new(value))
    }

    /// The wrapped value as `Any`.
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }

    /// The shape of the wrapped value.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        self.0.shape()
    }

    /// Element view, if the wrapped value is a sequence.
    #[inline]
    pub fn items(&self) -> Option<&dyn Items> {
        self.0.items()
    }

    /// Returns the wrapped value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Builds a [`Map`] from `key => value` pairs.
///
/// Values go through [`Value::from`], so nested `map!` invocations, strings,
/// numbers and `Vec<Value>` all work directly.
///
/// ```
/// use mapcast::{map, Value};
///
/// let m = map! {
///     "name" => "Alice",
///     "age" => 30,
///     "address" => map! { "city" => "Paris" },
/// };
/// assert_eq!(m["age"], Value::I32(30));
/// ```
#[macro_export]
macro_rules! map {
    () => {
        $crate::Map::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Map::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        map
    }};
}
