//! The [`Decode`] trait and the erased [`Target`] view the decoder writes through.

use core::any::Any;
use core::fmt;
use core::time::Duration;
use std::collections::VecDeque;

use crate::{
    ConstTypeId, ConversionError, Def, ListDef, Map, PointerDef, ReadCloser, Shape, Stream,
    Value,
};

/// A type that can be produced by the decoder.
///
/// Implemented for scalars, strings, `Vec`, `VecDeque`, `Option`, `Box`, [`Value`],
/// [`Map`], streams and `Duration`. Records get it from `#[derive(Decode)]`.
pub trait Decode: Any + Clone + Default + fmt::Debug + Send + Sync {
    /// Static description of the type.
    const SHAPE: &'static Shape;

    /// Structural access for the decoder. Leaf types keep the default.
    fn slot(&mut self) -> Slot<'_> {
        Slot::Scalar
    }

    /// Lifts the value into a dynamic [`Value`].
    fn to_value(&self) -> Value {
        Value::native(self.clone())
    }

    /// Element view, for sequence types.
    fn as_items(&self) -> Option<&dyn Items> {
        None
    }
}

/// Object-safe handle on a destination slot.
///
/// Every [`Decode`] type is a `Target`; the decoder only ever sees `&mut dyn Target`.
pub trait Target {
    /// Shape of the destination type.
    fn shape(&self) -> &'static Shape;

    /// Clones `value` in if it has exactly the destination type.
    fn assign(&mut self, value: &dyn Any) -> bool;

    /// Moves a converter's output in if it has exactly the destination type.
    fn put(&mut self, value: Box<dyn Any + Send>) -> bool;

    /// Structural access to the destination.
    fn slot(&mut self) -> Slot<'_>;
}

impl<T: Decode> Target for T {
    #[inline]
    fn shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn assign(&mut self, value: &dyn Any) -> bool {
        match value.downcast_ref::<T>() {
            Some(value) => {
                *self = value.clone();
                true
            }
            None => false,
        }
    }

    fn put(&mut self, value: Box<dyn Any + Send>) -> bool {
        match value.downcast::<T>() {
            Ok(value) => {
                *self = *value;
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    fn slot(&mut self) -> Slot<'_> {
        <T as Decode>::slot(self)
    }
}

/// Structural access to a destination, by kind.
pub enum Slot<'a> {
    /// A leaf: only assignment or a converter can fill it.
    Scalar,
    /// An `Option` or `Box`.
    Pointer(&'a mut dyn PointerSlot),
    /// A `Vec` or `VecDeque`.
    Sequence(&'a mut dyn SequenceSlot),
    /// A derived record.
    Record(&'a mut dyn RecordSlot),
    /// A [`Value`], which takes anything as-is.
    Dynamic(&'a mut Value),
}

/// Pointer-shaped destinations.
pub trait PointerSlot {
    /// Resets the pointer to its empty state.
    fn clear(&mut self);

    /// Returns the pointee, allocating it first if the pointer is empty.
    fn pointee(&mut self) -> &mut dyn Target;
}

/// Sequence-shaped destinations.
pub trait SequenceSlot {
    /// Shape of the element type.
    fn item_shape(&self) -> &'static Shape;

    /// Removes all elements.
    fn clear(&mut self);

    /// Builds `len` default elements, runs `fill` on each in order, and
    /// replaces the contents only if every call succeeds. On failure the
    /// destination keeps what it held before.
    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Target) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError>;

    /// Replaces the contents with clones of `items` if they have exactly the
    /// destination element type. Returns false, leaving the destination
    /// untouched, otherwise.
    fn copy_from(&mut self, items: &dyn Items) -> bool;
}

/// Record-shaped destinations, implemented by `#[derive(Decode)]`.
pub trait RecordSlot {
    /// Returns the field at `position` in the field table, or `None` if the
    /// field is not `pub`.
    fn field_mut(&mut self, position: usize) -> Option<&mut dyn Target>;
}

/// Read view over the elements of a sequence-shaped value.
pub trait Items {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns true if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of the element type.
    fn item_shape(&self) -> &'static Shape;

    /// The element at `index`, for same-type copies.
    fn item_any(&self, index: usize) -> Option<&dyn Any>;

    /// The element at `index`, lifted into a [`Value`].
    fn item_value(&self, index: usize) -> Option<Value>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Decode for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape {
                        id: ConstTypeId::of::<$ty>(),
                        type_identifier: stringify!($ty),
                        def: Def::Scalar,
                    }
                };

                #[inline]
                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }
        )*
    };
}

impl_scalar! {
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
    Stream => Stream,
}

impl Decode for Duration {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Duration>(),
            type_identifier: "Duration",
            def: Def::Scalar,
        }
    };
}

impl Decode for ReadCloser {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<ReadCloser>(),
            type_identifier: "ReadCloser",
            def: Def::Scalar,
        }
    };
}

impl Decode for Map {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Map>(),
            type_identifier: "Map",
            def: Def::Scalar,
        }
    };

    fn to_value(&self) -> Value {
        Value::Map(self.clone())
    }
}

impl Decode for Value {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Value>(),
            type_identifier: "Value",
            def: Def::DynamicValue,
        }
    };

    fn slot(&mut self) -> Slot<'_> {
        Slot::Dynamic(self)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn as_items(&self) -> Option<&dyn Items> {
        Value::as_items(self)
    }
}

impl<T: Decode> Decode for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Option<T>>(),
            type_identifier: "Option",
            def: Def::Pointer(PointerDef {
                pointee: || T::SHAPE,
            }),
        }
    };

    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }
}

impl<T: Decode> PointerSlot for Option<T> {
    fn clear(&mut self) {
        *self = None;
    }

    fn pointee(&mut self) -> &mut dyn Target {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Decode> Decode for Box<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Box<T>>(),
            type_identifier: "Box",
            def: Def::Pointer(PointerDef {
                pointee: || T::SHAPE,
            }),
        }
    };

    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }

    fn to_value(&self) -> Value {
        T::to_value(self)
    }
}

impl<T: Decode> PointerSlot for Box<T> {
    fn clear(&mut self) {
        **self = T::default();
    }

    fn pointee(&mut self) -> &mut dyn Target {
        &mut **self
    }
}

/// Copies `items` into a fresh collection if their element type is exactly `T`.
fn clone_items<T: Decode, C: FromIterator<T>>(items: &dyn Items) -> Option<C> {
    if !items.item_shape().is_type::<T>() {
        return None;
    }
    (0..items.len())
        .map(|index| items.item_any(index)?.downcast_ref::<T>().cloned())
        .collect()
}

impl<T: Decode> Decode for Vec<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Vec<T>>(),
            type_identifier: "Vec",
            def: Def::List(ListDef { item: || T::SHAPE }),
        }
    };

    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }

    fn to_value(&self) -> Value {
        let any: &dyn Any = self;
        if let Some(bytes) = any.downcast_ref::<Vec<u8>>() {
            return Value::Bytes(bytes.clone());
        }
        if let Some(values) = any.downcast_ref::<Vec<Value>>() {
            return Value::Array(values.clone());
        }
        Value::native(self.clone())
    }

    fn as_items(&self) -> Option<&dyn Items> {
        Some(self)
    }
}

impl<T: Decode> SequenceSlot for Vec<T> {
    fn item_shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Target) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError> {
        let mut fresh = Vec::with_capacity(len);
        fresh.resize_with(len, T::default);
        for (index, item) in fresh.iter_mut().enumerate() {
            fill(index, item as &mut dyn Target)?;
        }
        *self = fresh;
        Ok(())
    }

    fn copy_from(&mut self, items: &dyn Items) -> bool {
        match clone_items::<T, Vec<T>>(items) {
            Some(copied) => {
                *self = copied;
                true
            }
            None => false,
        }
    }
}

impl<T: Decode> Items for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item_shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn item_any(&self, index: usize) -> Option<&dyn Any> {
        self.get(index).map(|item| item as &dyn Any)
    }

    fn item_value(&self, index: usize) -> Option<Value> {
        self.get(index).map(T::to_value)
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<VecDeque<T>>(),
            type_identifier: "VecDeque",
            def: Def::List(ListDef { item: || T::SHAPE }),
        }
    };

    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }

    fn as_items(&self) -> Option<&dyn Items> {
        Some(self)
    }
}

impl<T: Decode> SequenceSlot for VecDeque<T> {
    fn item_shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Target) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError> {
        let mut fresh = VecDeque::with_capacity(len);
        fresh.resize_with(len, T::default);
        for (index, item) in fresh.iter_mut().enumerate() {
            fill(index, item as &mut dyn Target)?;
        }
        *self = fresh;
        Ok(())
    }

    fn copy_from(&mut self, items: &dyn Items) -> bool {
        match clone_items::<T, VecDeque<T>>(items) {
            Some(copied) => {
                *self = copied;
                true
            }
            None => false,
        }
    }
}

impl<T: Decode> Items for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn item_shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn item_any(&self, index: usize) -> Option<&dyn Any> {
        self.get(index).map(|item| item as &dyn Any)
    }

    fn item_value(&self, index: usize) -> Option<Value> {
        self.get(index).map(T::to_value)
    }
}
