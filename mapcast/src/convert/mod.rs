//! Value converters and the registry the decoder consults.

use core::any::{Any, TypeId};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{ConvertError, Decode, Shape, Value};

mod builtin;
pub use builtin::builtin_converters;

type ConvertFn = dyn Fn(&Value) -> Result<Box<dyn Any + Send>, ConvertError> + Send + Sync;

/// Turns a dynamic [`Value`] into one specific target type.
#[derive(Clone)]
pub struct Converter {
    target: &'static Shape,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Creates a converter producing `T`.
    pub fn new<T, F>(func: F) -> Self
    where
        T: Decode,
        F: Fn(&Value) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        Self {
            target: T::SHAPE,
            func: Arc::new(move |value: &Value| {
                func(value).map(|out| Box::new(out) as Box<dyn Any + Send>)
            }),
        }
    }

    /// The type this converter produces.
    #[inline]
    pub fn target(&self) -> &'static Shape {
        self.target
    }

    /// Converts `value`, returning the output type-erased.
    #[inline]
    pub fn convert(&self, value: &Value) -> Result<Box<dyn Any + Send>, ConvertError> {
        (self.func)(value)
    }

    /// Converts `value` into `T`, which must be the converter's target.
    pub fn convert_to<T: Decode>(&self, value: &Value) -> Result<T, ConvertError> {
        self.convert(value)?
            .downcast::<T>()
            .map(|out| *out)
            .map_err(|_| ConvertError::WrongOutput {
                expected: self.target,
            })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.target)
    }
}

/// A set of converters, one per target type.
#[derive(Clone, Default)]
pub struct ConverterMap {
    converters: HashMap<TypeId, Converter>,
}

impl ConverterMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `converter`, replacing any previous one for the same target.
    pub fn insert(&mut self, converter: Converter) -> Option<Converter> {
        self.converters
            .insert(converter.target.id.get(), converter)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, converter: Converter) -> Self {
        self.insert(converter);
        self
    }

    /// Shorthand for `with(Converter::new::<T, _>(func))`.
    pub fn with_fn<T, F>(self, func: F) -> Self
    where
        T: Decode,
        F: Fn(&Value) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        self.with(Converter::new::<T, F>(func))
    }

    /// Number of converters.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Returns true if there are no converters.
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl FromIterator<Converter> for ConverterMap {
    fn from_iter<I: IntoIterator<Item = Converter>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl Extend<Converter> for ConverterMap {
    fn extend<I: IntoIterator<Item = Converter>>(&mut self, iter: I) {
        for converter in iter {
            self.insert(converter);
        }
    }
}

impl fmt::Debug for ConverterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.converters.values()).finish()
    }
}

/// Immutable lookup of converters by target type.
///
/// Built by merging [`ConverterMap`]s left to right; a later map's converter
/// replaces an earlier one for the same target.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<TypeId, Converter>,
}

impl ConverterRegistry {
    /// Merges `maps` without any built-in converters.
    pub fn new(maps: impl IntoIterator<Item = ConverterMap>) -> Self {
        let mut converters = HashMap::new();
        for map in maps {
            converters.extend(map.converters);
        }
        Self { converters }
    }

    /// Merges the built-in converters, then `maps` on top.
    pub fn with_defaults(maps: impl IntoIterator<Item = ConverterMap>) -> Self {
        Self::new(core::iter::once(builtin_converters()).chain(maps))
    }

    /// Finds the converter for exactly `shape`.
    #[inline]
    pub fn find(&self, shape: &Shape) -> Option<&Converter> {
        self.converters.get(&shape.id.get())
    }

    /// Finds the converter for `T`.
    pub fn get<T: Decode>(&self) -> Option<&Converter> {
        self.converters.get(&TypeId::of::<T>())
    }

    /// Number of registered target types.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Returns true if no converter is registered.
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults([])
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.converters.values()).finish()
    }
}
