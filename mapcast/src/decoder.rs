//! The recursive decoding engine.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{
    ConversionError, ConvertError, ConverterRegistry, Decode, DecodeError, FieldDescriptor,
    Items, Map, MetadataCache, PointerSlot, RecordSlot, SequenceSlot, Shape, Slot, Target,
    ValidationError, Value, trace,
};

/// Decodes source maps into typed destinations.
///
/// A decoder is cheap to clone and safe to share between threads: the field
/// metadata cache and the converter registry sit behind `Arc`s.
///
/// ```
/// use mapcast::{Decode, Decoder, map};
///
/// #[derive(Debug, Clone, Default, Decode)]
/// struct Server {
///     #[mapcast(schema = "host")]
///     pub host: String,
///     #[mapcast(schema = "port", default = "8080")]
///     pub port: u16,
/// }
///
/// let decoder = Decoder::default();
/// let server: Server = decoder.from_map(&map! { "host" => "localhost" }).unwrap();
/// assert_eq!(server.host, "localhost");
/// assert_eq!(server.port, 8080);
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    cache: Arc<MetadataCache>,
    converters: Arc<ConverterRegistry>,
}

/// What the engine is currently looking at.
///
/// The root source is a bare [`Map`]; everything below it is a [`Value`]. Keeping
/// both avoids cloning the root map into a `Value` up front.
#[derive(Clone, Copy)]
enum Input<'a> {
    Map(&'a Map),
    Value(&'a Value),
}

impl<'a> Input<'a> {
    fn is_null(self) -> bool {
        matches!(self, Input::Value(Value::Null))
    }

    fn as_value(self) -> Cow<'a, Value> {
        match self {
            Input::Map(map) => Cow::Owned(Value::Map(map.clone())),
            Input::Value(value) => Cow::Borrowed(value),
        }
    }

    fn to_value(self) -> Value {
        self.as_value().into_owned()
    }

    fn as_map(self) -> Option<&'a Map> {
        match self {
            Input::Map(map) => Some(map),
            Input::Value(value) => value.as_map(),
        }
    }
}

impl Decoder {
    /// Creates a decoder from a metadata cache and a converter registry.
    pub fn new(cache: Arc<MetadataCache>, converters: Arc<ConverterRegistry>) -> Self {
        Self { cache, converters }
    }

    /// The metadata cache.
    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// The converter registry.
    pub fn converters(&self) -> &Arc<ConverterRegistry> {
        &self.converters
    }

    /// Decodes `source` into `destination`.
    ///
    /// Fields whose keys are missing from `source` and that have no default are
    /// left as they were. On failure the destination may be partially written.
    pub fn decode<T: Decode>(&self, source: &Map, destination: &mut T) -> Result<(), DecodeError> {
        self.decode_dyn(source, Some(destination as &mut dyn Target))
    }

    /// Decodes `source` into an erased destination.
    ///
    /// A `None` destination fails with a [`ValidationError`] before anything is read.
    pub fn decode_dyn(
        &self,
        source: &Map,
        destination: Option<&mut dyn Target>,
    ) -> Result<(), DecodeError> {
        let Some(destination) = destination else {
            return Err(ValidationError::new("result pointer is nil").into());
        };
        self.resolve(Input::Map(source), destination)?;
        Ok(())
    }

    /// Decodes `source` into a fresh `T::default()`.
    pub fn from_map<T: Decode>(&self, source: &Map) -> Result<T, DecodeError> {
        let mut out = T::default();
        self.decode(source, &mut out)?;
        Ok(out)
    }

    /// Decodes any value, not only a map, into `destination`.
    pub fn decode_value(
        &self,
        source: &Value,
        destination: &mut dyn Target,
    ) -> Result<(), DecodeError> {
        self.resolve(Input::Value(source), destination)?;
        Ok(())
    }

    fn resolve(&self, input: Input<'_>, destination: &mut dyn Target) -> Result<(), ConversionError> {
        let shape = destination.shape();

        let assigned = match input {
            Input::Map(map) => destination.assign(map),
            Input::Value(Value::Null) => false,
            Input::Value(value) => {
                destination.assign(value)
                    || value
                        .payload()
                        .is_some_and(|payload| destination.assign(payload))
            }
        };
        if assigned {
            return Ok(());
        }

        if let Some(converter) = self.converters.find(shape) {
            trace!("converting into {shape}");
            let value = input.as_value();
            let cause = match converter.convert(&value) {
                Ok(out) => {
                    if destination.put(out) {
                        return Ok(());
                    }
                    ConvertError::WrongOutput { expected: shape }
                }
                Err(cause) => cause,
            };
            return Err(ConversionError::new(value.into_owned(), shape, Some(cause)));
        }

        match destination.slot() {
            Slot::Pointer(pointer) => self.resolve_pointer(input, pointer),
            Slot::Sequence(sequence) => self.resolve_sequence(input, sequence, shape),
            Slot::Record(record) => self.resolve_record(input, record, shape),
            Slot::Dynamic(_) if input.is_null() => Err(ConversionError::new(
                Value::Null,
                shape,
                Some(ConvertError::NoConverter),
            )),
            Slot::Dynamic(slot) => {
                *slot = input.to_value();
                Ok(())
            }
            Slot::Scalar => Err(ConversionError::new(
                input.to_value(),
                shape,
                Some(ConvertError::NoConverter),
            )),
        }
    }

    fn resolve_pointer(
        &self,
        input: Input<'_>,
        pointer: &mut dyn PointerSlot,
    ) -> Result<(), ConversionError> {
        if input.is_null() {
            pointer.clear();
            return Ok(());
        }
        self.resolve(input, pointer.pointee())
    }

    fn resolve_sequence(
        &self,
        input: Input<'_>,
        sequence: &mut dyn SequenceSlot,
        shape: &'static Shape,
    ) -> Result<(), ConversionError> {
        let value = match input {
            Input::Value(Value::Null) => {
                sequence.clear();
                return Ok(());
            }
            Input::Value(value) => value,
            Input::Map(_) => return Err(ConversionError::new(input.to_value(), shape, None)),
        };
        let Some(items) = value.as_items() else {
            return Err(ConversionError::new(value.clone(), shape, None));
        };
        if items.is_empty() {
            sequence.clear();
            return Ok(());
        }
        if sequence.copy_from(items) {
            trace!("copied {} items into {shape}", items.len());
            return Ok(());
        }

        if sequence.item_shape().is_type::<Value>() {
            return sequence.rebuild(items.len(), &mut |index, slot| {
                lift_item(items, index, slot);
                Ok(())
            });
        }

        sequence.rebuild(items.len(), &mut |index, slot| {
            let Some(item) = items.item_value(index) else {
                return Ok(());
            };
            self.resolve(Input::Value(&item), slot)
                .map_err(|err| err.within_index(index))
        })
    }

    fn resolve_record(
        &self,
        input: Input<'_>,
        record: &mut dyn RecordSlot,
        shape: &'static Shape,
    ) -> Result<(), ConversionError> {
        let Some(map) = input.as_map() else {
            return Err(ConversionError::new(input.to_value(), shape, None));
        };

        let descriptor = self.cache.descriptor(shape);
        for field in descriptor.fields() {
            let Some(slot) = record.field_mut(field.position) else {
                continue;
            };

            if field.embedded {
                self.resolve_embedded(map, field, slot)?;
                continue;
            }

            let result = match map.get(&field.source_key) {
                Some(value) => self.resolve(Input::Value(value), slot),
                None => match field.default {
                    Some(literal) => {
                        trace!("{}: using default {literal:?}", field.source_key);
                        let value = Value::String(literal.to_owned());
                        self.resolve(Input::Value(&value), slot)
                    }
                    None => Ok(()),
                },
            };
            result.map_err(|err| err.within_field(&field.source_key))?;
        }
        Ok(())
    }

    /// Embedded records read from a nested map under their declared name when
    /// there is one, and from the parent map otherwise. Errors keep the parent path.
    fn resolve_embedded(
        &self,
        map: &Map,
        field: &FieldDescriptor,
        slot: &mut dyn Target,
    ) -> Result<(), ConversionError> {
        if !field.shape.is_record() {
            trace!("{}: embedded non-record left untouched", field.declared_name);
            return Ok(());
        }
        match map
            .get(field.declared_name)
            .filter(|nested| nested.as_map().is_some())
        {
            Some(nested) => {
                trace!("{}: decoding from nested map", field.declared_name);
                self.resolve(Input::Value(nested), slot)
            }
            _ => self.resolve(Input::Map(map), slot),
        }
    }
}

/// Stores a source element in a `Value` element as it is.
fn lift_item(items: &dyn Items, index: usize, slot: &mut dyn Target) {
    if let Some(item) = items.item_value(index) {
        slot.assign(&item);
    }
}

impl Default for Decoder {
    /// A decoder with default annotation names and the built-in converters.
    fn default() -> Self {
        Self::new(
            Arc::new(MetadataCache::default()),
            Arc::new(ConverterRegistry::default()),
        )
    }
}
