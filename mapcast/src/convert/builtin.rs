use std::num::IntErrorKind;

use crate::{ConvertError, ConverterMap, Decode, ReadCloser, Shape, Stream, Value};

/// The built-in conversion table.
///
/// Covers `bool`, `String`, every integer width, `f32`, `f64`, `Vec<u8>` and
/// [`ReadCloser`].
pub fn builtin_converters() -> ConverterMap {
    ConverterMap::new()
        .with_fn::<bool, _>(to_bool)
        .with_fn::<String, _>(to_string)
        .with_fn::<i8, _>(to_int::<i8>)
        .with_fn::<i16, _>(to_int::<i16>)
        .with_fn::<i32, _>(to_int::<i32>)
        .with_fn::<i64, _>(to_int::<i64>)
        .with_fn::<isize, _>(to_int::<isize>)
        .with_fn::<u8, _>(to_int::<u8>)
        .with_fn::<u16, _>(to_int::<u16>)
        .with_fn::<u32, _>(to_int::<u32>)
        .with_fn::<u64, _>(to_int::<u64>)
        .with_fn::<usize, _>(to_int::<usize>)
        .with_fn::<f32, _>(to_f32)
        .with_fn::<f64, _>(to_f64)
        .with_fn::<Vec<u8>, _>(to_bytes)
        .with_fn::<ReadCloser, _>(to_read_closer)
}

/// Textual form of a scalar, for error messages.
fn text(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::Isize(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::Usize(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::String(s) => s.clone(),
        other => other.type_name().into_owned(),
    }
}

fn to_bool(value: &Value) -> Result<bool, ConvertError> {
    Ok(match value {
        Value::Bool(b) => *b,
        Value::I8(v) => *v != 0,
        Value::I16(v) => *v != 0,
        Value::I32(v) => *v != 0,
        Value::I64(v) => *v != 0,
        Value::Isize(v) => *v != 0,
        Value::U8(v) => *v != 0,
        Value::U16(v) => *v != 0,
        Value::U32(v) => *v != 0,
        Value::U64(v) => *v != 0,
        Value::Usize(v) => *v != 0,
        Value::F32(v) => *v != 0.0,
        Value::F64(v) => *v != 0.0,
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" | "" => false,
            _ => return Err(ConvertError::InvalidBool(s.clone())),
        },
        other => return Err(ConvertError::invalid_input(other)),
    })
}

fn to_string(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_owned()),
        Value::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(ConvertError::InvalidUtf8),
        Value::I8(_)
        | Value::I16(_)
        | Value::I32(_)
        | Value::I64(_)
        | Value::Isize(_)
        | Value::U8(_)
        | Value::U16(_)
        | Value::U32(_)
        | Value::U64(_)
        | Value::Usize(_)
        | Value::F32(_)
        | Value::F64(_) => Ok(text(value)),
        other => Err(ConvertError::invalid_input(other)),
    }
}

/// Widens any numeric, boolean or decimal string input to `i128`.
///
/// Floats are truncated toward zero. `target` only labels range errors.
fn to_i128(value: &Value, target: &'static Shape) -> Result<i128, ConvertError> {
    Ok(match value {
        Value::Bool(b) => i128::from(*b),
        Value::I8(v) => i128::from(*v),
        Value::I16(v) => i128::from(*v),
        Value::I32(v) => i128::from(*v),
        Value::I64(v) => i128::from(*v),
        Value::Isize(v) => *v as i128,
        Value::U8(v) => i128::from(*v),
        Value::U16(v) => i128::from(*v),
        Value::U32(v) => i128::from(*v),
        Value::U64(v) => i128::from(*v),
        Value::Usize(v) => *v as i128,
        Value::F32(v) => float_to_i128(f64::from(*v))?,
        Value::F64(v) => float_to_i128(*v)?,
        Value::String(s) if s.is_empty() => 0,
        Value::String(s) => s.parse::<i128>().map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow => ConvertError::Overflow {
                value: s.clone(),
                target,
            },
            IntErrorKind::NegOverflow => ConvertError::Underflow {
                value: s.clone(),
                target,
            },
            _ => ConvertError::InvalidInt(err),
        })?,
        other => return Err(ConvertError::invalid_input(other)),
    })
}

fn float_to_i128(v: f64) -> Result<i128, ConvertError> {
    if !v.is_finite() {
        return Err(ConvertError::NonFinite(v));
    }
    // saturating; out-of-range results are caught by the width check
    Ok(v.trunc() as i128)
}

fn to_int<T>(value: &Value) -> Result<T, ConvertError>
where
    T: Decode + TryFrom<i128>,
{
    let wide = to_i128(value, T::SHAPE)?;
    T::try_from(wide).map_err(|_| {
        let value = text(value);
        if wide < 0 {
            ConvertError::Underflow {
                value,
                target: T::SHAPE,
            }
        } else {
            ConvertError::Overflow {
                value,
                target: T::SHAPE,
            }
        }
    })
}

fn to_f64(value: &Value) -> Result<f64, ConvertError> {
    Ok(match value {
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::I8(v) => f64::from(*v),
        Value::I16(v) => f64::from(*v),
        Value::I32(v) => f64::from(*v),
        Value::I64(v) => *v as f64,
        Value::Isize(v) => *v as f64,
        Value::U8(v) => f64::from(*v),
        Value::U16(v) => f64::from(*v),
        Value::U32(v) => f64::from(*v),
        Value::U64(v) => *v as f64,
        Value::Usize(v) => *v as f64,
        Value::F32(v) => f64::from(*v),
        Value::F64(v) => *v,
        Value::String(s) if s.is_empty() => 0.0,
        Value::String(s) => s.parse::<f64>().map_err(ConvertError::InvalidFloat)?,
        other => return Err(ConvertError::invalid_input(other)),
    })
}

fn to_f32(value: &Value) -> Result<f32, ConvertError> {
    match value {
        Value::F32(v) => Ok(*v),
        Value::String(s) if !s.is_empty() => s.parse::<f32>().map_err(ConvertError::InvalidFloat),
        _ => {
            let wide = to_f64(value)?;
            let narrow = wide as f32;
            if wide.is_finite() && narrow.is_infinite() {
                let value = text(value);
                let target = f32::SHAPE;
                return Err(if wide < 0.0 {
                    ConvertError::Underflow { value, target }
                } else {
                    ConvertError::Overflow { value, target }
                });
            }
            Ok(narrow)
        }
    }
}

fn to_bytes(value: &Value) -> Result<Vec<u8>, ConvertError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Bytes(bytes) => Ok(bytes.clone()),
        Value::String(s) => Ok(s.clone().into_bytes()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| byte_at(index, item))
            .collect(),
        Value::Stream(stream) => stream.read_to_end().map_err(ConvertError::Read),
        Value::Native(native) => {
            if let Some(rc) = native.downcast_ref::<ReadCloser>() {
                rc.read_to_end().map_err(ConvertError::Read)
            } else if let Some(stream) = native.downcast_ref::<Stream>() {
                stream.read_to_end().map_err(ConvertError::Read)
            } else {
                Err(ConvertError::invalid_input(value))
            }
        }
        other => Err(ConvertError::invalid_input(other)),
    }
}

fn byte_at(index: usize, item: &Value) -> Result<u8, ConvertError> {
    let invalid = || ConvertError::InvalidByte {
        index,
        value: text(item),
    };
    let numeric = matches!(
        item,
        Value::I8(_)
            | Value::I16(_)
            | Value::I32(_)
            | Value::I64(_)
            | Value::Isize(_)
            | Value::U8(_)
            | Value::U16(_)
            | Value::U32(_)
            | Value::U64(_)
            | Value::Usize(_)
            | Value::F32(_)
            | Value::F64(_)
    );
    if !numeric {
        return Err(invalid());
    }
    let wide = to_i128(item, u8::SHAPE).map_err(|_| invalid())?;
    u8::try_from(wide).map_err(|_| invalid())
}

fn to_read_closer(value: &Value) -> Result<ReadCloser, ConvertError> {
    match value {
        Value::Null => Ok(ReadCloser::default()),
        Value::Stream(stream) => Ok(ReadCloser::new(stream.clone())),
        Value::Bytes(bytes) => Ok(ReadCloser::new(Stream::from_bytes(bytes.clone()))),
        Value::String(s) => Ok(ReadCloser::new(Stream::from_bytes(s.clone()))),
        Value::Native(native) => match native.downcast_ref::<Stream>() {
            Some(stream) => Ok(ReadCloser::new(stream.clone())),
            None => Err(ConvertError::invalid_input(value)),
        },
        other => Err(ConvertError::invalid_input(other)),
    }
}
