use core::fmt;
use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::string::FromUtf8Error;

use crate::{Shape, Value};

/// A segment in the path to the value that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A record field, by source key
    Field(String),
    /// A sequence element
    Index(usize),
}

/// Location of a failure inside the source map, e.g. `inner.items[2].value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path, pointing at the source map itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("root");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(key) if i == 0 => f.write_str(key)?,
                PathSegment::Field(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Why a single value could not be converted.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A string did not parse as an integer.
    #[error("invalid integer syntax: {0}")]
    InvalidInt(#[source] ParseIntError),

    /// A string did not parse as a float.
    #[error("invalid float syntax: {0}")]
    InvalidFloat(#[source] ParseFloatError),

    /// A string was not a recognized boolean.
    #[error("invalid boolean `{0}`")]
    InvalidBool(String),

    /// The value is above the target's range.
    #[error("value {value} overflows {target}")]
    Overflow {
        /// Textual form of the input
        value: String,
        /// Target type
        target: &'static Shape,
    },

    /// The value is below the target's range.
    #[error("value {value} underflows {target}")]
    Underflow {
        /// Textual form of the input
        value: String,
        /// Target type
        target: &'static Shape,
    },

    /// NaN or infinity where an integer was expected.
    #[error("non-finite float {0} cannot become an integer")]
    NonFinite(f64),

    /// Bytes were not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[source] FromUtf8Error),

    /// An element of a list was not a byte.
    #[error("element {index} ({value}) is not a byte")]
    InvalidByte {
        /// Position in the list
        index: usize,
        /// Textual form of the element
        value: String,
    },

    /// The input's type is not accepted by this converter.
    #[error("unsupported input type {got}")]
    InvalidInput {
        /// Runtime type of the input
        got: String,
    },

    /// Draining a stream failed.
    #[error("failed to read: {0}")]
    Read(#[source] io::Error),

    /// No converter exists for a scalar target.
    #[error("no converter registered")]
    NoConverter,

    /// A converter produced a value of another type than it was registered for.
    #[error("converter for {expected} produced another type")]
    WrongOutput {
        /// The type the converter was registered for
        expected: &'static Shape,
    },

    /// A failure from a user-supplied converter.
    #[error("{0}")]
    Custom(#[source] Box<dyn core::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Wraps an arbitrary error from a custom converter.
    pub fn custom(error: impl Into<Box<dyn core::error::Error + Send + Sync>>) -> Self {
        ConvertError::Custom(error.into())
    }

    pub(crate) fn invalid_input(value: &Value) -> Self {
        ConvertError::InvalidInput {
            got: value.type_name().into_owned(),
        }
    }
}

/// A value could not be converted into the destination type.
#[derive(Debug)]
pub struct ConversionError {
    /// Where in the source the value was found.
    pub path: Path,

    /// The offending input value.
    pub value: Value,

    /// The destination type.
    pub target: &'static Shape,

    /// The underlying failure, if there is one.
    pub cause: Option<ConvertError>,
}

impl ConversionError {
    /// Creates an error at the root path.
    pub fn new(value: Value, target: &'static Shape, cause: Option<ConvertError>) -> Self {
        Self {
            path: Path::root(),
            value,
            target,
            cause,
        }
    }

    pub(crate) fn within_field(mut self, key: &str) -> Self {
        self.path.prepend(PathSegment::Field(key.to_owned()));
        self
    }

    pub(crate) fn within_index(mut self, index: usize) -> Self {
        self.path.prepend(PathSegment::Index(index));
        self
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: cannot convert {} to {}",
            self.path,
            self.value.type_name(),
            self.target
        )?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl core::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn core::error::Error + 'static))
    }
}

/// The decode call itself was malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// What was wrong.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Anything that can go wrong while decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A value could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The call was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DecodeError {
    /// The conversion failure, if this is one.
    pub fn as_conversion(&self) -> Option<&ConversionError> {
        match self {
            DecodeError::Conversion(err) => Some(err),
            DecodeError::Validation(_) => None,
        }
    }

    /// The path of a conversion failure.
    pub fn path(&self) -> Option<&Path> {
        self.as_conversion().map(|err| &err.path)
    }
}
