#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

// lets the derive's `::mapcast::` paths resolve inside this crate's own tests
extern crate self as mapcast;

mod shape;
pub use shape::*;

mod value;
pub use value::*;

mod target;
pub use target::*;

mod stream;
pub use stream::*;

mod tag;
pub use tag::{DefaultTagParser, Tag, TagError, TagParser};

/// Parses a key annotation with the default grammar.
pub use tag::parse as parse_tag;

mod error;
pub use error::*;

mod cache;
pub use cache::*;

mod convert;
pub use convert::*;

mod decoder;
pub use decoder::*;

#[cfg(feature = "derive")]
pub use mapcast_macros::Decode;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
