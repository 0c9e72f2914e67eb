#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod unescaping;
pub use unescaping::{UnescapeError, string_value};

mod parse;
pub use parse::*;

mod derive;
pub use derive::*;
