//! Declarative command-line options and a single-pass argument parser.
//!
//! Options are declared as [`OptionDefinition`]s: an [`OptionName`], a
//! [`Processor`] that consumes the arguments following the option, an
//! optional default, and a [`MergeMode`] for repeats. A [`Parser`] runs the
//! definitions over argv and produces [`Matches`].
//!
//! ```
//! use clopts::{convert, processor, OptionDefinition, OptionName, Parser};
//!
//! # fn main() -> clopts::Result<()> {
//! let parser = Parser::new()
//!     .option(OptionDefinition::replace(
//!         OptionName::both("count", 'c')?,
//!         processor::required(convert::integer::<u32>()),
//!     ).with_default(1u32))
//!     .option(OptionDefinition::append(
//!         OptionName::short('I')?,
//!         processor::required(convert::path()),
//!     ));
//!
//! let m = parser.parse(["-c", "3", "-I", "a", "-I", "b", "input.txt"])?;
//! assert_eq!(m.get::<u32>("count")?, 3);
//! assert_eq!(m.get::<Vec<std::path::PathBuf>>("I")?.len(), 2);
//! assert_eq!(m.trailing(), vec!["input.txt"]);
//! # Ok(())
//! # }
//! ```
//!
//! Scanning rules:
//! - `--` ends option scanning; everything after it is trailing.
//! - The first token that is neither `--name` nor `-c` ends scanning too,
//!   and is itself the first trailing argument. `-abc` is not split.
//! - An unknown `--name` or `-c` is an error.
//! - A value that starts with `-` can be passed escaped as `\-10`.

pub mod convert;
pub mod processor;

mod definition;
mod error;
mod matches;
mod name;
mod parser;
mod value;

pub use convert::Converter;
pub use definition::{MergeMode, OptionDefinition};
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use matches::{Matches, TRAILING_KEY};
pub use name::OptionName;
pub use parser::Parser;
pub use processor::Processor;
pub use value::{Charset, FromValue, InvalidUri, UnknownCharset, Uri, Value};
