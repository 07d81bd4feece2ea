//! Reading and writing configurations as rule text
//!
//! Only the part of the rule language that the [`crate::spec`] model can hold is supported:
//! class path options, keep options (with an optional `-if` condition),
//! `-assumenosideeffects` and `-whyareyoukeeping`. Text uses external (dotted) class names and
//! Java types, which are converted to internal names and descriptors on the way in and back on
//! the way out.
//!
//! Attribute name constraints and feature names have no rule text form, so they are not written.

mod java_types;
mod lexer;
mod parser;
mod writer;

pub use java_types::*;
pub use parser::{parse_configuration, read_configuration};
pub use writer::write_configuration;

use std::fmt;

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),

    /// Quoted word is missing its closing quote
    UnterminatedQuote { line: usize },

    /// Input ended while something else was still expected
    UnexpectedEnd { expected: &'static str },

    UnexpectedToken {
        line: usize,
        found: String,
        expected: &'static str,
    },

    UnknownOption { line: usize, option: String },

    UnknownModifier { line: usize, modifier: String },

    /// More than nine filter lists on one class path entry
    TooManyFilters { line: usize, count: usize },

    /// Java type that can't be turned into a descriptor (eg. `void` as a field type)
    UnsupportedType { line: usize, java_type: String },

    /// Descriptor in a specification that can't be written as Java types
    UnwritableDescriptor { descriptor: String },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "{}", err),
            Error::UnterminatedQuote { line } => write!(f, "line {}: unterminated quote", line),
            Error::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected {}", expected)
            }
            Error::UnexpectedToken {
                line,
                found,
                expected,
            } => write!(f, "line {}: expected {} but found '{}'", line, expected, found),
            Error::UnknownOption { line, option } => {
                write!(f, "line {}: unknown option '{}'", line, option)
            }
            Error::UnknownModifier { line, modifier } => {
                write!(f, "line {}: unknown modifier '{}'", line, modifier)
            }
            Error::TooManyFilters { line, count } => write!(
                f,
                "line {}: {} filters given, but at most 9 are allowed",
                line, count
            ),
            Error::UnsupportedType { line, java_type } => {
                write!(f, "line {}: unsupported type '{}'", line, java_type)
            }
            Error::UnwritableDescriptor { descriptor } => {
                write!(f, "descriptor '{}' has no Java type form", descriptor)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}
