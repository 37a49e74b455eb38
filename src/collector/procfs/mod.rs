//! Parsers for Linux `/proc` text files.
//!
//! Pure functions over file contents; the collectors do the reading.

pub mod parser;

pub use parser::ParseError;
