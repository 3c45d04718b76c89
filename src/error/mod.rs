//! Error types for B3 header decoding.
//!
//! Decoding is the only fallible operation in the crate. Every failure is a
//! [`TraceHeaderParseError`] naming the header, the raw value and a
//! [`ParseErrorReason`]. Encoding and identifier generation never fail.
//!
//! The codec never swallows an error into a default context. Falling back to
//! a fresh trace is a policy of the pipeline step, see
//! [`ZipkinIds`](crate::ZipkinIds).

mod parse;

pub use parse::{IdField, ParseErrorReason, TraceHeaderParseError};

/// A specialized `Result` type for header decoding.
pub type Result<T> = std::result::Result<T, TraceHeaderParseError>;
