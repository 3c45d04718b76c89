//! Parse errors raised while decoding B3 headers.

use std::fmt;

/// The identifier a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdField {
    /// The trace ID (16 or 32 hex characters).
    TraceId,
    /// The span ID (16 hex characters).
    SpanId,
    /// The parent span ID (16 hex characters).
    ParentSpanId,
}

impl IdField {
    /// Returns the accepted lengths for this field, for error messages.
    pub fn expected_length(&self) -> &'static str {
        match self {
            IdField::TraceId => "16 or 32",
            IdField::SpanId | IdField::ParentSpanId => "16",
        }
    }
}

impl fmt::Display for IdField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdField::TraceId => write!(f, "trace ID"),
            IdField::SpanId => write!(f, "span ID"),
            IdField::ParentSpanId => write!(f, "parent span ID"),
        }
    }
}

/// Why a header value was rejected.
///
/// | Reason               | Raised by                   |
/// |----------------------|-----------------------------|
/// | `Empty`              | combined `b3` header        |
/// | `SegmentCount`       | combined `b3` header        |
/// | `IdLength`           | both styles                 |
/// | `NonHex`             | both styles                 |
/// | `InvalidFlag`        | combined `b3` header        |
/// | `InvalidSampled`     | `X-B3-Sampled`              |
/// | `InvalidDebugFlag`   | `X-B3-Flags`                |
/// | `MissingIdentifiers` | both styles                 |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseErrorReason {
    /// The header value was empty.
    #[error("value is empty")]
    Empty,

    /// The combined header did not split into 1 to 4 dash-separated segments.
    #[error("expected 1 to 4 dash-separated segments, found {0}")]
    SegmentCount(usize),

    /// An identifier had the wrong number of characters.
    #[error("{field} must be {} hex characters, found {found}", field.expected_length())]
    IdLength {
        /// Which identifier was malformed.
        field: IdField,
        /// The length that was found.
        found: usize,
    },

    /// An identifier contained something other than lowercase hex digits.
    #[error("{field} must contain only lowercase hex digits")]
    NonHex {
        /// Which identifier was malformed.
        field: IdField,
    },

    /// The sampling segment of the combined header was not `0`, `1` or `d`.
    #[error("sampling flag {0:?} is not one of \"0\", \"1\" or \"d\"")]
    InvalidFlag(String),

    /// `X-B3-Sampled` was not `0`, `1`, `true` or `false`.
    #[error("sampled value {0:?} is not \"0\", \"1\", \"true\" or \"false\"")]
    InvalidSampled(String),

    /// `X-B3-Flags` was not `0` or `1`.
    #[error("debug flag {0:?} is not \"0\" or \"1\"")]
    InvalidDebugFlag(String),

    /// Trace and span IDs are required unless sampling is denied.
    #[error("trace and span IDs are required unless sampling is denied")]
    MissingIdentifiers,
}

/// A B3 header value could not be decoded.
///
/// Carries the header being read, the raw value, and the reason it was
/// rejected. Decoding never yields a partially-populated context: either
/// every field is valid or this error is returned.
///
/// ## Example
///
/// ```rust
/// use zipkin_ids::{ParseErrorReason, TraceContext};
///
/// let err = TraceContext::from_b3_header("zz-zz").unwrap_err();
/// assert_eq!(err.header(), "b3");
/// assert_eq!(err.value(), "zz-zz");
/// assert!(matches!(err.reason(), ParseErrorReason::IdLength { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {header} header {value:?}: {reason}")]
pub struct TraceHeaderParseError {
    header: &'static str,
    value: String,
    reason: ParseErrorReason,
}

impl TraceHeaderParseError {
    /// Creates a parse error for the given header and raw value.
    pub fn new(header: &'static str, value: impl Into<String>, reason: ParseErrorReason) -> Self {
        Self { header, value: value.into(), reason }
    }

    /// Returns the canonical name of the header that failed to parse.
    #[inline]
    pub fn header(&self) -> &'static str {
        self.header
    }

    /// Returns the raw value that was rejected.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns why the value was rejected.
    #[inline]
    pub fn reason(&self) -> &ParseErrorReason {
        &self.reason
    }
}
