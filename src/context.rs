//! The trace context carried through a request.

use std::fmt;

use crate::{
    error::{IdField, ParseErrorReason},
    id::{IdLength, next_id_with_length},
};

/// The sampling decision carried by a B3 context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sampled {
    /// Report this trace.
    Accept,
    /// Do not report this trace.
    Deny,
    /// Report this trace and bypass any downstream sampling.
    Debug,
    /// No decision has been made yet.
    #[default]
    Defer,
}

impl Sampled {
    /// Returns the combined-header flag for this state, or `None` for `Defer`.
    ///
    /// ```rust
    /// use zipkin_ids::Sampled;
    ///
    /// assert_eq!(Sampled::Accept.flag(), Some("1"));
    /// assert_eq!(Sampled::Deny.flag(), Some("0"));
    /// assert_eq!(Sampled::Debug.flag(), Some("d"));
    /// assert_eq!(Sampled::Defer.flag(), None);
    /// ```
    #[inline]
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            Sampled::Accept => Some("1"),
            Sampled::Deny => Some("0"),
            Sampled::Debug => Some("d"),
            Sampled::Defer => None,
        }
    }

    /// Parses a combined-header flag. The empty flag means `Defer`.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "" => Some(Sampled::Defer),
            "1" => Some(Sampled::Accept),
            "0" => Some(Sampled::Deny),
            "d" => Some(Sampled::Debug),
            _ => None,
        }
    }

    /// Returns `true` if the trace should be reported.
    #[inline]
    pub fn is_sampled(&self) -> bool {
        matches!(self, Sampled::Accept | Sampled::Debug)
    }
}

/// A trace identifier: 16 or 32 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// Creates a random trace ID of the given width.
    pub fn random(length: IdLength) -> Self {
        Self(next_id_with_length(length))
    }

    /// Creates a trace ID from a hex string, rejecting uppercase digits.
    pub fn from_hex(hex: &str) -> Result<Self, ParseErrorReason> {
        if hex.len() != 16 && hex.len() != 32 {
            return Err(ParseErrorReason::IdLength { field: IdField::TraceId, found: hex.len() });
        }
        check_lower_hex(hex, IdField::TraceId)?;
        Ok(Self(hex.to_string()))
    }

    /// Returns the width of this trace ID.
    pub fn id_length(&self) -> IdLength {
        if self.0.len() == 32 { IdLength::Bits128 } else { IdLength::Bits64 }
    }

    /// Returns the hex string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A span identifier: 16 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SpanId(String);

impl SpanId {
    /// Creates a random span ID.
    pub fn random() -> Self {
        Self(next_id_with_length(IdLength::Bits64))
    }

    /// Creates a span ID from a hex string, rejecting uppercase digits.
    pub fn from_hex(hex: &str) -> Result<Self, ParseErrorReason> {
        Self::parse_field(hex, IdField::SpanId)
    }

    /// Parses a span-sized identifier, reporting errors against `field`.
    pub(crate) fn parse_field(hex: &str, field: IdField) -> Result<Self, ParseErrorReason> {
        if hex.len() != 16 {
            return Err(ParseErrorReason::IdLength { field, found: hex.len() });
        }
        check_lower_hex(hex, field)?;
        Ok(Self(hex.to_string()))
    }

    /// Returns the hex string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({})", self.0)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_lower_hex(hex: &str, field: IdField) -> Result<(), ParseErrorReason> {
    if hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        Ok(())
    } else {
        Err(ParseErrorReason::NonHex { field })
    }
}

/// Trace and span IDs, always present together.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Identifiers {
    trace_id: TraceId,
    span_id: SpanId,
    parent_span_id: Option<SpanId>,
}

/// A parsed or freshly generated B3 trace context.
///
/// A context either carries a trace ID and span ID (and optionally a parent
/// span ID), or carries no identifiers at all. The identifier-less form only
/// exists with [`Sampled::Deny`] and means "do not trace".
///
/// Contexts are immutable values: build one per inbound request and pass it
/// along explicitly.
///
/// ## Example
///
/// ```rust
/// use zipkin_ids::{IdLength, Sampled, TraceContext};
///
/// // Start a new trace
/// let ctx = TraceContext::new_root(IdLength::Bits128);
/// assert!(ctx.initiated_here());
/// assert_eq!(ctx.trace_id().map(|id| id.as_str().len()), Some(32));
/// assert_eq!(ctx.sampled(), Sampled::Defer);
///
/// // Context for a call to another service
/// let child = ctx.child();
/// assert_eq!(child.trace_id(), ctx.trace_id());
/// assert_eq!(child.parent_span_id(), ctx.span_id());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    initiated_here: bool,
    ids: Option<Identifiers>,
    sampled: Sampled,
}

impl TraceContext {
    /// Creates a context with the given IDs, no parent, and `Defer` sampling.
    pub fn new(initiated_here: bool, trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            initiated_here,
            ids: Some(Identifiers { trace_id, span_id, parent_span_id: None }),
            sampled: Sampled::Defer,
        }
    }

    /// Creates a new trace with random IDs, initiated by this process.
    pub fn new_root(trace_id_length: IdLength) -> Self {
        Self::new(true, TraceId::random(trace_id_length), SpanId::random())
    }

    /// Creates the identifier-less "do not trace" context.
    pub fn denied(initiated_here: bool) -> Self {
        Self { initiated_here, ids: None, sampled: Sampled::Deny }
    }

    /// Sets the parent span ID.
    ///
    /// Ignored on an identifier-less context, which cannot carry a parent.
    pub fn with_parent_span_id(mut self, parent_span_id: SpanId) -> Self {
        if let Some(ids) = self.ids.as_mut() {
            ids.parent_span_id = Some(parent_span_id);
        }
        self
    }

    /// Sets the sampling decision.
    ///
    /// An identifier-less context stays `Deny`.
    pub fn with_sampled(mut self, sampled: Sampled) -> Self {
        if self.ids.is_some() {
            self.sampled = sampled;
        }
        self
    }

    /// Sets whether this process initiated the trace.
    pub fn with_initiated_here(mut self, initiated_here: bool) -> Self {
        self.initiated_here = initiated_here;
        self
    }

    /// Creates the context to send with a downstream call.
    ///
    /// The child keeps the trace ID and sampling decision, gets a fresh span
    /// ID, and records the current span as its parent. An identifier-less
    /// context is returned unchanged.
    pub fn child(&self) -> Self {
        match &self.ids {
            Some(ids) => Self {
                initiated_here: false,
                ids: Some(Identifiers {
                    trace_id: ids.trace_id.clone(),
                    span_id: SpanId::random(),
                    parent_span_id: Some(ids.span_id.clone()),
                }),
                sampled: self.sampled,
            },
            None => self.clone(),
        }
    }

    /// Returns `true` if this process started the trace.
    #[inline]
    pub fn initiated_here(&self) -> bool {
        self.initiated_here
    }

    /// Returns the trace ID, if any.
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.ids.as_ref().map(|ids| &ids.trace_id)
    }

    /// Returns the span ID, if any.
    pub fn span_id(&self) -> Option<&SpanId> {
        self.ids.as_ref().map(|ids| &ids.span_id)
    }

    /// Returns the parent span ID, if any.
    pub fn parent_span_id(&self) -> Option<&SpanId> {
        self.ids.as_ref().and_then(|ids| ids.parent_span_id.as_ref())
    }

    /// Returns the sampling decision.
    #[inline]
    pub fn sampled(&self) -> Sampled {
        self.sampled
    }

    /// Returns `true` if the trace should be reported.
    #[inline]
    pub fn is_sampled(&self) -> bool {
        self.sampled.is_sampled()
    }

    /// Returns `true` if this is the identifier-less "do not trace" context.
    #[inline]
    pub fn is_denied_without_ids(&self) -> bool {
        self.ids.is_none()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b3_header())
    }
}
