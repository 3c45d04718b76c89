//! The combined `b3` header.

use super::B3_HEADER;
use crate::{
    context::{Sampled, SpanId, TraceContext, TraceId},
    error::{IdField, ParseErrorReason, Result, TraceHeaderParseError},
};

impl TraceContext {
    /// Decodes a combined `b3` header value.
    ///
    /// | Value                   | Result                              |
    /// |-------------------------|-------------------------------------|
    /// | `0`                     | denied, no IDs                      |
    /// | `{T}-{S}`               | `Defer`                             |
    /// | `{T}-{S}-{flag}`        | flag `0`, `1` or `d`                |
    /// | `{T}-{S}-{flag}-{P}`    | flag may be empty, meaning `Defer`  |
    ///
    /// The decoded context is always marked as initiated here.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use zipkin_ids::{Sampled, TraceContext};
    ///
    /// let ctx = TraceContext::from_b3_header(
    ///     "80f198ee56343ba864fe8b2a57d3eff7-e457b5a2e4d86bd1--05e3ac9a4f6e3b90",
    /// ).unwrap();
    ///
    /// assert_eq!(ctx.span_id().unwrap().as_str(), "e457b5a2e4d86bd1");
    /// assert_eq!(ctx.parent_span_id().unwrap().as_str(), "05e3ac9a4f6e3b90");
    /// assert_eq!(ctx.sampled(), Sampled::Defer);
    /// ```
    pub fn from_b3_header(value: &str) -> Result<Self> {
        let fail = |reason| TraceHeaderParseError::new(B3_HEADER, value, reason);

        if value.is_empty() {
            return Err(fail(ParseErrorReason::Empty));
        }

        let segments: Vec<&str> = value.split('-').collect();
        let (trace_id, span_id, flag, parent_span_id) = match segments.as_slice() {
            [flag] => {
                return match Sampled::from_flag(flag) {
                    Some(Sampled::Deny) => Ok(Self::denied(true)),
                    Some(_) => Err(fail(ParseErrorReason::MissingIdentifiers)),
                    None => Err(fail(ParseErrorReason::InvalidFlag(flag.to_string()))),
                };
            }
            [trace_id, span_id] => (*trace_id, *span_id, "", None),
            [trace_id, span_id, flag] => (*trace_id, *span_id, *flag, None),
            [trace_id, span_id, flag, parent] => (*trace_id, *span_id, *flag, Some(*parent)),
            _ => return Err(fail(ParseErrorReason::SegmentCount(segments.len()))),
        };

        let trace_id = TraceId::from_hex(trace_id).map_err(fail)?;
        let span_id = SpanId::from_hex(span_id).map_err(fail)?;
        let sampled = Sampled::from_flag(flag)
            .ok_or_else(|| fail(ParseErrorReason::InvalidFlag(flag.to_string())))?;

        let mut ctx = Self::new(true, trace_id, span_id).with_sampled(sampled);
        if let Some(parent) = parent_span_id {
            ctx = ctx.with_parent_span_id(
                SpanId::parse_field(parent, IdField::ParentSpanId).map_err(fail)?,
            );
        }
        Ok(ctx)
    }

    /// Encodes this context as a combined `b3` header value.
    ///
    /// Produces the shortest form that decodes back to the same context: the
    /// flag segment is omitted for `Defer` unless a parent span ID follows,
    /// in which case it is left empty.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use zipkin_ids::{Sampled, SpanId, TraceContext, TraceId};
    ///
    /// let ctx = TraceContext::new(
    ///     true,
    ///     TraceId::from_hex("80f198ee56343ba8").unwrap(),
    ///     SpanId::from_hex("e457b5a2e4d86bd1").unwrap(),
    /// );
    /// assert_eq!(ctx.to_b3_header(), "80f198ee56343ba8-e457b5a2e4d86bd1");
    ///
    /// let ctx = ctx.with_sampled(Sampled::Debug);
    /// assert_eq!(ctx.to_b3_header(), "80f198ee56343ba8-e457b5a2e4d86bd1-d");
    ///
    /// assert_eq!(TraceContext::denied(true).to_b3_header(), "0");
    /// ```
    pub fn to_b3_header(&self) -> String {
        let (Some(trace_id), Some(span_id)) = (self.trace_id(), self.span_id()) else {
            return "0".to_string();
        };

        match (self.sampled().flag(), self.parent_span_id()) {
            (None, None) => format!("{trace_id}-{span_id}"),
            (Some(flag), None) => format!("{trace_id}-{span_id}-{flag}"),
            (None, Some(parent)) => format!("{trace_id}-{span_id}--{parent}"),
            (Some(flag), Some(parent)) => format!("{trace_id}-{span_id}-{flag}-{parent}"),
        }
    }
}
