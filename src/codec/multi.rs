//! The discrete `X-B3-*` headers.

use std::collections::HashMap;

use super::{DEBUG_HEADER, PARENT_SPAN_ID_HEADER, SAMPLED_HEADER, SPAN_ID_HEADER, TRACE_ID_HEADER};
use crate::{
    context::{Sampled, SpanId, TraceContext, TraceId},
    error::{IdField, ParseErrorReason, Result, TraceHeaderParseError},
    propagator::{HeaderExtractor, HeaderInjector},
};

impl TraceContext {
    /// Decodes a context from discrete `X-B3-*` headers.
    ///
    /// Header names are matched case-insensitively. `X-B3-Flags: 1` means
    /// `Debug` and takes precedence over `X-B3-Sampled`; with neither header
    /// the decision is `Defer`. The decoded context is marked as received
    /// from an upstream caller.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use zipkin_ids::{Sampled, TraceContext};
    ///
    /// let headers: HashMap<String, String> = [
    ///     ("x-b3-traceid", "4bf92f3577b34da6a3ce929d0e0e4736"),
    ///     ("x-b3-spanid", "00f067aa0ba902b7"),
    ///     ("x-b3-sampled", "1"),
    /// ]
    /// .into_iter()
    /// .map(|(k, v)| (k.to_string(), v.to_string()))
    /// .collect();
    ///
    /// let ctx = TraceContext::from_b3_headers(&headers).unwrap();
    /// assert!(!ctx.initiated_here());
    /// assert_eq!(ctx.sampled(), Sampled::Accept);
    /// ```
    pub fn from_b3_headers<E: HeaderExtractor + ?Sized>(headers: &E) -> Result<Self> {
        let trace_id = headers
            .get(TRACE_ID_HEADER)
            .map(|value| {
                TraceId::from_hex(value)
                    .map_err(|reason| TraceHeaderParseError::new(TRACE_ID_HEADER, value, reason))
            })
            .transpose()?;
        let span_id = read_span_id(headers, SPAN_ID_HEADER, IdField::SpanId)?;
        let parent_span_id = read_span_id(headers, PARENT_SPAN_ID_HEADER, IdField::ParentSpanId)?;
        let sampled = read_sampled(headers)?;

        match (trace_id, span_id) {
            (Some(trace_id), Some(span_id)) => {
                let mut ctx = Self::new(false, trace_id, span_id).with_sampled(sampled);
                if let Some(parent) = parent_span_id {
                    ctx = ctx.with_parent_span_id(parent);
                }
                Ok(ctx)
            }
            (None, None) if parent_span_id.is_none() && sampled == Sampled::Deny => {
                Ok(Self::denied(false))
            }
            (Some(_), None) => Err(missing(SPAN_ID_HEADER)),
            _ => Err(missing(TRACE_ID_HEADER)),
        }
    }

    /// Writes this context as discrete `X-B3-*` headers.
    ///
    /// Only headers for present fields are written: `X-B3-Sampled` is `1`
    /// for `Accept` and `0` for `Deny`, `X-B3-Flags: 1` marks `Debug`, and
    /// `Defer` writes neither.
    pub fn inject_b3_headers<I: HeaderInjector + ?Sized>(&self, headers: &mut I) {
        if let (Some(trace_id), Some(span_id)) = (self.trace_id(), self.span_id()) {
            headers.set(TRACE_ID_HEADER, trace_id.to_string());
            headers.set(SPAN_ID_HEADER, span_id.to_string());
        }
        if let Some(parent) = self.parent_span_id() {
            headers.set(PARENT_SPAN_ID_HEADER, parent.to_string());
        }
        match self.sampled() {
            Sampled::Accept => headers.set(SAMPLED_HEADER, "1".to_string()),
            Sampled::Deny => headers.set(SAMPLED_HEADER, "0".to_string()),
            Sampled::Debug => headers.set(DEBUG_HEADER, "1".to_string()),
            Sampled::Defer => {}
        }
    }

    /// Returns this context as a map of `X-B3-*` header names to values.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use zipkin_ids::TraceContext;
    ///
    /// let headers = TraceContext::denied(false).to_b3_headers();
    /// assert_eq!(headers.len(), 1);
    /// assert_eq!(headers["X-B3-Sampled"], "0");
    /// ```
    pub fn to_b3_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        self.inject_b3_headers(&mut headers);
        headers
    }
}

fn read_span_id<E: HeaderExtractor + ?Sized>(
    headers: &E,
    header: &'static str,
    field: IdField,
) -> Result<Option<SpanId>> {
    headers
        .get(header)
        .map(|value| {
            SpanId::parse_field(value, field)
                .map_err(|reason| TraceHeaderParseError::new(header, value, reason))
        })
        .transpose()
}

fn read_sampled<E: HeaderExtractor + ?Sized>(headers: &E) -> Result<Sampled> {
    match headers.get(DEBUG_HEADER) {
        Some("1") => return Ok(Sampled::Debug),
        Some("0") | None => {}
        Some(other) => {
            return Err(TraceHeaderParseError::new(
                DEBUG_HEADER,
                other,
                ParseErrorReason::InvalidDebugFlag(other.to_string()),
            ));
        }
    }

    match headers.get(SAMPLED_HEADER) {
        None => Ok(Sampled::Defer),
        Some("1") => Ok(Sampled::Accept),
        Some("0") => Ok(Sampled::Deny),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(Sampled::Accept),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(Sampled::Deny),
        Some(other) => Err(TraceHeaderParseError::new(
            SAMPLED_HEADER,
            other,
            ParseErrorReason::InvalidSampled(other.to_string()),
        )),
    }
}

fn missing(header: &'static str) -> TraceHeaderParseError {
    TraceHeaderParseError::new(header, "", ParseErrorReason::MissingIdentifiers)
}
