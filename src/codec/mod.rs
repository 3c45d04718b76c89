//! B3 wire encodings.
//!
//! B3 carries a trace context in one of two equivalent header styles:
//!
//! ```text
//! combined:  b3: {TraceId}-{SpanId}-{Sampled}-{ParentSpanId}
//!
//! multi:     X-B3-TraceId: {TraceId}
//!            X-B3-SpanId: {SpanId}
//!            X-B3-ParentSpanId: {ParentSpanId}
//!            X-B3-Sampled: 0 | 1
//!            X-B3-Flags: 1
//! ```
//!
//! Header names are matched case-insensitively on read and written in the
//! canonical case of the constants below.

mod multi;
mod single;

/// The combined single-header name.
pub const B3_HEADER: &str = "b3";
/// The trace ID header name.
pub const TRACE_ID_HEADER: &str = "X-B3-TraceId";
/// The span ID header name.
pub const SPAN_ID_HEADER: &str = "X-B3-SpanId";
/// The parent span ID header name.
pub const PARENT_SPAN_ID_HEADER: &str = "X-B3-ParentSpanId";
/// The sampling decision header name.
pub const SAMPLED_HEADER: &str = "X-B3-Sampled";
/// The debug flag header name.
pub const DEBUG_HEADER: &str = "X-B3-Flags";

/// Every header the multi-header style reads or writes.
pub const MULTI_HEADERS: [&str; 5] =
    [TRACE_ID_HEADER, SPAN_ID_HEADER, PARENT_SPAN_ID_HEADER, SAMPLED_HEADER, DEBUG_HEADER];
