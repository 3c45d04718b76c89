//! # zipkin-ids
//!
//! B3 trace-context propagation for Zipkin-compatible distributed tracing.
//!
//! ## Quick Start
//!
//! ```rust
//! use zipkin_ids::prelude::*;
//!
//! // Decode an inbound combined header
//! let ctx = TraceContext::from_b3_header("80f198ee56343ba8-e457b5a2e4d86bd1-1")?;
//! assert_eq!(ctx.sampled(), Sampled::Accept);
//!
//! // Answer in the discrete header style
//! let headers = ctx.to_b3_headers();
//! assert_eq!(headers["X-B3-TraceId"], "80f198ee56343ba8");
//! assert_eq!(headers["X-B3-Sampled"], "1");
//! # Ok::<(), zipkin_ids::TraceHeaderParseError>(())
//! ```
//!
//! ## Key Concepts
//!
//! - **Two header styles**: a single `b3` header or discrete `X-B3-*` headers, carrying the same
//!   context
//! - **Denial without IDs**: `b3: 0` means "do not trace" and carries no identifiers
//! - **Malformed ≠ missing**: decoding returns `Err(TraceHeaderParseError)`, and [`ZipkinIds`]
//!   decides whether to start a fresh trace instead
//!
//! ## Features
//!
//! - `tracing` (default): Structured logging in the [`ZipkinIds`] pipeline step
//! - `http`: [`HeaderExtractor`] and [`HeaderInjector`] for `http::HeaderMap`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod id;

// Carriers and propagators
pub mod propagator;

// Request pipeline
pub mod middleware;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use codec::{
    B3_HEADER, DEBUG_HEADER, MULTI_HEADERS, PARENT_SPAN_ID_HEADER, SAMPLED_HEADER, SPAN_ID_HEADER,
    TRACE_ID_HEADER,
};
pub use config::{HeaderStyle, ZipkinIdsConfig};
pub use context::{Sampled, SpanId, TraceContext, TraceId};
pub use error::{IdField, ParseErrorReason, TraceHeaderParseError};
pub use id::{IdLength, next_id, next_id_with_length};
pub use middleware::{RequestTrace, ZipkinIds};
pub use propagator::{B3Propagator, HeaderExtractor, HeaderInjector, Propagator, detect_style};
