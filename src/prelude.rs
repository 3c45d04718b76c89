//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types for easy importing:
//!
//! ```rust
//! use zipkin_ids::prelude::*;
//! ```
//!
//! This provides access to:
//! - Trace context types
//! - Propagators and header carriers
//! - The pipeline step and its configuration

pub use crate::{
    config::{HeaderStyle, ZipkinIdsConfig},
    context::{Sampled, SpanId, TraceContext, TraceId},
    error::{ParseErrorReason, TraceHeaderParseError},
    id::IdLength,
    middleware::{RequestTrace, ZipkinIds},
    propagator::{B3Propagator, HeaderExtractor, HeaderInjector, Propagator},
};
