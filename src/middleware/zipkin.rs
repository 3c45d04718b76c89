//! The B3 propagation pipeline step.

use super::{Middleware, Next, Request, ResponseFuture};
use crate::{
    config::{HeaderStyle, ZipkinIdsConfig},
    context::TraceContext,
    propagator::{B3Propagator, HeaderExtractor, HeaderInjector, Propagator},
};

/// The trace a request belongs to, and the header style to answer in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTrace {
    context: TraceContext,
    style: HeaderStyle,
}

impl RequestTrace {
    /// Creates a request trace.
    pub fn new(context: TraceContext, style: HeaderStyle) -> Self {
        Self { context, style }
    }

    /// Returns the trace context for this request.
    pub fn context(&self) -> &TraceContext {
        &self.context
    }

    /// Returns the header style used for responses and downstream calls.
    pub fn style(&self) -> HeaderStyle {
        self.style
    }

    /// Consumes the trace and returns its context.
    pub fn into_context(self) -> TraceContext {
        self.context
    }
}

/// Reads, initiates, and writes B3 trace context for each request.
///
/// Only requests whose path matches one of the configured prefixes are
/// traced. For those:
///
/// - A valid `b3` header continues that trace. Failing that, valid `X-B3-*`
///   headers do. The response echoes the trace in the style it arrived in.
/// - A request without B3 headers, or whose headers fail to parse, starts a
///   new trace. The response carries the configured style.
///
/// ## Example
///
/// ```rust
/// use std::collections::HashMap;
/// use zipkin_ids::{ZipkinIds, ZipkinIdsConfig};
///
/// let zipkin = ZipkinIds::new(ZipkinIdsConfig::default());
///
/// let mut inbound: HashMap<String, String> = HashMap::new();
/// inbound.insert("b3".into(), "80f198ee56343ba8-e457b5a2e4d86bd1-1".into());
///
/// let trace = zipkin.start("/orders", &inbound).unwrap();
///
/// let mut response: HashMap<String, String> = HashMap::new();
/// zipkin.finish(&trace, &mut response);
/// assert_eq!(response["b3"], "80f198ee56343ba8-e457b5a2e4d86bd1-1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZipkinIds {
    config: ZipkinIdsConfig,
}

impl ZipkinIds {
    /// Creates the pipeline step.
    pub fn new(config: ZipkinIdsConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ZipkinIdsConfig {
        &self.config
    }

    /// Establishes the trace for an inbound request.
    ///
    /// Returns `None` when `path` matches none of the configured prefixes.
    pub fn start<E: HeaderExtractor + ?Sized>(
        &self,
        path: &str,
        headers: &E,
    ) -> Option<RequestTrace> {
        if !self.config.initiates_trace(path) {
            #[cfg(feature = "tracing")]
            tracing::trace!(path, "path is not traced");
            return None;
        }

        // `b3` takes precedence; `X-B3-*` still applies when `b3` is malformed.
        let propagated = [HeaderStyle::Combined, HeaderStyle::Multi]
            .into_iter()
            .find_map(|style| self.propagated(style, headers));
        if propagated.is_some() {
            return propagated;
        }

        let context = TraceContext::new_root(self.config.trace_id_length);
        let style = self.config.header_style;
        #[cfg(feature = "tracing")]
        log_trace("initiated trace", &context, style);
        Some(RequestTrace::new(context, style))
    }

    fn propagated<E: HeaderExtractor + ?Sized>(
        &self,
        style: HeaderStyle,
        headers: &E,
    ) -> Option<RequestTrace> {
        match B3Propagator::new(style).extract(headers) {
            Ok(Some(context)) => {
                #[cfg(feature = "tracing")]
                log_trace("propagated trace", &context, style);
                Some(RequestTrace::new(context, style))
            }
            Ok(None) => None,
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    header = error.header(),
                    error = %error,
                    "ignoring malformed B3 headers"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = error;
                None
            }
        }
    }

    /// Writes the request's trace onto the response headers.
    pub fn finish<I: HeaderInjector + ?Sized>(&self, trace: &RequestTrace, headers: &mut I) {
        B3Propagator::new(trace.style).inject(&trace.context, headers);
    }

    /// Writes a child context onto the headers of an outgoing call.
    ///
    /// The downstream service sees this request's span as its parent.
    pub fn downstream<I: HeaderInjector + ?Sized>(&self, trace: &RequestTrace, headers: &mut I) {
        B3Propagator::new(trace.style).inject(&trace.context.child(), headers);
    }
}

#[cfg(feature = "tracing")]
fn log_trace(message: &str, context: &TraceContext, style: HeaderStyle) {
    tracing::debug!(
        trace_id = context.trace_id().map_or("", |id| id.as_str()),
        span_id = context.span_id().map_or("", |id| id.as_str()),
        sampled = ?context.sampled(),
        style = style.as_str(),
        "{message}"
    );
}

impl Middleware for ZipkinIds {
    fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> ResponseFuture<'a> {
        Box::pin(async move {
            let trace = self.start(req.path(), &req.metadata().headers);
            req.metadata_mut().trace = trace.clone();

            let mut resp = next.call(req).await?;
            if let Some(trace) = &trace {
                self.finish(trace, &mut resp.metadata_mut().headers);
            }
            Ok(resp)
        })
    }
}
