//! Header carriers and B3 propagators.
//!
//! A carrier is anything that holds header name/value pairs: a `HashMap`
//! for tests and simple hosts, or an `http::HeaderMap` (with the `http`
//! feature) for axum, hyper and tower services.

use std::collections::HashMap;

use crate::{
    codec::{B3_HEADER, MULTI_HEADERS},
    config::HeaderStyle,
    context::TraceContext,
    error::Result,
};

/// A trait for reading header values.
pub trait HeaderExtractor {
    /// Gets a header value by name, ignoring ASCII case.
    fn get(&self, key: &str) -> Option<&str>;
}

/// A trait for writing header values.
pub trait HeaderInjector {
    /// Sets a header value, replacing any previous value.
    fn set(&mut self, key: &str, value: String);
}

impl HeaderExtractor for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        if let Some(value) = HashMap::get(self, key) {
            return Some(value.as_str());
        }
        self.iter().find(|(name, _)| name.eq_ignore_ascii_case(key)).map(|(_, v)| v.as_str())
    }
}

impl HeaderInjector for HashMap<String, String> {
    fn set(&mut self, key: &str, value: String) {
        self.retain(|name, _| !name.eq_ignore_ascii_case(key));
        self.insert(key.to_string(), value);
    }
}

#[cfg(feature = "http")]
impl HeaderExtractor for http::HeaderMap {
    fn get(&self, key: &str) -> Option<&str> {
        http::HeaderMap::get(self, key).and_then(|value| value.to_str().ok())
    }
}

#[cfg(feature = "http")]
impl HeaderInjector for http::HeaderMap {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::from_bytes(key.as_bytes()),
            http::HeaderValue::from_str(&value),
        ) {
            self.insert(name, value);
        }
    }
}

/// Returns which B3 style, if any, a carrier holds.
///
/// A combined `b3` header wins over discrete `X-B3-*` headers.
pub fn detect_style<E: HeaderExtractor + ?Sized>(carrier: &E) -> Option<HeaderStyle> {
    if carrier.get(B3_HEADER).is_some() {
        Some(HeaderStyle::Combined)
    } else if has_multi_headers(carrier) {
        Some(HeaderStyle::Multi)
    } else {
        None
    }
}

fn has_multi_headers<E: HeaderExtractor + ?Sized>(carrier: &E) -> bool {
    MULTI_HEADERS.iter().any(|name| carrier.get(name).is_some())
}

/// A propagator for trace context.
pub trait Propagator {
    /// Extracts a trace context from headers.
    ///
    /// Returns `Ok(None)` when the headers this propagator reads are absent.
    fn extract<E: HeaderExtractor + ?Sized>(&self, carrier: &E) -> Result<Option<TraceContext>>;

    /// Injects a trace context into headers.
    fn inject<I: HeaderInjector + ?Sized>(&self, context: &TraceContext, carrier: &mut I);

    /// Returns the header names this propagator reads and writes.
    fn fields(&self) -> &'static [&'static str];
}

/// B3 propagator for Zipkin compatibility.
///
/// Handles exactly one header style. Choosing between styles for a given
/// request is up to the caller, see [`detect_style`].
///
/// ## Example
///
/// ```rust
/// use std::collections::HashMap;
/// use zipkin_ids::{B3Propagator, IdLength, Propagator, TraceContext};
///
/// let propagator = B3Propagator::multi();
/// let ctx = TraceContext::new_root(IdLength::Bits64);
///
/// let mut headers: HashMap<String, String> = HashMap::new();
/// propagator.inject(&ctx, &mut headers);
/// assert!(headers.contains_key("X-B3-TraceId"));
///
/// let extracted = propagator.extract(&headers).unwrap().unwrap();
/// assert_eq!(extracted.trace_id(), ctx.trace_id());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct B3Propagator {
    style: HeaderStyle,
}

impl B3Propagator {
    /// Creates a propagator for the given style.
    pub fn new(style: HeaderStyle) -> Self {
        Self { style }
    }

    /// Creates a propagator for the combined `b3` header.
    pub fn combined() -> Self {
        Self::new(HeaderStyle::Combined)
    }

    /// Creates a propagator for the discrete `X-B3-*` headers.
    pub fn multi() -> Self {
        Self::new(HeaderStyle::Multi)
    }

    /// Returns the header style this propagator handles.
    pub fn style(&self) -> HeaderStyle {
        self.style
    }
}

impl Default for B3Propagator {
    fn default() -> Self {
        Self::new(HeaderStyle::default())
    }
}

impl Propagator for B3Propagator {
    fn extract<E: HeaderExtractor + ?Sized>(&self, carrier: &E) -> Result<Option<TraceContext>> {
        match self.style {
            HeaderStyle::Combined => {
                carrier.get(B3_HEADER).map(TraceContext::from_b3_header).transpose()
            }
            HeaderStyle::Multi => {
                if has_multi_headers(carrier) {
                    TraceContext::from_b3_headers(carrier).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn inject<I: HeaderInjector + ?Sized>(&self, context: &TraceContext, carrier: &mut I) {
        match self.style {
            HeaderStyle::Combined => carrier.set(B3_HEADER, context.to_b3_header()),
            HeaderStyle::Multi => context.inject_b3_headers(carrier),
        }
    }

    fn fields(&self) -> &'static [&'static str] {
        match self.style {
            HeaderStyle::Combined => &[B3_HEADER],
            HeaderStyle::Multi => &MULTI_HEADERS,
        }
    }
}
