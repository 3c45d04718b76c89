//! Configuration for the [`ZipkinIds`](crate::ZipkinIds) pipeline step.
//!
//! The configuration is a plain value passed to
//! [`ZipkinIds::new`](crate::ZipkinIds::new). It derives `serde` traits so a
//! host can embed it in its own configuration file:
//!
//! ```toml
//! [zipkin]
//! header_style = "combined"
//! initiate_trace_path_prefixes = ["/api"]
//! trace_id_length = "bits128"
//! ```

use serde::{Deserialize, Serialize};

use crate::id::IdLength;

/// Which B3 header style to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    /// A single `b3` header.
    Combined,
    /// Discrete `X-B3-*` headers.
    #[default]
    Multi,
}

impl HeaderStyle {
    /// Returns a short name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderStyle::Combined => "combined",
            HeaderStyle::Multi => "multi",
        }
    }
}

/// Configuration for B3 trace propagation.
///
/// ## Default Values
///
/// - `header_style`: `Multi`
/// - `initiate_trace_path_prefixes`: `["/"]` (every path)
/// - `trace_id_length`: 64 bits
///
/// ## Example
///
/// ```rust
/// use zipkin_ids::{HeaderStyle, IdLength, ZipkinIdsConfig};
///
/// let config = ZipkinIdsConfig::builder()
///     .header_style(HeaderStyle::Combined)
///     .initiate_trace_path_prefixes(vec!["/api".to_string()])
///     .trace_id_length(IdLength::Bits128)
///     .build();
///
/// assert!(config.initiates_trace("/api/v1/orders"));
/// assert!(!config.initiates_trace("/health"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipkinIdsConfig {
    /// Header style for newly initiated traces.
    ///
    /// Propagated traces are answered in the style they arrived in.
    #[builder(default)]
    pub header_style: HeaderStyle,

    /// Paths that are traced. Requests for any other path pass through untouched.
    #[builder(default = vec!["/".to_string()])]
    pub initiate_trace_path_prefixes: Vec<String>,

    /// Width of generated trace IDs. Span IDs are always 64 bits.
    #[builder(default)]
    pub trace_id_length: IdLength,
}

impl Default for ZipkinIdsConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ZipkinIdsConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that writes the combined `b3` header.
    pub fn combined() -> Self {
        Self::builder().header_style(HeaderStyle::Combined).build()
    }

    /// Returns `true` if requests for `path` are traced.
    pub fn initiates_trace(&self, path: &str) -> bool {
        self.initiate_trace_path_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}
