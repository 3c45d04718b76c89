//! Integration tests for zipkin-ids.
//!
//! These tests drive the public API end to end: requests flow through a
//! [`MiddlewareStack`](zipkin_ids::middleware::MiddlewareStack) with
//! [`ZipkinIds`](zipkin_ids::ZipkinIds) installed, and the codec is exercised
//! only through its exported functions.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With pipeline logging
//! RUST_LOG=zipkin_ids=trace cargo test --test integration -- --nocapture
//! ```

mod codec_tests;
mod middleware_tests;
