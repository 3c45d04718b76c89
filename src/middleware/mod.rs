//! A host-agnostic request pipeline.
//!
//! Middleware wraps the host's request handler. [`ZipkinIds`] is the
//! middleware this crate ships: it reads B3 headers off the request,
//! attaches a [`RequestTrace`] to the request metadata, and writes the
//! context back onto the response.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Request Pipeline                                             │
//! │                                                              │
//! │  ┌─────────────────┐                                         │
//! │  │ Host            │  GET /api/orders  (X-B3-* headers)      │
//! │  └────────┬────────┘                                         │
//! │           │                                                  │
//! │           ▼                                                  │
//! │  ┌─────────────────┐                                         │
//! │  │ ZipkinIds       │  decode or initiate, attach trace       │
//! │  └────────┬────────┘                                         │
//! │           │                                                  │
//! │           ▼                                                  │
//! │  ┌─────────────────┐                                         │
//! │  │ Middleware N    │  e.g., access logging                   │
//! │  └────────┬────────┘                                         │
//! │           │                                                  │
//! │           ▼                                                  │
//! │  ┌─────────────────┐                                         │
//! │  │ Handler         │  reads metadata().trace                 │
//! │  └─────────────────┘                                         │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use zipkin_ids::middleware::{MiddlewareStack, Request, Response};
//! use zipkin_ids::{ZipkinIds, ZipkinIdsConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stack = MiddlewareStack::new().with(ZipkinIds::new(ZipkinIdsConfig::default()));
//!
//! let response = stack
//!     .process(Request::new("/api/orders"), |req| async move {
//!         assert!(req.metadata().trace.is_some());
//!         Ok(Response::ok())
//!     })
//!     .await
//!     .unwrap();
//!
//! assert!(response.metadata().headers.contains_key("X-B3-TraceId"));
//! # }
//! ```
//!
//! [`ZipkinIds`]: crate::ZipkinIds
//! [`RequestTrace`]: crate::RequestTrace

mod zipkin;

use std::{collections::HashMap, fmt, future::Future, pin::Pin};

pub use zipkin::{RequestTrace, ZipkinIds};

/// Error type flowing through the middleware chain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type alias for the response future returned by middleware handlers.
pub type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<Response, BoxError>> + Send + 'a>>;

/// Type alias for the next handler function in the middleware chain.
type NextHandler<'a> = Box<dyn FnOnce(Request) -> ResponseFuture<'a> + Send + 'a>;

/// Middleware trait for intercepting requests.
///
/// ## Example
///
/// ```rust
/// use zipkin_ids::middleware::{Middleware, Next, Request, ResponseFuture};
///
/// struct LoggingMiddleware;
///
/// impl Middleware for LoggingMiddleware {
///     fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> ResponseFuture<'a> {
///         Box::pin(async move {
///             println!("Request: {}", req.path());
///             let response = next.call(req).await?;
///             println!("Status: {}", response.metadata().status);
///             Ok(response)
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// Handle a request, optionally modifying it or the response.
    ///
    /// Call `next.call(req)` to continue the chain. You can:
    /// - Modify the request before calling `next`
    /// - Modify the response after `next` returns
    /// - Short-circuit and return early without calling `next`
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> ResponseFuture<'a>;
}

/// A request being processed through the middleware chain.
#[derive(Debug, Clone)]
pub struct Request {
    /// The request path, e.g. `/api/v1/orders`.
    path: String,
    /// Request metadata
    metadata: RequestMetadata,
}

impl Request {
    /// Create a new request.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), metadata: RequestMetadata::default() }
    }

    /// Get the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get request metadata (headers, trace).
    pub fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }

    /// Get mutable access to metadata.
    pub fn metadata_mut(&mut self) -> &mut RequestMetadata {
        &mut self.metadata
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.headers.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request({})", self.path)
    }
}

/// Request metadata including headers and the request's trace.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    /// Inbound headers.
    pub headers: HashMap<String, String>,
    /// The trace this request belongs to, set by [`ZipkinIds`].
    pub trace: Option<RequestTrace>,
}

impl RequestMetadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// The response produced by the handler.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response metadata
    metadata: ResponseMetadata,
}

impl Response {
    /// Create a `200 OK` response.
    pub fn ok() -> Self {
        Self::with_status(200)
    }

    /// Create a response with the given status code.
    pub fn with_status(status: u16) -> Self {
        Self { metadata: ResponseMetadata::new(status) }
    }

    /// Get response metadata.
    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// Get mutable access to response metadata.
    pub fn metadata_mut(&mut self) -> &mut ResponseMetadata {
        &mut self.metadata
    }

    /// Add a header to the response.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.headers.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response({})", self.metadata.status)
    }
}

/// Response metadata including status and headers.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
}

impl ResponseMetadata {
    /// Create metadata with the given status and no headers.
    pub fn new(status: u16) -> Self {
        Self { status, headers: HashMap::new() }
    }
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self::new(200)
    }
}

/// The next middleware or handler in the chain.
pub struct Next<'a> {
    inner: NextHandler<'a>,
}

impl<'a> Next<'a> {
    /// Create a new Next wrapper.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Request) -> Fut + Send + 'a,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'a,
    {
        Self { inner: Box::new(move |req| Box::pin(f(req))) }
    }

    /// Call the next middleware or handler.
    pub async fn call(self, req: Request) -> Result<Response, BoxError> {
        (self.inner)(req).await
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A stack of middleware that processes requests in order.
pub struct MiddlewareStack {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareStack {
    /// Create a new empty middleware stack.
    pub fn new() -> Self {
        Self { middlewares: Vec::new() }
    }

    /// Add a middleware to the stack.
    ///
    /// Middleware is called in the order added (first added = outermost).
    pub fn push(&mut self, middleware: impl Middleware) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Add a middleware to the stack (builder pattern).
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.push(middleware);
        self
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Get the number of middlewares in the stack.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Process a request through the middleware stack.
    ///
    /// The `handler` function is called at the end of the chain.
    pub async fn process<F, Fut>(&self, req: Request, handler: F) -> Result<Response, BoxError>
    where
        F: FnOnce(Request) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
    {
        self.process_at(0, req, handler).await
    }

    fn process_at<'a, F, Fut>(
        &'a self,
        index: usize,
        req: Request,
        handler: F,
    ) -> ResponseFuture<'a>
    where
        F: FnOnce(Request) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
    {
        match self.middlewares.get(index) {
            None => Box::pin(handler(req)),
            Some(middleware) => {
                let next = Next::new(move |req| self.process_at(index + 1, req, handler));
                middleware.handle(req, next)
            }
        }
    }
}

impl Default for MiddlewareStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareStack").field("len", &self.middlewares.len()).finish()
    }
}
