//! End-to-end pipeline scenarios for the `ZipkinIds` step.

use std::collections::HashMap;

use zipkin_ids::middleware::{MiddlewareStack, Next, Request, Response, ResponseFuture};
use zipkin_ids::{
    B3_HEADER, DEBUG_HEADER, HeaderStyle, IdLength, PARENT_SPAN_ID_HEADER, SAMPLED_HEADER,
    SPAN_ID_HEADER, Sampled, TRACE_ID_HEADER, TraceContext, ZipkinIds, ZipkinIdsConfig, next_id,
    next_id_with_length,
};

use crate::common::{exchange, init_tracing};

fn api_prefix() -> ZipkinIdsConfig {
    ZipkinIdsConfig::builder().initiate_trace_path_prefixes(vec!["/api".to_string()]).build()
}

// Path prefix matching

#[tokio::test]
async fn test_initiates_trace_when_path_matches_prefix() {
    let ex = exchange(api_prefix(), "/api/v1/premium-sms", &[]).await.unwrap();
    assert!(ex.trace.is_some());
    assert!(ex.header(TRACE_ID_HEADER).is_some());
}

#[tokio::test]
async fn test_no_trace_when_path_does_not_match_prefix() {
    let ex = exchange(api_prefix(), "/health", &[]).await.unwrap();
    assert!(ex.trace.is_none());
    assert!(ex.response.metadata().headers.is_empty());
}

#[tokio::test]
async fn test_inbound_headers_ignored_when_path_does_not_match_prefix() {
    let (t, s) = (next_id(), next_id());
    let ex = exchange(
        api_prefix(),
        "/health",
        &[(TRACE_ID_HEADER, t.as_str()), (SPAN_ID_HEADER, s.as_str())],
    )
    .await
    .unwrap();
    assert!(ex.trace.is_none());
    assert!(ex.response.metadata().headers.is_empty());
}

// Response headers

#[tokio::test]
async fn test_headers_not_set_without_zipkin_ids() {
    let stack = MiddlewareStack::new();
    let resp = stack.process(Request::new("/"), |_| async { Ok(Response::ok()) }).await.unwrap();
    assert!(!resp.metadata().headers.contains_key(TRACE_ID_HEADER));
    assert!(!resp.metadata().headers.contains_key(SPAN_ID_HEADER));
}

#[tokio::test]
async fn test_b3_header_is_read_and_echoed() {
    let (t, s) = (next_id(), next_id());
    let b3 = format!("{t}-{s}");
    let ex = exchange(ZipkinIdsConfig::default(), "/", &[(B3_HEADER, b3.as_str())]).await.unwrap();
    assert_eq!(ex.header(B3_HEADER), Some(b3.as_str()));
    assert!(ex.header(TRACE_ID_HEADER).is_none());
}

#[tokio::test]
async fn test_x_b3_headers_are_read_and_echoed() {
    let (t, s) = (next_id(), next_id());
    let ex = exchange(
        ZipkinIdsConfig::combined(),
        "/",
        &[(TRACE_ID_HEADER, t.as_str()), (SPAN_ID_HEADER, s.as_str())],
    )
    .await
    .unwrap();
    assert_eq!(ex.header(TRACE_ID_HEADER), Some(t.as_str()));
    assert_eq!(ex.header(SPAN_ID_HEADER), Some(s.as_str()));
    assert!(ex.header(B3_HEADER).is_none());
}

#[tokio::test]
async fn test_lowercase_inbound_headers_are_honored() {
    let (t, s) = (next_id(), next_id());
    let ex = exchange(
        ZipkinIdsConfig::default(),
        "/",
        &[("x-b3-traceid", t.as_str()), ("x-b3-spanid", s.as_str()), ("x-b3-flags", "1")],
    )
    .await
    .unwrap();
    let trace = ex.trace.as_ref().unwrap();
    assert_eq!(trace.context().trace_id().unwrap().as_str(), t);
    assert_eq!(trace.context().sampled(), Sampled::Debug);
    assert_eq!(ex.header(DEBUG_HEADER), Some("1"));
}

#[tokio::test]
async fn test_new_trace_uses_x_b3_headers_by_default() {
    let ex = exchange(ZipkinIdsConfig::default(), "/", &[]).await.unwrap();
    assert!(ex.header(TRACE_ID_HEADER).is_some());
    assert!(ex.header(SPAN_ID_HEADER).is_some());
    assert!(ex.header(B3_HEADER).is_none());
}

#[tokio::test]
async fn test_new_trace_uses_b3_header_when_configured() {
    let ex = exchange(ZipkinIdsConfig::combined(), "/", &[]).await.unwrap();
    assert!(ex.header(TRACE_ID_HEADER).is_none());
    assert!(ex.header(SPAN_ID_HEADER).is_none());
    assert!(ex.header(B3_HEADER).is_some());
}

#[tokio::test]
async fn test_deny_only_is_echoed() {
    let ex = exchange(ZipkinIdsConfig::combined(), "/", &[(SAMPLED_HEADER, "0")]).await.unwrap();
    assert!(ex.trace.as_ref().unwrap().context().is_denied_without_ids());
    assert_eq!(ex.header(SAMPLED_HEADER), Some("0"));
    assert!(ex.header(B3_HEADER).is_none());
}

// Malformed input

#[tokio::test]
async fn test_malformed_b3_starts_new_trace() {
    let ex =
        exchange(ZipkinIdsConfig::default(), "/", &[(B3_HEADER, "not-a-trace")]).await.unwrap();
    let trace = ex.trace.as_ref().unwrap();
    assert!(trace.context().initiated_here());
    assert_eq!(trace.style(), HeaderStyle::Multi);
    assert_eq!(ex.header(TRACE_ID_HEADER), trace.context().trace_id().map(|id| id.as_str()));
}

#[tokio::test]
async fn test_malformed_b3_uses_valid_x_b3_headers() {
    let (t, s) = (next_id(), next_id());
    let ex = exchange(
        ZipkinIdsConfig::combined(),
        "/",
        &[(B3_HEADER, "garbage"), (TRACE_ID_HEADER, t.as_str()), (SPAN_ID_HEADER, s.as_str())],
    )
    .await
    .unwrap();
    let trace = ex.trace.as_ref().unwrap();
    assert!(!trace.context().initiated_here());
    assert_eq!(trace.style(), HeaderStyle::Multi);
    assert_eq!(ex.header(TRACE_ID_HEADER), Some(t.as_str()));
    assert_eq!(ex.header(SPAN_ID_HEADER), Some(s.as_str()));
    assert!(ex.header(B3_HEADER).is_none());
}

#[tokio::test]
async fn test_malformed_headers_on_skipped_path_are_not_traced() {
    let ex = exchange(api_prefix(), "/health", &[(TRACE_ID_HEADER, "xyz")]).await.unwrap();
    assert!(ex.trace.is_none());
    assert!(ex.response.metadata().headers.is_empty());
}

// Request trace

#[tokio::test]
async fn test_trace_is_attached_to_request() {
    let t = next_id_with_length(IdLength::Bits128);
    let s = next_id();
    let ex = exchange(
        ZipkinIdsConfig::default(),
        "/",
        &[(TRACE_ID_HEADER, t.as_str()), (SPAN_ID_HEADER, s.as_str())],
    )
    .await
    .unwrap();
    let trace = ex.trace.unwrap();
    assert_eq!(trace.context().trace_id().unwrap().as_str(), t);
    assert_eq!(trace.context().span_id().unwrap().as_str(), s);
}

#[tokio::test]
async fn test_configured_trace_id_length() {
    let config = ZipkinIdsConfig::builder().trace_id_length(IdLength::Bits128).build();
    let ex = exchange(config, "/", &[]).await.unwrap();
    assert_eq!(ex.header(TRACE_ID_HEADER).map(str::len), Some(32));
    assert_eq!(ex.header(SPAN_ID_HEADER).map(str::len), Some(16));
}

// Downstream calls

#[tokio::test]
async fn test_downstream_call_carries_child_context() {
    init_tracing();

    let zipkin = ZipkinIds::new(ZipkinIdsConfig::combined());
    let (t, s) = (next_id(), next_id());
    let mut inbound = HashMap::new();
    inbound.insert(B3_HEADER.to_string(), format!("{t}-{s}-1"));

    let trace = zipkin.start("/", &inbound).unwrap();
    let mut outbound: HashMap<String, String> = HashMap::new();
    zipkin.downstream(&trace, &mut outbound);

    let child = TraceContext::from_b3_header(&outbound[B3_HEADER]).unwrap();
    assert_eq!(child.trace_id().unwrap().as_str(), t);
    assert_eq!(child.parent_span_id().unwrap().as_str(), s);
    assert_ne!(child.span_id().unwrap().as_str(), s);
    assert_eq!(child.sampled(), Sampled::Accept);
}

#[tokio::test]
async fn test_inner_middleware_sees_trace() {
    struct Forwarder;

    impl zipkin_ids::middleware::Middleware for Forwarder {
        fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> ResponseFuture<'a> {
            Box::pin(async move {
                let mut outbound: HashMap<String, String> = HashMap::new();
                if let Some(trace) = &req.metadata().trace {
                    ZipkinIds::default().downstream(trace, &mut outbound);
                }
                let resp = next.call(req).await?;
                Ok(match outbound.get(PARENT_SPAN_ID_HEADER) {
                    Some(parent) => resp.header("X-Forwarded-Parent", parent.clone()),
                    None => resp,
                })
            })
        }
    }

    init_tracing();
    let stack = MiddlewareStack::new().with(ZipkinIds::default()).with(Forwarder);
    let resp = stack.process(Request::new("/"), |_| async { Ok(Response::ok()) }).await.unwrap();

    let headers = &resp.metadata().headers;
    assert_eq!(headers.get("X-Forwarded-Parent"), headers.get(SPAN_ID_HEADER));
}
