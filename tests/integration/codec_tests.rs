//! Codec scenarios and round-trip properties through the public API.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use zipkin_ids::{
    B3Propagator, IdLength, PARENT_SPAN_ID_HEADER, ParseErrorReason, Propagator, SAMPLED_HEADER,
    SPAN_ID_HEADER, Sampled, SpanId, TRACE_ID_HEADER, TraceContext, TraceId, next_id,
    next_id_with_length,
};

use crate::common::headers;

#[test]
fn test_decode_trace_and_span() {
    let (t, s) = (next_id(), next_id());
    let ctx = TraceContext::from_b3_header(&format!("{t}-{s}")).unwrap();
    assert!(ctx.initiated_here());
    assert_eq!(ctx.trace_id().unwrap().as_str(), t);
    assert_eq!(ctx.span_id().unwrap().as_str(), s);
    assert!(ctx.parent_span_id().is_none());
    assert_eq!(ctx.sampled(), Sampled::Defer);
}

#[test]
fn test_decode_denied_with_parent() {
    let (t, s, p) = (next_id(), next_id(), next_id());
    let ctx = TraceContext::from_b3_header(&format!("{t}-{s}-0-{p}")).unwrap();
    assert_eq!(ctx.sampled(), Sampled::Deny);
    assert_eq!(ctx.parent_span_id().unwrap().as_str(), p);
}

#[test]
fn test_decode_deferred_with_parent() {
    let (t, s, p) = (next_id(), next_id(), next_id());
    let ctx = TraceContext::from_b3_header(&format!("{t}-{s}--{p}")).unwrap();
    assert_eq!(ctx.sampled(), Sampled::Defer);
    assert_eq!(ctx.parent_span_id().unwrap().as_str(), p);
}

#[test]
fn test_decode_deny_only() {
    let ctx = TraceContext::from_b3_header("0").unwrap();
    assert!(ctx.initiated_here());
    assert!(ctx.trace_id().is_none());
    assert!(ctx.span_id().is_none());
    assert!(ctx.parent_span_id().is_none());
    assert_eq!(ctx.sampled(), Sampled::Deny);
}

#[test]
fn test_encode_accepted_multi() {
    let (t, s, p) = (next_id(), next_id(), next_id());
    let (trace_id, span_id) = (TraceId::from_hex(&t).unwrap(), SpanId::from_hex(&s).unwrap());
    let ctx = TraceContext::new(false, trace_id, span_id)
        .with_parent_span_id(SpanId::from_hex(&p).unwrap())
        .with_sampled(Sampled::Accept);
    assert_eq!(
        ctx.to_b3_headers(),
        headers(&[
            (TRACE_ID_HEADER, t.as_str()),
            (SPAN_ID_HEADER, s.as_str()),
            (PARENT_SPAN_ID_HEADER, p.as_str()),
            (SAMPLED_HEADER, "1"),
        ])
    );
}

#[test]
fn test_encode_deny_only_multi() {
    assert_eq!(TraceContext::denied(false).to_b3_headers(), headers(&[(SAMPLED_HEADER, "0")]));
}

#[test]
fn test_malformed_is_error_not_partial_context() {
    let err = TraceContext::from_b3_header("zz-zz").unwrap_err();
    assert_eq!(err.value(), "zz-zz");
    assert!(err.to_string().contains("zz-zz"));

    let err = B3Propagator::multi()
        .extract(&headers(&[(TRACE_ID_HEADER, "zz"), (SPAN_ID_HEADER, "zz")]))
        .unwrap_err();
    assert_eq!(err.header(), TRACE_ID_HEADER);
    assert!(matches!(err.reason(), ParseErrorReason::IdLength { .. }));
}

#[test]
fn test_next_id_has_no_duplicates() {
    let ids: HashSet<String> = (0..10_000).map(|_| next_id()).collect();
    assert_eq!(ids.len(), 10_000);
    assert!(ids.iter().all(|id| id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))));
}

#[test]
fn test_next_id_lengths() {
    assert_eq!(next_id().len(), 16);
    assert_eq!(next_id_with_length(IdLength::Bits128).len(), 32);
}

fn arb_context() -> impl Strategy<Value = TraceContext> {
    let with_ids = (
        "[0-9a-f]{16}|[0-9a-f]{32}",
        "[0-9a-f]{16}",
        proptest::option::of("[0-9a-f]{16}"),
        prop_oneof![
            Just(Sampled::Accept),
            Just(Sampled::Deny),
            Just(Sampled::Debug),
            Just(Sampled::Defer),
        ],
    )
        .prop_map(|(t, s, p, sampled)| {
            let ctx = TraceContext::new(
                true,
                TraceId::from_hex(&t).unwrap(),
                SpanId::from_hex(&s).unwrap(),
            )
            .with_sampled(sampled);
            match p {
                Some(p) => ctx.with_parent_span_id(SpanId::from_hex(&p).unwrap()),
                None => ctx,
            }
        });
    prop_oneof![1 => Just(TraceContext::denied(true)), 9 => with_ids]
}

proptest! {
    #[test]
    fn prop_combined_round_trip(ctx in arb_context()) {
        let decoded = TraceContext::from_b3_header(&ctx.to_b3_header()).unwrap();
        prop_assert_eq!(decoded, ctx);
    }

    #[test]
    fn prop_multi_round_trip(ctx in arb_context()) {
        let ctx = ctx.with_initiated_here(false);
        let map: HashMap<String, String> = ctx.to_b3_headers();
        prop_assert_eq!(TraceContext::from_b3_headers(&map).unwrap(), ctx);
    }

    #[test]
    fn prop_styles_agree(ctx in arb_context()) {
        let from_combined = TraceContext::from_b3_header(&ctx.to_b3_header()).unwrap();
        let from_multi = TraceContext::from_b3_headers(&ctx.to_b3_headers()).unwrap();
        prop_assert_eq!(from_combined.with_initiated_here(false), from_multi);
    }
}
