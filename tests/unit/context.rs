//! Cross-call context merging over generated caller contexts.

use layers_mcp_server::context::{
    AuthInfo, ContextMerger, LogId, REQUEST_ID_KEY, RequestInfo, TransportExtras,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn log_id() -> impl Strategy<Value = LogId> {
    ("[a-z]{1,6}", "[a-z0-9]{1,8}").prop_map(|(name, value)| LogId::new(name, value))
}

fn log_ids() -> impl Strategy<Value = Vec<LogId>> {
    prop::collection::vec(log_id(), 0..4)
}

fn caller_context(ids: &[LogId], extra: &[(String, i64)]) -> Value {
    let mut context = json!({ "logging": { "ids": ids } });
    for (key, value) in extra {
        context[key.as_str()] = json!(value);
    }
    context
}

fn extra_keys() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[a-c]{1,2}", any::<i64>()), 0..4)
}

proptest! {
    #[test]
    fn log_ids_accumulate_in_source_order(
        top in log_ids(),
        nested in log_ids(),
        logger in log_ids(),
    ) {
        let context = ContextMerger::merge(
            Some(&caller_context(&top, &[])),
            Some(&caller_context(&nested, &[])),
            &TransportExtras::default(),
            &logger,
        );
        let expected: Vec<LogId> = top.into_iter().chain(nested).chain(logger).collect();
        prop_assert_eq!(context.log_ids(), expected.as_slice());
    }

    #[test]
    fn nested_keys_win_over_top_level(top in extra_keys(), nested in extra_keys()) {
        let context = ContextMerger::merge(
            Some(&caller_context(&[], &top)),
            Some(&caller_context(&[], &nested)),
            &TransportExtras::default(),
            &[],
        );
        for (key, _) in &top {
            let winner = nested
                .iter()
                .rev()
                .chain(top.iter().rev())
                .find(|(candidate, _)| candidate == key)
                .map(|(_, value)| json!(value));
            prop_assert_eq!(context.extra.get(key).cloned(), winner);
        }
    }

    #[test]
    fn transport_request_info_always_wins(client_value in "[a-z]{1,5}", transport_value in "[A-Z]{1,5}") {
        let client = json!({ "requestInfo": { "headers": { "x-tenant": client_value } } });
        let transport =
            TransportExtras::new(RequestInfo::default().with_header("x-tenant", transport_value.clone()));
        let context = ContextMerger::merge(Some(&client), None, &transport, &[]);
        prop_assert_eq!(&context.request_info.headers["x-tenant"], &json!(transport_value));
        prop_assert!(!context.extra.contains_key("requestInfo"));
    }
}

#[test]
fn test_transport_auth_replaces_client_claim() {
    let transport = TransportExtras::default().with_auth(AuthInfo {
        token: "real".to_string(),
        client_id: "svc".to_string(),
        scopes: vec!["read".to_string()],
        expires_at: None,
        resource: None,
        extra: None,
    });
    let client = json!({"authInfo": {"token": "forged", "clientId": "x", "scopes": []}});
    let context = ContextMerger::merge(Some(&client), None, &transport, &[]);

    let auth = context.auth_info.as_ref().expect("transport auth is carried");
    assert_eq!(auth.token, "real");
    assert_eq!(context.to_value()["authInfo"]["clientId"], "svc");
}

#[test]
fn test_merge_arguments_strips_context_from_handler_input() {
    let mut arguments = json!({
        "domain": "billing",
        "featureName": "createInvoice",
        "crossLayerProps": {"tenant": "acme"},
        "args": {"amount": 3, "crossLayerProps": {"tenant": "globex"}}
    });
    let context = ContextMerger::merge_arguments(
        &mut arguments,
        &TransportExtras::default(),
        &[LogId::request_id()],
    );

    assert_eq!(context.extra["tenant"], "globex");
    assert_eq!(arguments["args"], json!({"amount": 3}));
    assert!(arguments.get("crossLayerProps").is_none());
    assert!(context.request_id().is_some());
    assert_eq!(context.log_ids()[0].name(), REQUEST_ID_KEY);
}

#[test]
fn test_malformed_log_ids_are_dropped() {
    let client = json!({"logging": {"ids": [{"a": "1", "b": "2"}, "loose", {"traceId": 7}]}});
    let context = ContextMerger::merge(Some(&client), None, &TransportExtras::default(), &[]);
    assert_eq!(context.log_ids(), &[LogId::new("traceId", "7")]);
}
