//! Property tests for hide rule resolution.

use layers_mcp_server::visibility::{HideComponents, MODELS_CONTAINER, SYSTEM_DOMAINS};
use layers_mcp_server::VisibilityResolver;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("billing".to_string()),
        Just("shop".to_string()),
        Just(MODELS_CONTAINER.to_string()),
        Just("Order".to_string()),
        Just("save".to_string()),
        "[a-c]{1,2}",
    ]
}

fn path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

fn rules() -> impl Strategy<Value = HideComponents> {
    (
        prop::collection::vec(path().prop_map(|path| path.join(".")), 0..4),
        prop::collection::vec(segment(), 0..2),
        any::<bool>(),
    )
        .prop_map(|(paths, domains, all_models)| {
            HideComponents::default()
                .with_paths(paths)
                .with_domains(domains)
                .with_all_models(all_models)
        })
}

proptest! {
    #[test]
    fn hiding_is_inherited_by_descendants(
        rules in rules(),
        path in path(),
        extension in prop::collection::vec(segment(), 1..3),
    ) {
        let resolver = VisibilityResolver::new(&rules);
        if resolver.is_hidden(path.as_slice()) {
            let mut longer = path.clone();
            longer.extend(extension);
            prop_assert!(resolver.is_hidden(longer.as_slice()));
        }
    }

    #[test]
    fn adding_rules_never_reveals(
        rules in rules(),
        extra in path(),
        candidate in path(),
    ) {
        let before = VisibilityResolver::new(&rules);
        let after = VisibilityResolver::new(&rules.clone().with_paths([extra.join(".")]));
        if before.is_hidden(candidate.as_slice()) {
            prop_assert!(after.is_hidden(candidate.as_slice()));
        }
    }

    #[test]
    fn configured_path_is_hidden_exactly(path in path()) {
        let resolver = VisibilityResolver::new(
            &HideComponents::default().with_paths([path.join(".")]),
        );
        prop_assert!(resolver.is_hidden(path.as_slice()));
        if path.len() > 1 {
            prop_assert!(!resolver.is_hidden(&path[..path.len() - 1]));
        }
    }

    #[test]
    fn system_domains_are_hidden_under_any_rules(rules in rules(), rest in prop::collection::vec(segment(), 0..3)) {
        let resolver = VisibilityResolver::new(&rules);
        for domain in SYSTEM_DOMAINS {
            let mut path = vec![domain.to_string()];
            path.extend(rest.iter().cloned());
            prop_assert!(resolver.is_hidden(path.as_slice()));
        }
    }
}

#[test]
fn test_invoice_feature_path() {
    let resolver = VisibilityResolver::new(
        &HideComponents::default().with_paths(["billing.createInvoice"]),
    );
    assert!(resolver.is_feature_hidden("billing", "createInvoice"));
    assert!(!resolver.is_feature_hidden("billing", "listInvoices"));
    assert!(!resolver.is_domain_hidden("billing"));
}

#[test]
fn test_all_models_leaves_features_visible() {
    let resolver = VisibilityResolver::new(&HideComponents::default().with_all_models(true));
    assert!(resolver.are_models_hidden("shop"));
    assert!(resolver.is_operation_hidden("shop", "Order", "save"));
    assert!(!resolver.is_feature_hidden("shop", "checkout"));
}
