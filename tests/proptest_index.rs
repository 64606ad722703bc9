//! Property-based tests using proptest
//!
//! These tests verify the resource-id grouping and the operation union
//! against randomized inputs.

use armx::operations::{index_resources, parse_resource_id, union_operations};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Generate a segment with mixed case and no slashes
fn arb_segment() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9.-]{0,15}"
}

/// Generate a well-formed resource id and the triple it should group under
fn arb_resource_id() -> impl Strategy<Value = (String, (String, String, String))> {
    (
        "[a-f0-9-]{8,36}",
        arb_segment(),
        arb_segment(),
        arb_segment(),
        arb_segment(),
    )
        .prop_map(|(sub, rg, provider, collection, name)| {
            let id = format!(
                "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
                sub, rg, provider, collection, name
            );
            (
                id,
                (rg.to_uppercase(), provider.to_uppercase(), collection.to_uppercase()),
            )
        })
}

/// Generate a small operation descriptor
fn arb_operation() -> impl Strategy<Value = Value> {
    (
        prop_oneof!["List", "Get", "Delete", "CreateOrUpdate"],
        prop_oneof!["GET", "PUT", "POST", "DELETE"],
        0u8..4,
    )
        .prop_map(|(name, method, version)| {
            json!({
                "MethodName": name,
                "HttpMethod": method,
                "ApiVersion": format!("2015-0{}-01", version + 1)
            })
        })
}

fn arb_batches() -> impl Strategy<Value = Vec<Vec<Value>>> {
    prop::collection::vec(prop::collection::vec(arb_operation(), 0..20), 0..6)
}

proptest! {
    /// Every well-formed id parses to its upper-cased segments
    #[test]
    fn well_formed_ids_parse((id, expected) in arb_resource_id()) {
        prop_assert_eq!(parse_resource_id(&id), Some(expected));
    }

    /// Each id lands in exactly the group it parses to, and nothing else
    #[test]
    fn index_contains_exactly_parsed_triples(
        entries in prop::collection::vec(arb_resource_id(), 0..50)
    ) {
        let index = index_resources(entries.iter().map(|(id, _)| id.as_str()));

        let expected: HashSet<_> = entries.iter().map(|(_, triple)| triple.clone()).collect();
        let actual: HashSet<_> = index
            .iter()
            .flat_map(|(rg, providers)| {
                providers.iter().flat_map(move |(provider, collections)| {
                    collections
                        .iter()
                        .map(move |c| (rg.clone(), provider.clone(), c.clone()))
                })
            })
            .collect();

        prop_assert_eq!(actual, expected);
    }

    /// Changing the case of an id never changes the index
    #[test]
    fn index_is_case_insensitive(
        entries in prop::collection::vec(arb_resource_id(), 0..30)
    ) {
        let ids: Vec<String> = entries.into_iter().map(|(id, _)| id).collect();
        let mixed: Vec<String> = ids
            .iter()
            .map(|id| {
                // keep the literal path segments intact, flip everything else
                id.split('/')
                    .map(|seg| match seg {
                        "subscriptions" | "resourceGroups" | "providers" => seg.to_string(),
                        other => other.to_lowercase(),
                    })
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();

        prop_assert_eq!(
            index_resources(ids.iter().map(String::as_str)),
            index_resources(mixed.iter().map(String::as_str))
        );
    }

    /// Ids without a providers segment never contribute
    #[test]
    fn ids_without_providers_are_skipped(rg in arb_segment(), sub in "[a-f0-9]{8}") {
        let id = format!("/subscriptions/{}/resourceGroups/{}/", sub, rg);
        prop_assert!(index_resources([id.as_str()]).is_empty());
    }

    /// Union output has no duplicates
    #[test]
    fn union_has_no_duplicates(batches in arb_batches()) {
        let merged = union_operations(batches);
        for (i, a) in merged.iter().enumerate() {
            for b in merged.iter().skip(i + 1) {
                prop_assert_ne!(a, b);
            }
        }
    }

    /// Union keeps every distinct input and the order of first occurrence
    #[test]
    fn union_preserves_first_occurrence_order(batches in arb_batches()) {
        let flat: Vec<Value> = batches.iter().flatten().cloned().collect();
        let mut expected: Vec<Value> = Vec::new();
        for op in &flat {
            if !expected.contains(op) {
                expected.push(op.clone());
            }
        }

        prop_assert_eq!(union_operations(batches), expected);
    }
}
