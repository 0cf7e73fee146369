//! Property-based tests for remap lookup and source id normalization.
//!
//! Uses proptest to generate remapping tables and import literals and checks
//! the lookup invariants that resolution depends on:
//!
//! - the chosen key occurs in the literal
//! - no longer key occurs in the literal
//! - among equally long candidates the earliest inserted key wins
#![cfg(feature = "proptest")]

use proptest::prelude::*;
use solgraph::{RemappingTable, SourceId};

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for remap keys such as `@vendor` or `@vendor/sub`.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "@[a-c]{1,3}",
        "@[a-c]{1,3}/[a-c]{1,3}",
        "[a-c]{1,4}",
    ]
}

/// Strategy for import literals built from the same alphabet.
fn arb_literal() -> impl Strategy<Value = String> {
    "(@?[a-c]{1,3}/){0,3}[A-C][a-c]{0,4}\\.sol"
}

fn arb_table() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((arb_key(), "[a-z]{1,8}"), 0..8)
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_longest_match_is_longest(entries in arb_table(), literal in arb_literal()) {
        let table: RemappingTable = entries.iter().cloned().collect();

        match table.longest_match(&literal) {
            Some((key, _)) => {
                prop_assert!(literal.contains(key));
                for (other, _) in table.iter() {
                    if literal.contains(other) {
                        prop_assert!(other.len() <= key.len());
                    }
                }
                let first_of_len = table
                    .iter()
                    .find(|(k, _)| k.len() == key.len() && literal.contains(k))
                    .map(|(k, _)| k);
                prop_assert_eq!(first_of_len, Some(key));
            }
            None => {
                prop_assert!(table.iter().all(|(k, _)| !literal.contains(k)));
            }
        }
    }

    #[test]
    fn prop_source_id_normalization_is_idempotent(path in "(\\./)?([a-c]{1,3}[/\\\\]{1,2}){0,4}[A-C]\\.sol") {
        let once = SourceId::new(&path);
        let twice = SourceId::new(once.as_str());
        prop_assert_eq!(&once, &twice);
        prop_assert!(!once.as_str().contains('\\'));
        prop_assert!(!once.as_str().contains("//"));
        prop_assert!(!once.as_str().starts_with("./"));
    }
}
