//! Property-based tests for the template codec and the status catalog.
//!
//! These tests use proptest to generate arbitrary inputs and verify that the
//! transport encoding and the catalog lookup behave for every value.

use proptest::prelude::*;
use scanbridge_core::catalog::{self, UNKNOWN_ERROR};
use scanbridge_core::codec::{decode, encode};
use scanbridge_core::constants::TEMPLATE_SIZE;
use scanbridge_core::{SecurityLevel, Template};

/// Strategy for buffers up to twice the vendor template size.
fn template_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=TEMPLATE_SIZE * 2)
}

proptest! {
    /// Property: decoding an encoded buffer yields the original bytes.
    #[test]
    fn prop_codec_roundtrip(bytes in template_bytes()) {
        prop_assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    /// Property: non-empty templates survive the request field path.
    #[test]
    fn prop_template_field_roundtrip(bytes in prop::collection::vec(any::<u8>(), 1..=TEMPLATE_SIZE)) {
        let text = encode(&bytes);
        let template = Template::from_field("template1", Some(&text)).unwrap();
        prop_assert_eq!(template.as_bytes(), bytes.as_slice());
    }

    /// Property: decoding arbitrary text never panics.
    #[test]
    fn prop_decode_arbitrary_text(text in ".{0,64}") {
        let _ = decode(&text);
    }

    /// Property: every code maps to a non-empty phrase.
    #[test]
    fn prop_lookup_total(code in any::<i32>()) {
        prop_assert!(!catalog::lookup(code).is_empty());
    }

    /// Property: codes outside the documented ranges map to the generic phrase.
    #[test]
    fn prop_lookup_unknown_outside_table(code in any::<i32>().prop_filter(
        "documented code",
        |c| !((0..=7).contains(c) || (51..=61).contains(c) || (101..=106).contains(c)),
    )) {
        prop_assert_eq!(catalog::lookup(code), UNKNOWN_ERROR);
    }

    /// Property: security level resolution is total and case-insensitive.
    #[test]
    fn prop_security_level_case_insensitive(index in 0usize..9, upper in any::<bool>()) {
        let level = SecurityLevel::ALL[index];
        let name = if upper { level.name().to_string() } else { level.name().to_lowercase() };
        prop_assert_eq!(SecurityLevel::from_name(&name), level);
    }
}
