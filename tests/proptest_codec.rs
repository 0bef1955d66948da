//! Property-based tests for the Huffman codec.
//!
//! - compress/decompress is lossless for arbitrary byte buffers
//! - output is deterministic
//! - code tables are prefix-free
//! - tables built from permuted pairs yield identical trees

use proptest::prelude::*;

use huffpack::{CodeTable, CompressedArtifact, FrequencyTable, HuffmanTree, compress, decompress};

/// Byte buffers drawn from a small alphabet, so frequencies are skewed and ties common.
fn small_alphabet_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c'), Just(0u8)], 0..512)
}

/// Distinct (symbol, count) pairs.
fn pairs_strategy() -> impl Strategy<Value = Vec<(u8, u64)>> {
    prop::collection::btree_map(any::<u8>(), 1u64..50, 1..40)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    })]

    /// Property: decompress(compress(x)) == x.
    #[test]
    fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let artifact = compress(&data).unwrap();
        prop_assert_eq!(decompress(&artifact).unwrap(), data);
    }

    /// Property: round trip survives serialization to bytes.
    #[test]
    fn prop_roundtrip_through_bytes(data in small_alphabet_strategy()) {
        let bytes = compress(&data).unwrap().to_bytes().unwrap();
        let parsed = CompressedArtifact::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decompress(&parsed).unwrap(), data);
    }

    /// Property: identical input gives byte-identical artifacts.
    #[test]
    fn prop_deterministic(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        let first = compress(&data).unwrap().to_bytes().unwrap();
        let second = compress(&data).unwrap().to_bytes().unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: no code is a prefix of another.
    #[test]
    fn prop_prefix_free(pairs in pairs_strategy()) {
        let table = FrequencyTable::from_pairs(pairs).unwrap();
        let codes = CodeTable::build(&HuffmanTree::build(&table).unwrap()).unwrap();
        let all: Vec<&[bool]> = codes.iter().map(|(_, code)| code).collect();
        for (i, a) in all.iter().enumerate() {
            prop_assert!(!a.is_empty());
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    prop_assert!(!b.starts_with(a));
                }
            }
        }
    }

    /// Property: pair order does not affect the tree or the codes.
    #[test]
    fn prop_tie_break_ignores_pair_order(pairs in pairs_strategy()) {
        let mut reversed = pairs.clone();
        reversed.reverse();

        let a = FrequencyTable::from_pairs(pairs).unwrap();
        let b = FrequencyTable::from_pairs(reversed).unwrap();
        let tree_a = HuffmanTree::build(&a).unwrap();
        let tree_b = HuffmanTree::build(&b).unwrap();
        prop_assert_eq!(&tree_a, &tree_b);
        prop_assert_eq!(CodeTable::build(&tree_a).unwrap(), CodeTable::build(&tree_b).unwrap());
    }

    /// Property: dropping the last packed byte is always reported as truncation.
    #[test]
    fn prop_truncation_detected(data in prop::collection::vec(any::<u8>(), 1..512)) {
        let (table, bit_len, mut packed) = compress(&data).unwrap().into_parts();
        packed.pop();
        let artifact = CompressedArtifact::new(table, bit_len, packed);
        let is_truncated = matches!(
            decompress(&artifact),
            Err(huffpack::Error::TruncatedData { expected, .. }) if expected == data.len() as u64
        );
        prop_assert!(is_truncated);
    }
}
