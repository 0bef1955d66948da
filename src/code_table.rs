use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, Node};

/// Prefix-free bit codes keyed by symbol. `false` is a 0 bit (left branch).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Vec<bool>>,
}

impl CodeTable {
    /// Walk `tree` and record each leaf's root path as its code.
    pub fn build(tree: &HuffmanTree) -> Result<Self> {
        let mut codes = BTreeMap::new();
        let root = tree.root();

        // A lone leaf has an empty path; give it "0" instead.
        if root.is_leaf() {
            let byte = leaf_byte(root)?;
            codes.insert(byte, vec![false]);
            return Ok(CodeTable { codes });
        }

        walk(root, Vec::new(), &mut codes)?;
        Ok(CodeTable { codes })
    }

    pub fn code(&self, symbol: u8) -> Option<&[bool]> {
        self.codes.get(&symbol).map(Vec::as_slice)
    }

    /// Render a code as a string of '0' and '1'.
    pub fn code_string(&self, symbol: u8) -> Option<String> {
        self.code(symbol)
            .map(|bits| bits.iter().map(|&b| if b { '1' } else { '0' }).collect())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[bool])> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_slice()))
    }

    /// Number of bits the input described by `table` encodes to.
    pub fn encoded_bit_len(&self, table: &FrequencyTable) -> Result<u64> {
        table.iter().try_fold(0u64, |acc, (symbol, count)| {
            let code = self
                .code(symbol)
                .ok_or_else(|| Error::malformed(format!("symbol {symbol} has no code")))?;
            count
                .checked_mul(code.len() as u64)
                .and_then(|bits| acc.checked_add(bits))
                .ok_or_else(|| Error::malformed("encoded bit length overflows u64"))
        })
    }
}

fn leaf_byte(node: &Node) -> Result<u8> {
    match (node.byte, &node.left, &node.right) {
        (Some(byte), None, None) => Ok(byte),
        _ => Err(Error::malformed("leaf must hold a symbol and no children")),
    }
}

fn walk(node: &Node, prefix: Vec<bool>, codes: &mut BTreeMap<u8, Vec<bool>>) -> Result<()> {
    match (node.byte, node.left.as_deref(), node.right.as_deref()) {
        (Some(byte), None, None) => {
            if codes.insert(byte, prefix).is_some() {
                return Err(Error::malformed(format!("symbol {byte} appears in two leaves")));
            }
            Ok(())
        }
        (None, Some(left), Some(right)) => {
            let mut left_prefix = prefix.clone();
            left_prefix.push(false);
            walk(left, left_prefix, codes)?;

            let mut right_prefix = prefix;
            right_prefix.push(true);
            walk(right, right_prefix, codes)
        }
        _ => Err(Error::malformed(
            "node is neither a leaf nor an internal node with two children",
        )),
    }
}
