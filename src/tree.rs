use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;

/// One node of a Huffman tree.
///
/// A leaf carries `byte` and no children; an internal node carries both
/// children and no byte. `freq` is the symbol count for a leaf and the sum of
/// the children's counts for an internal node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub freq: u64,
    pub byte: Option<u8>,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    pub fn leaf(byte: u8, freq: u64) -> Self {
        Node {
            freq,
            byte: Some(byte),
            left: None,
            right: None,
        }
    }

    /// Join two subtrees; `left` takes the 0 branch.
    pub fn merge(left: Node, right: Node) -> Self {
        Node {
            freq: left.freq + right.freq,
            byte: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.byte.is_some()
    }

    /// Verify this subtree is well formed, collecting leaf symbols into `seen`.
    fn check(&self, seen: &mut BTreeSet<u8>) -> Result<()> {
        match (self.byte, self.left.as_deref(), self.right.as_deref()) {
            (Some(byte), None, None) => {
                if !seen.insert(byte) {
                    return Err(Error::malformed(format!("symbol {byte} appears in two leaves")));
                }
                if self.freq == 0 {
                    return Err(Error::malformed(format!("leaf {byte} has zero frequency")));
                }
                Ok(())
            }
            (None, Some(left), Some(right)) => {
                left.check(seen)?;
                right.check(seen)?;
                if left.freq.checked_add(right.freq) != Some(self.freq) {
                    return Err(Error::malformed(format!(
                        "internal node weight {} is not {} + {}",
                        self.freq, left.freq, right.freq
                    )));
                }
                Ok(())
            }
            (Some(byte), _, _) => {
                Err(Error::malformed(format!("leaf {byte} must not have children")))
            }
            (None, _, _) => Err(Error::malformed("internal node needs exactly two children")),
        }
    }

    fn depth(&self) -> usize {
        match (self.left.as_deref(), self.right.as_deref()) {
            (Some(left), Some(right)) => 1 + left.depth().max(right.depth()),
            _ => 0,
        }
    }
}

// Merge candidate. BinaryHeap is a max-heap, so the ordering is reversed:
// lowest frequency first, then earliest created.
struct Candidate {
    order: usize,
    node: Node,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.node.freq == other.node.freq && self.order == other.order
    }
}
impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .node
            .freq
            .cmp(&self.node.freq)
            .then_with(|| other.order.cmp(&self.order))
    }
}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree by repeatedly merging the two lightest candidates.
    ///
    /// Leaves are created in ascending symbol order and every merged node is
    /// created after all existing ones; among equal frequencies the earliest
    /// created node is taken first and becomes the left child. The same table
    /// therefore always yields the same tree.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }
        table.validate()?;

        let mut heap: BinaryHeap<Candidate> = table
            .iter()
            .enumerate()
            .map(|(order, (byte, freq))| Candidate {
                order,
                node: Node::leaf(byte, freq),
            })
            .collect();
        let mut next_order = heap.len();

        loop {
            let left = heap.pop().ok_or(Error::EmptyInput)?;
            let Some(right) = heap.pop() else {
                return Ok(HuffmanTree { root: left.node });
            };
            heap.push(Candidate {
                order: next_order,
                node: Node::merge(left.node, right.node),
            });
            next_order += 1;
        }
    }

    /// Adopt an externally assembled tree after checking its structure.
    pub fn from_root(root: Node) -> Result<Self> {
        root.check(&mut BTreeSet::new())?;
        Ok(HuffmanTree { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total weight, equal to the number of encoded symbols.
    pub fn weight(&self) -> u64 {
        self.root.freq
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// A lone leaf has no branching; the codec gives it a 1-bit code.
    pub fn is_single_leaf(&self) -> bool {
        self.root.is_leaf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_symbols(node: &Node, out: &mut Vec<u8>) {
        match node.byte {
            Some(byte) => out.push(byte),
            None => {
                leaf_symbols(node.left.as_deref().unwrap(), out);
                leaf_symbols(node.right.as_deref().unwrap(), out);
            }
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let result = HuffmanTree::build(&FrequencyTable::default());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn single_symbol_gives_single_leaf() {
        let tree = HuffmanTree::build(&FrequencyTable::count(&[7; 10])).unwrap();
        assert!(tree.is_single_leaf());
        assert_eq!(tree.weight(), 10);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn root_weight_is_input_length() {
        let data = b"she sells sea shells by the sea shore";
        let tree = HuffmanTree::build(&FrequencyTable::count(data)).unwrap();
        assert_eq!(tree.weight(), data.len() as u64);
        assert_eq!(HuffmanTree::from_root(tree.root().clone()).unwrap(), tree);
    }

    #[test]
    fn leaves_match_table_keys() {
        let table = FrequencyTable::count(b"mississippi river");
        let tree = HuffmanTree::build(&table).unwrap();
        let mut symbols = Vec::new();
        leaf_symbols(tree.root(), &mut symbols);
        symbols.sort_unstable();
        let keys: Vec<u8> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, keys);
    }

    #[test]
    fn ties_break_by_creation_order() {
        // a, b, c, d all weigh 1: (a,b) merge first, then (c,d), then the two pairs.
        let table =
            FrequencyTable::from_pairs([(b'd', 1), (b'c', 1), (b'b', 1), (b'a', 1)]).unwrap();
        let tree = HuffmanTree::build(&table).unwrap();
        let mut order = Vec::new();
        leaf_symbols(tree.root(), &mut order);
        assert_eq!(order, b"abcd".to_vec());
    }

    #[test]
    fn leaf_beats_later_merged_node_on_tie() {
        // a=1, b=1 merge into weight 2; c=2 was created earlier so it goes left.
        let table = FrequencyTable::from_pairs([(b'a', 1), (b'b', 1), (b'c', 2)]).unwrap();
        let tree = HuffmanTree::build(&table).unwrap();
        let root = tree.root();
        assert_eq!(root.left.as_deref().unwrap().byte, Some(b'c'));
        assert!(!root.right.as_deref().unwrap().is_leaf());
    }

    #[test]
    fn from_root_rejects_half_internal_node() {
        let bad = Node {
            freq: 3,
            byte: None,
            left: Some(Box::new(Node::leaf(1, 3))),
            right: None,
        };
        assert!(matches!(HuffmanTree::from_root(bad), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn from_root_rejects_leaf_with_children() {
        let bad = Node {
            freq: 2,
            byte: Some(4),
            left: Some(Box::new(Node::leaf(1, 1))),
            right: Some(Box::new(Node::leaf(2, 1))),
        };
        assert!(matches!(HuffmanTree::from_root(bad), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn from_root_rejects_wrong_weight_and_duplicates() {
        let mut wrong_weight = Node::merge(Node::leaf(1, 1), Node::leaf(2, 1));
        wrong_weight.freq = 5;
        assert!(HuffmanTree::from_root(wrong_weight).is_err());

        let duplicate = Node::merge(Node::leaf(1, 1), Node::leaf(1, 1));
        assert!(HuffmanTree::from_root(duplicate).is_err());
    }
}
