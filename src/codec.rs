//! Huffman encoder and decoder over fully materialized byte buffers.
//!
//! ## Artifact layout
//!
//! [`CompressedArtifact::to_bytes`] writes the fields in this order, all
//! integers little-endian (bincode fixed-width encoding):
//!
//! ```text
//! u64                 k, number of frequency entries (0..=256)
//! k x (u8, u64)       (symbol, count), ascending by symbol, count > 0
//! u64                 b, total bits in the encoded stream
//! u64                 p, packed byte count, ceil(b / 8)
//! p x u8              packed bits, MSB first, zero padded
//! ```
//!
//! The decoder rebuilds the tree from the frequency table, so the
//! deterministic merge order in [`HuffmanTree::build`] is part of the format.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::bits::{self, BitCursor};
use crate::code_table::CodeTable;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, Node};

/// Self-describing output of [`compress`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedArtifact {
    table: FrequencyTable,
    bit_len: u64,
    packed: Vec<u8>,
}

impl CompressedArtifact {
    /// Assemble an artifact from its parts. Nothing is validated until
    /// [`decompress`] runs.
    pub fn new(table: FrequencyTable, bit_len: u64, packed: Vec<u8>) -> Self {
        CompressedArtifact {
            table,
            bit_len,
            packed,
        }
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    pub fn packed(&self) -> &[u8] {
        &self.packed
    }

    pub fn into_parts(self) -> (FrequencyTable, u64, Vec<u8>) {
        (self.table, self.bit_len, self.packed)
    }

    /// Number of symbols the artifact decodes to.
    pub fn original_len(&self) -> Result<u64> {
        self.table.total()
    }

    pub fn distinct_symbols(&self) -> usize {
        self.table.len()
    }

    /// Size of [`Self::to_bytes`] output, computed from the layout.
    pub fn serialized_len(&self) -> u64 {
        8 + 9 * self.table.len() as u64 + 8 + 8 + self.packed.len() as u64
    }

    /// Serialized size over original size; `None` for an empty input.
    pub fn ratio(&self) -> Option<f64> {
        match self.original_len() {
            Ok(0) | Err(_) => None,
            Ok(len) => Some(self.serialized_len() as f64 / len as f64),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::InvalidFormat(e.to_string()))
    }

    /// Parse the layout documented at module level. Trailing bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let artifact = Self::read_from(&mut cursor)?;
        let consumed = cursor.position();
        if consumed != bytes.len() as u64 {
            return Err(Error::InvalidFormat(format!(
                "{} trailing bytes after artifact",
                bytes.len() as u64 - consumed
            )));
        }
        Ok(artifact)
    }

    pub(crate) fn read_from(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        bincode::deserialize_from(cursor).map_err(|e| Error::from_bincode(e, "artifact"))
    }
}

/// Compress `data` into a self-contained artifact.
///
/// Empty input yields the canonical empty artifact: no table entries, zero
/// bits and no packed bytes.
pub fn compress(data: &[u8]) -> Result<CompressedArtifact> {
    let table = FrequencyTable::count(data);
    if table.is_empty() {
        return Ok(CompressedArtifact::default());
    }

    let tree = HuffmanTree::build(&table)?;
    let codes = CodeTable::build(&tree)?;
    let packed = bits::pack(data, &codes)?;

    Ok(CompressedArtifact {
        table,
        bit_len: packed.bit_len,
        packed: packed.bytes,
    })
}

/// Reconstruct the original bytes from `artifact`.
pub fn decompress(artifact: &CompressedArtifact) -> Result<Vec<u8>> {
    let expected = artifact.table.total()?;
    let available_bits = artifact.packed.len() as u64 * 8;

    if artifact.table.is_empty() {
        if artifact.bit_len != 0 || !artifact.packed.is_empty() {
            return Err(Error::LengthMismatch {
                expected: 0,
                actual: artifact.bit_len.max(available_bits),
            });
        }
        return Ok(Vec::new());
    }

    let tree = HuffmanTree::build(&artifact.table)?;
    let codes = CodeTable::build(&tree)?;

    let predicted = codes.encoded_bit_len(&artifact.table)?;
    if predicted != artifact.bit_len {
        return Err(Error::LengthMismatch {
            expected: predicted,
            actual: artifact.bit_len,
        });
    }
    if artifact.packed.len() as u64 > bits::packed_len(artifact.bit_len) {
        return Err(Error::LengthMismatch {
            expected: artifact.bit_len,
            actual: available_bits,
        });
    }

    decode_symbols(&tree, &artifact.packed, artifact.bit_len, expected)
}

/// Walk `tree` from the root for each of `expected` symbols.
pub fn decode_symbols(
    tree: &HuffmanTree,
    packed: &[u8],
    bit_len: u64,
    expected: u64,
) -> Result<Vec<u8>> {
    let mut cursor = BitCursor::new(packed, bit_len);
    let capacity = expected.min(packed.len() as u64 * 8);
    let mut output = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));

    while (output.len() as u64) < expected {
        match decode_one(tree.root(), &mut cursor)? {
            Some(byte) => output.push(byte),
            None => {
                return Err(Error::TruncatedData {
                    decoded: output.len() as u64,
                    expected,
                });
            }
        }
    }

    if cursor.position() != bit_len {
        return Err(Error::LengthMismatch {
            expected: bit_len,
            actual: cursor.position(),
        });
    }
    Ok(output)
}

// None means the stream ran out mid-symbol.
fn decode_one(root: &Node, cursor: &mut BitCursor<'_>) -> Result<Option<u8>> {
    // single-leaf tree: every occurrence spends its one-bit code
    if let Some(byte) = root.byte {
        return Ok(cursor.next_bit()?.map(|_| byte));
    }

    let mut node = root;
    loop {
        let Some(bit) = cursor.next_bit()? else {
            return Ok(None);
        };
        let next = if bit {
            node.right.as_deref()
        } else {
            node.left.as_deref()
        };
        node = next.ok_or_else(|| Error::malformed("bit path leads off the tree"))?;
        if let Some(byte) = node.byte {
            return Ok(Some(byte));
        }
    }
}
