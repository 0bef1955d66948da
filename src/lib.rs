//! # huffpack
//!
//! Lossless Huffman compression of arbitrary byte buffers.
//!
//! ```rust
//! let data = b"abracadabra".to_vec();
//! let artifact = huffpack::compress(&data)?;
//! let bytes = artifact.to_bytes()?;
//!
//! let parsed = huffpack::CompressedArtifact::from_bytes(&bytes)?;
//! assert_eq!(huffpack::decompress(&parsed)?, data);
//! # Ok::<(), huffpack::Error>(())
//! ```
//!
//! The codec (`frequency` through `codec`) is pure and synchronous; the
//! `container` module adds the on-disk `.hfp` envelope with a SHA-256 digest.

pub mod bits;
pub mod code_table;
pub mod codec;
pub mod container;
pub mod error;
pub mod frequency;
pub mod tree;
pub mod utils;

pub use code_table::CodeTable;
pub use codec::{CompressedArtifact, compress, decompress};
pub use container::Envelope;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use tree::{HuffmanTree, Node};
