//! The `.hfp` file envelope around a [`CompressedArtifact`].
//!
//! ```text
//! [u8; 4]     magic "HUFP"
//! u16         format version
//! u64 + 32    SHA-256 of the original input (length-prefixed)
//! ...         artifact, see the codec module
//! ```

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::codec::{self, CompressedArtifact};
use crate::error::{Error, Result};
use crate::utils;

pub const MAGIC: [u8; 4] = *b"HUFP";
pub const VERSION: u16 = 1;
pub const EXTENSION: &str = "hfp";

const DIGEST_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u16,
    digest: Vec<u8>,
}

/// A compressed artifact plus the digest of the data it decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    digest: [u8; DIGEST_LEN],
    artifact: CompressedArtifact,
}

impl Envelope {
    /// Compress `data` and record its digest.
    pub fn seal(data: &[u8]) -> Result<Self> {
        let artifact = codec::compress(data)?;
        let digest = Sha256::digest(data).into();
        debug!(
            input_len = data.len(),
            distinct = artifact.distinct_symbols(),
            bits = artifact.bit_len(),
            "sealed envelope"
        );
        Ok(Envelope { digest, artifact })
    }

    /// Decompress and verify against the stored digest.
    pub fn open(&self) -> Result<Vec<u8>> {
        let data = codec::decompress(&self.artifact)?;
        let actual: [u8; DIGEST_LEN] = Sha256::digest(&data).into();
        if actual != self.digest {
            return Err(Error::ChecksumMismatch);
        }
        Ok(data)
    }

    pub fn artifact(&self) -> &CompressedArtifact {
        &self.artifact
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header = Header {
            magic: MAGIC,
            version: VERSION,
            digest: self.digest.to_vec(),
        };
        let mut bytes =
            bincode::serialize(&header).map_err(|e| Error::InvalidFormat(e.to_string()))?;
        bytes.extend_from_slice(&self.artifact.to_bytes()?);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header: Header = bincode::deserialize_from(&mut cursor)
            .map_err(|e| Error::from_bincode(e, "envelope header"))?;

        if header.magic != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad magic {:?}, not a .{EXTENSION} file",
                header.magic
            )));
        }
        if header.version != VERSION {
            return Err(Error::UnsupportedVersion(header.version));
        }
        let digest: [u8; DIGEST_LEN] = header.digest.as_slice().try_into().map_err(|_| {
            Error::InvalidFormat(format!(
                "digest is {} bytes, expected {DIGEST_LEN}",
                header.digest.len()
            ))
        })?;

        let start = cursor.position() as usize;
        let artifact = CompressedArtifact::from_bytes(&bytes[start..])?;
        Ok(Envelope { digest, artifact })
    }
}

/// Sizes reported after writing or inspecting an envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub original_len: u64,
    pub stored_len: u64,
}

impl Report {
    /// Stored size over original size; 0 for an empty original.
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            0.0
        } else {
            self.stored_len as f64 / self.original_len as f64
        }
    }
}

/// Compress the file at `input` into an envelope at `output`.
pub fn compress_file(input: &Path, output: &Path, force: bool) -> Result<Report> {
    let data = utils::read_file(input)?;
    let envelope = Envelope::seal(&data)?;
    let bytes = envelope.to_bytes()?;
    utils::write_file_atomic(output, &bytes, force)?;

    let report = Report {
        original_len: data.len() as u64,
        stored_len: bytes.len() as u64,
    };
    info!(
        input = %input.display(),
        output = %output.display(),
        original = report.original_len,
        stored = report.stored_len,
        "compressed file"
    );
    Ok(report)
}

/// Decode the envelope at `input`, verify it and write the original to `output`.
pub fn decompress_file(input: &Path, output: &Path, force: bool) -> Result<Report> {
    let bytes = utils::read_file(input)?;
    let envelope = Envelope::from_bytes(&bytes)?;
    let data = envelope.open()?;
    utils::write_file_atomic(output, &data, force)?;

    let report = Report {
        original_len: data.len() as u64,
        stored_len: bytes.len() as u64,
    };
    info!(
        input = %input.display(),
        output = %output.display(),
        restored = report.original_len,
        "decompressed file"
    );
    Ok(report)
}

/// Parse an envelope from disk without decoding its payload.
pub fn read_envelope(path: &Path) -> Result<(Envelope, u64)> {
    let bytes = utils::read_file(path)?;
    let envelope = Envelope::from_bytes(&bytes)?;
    Ok((envelope, bytes.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_and_open() {
        let data = b"a small clip of not-really-video bytes".repeat(10);
        let envelope = Envelope::seal(&data).unwrap();
        let bytes = envelope.to_bytes().unwrap();
        let parsed = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.open().unwrap(), data);
    }

    #[test]
    fn header_layout() {
        let bytes = Envelope::seal(b"xy").unwrap().to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"HUFP");
        assert_eq!(&bytes[4..6], &VERSION.to_le_bytes());
        assert_eq!(&bytes[6..14], &32u64.to_le_bytes());
        assert_eq!(&bytes[14..46], Sha256::digest(b"xy").as_slice());
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        let mut bytes = Envelope::seal(b"data").unwrap().to_bytes().unwrap();
        let mut wrong_magic = bytes.clone();
        wrong_magic[0] = b'X';
        assert!(matches!(
            Envelope::from_bytes(&wrong_magic),
            Err(Error::InvalidFormat(_))
        ));

        bytes[4..6].copy_from_slice(&9u16.to_le_bytes());
        assert!(matches!(
            Envelope::from_bytes(&bytes),
            Err(Error::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn detects_digest_mismatch() {
        let mut bytes = Envelope::seal(b"checksum me").unwrap().to_bytes().unwrap();
        bytes[14] ^= 0xff;
        let envelope = Envelope::from_bytes(&bytes).unwrap();
        assert!(matches!(envelope.open(), Err(Error::ChecksumMismatch)));
    }

    #[test]
    fn short_header_is_unexpected_eof() {
        let bytes = Envelope::seal(b"abc").unwrap().to_bytes().unwrap();
        assert!(matches!(
            Envelope::from_bytes(&bytes[..10]),
            Err(Error::UnexpectedEof(_))
        ));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let packed = dir.path().join("clip.mp4.hfp");
        let restored = dir.path().join("restored.mp4");

        let mut data = vec![0u8; 4096];
        data.extend((0..=255u8).cycle().take(1024));
        std::fs::write(&input, &data).unwrap();

        let report = compress_file(&input, &packed, false).unwrap();
        assert_eq!(report.original_len, data.len() as u64);
        assert!(report.ratio() < 1.0);

        decompress_file(&packed, &restored, false).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), data);

        let (envelope, stored) = read_envelope(&packed).unwrap();
        assert_eq!(stored, report.stored_len);
        assert_eq!(envelope.artifact().original_len().unwrap(), data.len() as u64);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("in.bin.hfp");
        std::fs::write(&input, b"payload").unwrap();
        std::fs::write(&output, b"existing").unwrap();

        assert!(matches!(
            compress_file(&input, &output, false),
            Err(Error::Io(_))
        ));
        compress_file(&input, &output, true).unwrap();
    }
}
