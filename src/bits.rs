//! Bit-level packing of code sequences, MSB-first within each byte.

use std::io::{self, Cursor};

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::code_table::CodeTable;
use crate::error::{Error, Result};

/// A dense bit buffer plus the exact number of meaningful bits in it.
///
/// The final byte is zero padded when `bit_len` is not a multiple of 8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBits {
    pub bytes: Vec<u8>,
    pub bit_len: u64,
}

/// Bytes needed to hold `bit_len` bits.
pub fn packed_len(bit_len: u64) -> u64 {
    bit_len.div_ceil(8)
}

/// Concatenate the code of every byte of `data` and pack the result.
pub fn pack(data: &[u8], codes: &CodeTable) -> Result<PackedBits> {
    let mut bytes = Vec::new();
    let mut bit_len = 0u64;
    {
        let mut writer = BitWriter::endian(&mut bytes, BigEndian);
        for &byte in data {
            let code = codes
                .code(byte)
                .ok_or_else(|| Error::malformed(format!("byte {byte} not in code table")))?;
            for &bit in code {
                writer.write_bit(bit)?;
            }
            bit_len += code.len() as u64;
        }
        writer.byte_align()?;
    }
    Ok(PackedBits { bytes, bit_len })
}

/// Reads single bits from a packed buffer, refusing to go past `limit` bits.
pub struct BitCursor<'a> {
    reader: BitReader<Cursor<&'a [u8]>, BigEndian>,
    position: u64,
    limit: u64,
}

impl<'a> BitCursor<'a> {
    pub fn new(bytes: &'a [u8], limit: u64) -> Self {
        BitCursor {
            reader: BitReader::endian(Cursor::new(bytes), BigEndian),
            position: 0,
            limit,
        }
    }

    /// Next bit, or `None` once the limit or the end of the buffer is reached.
    pub fn next_bit(&mut self) -> io::Result<Option<bool>> {
        if self.position >= self.limit {
            return Ok(None);
        }
        match self.reader.read_bit() {
            Ok(bit) => {
                self.position += 1;
                Ok(Some(bit))
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Bits consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}
