use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Occurrence count of every byte value present in an input.
///
/// Symbols that never occur are absent rather than stored with a zero count.
/// Entries are kept in ascending symbol order, which is also the order the
/// tree builder creates its leaves in.
///
/// Serialized as a length-prefixed sequence of `(symbol, count)` pairs.
/// Deserializing rejects zero counts and symbols that are not strictly
/// ascending, so every accepted encoding is the canonical one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    /// Tally each byte value of `data`.
    pub fn count(data: &[u8]) -> Self {
        // flat array first, the map only ever sees symbols that occur
        let mut tally = [0u64; 256];
        for &byte in data {
            tally[byte as usize] += 1;
        }

        let counts = tally
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
            .collect();

        FrequencyTable { counts }
    }

    /// Build a table from explicit `(symbol, count)` pairs in any order.
    ///
    /// Rejects zero counts and repeated symbols.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, u64)>,
    {
        let mut counts = BTreeMap::new();
        for (symbol, count) in pairs {
            if count == 0 {
                return Err(Error::malformed(format!("symbol {symbol} has a zero count")));
            }
            if counts.insert(symbol, count).is_some() {
                return Err(Error::malformed(format!("symbol {symbol} listed twice")));
            }
        }
        Ok(FrequencyTable { counts })
    }

    pub fn get(&self, symbol: u8) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }

    /// Sum of all counts, i.e. the length of the input the table describes.
    ///
    /// Fails on overflow, which only a forged table can produce.
    pub fn total(&self) -> Result<u64> {
        self.counts.values().try_fold(0u64, |acc, &count| {
            acc.checked_add(count)
                .ok_or_else(|| Error::malformed("symbol counts overflow u64"))
        })
    }

    /// Counts are positive by construction; their sum must also fit a u64.
    pub(crate) fn validate(&self) -> Result<()> {
        self.total().map(|_| ())
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for FrequencyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        deserializer.deserialize_seq(TableVisitor)
    }
}

struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = FrequencyTable;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("at most 256 (symbol, count) pairs in ascending symbol order")
    }

    fn visit_seq<A>(self, mut seq: A) -> core::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        if let Some(len) = seq.size_hint() {
            if len > 256 {
                return Err(de::Error::invalid_length(len, &self));
            }
        }

        let mut counts = BTreeMap::new();
        let mut previous: Option<u8> = None;
        while let Some((symbol, count)) = seq.next_element::<(u8, u64)>()? {
            if previous.is_some_and(|prev| symbol <= prev) {
                return Err(de::Error::custom(format!(
                    "symbol {symbol} is out of order or repeated"
                )));
            }
            if count == 0 {
                return Err(de::Error::custom(format!("symbol {symbol} has a zero count")));
            }
            counts.insert(symbol, count);
            previous = Some(symbol);
        }
        Ok(FrequencyTable { counts })
    }
}
