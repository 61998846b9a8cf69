use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SizeError;
use crate::format::{self, FormatSpec};
use crate::parse;

/// Bits per byte unless configured otherwise.
pub const DEFAULT_WORD_LENGTH: u32 = 8;

/// An immutable, non-negative quantity of storage, counted in whole bytes.
///
/// Constructed from a raw byte count or a human-readable string, rendered
/// back through [`DataSize::format`]. Fractional and bit-denominated input
/// rounds up to the next whole byte. Arithmetic yields plain `u128` byte
/// counts rather than new `DataSize` values; re-wrap explicitly where a
/// `DataSize` is needed again.
///
/// Equality, ordering and hashing consider the byte count only, not the
/// word length.
#[derive(Debug, Clone, Copy)]
pub struct DataSize {
    bytes: u128,
    word_length: u32,
}

impl DataSize {
    /// Wrap a raw byte count.
    pub fn new(bytes: u128) -> Self {
        Self {
            bytes,
            word_length: DEFAULT_WORD_LENGTH,
        }
    }

    /// Count the bytes filled by `bits` at `word_length` bits per byte,
    /// rounding up to the next whole byte.
    pub fn from_bits(bits: u128, word_length: u32) -> Self {
        let word_length = word_length.max(1);
        Self {
            bytes: bits.div_ceil(u128::from(word_length)),
            word_length,
        }
    }

    /// Parse a human-readable size string (`"750GB"`, `"16GiB"`,
    /// `"128kb"`, `"1024"`).
    pub fn parse(input: &str) -> Result<Self, SizeError> {
        Self::parse_with_word_length(input, DEFAULT_WORD_LENGTH)
    }

    /// Parse with some other number of bits per byte.
    pub fn parse_with_word_length(input: &str, word_length: u32) -> Result<Self, SizeError> {
        let word_length = word_length.max(1);
        Ok(Self {
            bytes: parse::parse(input, word_length)?,
            word_length,
        })
    }

    /// Override the word length used for bit-denominated formatting.
    pub fn with_word_length(mut self, bits: u32) -> Self {
        self.word_length = bits.max(1);
        self
    }

    /// The byte count.
    pub fn get(&self) -> u128 {
        self.bytes
    }

    /// Bits per byte for bit/byte conversions.
    pub fn word_length(&self) -> u32 {
        self.word_length
    }

    /// Render under a format spec; see [`FormatSpec`] for the grammar.
    pub fn format(&self, spec: &str) -> Result<String, SizeError> {
        format::format(self.bytes, spec, self.word_length)
    }
}

impl Default for DataSize {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::render(
            self.bytes,
            self.word_length,
            &FormatSpec::default(),
        ))
    }
}

impl PartialEq for DataSize {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for DataSize {}

impl PartialOrd for DataSize {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataSize {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl Hash for DataSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl PartialEq<u128> for DataSize {
    fn eq(&self, other: &u128) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<DataSize> for u128 {
    fn eq(&self, other: &DataSize) -> bool {
        *self == other.bytes
    }
}

impl From<u128> for DataSize {
    fn from(bytes: u128) -> Self {
        Self::new(bytes)
    }
}

impl From<u64> for DataSize {
    fn from(bytes: u64) -> Self {
        Self::new(u128::from(bytes))
    }
}

impl From<DataSize> for u128 {
    fn from(size: DataSize) -> Self {
        size.bytes
    }
}

impl TryFrom<i128> for DataSize {
    type Error = SizeError;

    fn try_from(bytes: i128) -> Result<Self, Self::Error> {
        u128::try_from(bytes)
            .map(Self::new)
            .map_err(|_| SizeError::NegativeValue(bytes.to_string()))
    }
}

impl TryFrom<i64> for DataSize {
    type Error = SizeError;

    fn try_from(bytes: i64) -> Result<Self, Self::Error> {
        Self::try_from(i128::from(bytes))
    }
}

impl FromStr for DataSize {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for DataSize {
    type Output = u128;

    fn add(self, rhs: Self) -> u128 {
        self.bytes + rhs.bytes
    }
}

impl Sub for DataSize {
    type Output = u128;

    fn sub(self, rhs: Self) -> u128 {
        self.bytes - rhs.bytes
    }
}

impl Add<u128> for DataSize {
    type Output = u128;

    fn add(self, rhs: u128) -> u128 {
        self.bytes + rhs
    }
}

impl Sub<u128> for DataSize {
    type Output = u128;

    fn sub(self, rhs: u128) -> u128 {
        self.bytes - rhs
    }
}

impl Mul<u128> for DataSize {
    type Output = u128;

    fn mul(self, rhs: u128) -> u128 {
        self.bytes * rhs
    }
}

impl Div<u128> for DataSize {
    type Output = u128;

    fn div(self, rhs: u128) -> u128 {
        self.bytes / rhs
    }
}

impl Serialize for DataSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(self.bytes)
    }
}

impl<'de> Deserialize<'de> for DataSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SizeVisitor;

        impl<'de> Visitor<'de> for SizeVisitor {
            type Value = DataSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte count or a size string like \"1.5GiB\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<DataSize, E> {
                Ok(DataSize::from(v))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<DataSize, E> {
                Ok(DataSize::new(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<DataSize, E> {
                DataSize::try_from(v).map_err(de::Error::custom)
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<DataSize, E> {
                DataSize::try_from(v).map_err(de::Error::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<DataSize, E> {
                DataSize::parse(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(SizeVisitor)
    }
}
