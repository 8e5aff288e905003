//! Search-term bloom filter
//!
//! Blob layout (big-endian):
//!
//! | bytes  | field               |
//! |--------|---------------------|
//! | 0..8   | bitmap bits (u64)   |
//! | 8..12  | hash functions (u32)|
//! | 12..44 | sip keys (4 x u64)  |
//! | 44..   | bitmap              |

use bloomfilter::Bloom;

use super::errors::{PrefilterError, PrefilterResult};

const HEADER_LEN: usize = 44;

/// Inserts search tokens into a filter sized for `expected_items` at the
/// given false-positive rate. Tokens are lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTermBloomFilter {
    expected_items: usize,
    false_positive_rate: f64,
    tokens: Vec<String>,
}

impl SearchTermBloomFilter {
    pub fn new(
        expected_items: usize,
        false_positive_rate: f64,
        tokens: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            expected_items,
            false_positive_rate,
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn build(&self) -> PrefilterResult<TokenFilter> {
        if self.tokens.is_empty() {
            return Err(PrefilterError::NoTokens);
        }
        if self.expected_items == 0 {
            return Err(PrefilterError::InvalidParameters(
                "expected_items must be positive".into(),
            ));
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(PrefilterError::InvalidParameters(format!(
                "false_positive_rate must be in (0, 1), got {}",
                self.false_positive_rate
            )));
        }

        let capacity = self.expected_items.max(self.tokens.len());
        let mut bloom = Bloom::new_for_fp_rate(capacity, self.false_positive_rate);
        for token in &self.tokens {
            bloom.set(&token.to_lowercase());
        }
        Ok(TokenFilter { bloom })
    }

    /// Serialized filter blob
    pub fn bytes(&self) -> PrefilterResult<Vec<u8>> {
        Ok(self.build()?.to_bytes())
    }
}

/// Membership filter over lowercased tokens
pub struct TokenFilter {
    bloom: Bloom<String>,
}

impl TokenFilter {
    /// False means the token was definitely never inserted
    pub fn might_contain(&self, token: &str) -> bool {
        self.bloom.check(&token.to_lowercase())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let bitmap = self.bloom.bitmap();
        let mut out = Vec::with_capacity(HEADER_LEN + bitmap.len());
        out.extend_from_slice(&self.bloom.number_of_bits().to_be_bytes());
        out.extend_from_slice(&self.bloom.number_of_hash_functions().to_be_bytes());
        for (k0, k1) in self.bloom.sip_keys() {
            out.extend_from_slice(&k0.to_be_bytes());
            out.extend_from_slice(&k1.to_be_bytes());
        }
        out.extend_from_slice(&bitmap);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> PrefilterResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(PrefilterError::Corrupt(format!(
                "blob is {} bytes, header needs {}",
                bytes.len(),
                HEADER_LEN
            )));
        }
        let bits = read_u64(&bytes[0..8]);
        let mut k = [0u8; 4];
        k.copy_from_slice(&bytes[8..12]);
        let hashes = u32::from_be_bytes(k);
        let sip_keys = [
            (read_u64(&bytes[12..20]), read_u64(&bytes[20..28])),
            (read_u64(&bytes[28..36]), read_u64(&bytes[36..44])),
        ];
        let bitmap = &bytes[HEADER_LEN..];

        if bits == 0 || hashes == 0 {
            return Err(PrefilterError::Corrupt("empty filter header".into()));
        }
        if (bitmap.len() as u64) * 8 < bits {
            return Err(PrefilterError::Corrupt(format!(
                "bitmap has {} bytes for {} bits",
                bitmap.len(),
                bits
            )));
        }
        Ok(Self {
            bloom: Bloom::from_existing(bitmap, bits, hashes, sip_keys),
        })
    }
}

impl std::fmt::Debug for TokenFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFilter")
            .field("bits", &self.bloom.number_of_bits())
            .field("hashes", &self.bloom.number_of_hash_functions())
            .finish()
    }
}

fn read_u64(slice: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(slice);
    u64::from_be_bytes(buf)
}
