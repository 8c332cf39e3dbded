//! Pure encoding transforms for Stranger Q.
//!
//! Everything here is a deterministic, total function over a byte sequence;
//! no I/O, no state across calls. Two distinct random-to-text mappings are
//! deliberately kept side by side:
//!
//! - the 6-bit-chunk Base62 pipeline ([`bytes_to_key`]) used by the
//!   interactive key generator, and
//! - the per-byte modulo mapping ([`bytes_to_password`], [`bytes_to_token`],
//!   [`bytes_to_otp`]) used by the password / token / OTP tools.
//!
//! They yield different entropy per character (6 bits vs up to 8 via modulo);
//! each backs a different public tool, so both are part of the contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base62 alphabet: digits, then uppercase, then lowercase. The ordering is
/// part of the output contract for keys and tokens.
pub const BASE62: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 36-character set used by alphanumeric OTPs.
pub const OTP_ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Symbol set offered by the password tool.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Caller contract violations. Well-formed input never errors.
#[derive(Debug, Error)]
pub enum KeygenError {
    #[error("input byte sequence must not be empty")]
    EmptyInput,
    #[error("output length must be at least 1")]
    ZeroLength,
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
    #[error("candidate list must not be empty")]
    EmptyItems,
    #[error("need at least {needed} random bytes, got {got}")]
    ShortBuffer { needed: usize, got: usize },
    #[error("invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Render each byte as exactly two lowercase hex digits, in order.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parse a hex string back into bytes. Inverse of [`bytes_to_hex`].
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, KeygenError> {
    Ok(hex::decode(s)?)
}

/// Render each byte as exactly 8 binary digits, most-significant bit first.
/// The result always has `8 * bytes.len()` characters.
pub fn bytes_to_bits(bytes: &[u8]) -> String {
    let mut bits = String::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push(if byte >> shift & 1 == 1 { '1' } else { '0' });
        }
    }
    bits
}

/// Partition a bit string into consecutive 6-bit values, left to right.
///
/// A final group shorter than 6 bits is right-padded with zero bits before
/// evaluation, so `"10"` becomes `100000` = 32 (pad-end, not pad-start).
/// This padding policy is load-bearing for key-output parity.
///
/// Characters other than `'1'` count as zero bits; callers are expected to
/// pass output of [`bytes_to_bits`].
pub fn six_bit_chunks(bits: &str) -> Vec<u8> {
    let raw: Vec<char> = bits.chars().collect();
    let mut chunks = Vec::with_capacity((raw.len() + 5) / 6);
    for group in raw.chunks(6) {
        let mut value = 0u8;
        for slot in 0..6 {
            value <<= 1;
            if group.get(slot) == Some(&'1') {
                value |= 1;
            }
        }
        chunks.push(value);
    }
    chunks
}

/// Map a bit string onto Base62 characters, 6 bits per character, truncated
/// to `output_len`. Each chunk value indexes the alphabet as `value % 62`.
///
/// If fewer than `output_len` chunks can be formed the result is shorter;
/// requesting enough input bits is the caller's precondition.
pub fn bits_to_base62_key(bits: &str, output_len: usize) -> Result<String, KeygenError> {
    if bits.is_empty() {
        return Err(KeygenError::EmptyInput);
    }
    if output_len == 0 {
        return Err(KeygenError::ZeroLength);
    }
    let alphabet: Vec<char> = BASE62.chars().collect();
    Ok(six_bit_chunks(bits)
        .into_iter()
        .take(output_len)
        .map(|value| alphabet[(value as usize) % alphabet.len()])
        .collect())
}

/// The full key pipeline: bytes -> bits -> 6-bit chunks -> Base62.
pub fn bytes_to_key(bytes: &[u8], output_len: usize) -> Result<String, KeygenError> {
    if bytes.is_empty() {
        return Err(KeygenError::EmptyInput);
    }
    bits_to_base62_key(&bytes_to_bits(bytes), output_len)
}

/// One output character per input byte, `byte % alphabet.len()`. This is the
/// full-byte-entropy variant used for passwords and tokens.
pub fn bytes_to_password(bytes: &[u8], alphabet: &str) -> Result<String, KeygenError> {
    if bytes.is_empty() {
        return Err(KeygenError::EmptyInput);
    }
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(KeygenError::EmptyAlphabet);
    }
    Ok(bytes
        .iter()
        .map(|&byte| chars[(byte as usize) % chars.len()])
        .collect())
}

/// Base62 token with an optional caller-supplied prefix.
pub fn bytes_to_token(bytes: &[u8], prefix: &str) -> Result<String, KeygenError> {
    let body = bytes_to_password(bytes, BASE62)?;
    Ok(format!("{prefix}{body}"))
}

/// Character classes the password tool can toggle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AlphabetSpec {
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for AlphabetSpec {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl AlphabetSpec {
    /// Concatenated character set. When every class is disabled the tool
    /// still has to produce something, so it falls back to `a-z0-9`.
    pub fn charset(&self) -> String {
        let mut chars = String::new();
        if self.uppercase {
            chars.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        }
        if self.lowercase {
            chars.push_str("abcdefghijklmnopqrstuvwxyz");
        }
        if self.digits {
            chars.push_str("0123456789");
        }
        if self.symbols {
            chars.push_str(PASSWORD_SYMBOLS);
        }
        if chars.is_empty() {
            chars.push_str("abcdefghijklmnopqrstuvwxyz0123456789");
        }
        chars
    }
}

/// Password strength bucket derived from length and character variety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn label(self) -> &'static str {
        match self {
            Strength::Weak => "weak",
            Strength::Medium => "medium",
            Strength::Strong => "strong",
            Strength::VeryStrong => "very_strong",
        }
    }
}

/// Rate a generated password by length and how many character classes it
/// actually ended up containing.
pub fn password_strength(password: &str) -> Strength {
    let length = password.chars().count();
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    let variety = [has_upper, has_lower, has_digit, has_symbol]
        .iter()
        .filter(|&&present| present)
        .count();

    if length >= 16 && variety >= 3 {
        Strength::VeryStrong
    } else if length >= 12 && variety >= 2 {
        Strength::Strong
    } else if length >= 8 && variety >= 2 {
        Strength::Medium
    } else {
        Strength::Weak
    }
}

/// OTP output style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpStyle {
    Numeric,
    Alphanumeric,
}

impl OtpStyle {
    /// Lenient query-string parse; anything unrecognized means numeric.
    pub fn from_query(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "alphanumeric" => OtpStyle::Alphanumeric,
            _ => OtpStyle::Numeric,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OtpStyle::Numeric => "numeric",
            OtpStyle::Alphanumeric => "alphanumeric",
        }
    }
}

/// One-time code: `byte % 10` digits, or `byte % 36` over `0-9A-Z`,
/// truncated to `length` characters.
pub fn bytes_to_otp(bytes: &[u8], length: usize, style: OtpStyle) -> Result<String, KeygenError> {
    if bytes.is_empty() {
        return Err(KeygenError::EmptyInput);
    }
    if length == 0 {
        return Err(KeygenError::ZeroLength);
    }
    let otp: String = match style {
        OtpStyle::Numeric => bytes
            .iter()
            .map(|&byte| char::from(b'0' + byte % 10))
            .collect(),
        OtpStyle::Alphanumeric => bytes_to_password(bytes, OTP_ALPHANUMERIC)?,
    };
    Ok(otp.chars().take(length).collect())
}

/// Format 16 random bytes as a canonical UUID v4: force the version nibble
/// on byte 6 and the RFC 4122 variant bits on byte 8, then hex with hyphens
/// at positions 8, 13, 18 and 23.
pub fn bytes_to_uuid_v4(bytes: [u8; 16]) -> String {
    let mut bytes = bytes;
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = bytes_to_hex(&bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Shuffle `items` with a Fisher-Yates pass driven by the supplied random
/// bytes (`bytes[i] % (i + 1)` picks the swap target) and return the first
/// `count` entries. Needs at least as many bytes as items.
pub fn pick(items: &[String], count: usize, bytes: &[u8]) -> Result<Vec<String>, KeygenError> {
    if items.is_empty() {
        return Err(KeygenError::EmptyItems);
    }
    if count == 0 {
        return Err(KeygenError::ZeroLength);
    }
    if bytes.len() < items.len() {
        return Err(KeygenError::ShortBuffer {
            needed: items.len(),
            got: bytes.len(),
        });
    }
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = (bytes[i] as usize) % (i + 1);
        shuffled.swap(i, j);
    }
    shuffled.truncate(count.min(items.len()));
    Ok(shuffled)
}
