//! Reversible byte-pair obfuscation for secrets kept in config files.
//!
//! Each byte `b[i]` of the UTF-8 payload is paired with its mirror
//! `b[n - 1 - i]` and written as a base-36 block. Pairs where either byte has
//! the high bit set are written as a `U`-prefixed block holding both raw
//! bytes; all other pairs use a 4-character sum/difference block. Decoding
//! only ever recovers the leading byte of each block.
//!
//! This is concealment for checked-in files, not encryption.

use crate::ConfigError;

/// Marker that prefixes every obfuscated value.
pub const OBFUSCATION_PREFIX: &str = "OBF:";

/// Marker that introduces a 5-character block for high-bit byte pairs.
const HIGH_BIT_MARKER: u8 = b'U';
/// Width of the base-36 digits in every block.
const BLOCK_DIGITS: usize = 4;

/// Returns true when the value carries the obfuscation marker.
pub fn is_obfuscated(value: &str) -> bool {
    value.starts_with(OBFUSCATION_PREFIX)
}

/// Obfuscate a string into the `OBF:` block format.
pub fn obfuscate(plain: &str) -> String {
    let bytes = plain.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(OBFUSCATION_PREFIX.len() + len * (BLOCK_DIGITS + 1));
    out.push_str(OBFUSCATION_PREFIX);

    for (i, &b1) in bytes.iter().enumerate() {
        let b2 = bytes[len - 1 - i];
        if b1 >= 0x80 || b2 >= 0x80 {
            let i0 = u32::from(b1) * 256 + u32::from(b2);
            out.push(char::from(HIGH_BIT_MARKER));
            push_block(&mut out, i0);
        } else {
            // Both bytes are < 128, so the difference term never goes negative.
            let i1 = 127 + u32::from(b1) + u32::from(b2);
            let i2 = 127 + u32::from(b1) - u32::from(b2);
            push_block(&mut out, i1 * 256 + i2);
        }
    }
    out
}

/// Reverse [`obfuscate`]. The `OBF:` marker is optional on input.
///
/// Bytes that do not form valid UTF-8 are replaced, matching a lossy decode.
pub fn deobfuscate(encoded: &str) -> Result<String, ConfigError> {
    let body = encoded
        .strip_prefix(OBFUSCATION_PREFIX)
        .unwrap_or(encoded)
        .as_bytes();
    let mut out = Vec::with_capacity(body.len() / BLOCK_DIGITS);

    let mut pos = 0;
    while pos < body.len() {
        if body[pos] == HIGH_BIT_MARKER {
            let i0 = read_block(body, pos + 1)?;
            out.push((i0 >> 8) as u8);
            pos += BLOCK_DIGITS + 1;
        } else {
            let i0 = i64::from(read_block(body, pos)?);
            let i1 = i0 / 256;
            let i2 = i0 % 256;
            // Truncating cast keeps the low byte, like a signed byte narrowing.
            out.push(((i1 + i2 - 254) / 2) as u8);
            pos += BLOCK_DIGITS;
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn push_block(out: &mut String, value: u32) {
    let digits = to_base36(value);
    for _ in digits.len()..BLOCK_DIGITS {
        out.push('0');
    }
    out.push_str(&digits);
}

fn read_block(body: &[u8], start: usize) -> Result<u32, ConfigError> {
    let end = start + BLOCK_DIGITS;
    let block = body.get(start..end).ok_or_else(|| {
        ConfigError::Obfuscation(format!("truncated block at offset {start}"))
    })?;
    let text = std::str::from_utf8(block)
        .map_err(|_| ConfigError::Obfuscation(format!("non-ascii block at offset {start}")))?;
    u32::from_str_radix(text, 36)
        .map_err(|err| ConfigError::Obfuscation(format!("bad block {text:?}: {err}")))
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_ascii_secrets() {
        for plain in ["password123", "a", "ab", "abc", "", "p@ss w0rd!~{}"] {
            let encoded = obfuscate(plain);
            assert!(is_obfuscated(&encoded));
            assert_eq!(deobfuscate(&encoded).expect("decode"), plain);
        }
    }

    #[test]
    fn ascii_blocks_are_four_characters() {
        let encoded = obfuscate("password123");
        let body = encoded.strip_prefix(OBFUSCATION_PREFIX).expect("prefix");
        assert_eq!(body.len(), "password123".len() * 4);
        assert!(!body.contains('U'));
    }

    #[test]
    fn known_encoding_for_single_byte() {
        // 'a' pairs with itself: i1 = 127 + 97 + 97 = 321, i2 = 127.
        let expected = to_base36(321 * 256 + 127);
        assert_eq!(obfuscate("a"), format!("OBF:{expected}"));
        assert_eq!(expected.len(), 4);
    }

    #[test]
    fn known_encoding_for_password() {
        assert_eq!(
            obfuscate("password123"),
            "OBF:1lfg1i9a1lmp1vny1z7o1x1b1z7e1vn41lj11i6o1lc2"
        );
    }

    #[test]
    fn short_digits_are_zero_padded() {
        let mut out = String::new();
        push_block(&mut out, 35);
        assert_eq!(out, "000z");
    }

    #[test]
    fn non_ascii_payload_uses_high_bit_blocks() {
        let encoded = obfuscate("héllo");
        assert!(encoded.contains('U'));
        assert_eq!(deobfuscate(&encoded).expect("decode"), "héllo");
    }

    /// A high-bit block carries both mirrored bytes but decoding keeps only
    /// the leading one. Whole strings survive only because every position
    /// emits its own block; a lone block loses its trailing byte.
    #[test]
    fn high_bit_block_recovers_only_leading_byte() {
        let mut encoded = String::from(OBFUSCATION_PREFIX);
        encoded.push('U');
        push_block(&mut encoded, 0xC3 * 256 + 0xA9);
        let decoded = deobfuscate(&encoded).expect("decode");
        assert_eq!(decoded, "\u{FFFD}");
        assert_ne!(decoded, "é");
    }

    #[test]
    fn marker_is_optional_for_decode() {
        let encoded = obfuscate("secret");
        let body = encoded.strip_prefix(OBFUSCATION_PREFIX).expect("prefix");
        assert_eq!(deobfuscate(body).expect("decode"), "secret");
    }

    #[test]
    fn truncated_input_is_rejected() {
        let err = deobfuscate("OBF:1a").unwrap_err();
        assert!(format!("{err}").contains("truncated"));
    }
}
