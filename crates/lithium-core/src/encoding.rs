//! Fixed-width big-endian integer encoders, hex scanning and the keccak256
//! wrapper used throughout the leaf codec and Merkle engine.

use alloy_primitives::{keccak256, B256, U256};

use crate::error::EncodingError;

/// Big-endian 4-byte encoding of `x`.
pub fn u32_be(x: u32) -> [u8; 4] {
    x.to_be_bytes()
}

/// Big-endian 8-byte encoding of `x`.
pub fn u64_be(x: u64) -> [u8; 8] {
    x.to_be_bytes()
}

/// Left zero-padded big-endian 32-byte encoding of `x`.
///
/// Infallible: `U256` cannot represent a negative value or one exceeding
/// 2**256, so the overflow/negative-input failure modes of the original
/// dynamically-typed encoder are unrepresentable here.
pub fn u256_be(x: U256) -> [u8; 32] {
    x.to_be_bytes()
}

/// Decode a hex string, tolerating an optional `0x` prefix and an odd
/// number of nibbles (left-padded with a single `0`, matching how chain
/// RPCs encode quantities such as `value`).
pub fn scan_hex(s: &str) -> Result<Vec<u8>, EncodingError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let padded = if stripped.len() % 2 != 0 {
        format!("0{stripped}")
    } else {
        stripped.to_string()
    };
    let bytes = hex::decode(&padded).map_err(|_| EncodingError::InvalidHex(s.to_string()))?;
    if bytes.len() > 32 {
        return Err(EncodingError::TooLarge(bytes.len()));
    }
    Ok(bytes)
}

/// Decode a hex quantity directly into a zero-padded 32-byte big-endian
/// array, as needed for fields like `value` that may be shorter than 32
/// bytes on the wire.
pub fn scan_hex_u256(s: &str) -> Result<[u8; 32], EncodingError> {
    let bytes = scan_hex(s)?;
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// `keccak256` over arbitrary bytes.
pub fn keccak(data: impl AsRef<[u8]>) -> B256 {
    keccak256(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_be_roundtrips() {
        assert_eq!(u32_be(0x0102_0304), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(u32_be(0), [0, 0, 0, 0]);
    }

    #[test]
    fn u64_be_roundtrips() {
        assert_eq!(u64_be(10), [0, 0, 0, 0, 0, 0, 0, 10]);
    }

    #[test]
    fn u256_be_left_pads() {
        let x = U256::from(1u8);
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(u256_be(x), expected);
    }

    #[test]
    fn scan_hex_strips_prefix() {
        assert_eq!(scan_hex("0xab").unwrap(), vec![0xab]);
        assert_eq!(scan_hex("ab").unwrap(), vec![0xab]);
    }

    #[test]
    fn scan_hex_left_pads_odd_length() {
        // "0x0" is one nibble -> padded to "0x00"
        assert_eq!(scan_hex("0x0").unwrap(), vec![0x00]);
        // "0xa" -> "0x0a"
        assert_eq!(scan_hex("0xa").unwrap(), vec![0x0a]);
    }

    #[test]
    fn scan_hex_rejects_invalid_chars() {
        assert!(scan_hex("0xzz").is_err());
    }

    #[test]
    fn scan_hex_rejects_oversize() {
        let too_big = format!("0x{}", "ff".repeat(33));
        assert!(matches!(
            scan_hex(&too_big),
            Err(EncodingError::TooLarge(33))
        ));
    }

    #[test]
    fn scan_hex_u256_pads_to_32_bytes() {
        let out = scan_hex_u256("0x0").unwrap();
        assert_eq!(out, [0u8; 32]);

        let out = scan_hex_u256("0xff").unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 0xff;
        assert_eq!(out, expected);
    }
}
