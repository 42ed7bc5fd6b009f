//! Conversions between bytes, single-byte text and MSB-first bit sequences

use crate::error::{AudioModemError, Result};

/// Expand each byte into 8 bits, most significant bit first
pub fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 == 1);
        }
    }
    bits
}

/// Pack MSB-first bits back into bytes
///
/// Trailing bits that do not fill a whole byte are dropped.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len() / 8);
    for chunk in bits.chunks_exact(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                byte |= 1 << (7 - i);
            }
        }
        bytes.push(byte);
    }
    bytes
}

/// Encode text one byte per character (code points 0..=255)
///
/// A character above U+00FF cannot be expressed in 8 bits and is rejected
/// rather than shifting the alignment of everything after it.
pub fn text_to_bits(text: &str) -> Result<Vec<bool>> {
    let mut bytes = Vec::with_capacity(text.len());
    for (index, ch) in text.chars().enumerate() {
        let code = ch as u32;
        if code > 0xFF {
            return Err(AudioModemError::CharOutOfRange { ch, index });
        }
        bytes.push(code as u8);
    }
    Ok(bytes_to_bits(&bytes))
}

/// Decode bits as one character per byte (Latin-1)
pub fn bits_to_text(bits: &[bool]) -> String {
    bits_to_bytes(bits).into_iter().map(char::from).collect()
}

/// Render bits as a string of `0` and `1`
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a string of `0` and `1`, ignoring whitespace
pub fn parse_bits(s: &str) -> Option<Vec<bool>> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}
