//! The fixed rank alphabet and length limit.
//!
//! These are constants rather than configuration so that every deployment
//! orders ranks identically.

/// Rank symbols, lowest to highest. ASCII order matches symbol order.
pub const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of symbols in the alphabet
pub const BASE: u8 = 36;

/// Digit value of the lowest symbol (`0`)
pub const LOWEST: u8 = 0;

/// Digit value of the highest symbol (`z`)
pub const HIGHEST: u8 = BASE - 1;

/// Digit value of the midpoint symbol (`i`)
pub const MIDPOINT: u8 = BASE / 2;

/// Longest rank the generators and the interpolator will produce
pub const MAX_RANK_LEN: usize = 16;

/// Digit value of a symbol, or `None` if it is not in the alphabet
pub fn digit_of(symbol: u8) -> Option<u8> {
    match symbol {
        b'0'..=b'9' => Some(symbol - b'0'),
        b'a'..=b'z' => Some(symbol - b'a' + 10),
        _ => None,
    }
}

/// Symbol for a digit value. Digits must be below [`BASE`].
pub fn symbol_of(digit: u8) -> u8 {
    ALPHABET[digit as usize]
}
