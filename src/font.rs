// filepath: src/font.rs
//! Fixed 5x7 bitmap font
//!
//! Covers A-Z, 0-9, `_` and space. Each glyph is seven rows, the low five
//! bits of a row are the pixels, most significant bit leftmost.

pub const GLYPH_WIDTH: i32 = 5;
pub const GLYPH_HEIGHT: i32 = 7;
/// Horizontal cursor advance: glyph width plus one column of spacing
pub const ADVANCE: i32 = GLYPH_WIDTH + 1;

pub type Glyph = [u8; GLYPH_HEIGHT as usize];

const LETTERS: [Glyph; 26] = [
    [0x1E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x1E, 0x11, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x1E, 0x10, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x1E, 0x10, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x13, 0x11, 0x11, 0x0E], // G
    [0x11, 0x11, 0x1F, 0x11, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x12, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x11, 0x11, 0x11, 0x11], // M
    [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x0A, 0x0A, 0x04, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

const DIGITS: [Glyph; 10] = [
    [0x0E, 0x13, 0x15, 0x15, 0x15, 0x19, 0x0E],
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
    [0x1F, 0x01, 0x02, 0x06, 0x01, 0x11, 0x0E],
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
    [0x1F, 0x01, 0x02, 0x04, 0x04, 0x04, 0x04],
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
];

const UNDERSCORE: Glyph = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F];
const SPACE: Glyph = [0x00; GLYPH_HEIGHT as usize];

/// Look up a glyph; anything outside the table renders as a space.
pub fn glyph(ch: char) -> &'static Glyph {
    match ch {
        'A'..='Z' => &LETTERS[(ch as u8 - b'A') as usize],
        '0'..='9' => &DIGITS[(ch as u8 - b'0') as usize],
        '_' => &UNDERSCORE,
        _ => &SPACE,
    }
}

/// Whether the pixel at (`col`, `row`) of `glyph` is set
pub fn is_set(glyph: &Glyph, col: i32, row: i32) -> bool {
    glyph[row as usize] & (1 << (GLYPH_WIDTH - 1 - col)) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_characters_fall_back_to_space() {
        assert_eq!(glyph('a'), &SPACE);
        assert_eq!(glyph('!'), &SPACE);
        assert_eq!(glyph(' '), &SPACE);
        assert_ne!(glyph('A'), &SPACE);
    }

    #[test]
    fn glyph_bits_read_left_to_right() {
        // 'L' is a vertical bar in the leftmost column plus a bottom row
        let l = glyph('L');
        assert!(is_set(l, 0, 0));
        assert!(!is_set(l, 4, 0));
        assert!((0..GLYPH_WIDTH).all(|col| is_set(l, col, 6)));
    }
}
