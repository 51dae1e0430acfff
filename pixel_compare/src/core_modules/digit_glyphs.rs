//! A 3x5 bitmap font covering the ten decimal digits, enough to number regions
//! without shipping a font file.

pub const GLYPH_WIDTH: u32 = 3;
pub const GLYPH_HEIGHT: u32 = 5;
/// Horizontal advance per character, in glyph cells (glyph plus one blank column).
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

// One byte per row, low three bits, most significant bit is the left column.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Lit `(column, row)` cells of a digit glyph. Non-digits have none.
pub fn lit_cells(ch: char) -> impl Iterator<Item = (u32, u32)> {
    let rows = ch.to_digit(10).map(|d| DIGITS[d as usize]).unwrap_or([0; 5]);
    (0..GLYPH_HEIGHT).flat_map(move |row| {
        (0..GLYPH_WIDTH).filter_map(move |col| {
            let bit = (rows[row as usize] >> (GLYPH_WIDTH - 1 - col)) & 1;
            (bit == 1).then_some((col, row))
        })
    })
}
