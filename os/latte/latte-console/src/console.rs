//! # Character cell console
//!
//! Text is placed on a grid of 8×8 pixel cells addressed by `(col, row)`.
//! Glyph pixels are painted in the foreground colour; everything else is
//! left as it was, so text is drawn over whatever [`Console::fill`] put
//! there. There is no scrolling and no wrapping: cells outside the
//! framebuffer are clipped.

use crate::font::{GLYPH_SIZE, glyph};
use crate::framebuffer::Framebuffer;
use core::fmt;

/// Default glyph colour (black).
pub const FOREGROUND: u32 = 0x0000_0000;

/// Background the boot code clears the screen to (yellow).
pub const BACKGROUND: u32 = 0xffff_00ff;

/// Cell at which [`Console::fail_with_hex`] renders.
pub const FAIL_CELL: (usize, usize) = (0x18, 0x10);

/// A text position that returns to its left margin on `\n`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
    margin: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            margin: col,
        }
    }

    pub const fn newline(&mut self) {
        self.row += 1;
        self.col = self.margin;
    }
}

/// Eight lowercase hex digits of `value`, most significant first.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn hex_digits(value: u32) -> [u8; 8] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = [0; 8];
    let mut i = 0;
    while i < 8 {
        let shift = 28 - 4 * i as u32;
        out[i] = DIGITS[((value >> shift) & 0xf) as usize];
        i += 1;
    }
    out
}

pub struct Console<'a> {
    fb: Framebuffer<'a>,
    fg: u32,
    cursor: Cursor,
}

impl<'a> Console<'a> {
    /// Where formatted output ([`fmt::Write`]) starts.
    pub const HOME: Cursor = Cursor::new(1, 1);

    #[must_use]
    pub const fn new(fb: Framebuffer<'a>) -> Self {
        Self {
            fb,
            fg: FOREGROUND,
            cursor: Self::HOME,
        }
    }

    #[must_use]
    pub const fn with_foreground(mut self, color: u32) -> Self {
        self.fg = color;
        self
    }

    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer<'a> {
        &self.fb
    }

    /// Position of the next [`fmt::Write`] output.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub const fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Clear the whole framebuffer to `color`.
    pub fn fill(&mut self, color: u32) {
        self.fb.fill(color);
    }

    /// Draw `c` into cell `(col, row)`. Characters without a glyph draw nothing.
    pub fn put_char(&mut self, col: usize, row: usize, c: u8) {
        let Some(rows) = glyph(c) else {
            return;
        };
        let x0 = col.saturating_mul(GLYPH_SIZE);
        let y0 = row.saturating_mul(GLYPH_SIZE);
        for (dy, bits) in rows.iter().enumerate() {
            for dx in 0..GLYPH_SIZE {
                if bits & (1 << dx) != 0 {
                    self.fb
                        .put_pixel(x0.saturating_add(dx), y0.saturating_add(dy), self.fg);
                }
            }
        }
    }

    /// Draw `text` starting at cell `(col, row)`, one byte per cell.
    pub fn put_string(&mut self, col: usize, row: usize, text: &str) {
        for (i, b) in text.bytes().enumerate() {
            self.put_char(col.saturating_add(i), row, b);
        }
    }

    /// Draw `value` as exactly eight lowercase hex digits.
    pub fn put_hex(&mut self, col: usize, row: usize, value: u32) {
        for (i, b) in hex_digits(value).into_iter().enumerate() {
            self.put_char(col.saturating_add(i), row, b);
        }
    }

    /// Draw one byte at `cursor` and advance it; `\n` starts a new line.
    pub fn put_byte(&mut self, cursor: &mut Cursor, b: u8) {
        if b == b'\n' {
            cursor.newline();
        } else {
            self.put_char(cursor.col, cursor.row, b);
            cursor.col = cursor.col.saturating_add(1);
        }
    }

    /// Render `reason` followed by `value` in hex at [`FAIL_CELL`].
    pub fn fail_with_hex(&mut self, reason: &str, value: u32) {
        let (col, row) = FAIL_CELL;
        self.put_string(col, row, reason);
        self.put_hex(col + reason.len(), row, value);
    }
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut cursor = self.cursor;
        for b in s.bytes() {
            self.put_byte(&mut cursor, b);
        }
        self.cursor = cursor;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Framebuffer;
    use core::fmt::Write;

    const BG: u32 = 0xffff_00ff;

    fn screen(cols: usize, rows: usize) -> Vec<u32> {
        vec![BG; cols * 8 * rows * 8]
    }

    fn lit(fb: &Framebuffer<'_>) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..fb.height() {
            for x in 0..fb.stride() {
                if fb.pixel(x, y) != Some(BG) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn hex_digits_are_zero_padded_lowercase() {
        assert_eq!(&hex_digits(0x5), b"00000005");
        assert_eq!(&hex_digits(0xDEAD_BEEF), b"deadbeef");
    }

    #[test]
    fn bit_zero_is_the_leftmost_pixel() {
        let mut px = screen(2, 1);
        let mut con = Console::new(Framebuffer::new(&mut px, 16));
        con.put_char(1, 0, b'!');

        // '!' starts with row 0x18: pixels 3 and 4 of the cell.
        let fb = con.framebuffer();
        assert_eq!(fb.pixel(8 + 3, 0), Some(FOREGROUND));
        assert_eq!(fb.pixel(8 + 4, 0), Some(FOREGROUND));
        assert_eq!(fb.pixel(8 + 2, 0), Some(BG));
        assert_eq!(fb.pixel(3, 0), Some(BG));
    }

    #[test]
    fn glyphs_only_paint_foreground_pixels() {
        let mut px = screen(1, 1);
        let mut con = Console::new(Framebuffer::new(&mut px, 8)).with_foreground(0x1234_5678);
        con.put_char(0, 0, b'_');

        let fb = con.framebuffer();
        let expected: Vec<_> = (0..8).map(|x| (x, 7)).collect();
        assert_eq!(lit(fb), expected);
        assert_eq!(fb.pixel(0, 7), Some(0x1234_5678));
    }

    #[test]
    fn unknown_bytes_are_skipped_but_take_a_cell() {
        let mut a = screen(3, 1);
        let mut b = screen(3, 1);
        let mut con_a = Console::new(Framebuffer::new(&mut a, 24));
        let mut con_b = Console::new(Framebuffer::new(&mut b, 24));

        con_a.put_string(0, 0, "\u{1}A");
        con_b.put_char(1, 0, b'A');
        assert_eq!(con_a.framebuffer().pixels(), con_b.framebuffer().pixels());
    }

    #[test]
    fn hex_matches_the_equivalent_string() {
        let mut a = screen(8, 1);
        let mut b = screen(8, 1);
        let mut con_a = Console::new(Framebuffer::new(&mut a, 64));
        let mut con_b = Console::new(Framebuffer::new(&mut b, 64));

        con_a.put_hex(0, 0, 0x00c0_ffee);
        con_b.put_string(0, 0, "00c0ffee");
        assert_eq!(con_a.framebuffer().pixels(), con_b.framebuffer().pixels());
    }

    #[test]
    fn text_past_the_edge_is_clipped_not_wrapped() {
        let mut px = screen(2, 2);
        let mut con = Console::new(Framebuffer::new(&mut px, 16));
        con.put_string(1, 0, "HHHH");
        con.put_string(0, 5, "HHHH");

        let fb = con.framebuffer();
        assert!(lit(fb).iter().all(|&(x, y)| x >= 8 && y < 8));
    }

    #[test]
    fn failure_line_is_reason_then_hex() {
        let mut a = screen(0x40, 0x12);
        let mut b = screen(0x40, 0x12);
        let mut con_a = Console::new(Framebuffer::new(&mut a, 0x200));
        let mut con_b = Console::new(Framebuffer::new(&mut b, 0x200));

        con_a.fail_with_hex("not a PPC ancast image: ", 2);
        con_b.put_string(0x18, 0x10, "not a PPC ancast image: 00000002");
        assert_eq!(con_a.framebuffer().pixels(), con_b.framebuffer().pixels());
    }

    #[test]
    fn formatted_output_follows_the_cursor() {
        let mut px = screen(4, 4);
        let mut con = Console::new(Framebuffer::new(&mut px, 32));
        write!(con, "ab\ncd").unwrap();
        assert_eq!(con.cursor().row, Console::HOME.row + 1);
        assert_eq!(con.cursor().col, Console::HOME.col + 2);
    }
}
