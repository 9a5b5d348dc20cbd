use crate::chip::chip8::constants::{
    CHIP8_BYTES_PER_ROW, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH, CHIP8_FRAMEBUFFER_SIZE,
};

/// The monochrome 64x32 display memory. Pixels are packed 8 to a byte, row by row,
/// with the most significant bit of a byte being the leftmost pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: [u8; CHIP8_FRAMEBUFFER_SIZE],
}

impl FrameBuffer {
    pub const WIDTH: usize = CHIP8_DISPLAY_WIDTH;
    pub const HEIGHT: usize = CHIP8_DISPLAY_HEIGHT;

    pub fn new() -> Self {
        FrameBuffer {
            bytes: [0; CHIP8_FRAMEBUFFER_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.bytes = [0; CHIP8_FRAMEBUFFER_SIZE];
    }

    /// XORs `sprite` onto the display, one byte per row, with its top left corner
    /// at (`x`, `y`). The coordinate is taken modulo the display size; pixels past
    /// the right or bottom edge are clipped.
    ///
    /// Returns whether a pixel that was lit before is drawn onto again, i.e. whether
    /// any pixel got switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x = x as usize % CHIP8_DISPLAY_WIDTH;
        let y = y as usize % CHIP8_DISPLAY_HEIGHT;
        let column = x / 8;
        let offset = x % 8;
        let straddles_edge = column + 1 == CHIP8_BYTES_PER_ROW;

        let mut collision = false;
        for (row, sprite_byte) in (y..CHIP8_DISPLAY_HEIGHT).zip(sprite.iter()) {
            let index = row * CHIP8_BYTES_PER_ROW + column;

            // The sprite byte covers a window of 8 pixels which generally spans two
            // stored bytes. The right one does not exist for the last column.
            let mut shifted = u16::from(*sprite_byte) << (8 - offset);
            let right = if straddles_edge {
                shifted &= 0xFF00;
                0
            } else {
                self.bytes[index + 1]
            };
            let window = u16::from_be_bytes([self.bytes[index], right]);

            collision |= window & shifted != 0;

            let [left, right] = (window ^ shifted).to_be_bytes();
            self.bytes[index] = left;
            if !straddles_edge {
                self.bytes[index + 1] = right;
            }
        }
        collision
    }

    /// Whether the pixel at (`x`, `y`) is lit. Coordinates outside the display are unlit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= CHIP8_DISPLAY_WIDTH || y >= CHIP8_DISPLAY_HEIGHT {
            return false;
        }
        let byte = self.bytes[y * CHIP8_BYTES_PER_ROW + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|&byte| byte == 0)
    }

    pub fn as_bytes(&self) -> &[u8; CHIP8_FRAMEBUFFER_SIZE] {
        &self.bytes
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new()
    }
}

impl From<[u8; CHIP8_FRAMEBUFFER_SIZE]> for FrameBuffer {
    fn from(bytes: [u8; CHIP8_FRAMEBUFFER_SIZE]) -> Self {
        FrameBuffer { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYPH_ZERO: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    #[test]
    fn test_draw_aligned() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(8, 1, &GLYPH_ZERO));
        assert_eq!(fb.as_bytes()[8 + 1], 0xF0);
        assert_eq!(fb.as_bytes()[16 + 1], 0x90);
        assert_eq!(fb.as_bytes()[40 + 1], 0xF0);
        assert!(fb.pixel(8, 1));
        assert!(fb.pixel(11, 1));
        assert!(!fb.pixel(12, 1));
        assert!(!fb.pixel(9, 2));
    }

    #[test]
    fn test_draw_unaligned_straddles_two_bytes() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(6, 0, &[0xFF]);
        assert_eq!(fb.as_bytes()[0], 0b0000_0011);
        assert_eq!(fb.as_bytes()[1], 0b1111_1100);
        for x in 0..16 {
            assert_eq!(fb.pixel(x, 0), (6..14).contains(&x), "pixel {}", x);
        }
    }

    #[test]
    fn test_draw_xors() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(2, 0, &[0b0101_0000]);
        fb.draw_sprite(2, 0, &[0b1100_0000]);
        assert!(fb.pixel(2, 0));
        assert!(!fb.pixel(3, 0));
        assert!(!fb.pixel(4, 0));
        assert!(fb.pixel(5, 0));
    }

    #[test]
    fn test_double_draw_restores_and_collides() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0x81]);
        let before = fb;

        assert!(!fb.draw_sprite(13, 7, &GLYPH_ZERO));
        assert!(fb.draw_sprite(13, 7, &GLYPH_ZERO));
        assert_eq!(fb, before);
    }

    #[test]
    fn test_collision_only_when_lit_pixel_is_drawn_onto() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0b1000_0000]);
        assert!(!fb.draw_sprite(0, 0, &[0b0100_0000]));
        assert!(fb.draw_sprite(0, 0, &[0b1000_0000]));
    }

    #[test]
    fn test_collision_in_later_row() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(20, 12, &[0x01]);
        assert!(fb.draw_sprite(20, 11, &[0x00, 0x01]));
    }

    #[test]
    fn test_clips_at_right_edge() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(60, 0, &[0xFF]);
        assert!((60..64).all(|x| fb.pixel(x, 0)));
        // nothing bleeds into the next row
        assert!((0..64).all(|x| !fb.pixel(x, 1)));
        assert_eq!(fb.as_bytes()[7], 0x0F);
        assert_eq!(fb.as_bytes()[8], 0x00);
    }

    #[test]
    fn test_clips_at_bottom_edge() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 30, &GLYPH_ZERO);
        assert_eq!(fb.as_bytes()[30 * 8], 0xF0);
        assert_eq!(fb.as_bytes()[31 * 8], 0x90);
        // rows 32.. are dropped instead of wrapping to the top
        assert!(fb.as_bytes()[..8].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_start_coordinate_wraps() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(64 + 3, 32 + 2, &[0x80]);
        assert!(fb.pixel(3, 2));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::from([0xFF; CHIP8_FRAMEBUFFER_SIZE]);
        assert!(!fb.is_blank());
        fb.clear();
        assert!(fb.is_blank());
        assert_eq!(fb.as_bytes().len(), 256);
    }

    #[test]
    fn test_pixel_outside_display() {
        let fb = FrameBuffer::from([0xFF; CHIP8_FRAMEBUFFER_SIZE]);
        assert!(!fb.pixel(64, 0));
        assert!(!fb.pixel(0, 32));
    }
}
