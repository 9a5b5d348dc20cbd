use std::time::Duration;

/// Size of the addressable memory in bytes.
pub const CHIP8_MEMORY_SIZE: usize = 4096;

/// Address at which programs are loaded and execution starts.
pub const CHIP8_PROGRAM_START: u16 = 0x200;

pub const CHIP8_MAX_PROGRAM_SIZE: usize = CHIP8_MEMORY_SIZE - CHIP8_PROGRAM_START as usize;

/// Address of the first glyph of the charset. `FX29` relies on the glyphs
/// being stored from address 0.
pub const CHIP8_CHARSET_OFFSET: u16 = 0x00;

pub const CHIP8_CHARSET_LEN: u16 = 0x50; // 80

/// Every glyph of the charset is 5 bytes high.
pub const CHIP8_GLYPH_HEIGHT: u16 = 5;

pub const CHIP8_CHARSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub const CHIP8_DISPLAY_WIDTH: usize = 64;

pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// The framebuffer packs 8 pixels into a byte, most significant bit leftmost.
pub const CHIP8_BYTES_PER_ROW: usize = CHIP8_DISPLAY_WIDTH / 8;

pub const CHIP8_FRAMEBUFFER_SIZE: usize = CHIP8_BYTES_PER_ROW * CHIP8_DISPLAY_HEIGHT;

/// Number of return addresses the call stack can hold.
pub const CHIP8_STACK_DEPTH: usize = 16;

pub const CHIP8_KEY_COUNT: usize = 16;

/// Index of the flags register VF.
pub const CHIP8_FLAG_REGISTER: usize = 0xF;

/// Both timers count down at 60 Hz. Rounded up, so a period is never shorter
/// than 1/60 s.
pub const CHIP8_TIMER_PERIOD: Duration = Duration::from_nanos((1_000_000_000 + 59) / 60);
