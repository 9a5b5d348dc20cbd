use std::io::Read;
use std::ops::Range;

use crate::chip::{
    chip8::constants::{
        CHIP8_CHARSET, CHIP8_CHARSET_LEN, CHIP8_CHARSET_OFFSET, CHIP8_MAX_PROGRAM_SIZE,
        CHIP8_MEMORY_SIZE, CHIP8_PROGRAM_START,
    },
    LoadProgramError,
};

/// The 4096 bytes of main memory. The charset lives at `CHIP8_CHARSET_OFFSET`,
/// programs are loaded from `CHIP8_PROGRAM_START` onward.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; CHIP8_MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the charset in place.
    pub fn new() -> Self {
        let mut bytes = [0; CHIP8_MEMORY_SIZE];
        let charset =
            CHIP8_CHARSET_OFFSET as usize..(CHIP8_CHARSET_OFFSET + CHIP8_CHARSET_LEN) as usize;
        bytes[charset].copy_from_slice(&CHIP8_CHARSET);
        Memory { bytes }
    }

    /// Copies `program` to `CHIP8_PROGRAM_START`. The rest of the program area
    /// is zeroed so that a previously loaded program does not shine through.
    pub fn load_program(&mut self, program: &[u8]) -> Result<usize, LoadProgramError> {
        if program.len() > CHIP8_MAX_PROGRAM_SIZE {
            return Err(LoadProgramError::ProgramTooLarge(program.len()));
        }

        let start = CHIP8_PROGRAM_START as usize;
        self.bytes[start..].iter_mut().for_each(|byte| *byte = 0);
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(program.len())
    }

    /// Reads a whole program from `reader` and loads it.
    pub fn load_program_from(&mut self, reader: impl Read) -> Result<usize, LoadProgramError> {
        // Read one byte past the limit so oversized programs are detected
        // without buffering an unbounded source.
        let mut buffer = Vec::with_capacity(CHIP8_MAX_PROGRAM_SIZE);
        reader
            .take(CHIP8_MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut buffer)?;
        self.load_program(&buffer)
    }

    /// The big-endian word at `address`, if both of its bytes are addressable.
    pub fn read_word(&self, address: u16) -> Option<u16> {
        let range = self.range(address, 2)?;
        Some(u16::from_be_bytes([self.bytes[range.start], self.bytes[range.start + 1]]))
    }

    /// The byte range `address..address + len`, if it lies within memory.
    pub fn range(&self, address: u16, len: usize) -> Option<Range<usize>> {
        let start = address as usize;
        let end = start.checked_add(len)?;
        if end > CHIP8_MEMORY_SIZE {
            return None;
        }
        Some(start..end)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_loaded_at_zero() {
        let memory = Memory::new();
        assert_eq!(memory.bytes()[0..80], CHIP8_CHARSET[..]);
        assert!(memory.bytes()[80..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_program_load_ok() {
        let mut memory = Memory::new();
        assert_eq!(memory.load_program(&[0x00, 0xE0]).unwrap(), 2);
        assert_eq!(memory.bytes()[0x200..0x202], [0x00, 0xE0]);
    }

    #[test]
    fn test_program_reload_clears_previous_program() {
        let mut memory = Memory::new();
        memory.load_program(&[0x12, 0x34, 0x56, 0x78]).unwrap();
        memory.load_program(&[0xAB]).unwrap();
        assert_eq!(memory.bytes()[0x200..0x204], [0xAB, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_program_of_max_size_fits() {
        let mut memory = Memory::new();
        let program = vec![0xAA; CHIP8_MAX_PROGRAM_SIZE];
        assert_eq!(memory.load_program(&program).unwrap(), CHIP8_MAX_PROGRAM_SIZE);
        assert_eq!(memory.bytes()[CHIP8_MEMORY_SIZE - 1], 0xAA);
    }

    #[test]
    fn test_program_too_large() {
        let mut memory = Memory::new();
        let program = vec![0; CHIP8_MAX_PROGRAM_SIZE + 1];
        match memory.load_program(&program) {
            Err(LoadProgramError::ProgramTooLarge(size)) => {
                assert_eq!(size, CHIP8_MAX_PROGRAM_SIZE + 1)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_program_load_from_reader() {
        let mut memory = Memory::new();
        let prog: &[u8] = &[0x60, 0x01, 0x70, 0x02];
        assert_eq!(memory.load_program_from(prog).unwrap(), 4);
        assert_eq!(memory.read_word(0x202), Some(0x7002));
    }

    #[test]
    fn test_program_load_from_oversized_reader() {
        let mut memory = Memory::new();
        let reader = std::io::repeat(0xFF);
        assert!(matches!(
            memory.load_program_from(reader),
            Err(LoadProgramError::ProgramTooLarge(_))
        ));
    }

    #[test]
    fn test_read_word_at_end_of_memory() {
        let memory = Memory::new();
        assert_eq!(memory.read_word(0xFFE), Some(0));
        assert_eq!(memory.read_word(0xFFF), None);
    }

    #[test]
    fn test_range() {
        let memory = Memory::new();
        assert_eq!(memory.range(0x300, 3), Some(0x300..0x303));
        assert_eq!(memory.range(0xFFD, 3), Some(0xFFD..0x1000));
        assert_eq!(memory.range(0xFFE, 3), None);
        assert_eq!(memory.range(0xFFFF, 1), None);
    }
}
