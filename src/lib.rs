//! A CHIP-8 virtual machine. The implementation follows the instruction set
//! described [here](https://en.wikipedia.org/wiki/CHIP-8#Opcode_table), including the
//! historical quirks around carry/borrow flags, shifts and inclusive register ranges.
//!
//! The machine itself only mutates its own state. Rendering, audio, key events and the
//! instruction/timer clocks are left to a host; the `emulator_text_ui` binary is one
//! such host built on the cursive text user interface library.
pub mod chip;

pub use chip::{
    chip8::Chip8, Chip, ChipWithCursiveDisplay, ExecutionError, ExecutionState, LoadProgramError,
};
