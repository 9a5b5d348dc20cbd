pub mod chip8;

use std::path::Path;
use std::time::Instant;

use cursive::CbSink;
use thiserror::Error;

use crate::chip::chip8::constants::CHIP8_MAX_PROGRAM_SIZE;

/// A chip that can be driven by a host loop. The host owns the clocks: it decides
/// how often `cycle` runs and polls `update_timers` with a monotonic clock.
pub trait Chip {
    /// The type used to address an input pin (a key of the keypad).
    type PinAddress;

    /// The type used to address a byte of main memory.
    type MemoryAddress;

    /// Loads the program stored at `path` and returns its size in bytes.
    fn load_program(&mut self, path: &Path) -> Result<usize, LoadProgramError>;

    /// Decodes and executes a single instruction, unless the chip is blocked on a
    /// key press or has faulted. Returns the state the chip is in afterwards.
    fn cycle(&mut self) -> Result<ExecutionState, ExecutionError>;

    /// Advances the timers based on the wall-clock time `now`.
    fn update_timers(&mut self, now: Instant);

    /// Delivers a key-press event for the given pin.
    fn press_key(&mut self, pin: Self::PinAddress);

    /// Releases the given pin.
    fn release_key(&mut self, pin: Self::PinAddress);

    /// Releases all pins.
    fn reset_input_pins(&mut self);

    /// Whether a tone should currently be audible.
    fn sound_active(&self) -> bool;

    fn execution_state(&self) -> ExecutionState;
}

/// A chip whose output can be displayed by a cursive user interface.
pub trait ChipWithCursiveDisplay {
    /// Sends the current frame to the UI thread if it changed since the last call.
    /// Returns false once the UI has gone away.
    fn update_ui(&mut self, gfx_sink: &CbSink) -> bool;
}

/// Whether the chip keeps dispatching instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    /// Dispatch is suspended until a key-press event arrives. Timers keep ticking.
    AwaitingKey,
    /// A fatal error occurred. The chip will not execute any further instruction.
    Faulted(ExecutionError),
}

/// Fatal errors raised while executing an instruction. `pc` is the address of the
/// instruction that faulted; the machine state is left as it was before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("stack overflow at {pc:#05X}: more than 16 nested calls")]
    StackOverflow { pc: u16 },

    #[error("stack underflow at {pc:#05X}: return without a matching call")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of range at {pc:#05X}: address {address:#06X}")]
    AddressOutOfRange { pc: u16, address: usize },
}

/// Errors raised while loading a program into memory.
#[derive(Debug, Error)]
pub enum LoadProgramError {
    #[error("could not open program file {path}: {source}")]
    CouldNotOpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read program: {0}")]
    CouldNotReadFile(#[from] std::io::Error),

    #[error("program of {0} bytes does not fit into the {max} bytes of program memory", max = CHIP8_MAX_PROGRAM_SIZE)]
    ProgramTooLarge(usize),
}
