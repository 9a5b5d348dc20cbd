/// CHIP-8 constants.
pub mod constants;
/// Cursive display output.
pub mod cursive_display;
/// The packed monochrome display memory.
mod framebuffer;
/// Main memory.
mod memory;
/// Decoding of opcodes and their execution.
mod opcodes;
/// The 60 Hz countdown timers.
mod timers;
/// Convenience functions for modification of the CHIP-8 state.
mod util;


pub use framebuffer::FrameBuffer;
pub use memory::Memory;
pub use opcodes::{Opcode, OpcodePayload};
pub use timers::Timer;

use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::time::Instant;

use log::{debug, trace, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::chip::{
    chip8::{
        constants::{CHIP8_KEY_COUNT, CHIP8_PROGRAM_START, CHIP8_STACK_DEPTH},
        opcodes::Instruction,
    },
    Chip, ExecutionError, ExecutionState, LoadProgramError,
};

/// Represents the state of the CHIP-8.
pub struct Chip8 {
    /// 4096 bytes of main memory, holding the charset and the program.
    memory: Memory,

    /// 16 registers where each can store one byte. VF doubles as flags register.
    registers: [u8; 16],

    /// An index register. It is not range checked; instructions that access
    /// memory through it fault if the access leaves the address space.
    index: u16,

    /// A program counter, pointing at the next instruction to fetch.
    program_counter: u16,

    /// The display memory. Note that those are usually directly wired up to
    /// the pixels of the display.
    framebuffer: FrameBuffer,

    /// The delay timer, decremented at 60 Hz of wall-clock time.
    delay_timer: Timer,

    /// The sound timer. A tone is audible while it is non-zero.
    sound_timer: Timer,

    /// The input pins. Note that those input pins are usually directly wired
    /// up to the keys. However, we do not prescribe how this is handled and
    /// hence refer to them as input pins rather than as keys.
    input_pins: [bool; CHIP8_KEY_COUNT],

    /// A stack. Note that there are no instructions allowing to modify the
    /// stack and it is only used to store return addresses for the return
    /// opcode.
    stack: [u16; CHIP8_STACK_DEPTH],

    /// The number of return addresses on the stack. 0 means the stack is
    /// empty, the top of the stack is at `stack_pointer - 1`.
    stack_pointer: u8,

    /// Whether the chip runs, waits for a key or has faulted.
    execution_state: ExecutionState,

    /// Source of entropy for the random opcode.
    rng: StdRng,

    /// Number of unrecognised opcodes that were skipped.
    unknown_opcodes: u64,

    /// A flag that indicates whether the framebuffer changed since it
    /// was last set to false.
    draw: bool,
}

impl Chip for Chip8 {
    /// The CHIP-8's pins can actually be addressed by using just half a byte.
    /// However, we use a whole byte here and ignore pins out of range, because
    /// it is more convenient to handle.
    type PinAddress = u8;

    /// A CHIP-8 memory address is in the range between 0 and 4096 (exclusive).
    /// We represent it using a u16 and check the range whenever memory is accessed.
    type MemoryAddress = u16;

    fn load_program(&mut self, path: &Path) -> Result<usize, LoadProgramError> {
        let file = File::open(path).map_err(|source| LoadProgramError::CouldNotOpenFile {
            path: path.display().to_string(),
            source,
        })?;
        let size = self.memory.load_program_from(file)?;
        debug!("Loaded program [path: {}] [size: {}]", path.display(), size);
        Ok(size)
    }

    fn cycle(&mut self) -> Result<ExecutionState, ExecutionError> {
        match &self.execution_state {
            ExecutionState::Running => {}
            ExecutionState::AwaitingKey => return Ok(ExecutionState::AwaitingKey),
            ExecutionState::Faulted(error) => return Err(error.clone()),
        }

        let instruction = self
            .next_instruction()
            .map(Instruction::from)
            .and_then(|instruction| {
                trace!(
                    "Executing [{:?}] [pc: {:#05X}] [i: {:#05X}] [v: {:02X?}]",
                    instruction,
                    self.program_counter,
                    self.index,
                    self.registers
                );
                instruction.execute(self)
            });

        match instruction {
            Ok(flow) => {
                util::advance_program_counter(self, flow);
                Ok(self.execution_state.clone())
            }
            Err(error) => {
                self.execution_state = ExecutionState::Faulted(error.clone());
                Err(error)
            }
        }
    }

    fn update_timers(&mut self, now: Instant) {
        self.delay_timer.update(now);
        self.sound_timer.update(now);
    }

    fn press_key(&mut self, pin: u8) {
        if pin as usize >= CHIP8_KEY_COUNT {
            warn!("Ignoring press of unknown key {:#X}", pin);
            return;
        }
        self.input_pins[pin as usize] = true;

        if self.execution_state == ExecutionState::AwaitingKey {
            // The program counter has already moved past the Fx0A instruction.
            let waiting = self.program_counter.wrapping_sub(2);
            let reg = self
                .memory
                .read_word(waiting)
                .map(|word| Opcode::from(word).payload().reg_and_value().0);
            if let Some(reg) = reg {
                self.registers[reg as usize] = pin;
                debug!("Key {:X} resolves wait of V{:X}", pin, reg);
            }
            self.execution_state = ExecutionState::Running;
        }
    }

    fn release_key(&mut self, pin: u8) {
        if let Some(input_pin) = self.input_pins.get_mut(pin as usize) {
            *input_pin = false;
        }
    }

    fn reset_input_pins(&mut self) {
        self.input_pins = [false; CHIP8_KEY_COUNT];
    }

    fn sound_active(&self) -> bool {
        self.sound_timer.value() > 0
    }

    fn execution_state(&self) -> ExecutionState {
        self.execution_state.clone()
    }
}

impl Chip8 {
    /// Constructs a new CHIP-8 and appropriately initializes all fields so that
    /// it is ready for the first execution cycle. Essentially this means that
    /// the program counter is set to 0x200 and the default CHIP-8 charset is
    /// loaded at memory address `CHIP8_CHARSET_OFFSET`. Note that no program is
    /// loaded upon initialization.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Like `new`, but the random opcode draws from a generator seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let now = Instant::now();
        Chip8 {
            memory: Memory::new(),
            registers: [0; 16],
            index: 0,
            program_counter: CHIP8_PROGRAM_START,
            framebuffer: FrameBuffer::new(),
            delay_timer: Timer::new(now),
            sound_timer: Timer::new(now),
            input_pins: [false; CHIP8_KEY_COUNT],
            stack: [0; CHIP8_STACK_DEPTH],
            stack_pointer: 0,
            execution_state: ExecutionState::Running,
            rng,
            unknown_opcodes: 0,
            draw: true,
        }
    }

    /// Convenience method to load a program from a slice.
    pub fn load_program_bytes(&mut self, program: &[u8]) -> Result<usize, LoadProgramError> {
        self.memory.load_program(program)
    }

    /// The current display contents.
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.value()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.value()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// How many unrecognised opcodes were skipped so far.
    pub fn unknown_opcode_count(&self) -> u64 {
        self.unknown_opcodes
    }

    /// Returns whether the framebuffer changed since the last call.
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::replace(&mut self.draw, false)
    }

    /// Whether the host reports `key` as pressed. Values outside the keypad
    /// are never pressed.
    fn is_key_pressed(&self, key: u8) -> bool {
        self.input_pins.get(key as usize).copied().unwrap_or(false)
    }

    /// Fetches the next instruction based on the current state of self.program_counter.
    fn next_instruction(&self) -> Result<Opcode, ExecutionError> {
        self.memory
            .read_word(self.program_counter)
            .map(Opcode::from)
            .ok_or(ExecutionError::AddressOutOfRange {
                pc: self.program_counter,
                address: self.program_counter as usize + 1,
            })
    }

    /// The memory range `address..address + len` accessed by the current instruction.
    fn memory_range(&self, address: u16, len: usize) -> Result<Range<usize>, ExecutionError> {
        self.memory
            .range(address, len)
            .ok_or(ExecutionError::AddressOutOfRange {
                pc: self.program_counter,
                address: address as usize + len.saturating_sub(1),
            })
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}
