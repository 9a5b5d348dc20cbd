use crate::chip::{
    chip8::{
        constants::CHIP8_STACK_DEPTH,
        util::{self, ProgramFlow},
        Chip8,
    },
    ExecutionError,
};

/// 00EE: returns to the address on top of the stack.
pub(super) fn ret(state: &mut Chip8) -> Result<ProgramFlow, ExecutionError> {
    if state.stack_pointer == 0 {
        return Err(ExecutionError::StackUnderflow {
            pc: state.program_counter,
        });
    }
    state.stack_pointer -= 1;
    Ok(ProgramFlow::Jump(state.stack[state.stack_pointer as usize]))
}

/// 1nnn
pub(super) fn jump(address: u16) -> ProgramFlow {
    ProgramFlow::Jump(address)
}

/// 2nnn: pushes the address of the next instruction and jumps to `address`.
pub(super) fn call(state: &mut Chip8, address: u16) -> Result<ProgramFlow, ExecutionError> {
    if state.stack_pointer as usize == CHIP8_STACK_DEPTH {
        return Err(ExecutionError::StackOverflow {
            pc: state.program_counter,
        });
    }
    state.stack[state.stack_pointer as usize] = state.program_counter.wrapping_add(2);
    state.stack_pointer += 1;
    Ok(ProgramFlow::Jump(address))
}

/// 3xkk
pub(super) fn skip_if_equal(state: &Chip8, reg: u8, value: u8) -> ProgramFlow {
    util::conditional_skip(state.registers[reg as usize] == value)
}

/// 4xkk
pub(super) fn skip_if_not_equal(state: &Chip8, reg: u8, value: u8) -> ProgramFlow {
    util::conditional_skip(state.registers[reg as usize] != value)
}

/// 5xy0
pub(super) fn skip_if_registers_equal(state: &Chip8, x: u8, y: u8) -> ProgramFlow {
    util::conditional_skip(state.registers[x as usize] == state.registers[y as usize])
}

/// 9xy0
pub(super) fn skip_if_registers_not_equal(state: &Chip8, x: u8, y: u8) -> ProgramFlow {
    util::conditional_skip(state.registers[x as usize] != state.registers[y as usize])
}

/// Bnnn: jumps to `address` + V0.
pub(super) fn jump_with_offset(state: &Chip8, address: u16) -> ProgramFlow {
    ProgramFlow::Jump(address + state.registers[0] as u16)
}

/// Ex9E
pub(super) fn skip_if_key_pressed(state: &Chip8, reg: u8) -> ProgramFlow {
    util::conditional_skip(state.is_key_pressed(state.registers[reg as usize]))
}

/// ExA1
pub(super) fn skip_if_key_not_pressed(state: &Chip8, reg: u8) -> ProgramFlow {
    util::conditional_skip(!state.is_key_pressed(state.registers[reg as usize]))
}
