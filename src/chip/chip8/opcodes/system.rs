use log::warn;

use crate::chip::{
    chip8::{constants::CHIP8_FLAG_REGISTER, opcodes::Opcode, util::ProgramFlow, Chip8},
    ExecutionError, ExecutionState,
};

/// 00E0: clears the display.
pub(super) fn clear_screen(state: &mut Chip8) -> ProgramFlow {
    state.framebuffer.clear();
    state.draw = true;
    ProgramFlow::Next
}

/// Dxyn: draws the `n` bytes at the index register as a sprite at (Vx, Vy).
/// VF is set to 1 if a lit pixel got switched off, to 0 otherwise.
pub(super) fn draw(state: &mut Chip8, x: u8, y: u8, n: u8) -> Result<ProgramFlow, ExecutionError> {
    let sprite = state.memory_range(state.index, n as usize)?;

    let x = state.registers[x as usize];
    let y = state.registers[y as usize];
    let collision = state
        .framebuffer
        .draw_sprite(x, y, &state.memory.bytes()[sprite]);

    state.registers[CHIP8_FLAG_REGISTER] = collision as u8;
    state.draw = true;
    Ok(ProgramFlow::Next)
}

/// Fx0A: suspends dispatch until a key is pressed. The register to store the key
/// in is recovered from this instruction once the key press arrives, see
/// `Chip8::press_key`.
pub(super) fn wait_for_key(state: &mut Chip8) -> ProgramFlow {
    state.execution_state = ExecutionState::AwaitingKey;
    ProgramFlow::Next
}

/// Unrecognised instructions do nothing but are reported.
pub(super) fn unknown(state: &mut Chip8, opcode: Opcode) -> ProgramFlow {
    warn!(
        "Ignoring unknown opcode {} at {:#05X}",
        opcode, state.program_counter
    );
    state.unknown_opcodes += 1;
    ProgramFlow::Next
}
