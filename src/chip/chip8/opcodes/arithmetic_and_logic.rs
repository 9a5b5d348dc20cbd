use rand::Rng;

use crate::chip::{
    chip8::{
        constants::{CHIP8_CHARSET_OFFSET, CHIP8_FLAG_REGISTER, CHIP8_GLYPH_HEIGHT},
        opcodes::AluOp,
        util::ProgramFlow,
        Chip8,
    },
    ExecutionError,
};

/// 6xkk
pub(super) fn load(state: &mut Chip8, reg: u8, value: u8) -> ProgramFlow {
    state.registers[reg as usize] = value;
    ProgramFlow::Next
}

/// 7xkk: adds without touching VF.
pub(super) fn add(state: &mut Chip8, reg: u8, value: u8) -> ProgramFlow {
    state.registers[reg as usize] = state.registers[reg as usize].wrapping_add(value);
    ProgramFlow::Next
}

/// 8xyN: register to register operations. Those that report a carry, borrow or
/// shifted-out bit write VF before the result, so for x = F the result wins.
pub(super) fn alu(state: &mut Chip8, op: AluOp, x: u8, y: u8) -> ProgramFlow {
    fn modify_registers(state: &mut Chip8, r1: u8, r2: u8, f: fn(u8, u8) -> (u8, Option<bool>)) {
        let (val, flag) = f(state.registers[r1 as usize], state.registers[r2 as usize]);
        if let Some(flag) = flag {
            state.registers[CHIP8_FLAG_REGISTER] = flag as u8;
        }
        state.registers[r1 as usize] = val;
    }

    match op {
        AluOp::Load => modify_registers(state, x, y, |_, v2| (v2, None)),
        AluOp::Or => modify_registers(state, x, y, |v1, v2| (v1 | v2, None)),
        AluOp::And => modify_registers(state, x, y, |v1, v2| (v1 & v2, None)),
        AluOp::Xor => modify_registers(state, x, y, |v1, v2| (v1 ^ v2, None)),
        AluOp::Add => modify_registers(state, x, y, |v1, v2| {
            let (result, carry) = v1.overflowing_add(v2);
            (result, Some(carry))
        }),
        // VF = 1 means no borrow, which requires Vx to be strictly greater.
        AluOp::Sub => modify_registers(state, x, y, |v1, v2| (v1.wrapping_sub(v2), Some(v1 > v2))),
        AluOp::Shr => modify_registers(state, x, y, |v1, _| (v1 >> 1, Some(v1 & 0x01 != 0))),
        AluOp::SubN => {
            modify_registers(state, x, y, |v1, v2| (v2.wrapping_sub(v1), Some(v2 > v1)))
        }
        AluOp::Shl => modify_registers(state, x, y, |v1, _| (v1 << 1, Some(v1 & 0x80 != 0))),
    };
    ProgramFlow::Next
}

/// Annn
pub(super) fn load_index(state: &mut Chip8, address: u16) -> ProgramFlow {
    state.index = address;
    ProgramFlow::Next
}

/// Fx1E: no flag is set, even if the index leaves the address space.
pub(super) fn add_index(state: &mut Chip8, reg: u8) -> ProgramFlow {
    state.index = state.index.wrapping_add(state.registers[reg as usize] as u16);
    ProgramFlow::Next
}

/// Cxkk: a uniformly drawn byte masked with `mask`.
pub(super) fn random(state: &mut Chip8, reg: u8, mask: u8) -> ProgramFlow {
    let sample: u8 = state.rng.gen();
    state.registers[reg as usize] = sample & mask;
    ProgramFlow::Next
}

/// Fx07
pub(super) fn load_delay(state: &mut Chip8, reg: u8) -> ProgramFlow {
    state.registers[reg as usize] = state.delay_timer.value();
    ProgramFlow::Next
}

/// Fx15
pub(super) fn set_delay(state: &mut Chip8, reg: u8) -> ProgramFlow {
    state.delay_timer.set(state.registers[reg as usize]);
    ProgramFlow::Next
}

/// Fx18
pub(super) fn set_sound(state: &mut Chip8, reg: u8) -> ProgramFlow {
    state.sound_timer.set(state.registers[reg as usize]);
    ProgramFlow::Next
}

/// Fx29: points the index register at the glyph for the value of Vx.
pub(super) fn load_font(state: &mut Chip8, reg: u8) -> ProgramFlow {
    let character = state.registers[reg as usize] as u16;
    state.index = CHIP8_CHARSET_OFFSET + character * CHIP8_GLYPH_HEIGHT;
    ProgramFlow::Next
}

/// Fx33: stores the hundreds, tens and units of Vx at I, I+1 and I+2.
pub(super) fn store_bcd(state: &mut Chip8, reg: u8) -> Result<ProgramFlow, ExecutionError> {
    let target = state.memory_range(state.index, 3)?;
    let value = state.registers[reg as usize];
    state.memory.bytes_mut()[target].copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
    Ok(ProgramFlow::Next)
}

/// Fx55: stores V0 to Vx, both inclusive, from I onward.
pub(super) fn store_registers(state: &mut Chip8, reg: u8) -> Result<ProgramFlow, ExecutionError> {
    let count = reg as usize + 1;
    let target = state.memory_range(state.index, count)?;
    state.memory.bytes_mut()[target].copy_from_slice(&state.registers[..count]);
    Ok(ProgramFlow::Next)
}

/// Fx65: loads V0 to Vx, both inclusive, from I onward.
pub(super) fn load_registers(state: &mut Chip8, reg: u8) -> Result<ProgramFlow, ExecutionError> {
    let count = reg as usize + 1;
    let source = state.memory_range(state.index, count)?;
    state.registers[..count].copy_from_slice(&state.memory.bytes()[source]);
    Ok(ProgramFlow::Next)
}
