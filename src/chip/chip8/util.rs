use crate::chip::chip8::Chip8;

/// Where execution continues after an instruction. Instructions never touch the
/// program counter themselves; the cycle applies the flow once the handler returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ProgramFlow {
    /// Continue with the instruction following the current one.
    Next,
    /// Skip the instruction following the current one.
    Skip,
    /// Continue at the given address.
    Jump(u16),
}

pub(super) fn conditional_skip(condition: bool) -> ProgramFlow {
    if condition {
        ProgramFlow::Skip
    } else {
        ProgramFlow::Next
    }
}

pub(super) fn advance_program_counter(state: &mut Chip8, flow: ProgramFlow) {
    state.program_counter = match flow {
        ProgramFlow::Next => state.program_counter.wrapping_add(2),
        ProgramFlow::Skip => state.program_counter.wrapping_add(4),
        ProgramFlow::Jump(address) => address,
    };
}
