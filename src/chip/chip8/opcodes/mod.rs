mod arithmetic_and_logic;
mod program_flow;
mod system;

use crate::chip::{
    chip8::{util::ProgramFlow, Chip8},
    ExecutionError,
};

/// Represents a CHIP-8 opcode. A CHIP-8 opcode is two bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// The instruction class is the most significant nibble of the opcode.
    /// Note that we use a u8 to represent the instruction class here for
    /// convenience, but ensure that a valid opcode can only be constructed
    /// if the four most significant bits of the u8 are 0.
    instruction_class: u8,
    /// The payload constitutes the remaining nibbles of the opcode.
    payload: OpcodePayload,
}

/// Represents the payload of a CHIP-8 opcode. That is the opcode without
/// the most significant nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodePayload {
    /// The nibbles representing the payload. Note that we use the u8 type
    /// here for convenience, but ensure that valid payloads can only be
    /// constructed if the four most significant bits of the u8 are 0.
    nibbles: [u8; 3],
}

impl OpcodePayload {
    /// Interprets the opcode payload as an address in the range 0x000 to
    /// 0xFFF (inclusive) and returns an u16 containing this address.
    pub fn address(&self) -> u16 {
        (self.nibbles[0] as u16) << 8 | (self.nibbles[1] as u16) << 4 | self.nibbles[2] as u16
    }

    /// Interprets the most significant nibble of the payload as a register
    /// address in range 0x0 - 0xF (inclusive) and the remaining nibbles
    /// as a value in range 0x00 - 0xFF (inclusive) and returns a tuple
    /// representing these values.
    pub fn reg_and_value(&self) -> (u8, u8) {
        (self.nibbles[0], (self.nibbles[1] << 4) | self.nibbles[2])
    }

    /// Interprets the payload as three operands, each of size one nibble,
    /// i.e., in range 0x0 - 0xF (inclusive) and returns a triple representing
    /// these values. For most instructions these are `x`, `y` and `n`.
    pub fn operands(&self) -> (u8, u8, u8) {
        (self.nibbles[0], self.nibbles[1], self.nibbles[2])
    }
}

impl Opcode {
    /// Constructs a new `Opcode` given its byte representation.
    pub fn new(opcode: &[u8; 2]) -> Opcode {
        Opcode {
            instruction_class: opcode[0] >> 4,
            payload: OpcodePayload {
                nibbles: [opcode[0] & 0xF, opcode[1] >> 4, opcode[1] & 0xF],
            },
        }
    }

    pub fn instruction_class(&self) -> u8 {
        self.instruction_class
    }

    pub fn payload(&self) -> &OpcodePayload {
        &self.payload
    }

    /// The opcode as the 16-bit word it was fetched as.
    pub fn word(&self) -> u16 {
        (self.instruction_class as u16) << 12 | self.payload.address()
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode::new(&word.to_be_bytes())
    }
}

/// The operations of the `8xyN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AluOp {
    Load,
    Or,
    And,
    Xor,
    Add,
    Sub,
    Shr,
    SubN,
    Shl,
}

/// A decoded instruction. Register operands are nibbles, i.e. in range 0x0 - 0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jmp { address: u16 },
    /// 2nnn
    Call { address: u16 },
    /// 3xkk
    Se { reg: u8, value: u8 },
    /// 4xkk
    Sne { reg: u8, value: u8 },
    /// 5xy0
    Sre { x: u8, y: u8 },
    /// 6xkk
    Ldr { reg: u8, value: u8 },
    /// 7xkk
    Add { reg: u8, value: u8 },
    /// 8xyN
    Alu { op: AluOp, x: u8, y: u8 },
    /// 9xy0
    Srne { x: u8, y: u8 },
    /// Annn
    Ldi { address: u16 },
    /// Bnnn
    Jmpr { address: u16 },
    /// Cxkk
    Rnd { reg: u8, mask: u8 },
    /// Dxyn
    Drw { x: u8, y: u8, n: u8 },
    /// Ex9E
    Skp { reg: u8 },
    /// ExA1
    Sknp { reg: u8 },
    /// Fx07
    LdDelay { reg: u8 },
    /// Fx0A
    WaitKey { reg: u8 },
    /// Fx15
    SetDelay { reg: u8 },
    /// Fx18
    SetSound { reg: u8 },
    /// Fx1E
    AddIndex { reg: u8 },
    /// Fx29
    LdFont { reg: u8 },
    /// Fx33
    Bcd { reg: u8 },
    /// Fx55
    Store { reg: u8 },
    /// Fx65
    Load { reg: u8 },
    /// Anything else, including `0nnn`.
    Unknown(Opcode),
}

impl From<Opcode> for Instruction {
    fn from(opcode: Opcode) -> Instruction {
        let payload = opcode.payload;
        let address = payload.address();
        let (reg, value) = payload.reg_and_value();
        let (x, y, n) = payload.operands();

        match opcode.instruction_class {
            0x0 => match address {
                0x0E0 => Instruction::Cls,
                0x0EE => Instruction::Ret,
                _ => Instruction::Unknown(opcode),
            },
            0x1 => Instruction::Jmp { address },
            0x2 => Instruction::Call { address },
            0x3 => Instruction::Se { reg, value },
            0x4 => Instruction::Sne { reg, value },
            // The low nibble of 5xyN and 9xyN is not checked.
            0x5 => Instruction::Sre { x, y },
            0x6 => Instruction::Ldr { reg, value },
            0x7 => Instruction::Add { reg, value },
            0x8 => {
                let op = match n {
                    0x0 => AluOp::Load,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::Shr,
                    0x7 => AluOp::SubN,
                    0xE => AluOp::Shl,
                    _ => return Instruction::Unknown(opcode),
                };
                Instruction::Alu { op, x, y }
            }
            0x9 => Instruction::Srne { x, y },
            0xA => Instruction::Ldi { address },
            0xB => Instruction::Jmpr { address },
            0xC => Instruction::Rnd { reg, mask: value },
            0xD => Instruction::Drw { x, y, n },
            0xE => match value {
                0x9E => Instruction::Skp { reg },
                0xA1 => Instruction::Sknp { reg },
                _ => Instruction::Unknown(opcode),
            },
            0xF => match value {
                0x07 => Instruction::LdDelay { reg },
                0x0A => Instruction::WaitKey { reg },
                0x15 => Instruction::SetDelay { reg },
                0x18 => Instruction::SetSound { reg },
                0x1E => Instruction::AddIndex { reg },
                0x29 => Instruction::LdFont { reg },
                0x33 => Instruction::Bcd { reg },
                0x55 => Instruction::Store { reg },
                0x65 => Instruction::Load { reg },
                _ => Instruction::Unknown(opcode),
            },
            _ => Instruction::Unknown(opcode),
        }
    }
}

impl Instruction {
    /// Executes `self` relative to the given state. Note that this method will
    /// in-place modify the given state, except for the program counter: the
    /// returned flow tells the caller where execution continues. On error the
    /// state is left unchanged.
    pub(super) fn execute(self, state: &mut Chip8) -> Result<ProgramFlow, ExecutionError> {
        match self {
            Instruction::Cls => Ok(system::clear_screen(state)),
            Instruction::Ret => program_flow::ret(state),
            Instruction::Jmp { address } => Ok(program_flow::jump(address)),
            Instruction::Call { address } => program_flow::call(state, address),
            Instruction::Se { reg, value } => Ok(program_flow::skip_if_equal(state, reg, value)),
            Instruction::Sne { reg, value } => {
                Ok(program_flow::skip_if_not_equal(state, reg, value))
            }
            Instruction::Sre { x, y } => Ok(program_flow::skip_if_registers_equal(state, x, y)),
            Instruction::Srne { x, y } => {
                Ok(program_flow::skip_if_registers_not_equal(state, x, y))
            }
            Instruction::Ldr { reg, value } => Ok(arithmetic_and_logic::load(state, reg, value)),
            Instruction::Add { reg, value } => Ok(arithmetic_and_logic::add(state, reg, value)),
            Instruction::Alu { op, x, y } => Ok(arithmetic_and_logic::alu(state, op, x, y)),
            Instruction::Ldi { address } => Ok(arithmetic_and_logic::load_index(state, address)),
            Instruction::Jmpr { address } => Ok(program_flow::jump_with_offset(state, address)),
            Instruction::Rnd { reg, mask } => Ok(arithmetic_and_logic::random(state, reg, mask)),
            Instruction::Drw { x, y, n } => system::draw(state, x, y, n),
            Instruction::Skp { reg } => Ok(program_flow::skip_if_key_pressed(state, reg)),
            Instruction::Sknp { reg } => Ok(program_flow::skip_if_key_not_pressed(state, reg)),
            Instruction::LdDelay { reg } => Ok(arithmetic_and_logic::load_delay(state, reg)),
            Instruction::WaitKey { .. } => Ok(system::wait_for_key(state)),
            Instruction::SetDelay { reg } => Ok(arithmetic_and_logic::set_delay(state, reg)),
            Instruction::SetSound { reg } => Ok(arithmetic_and_logic::set_sound(state, reg)),
            Instruction::AddIndex { reg } => Ok(arithmetic_and_logic::add_index(state, reg)),
            Instruction::LdFont { reg } => Ok(arithmetic_and_logic::load_font(state, reg)),
            Instruction::Bcd { reg } => arithmetic_and_logic::store_bcd(state, reg),
            Instruction::Store { reg } => arithmetic_and_logic::store_registers(state, reg),
            Instruction::Load { reg } => arithmetic_and_logic::load_registers(state, reg),
            Instruction::Unknown(opcode) => Ok(system::unknown(state, opcode)),
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04X}", self.word())
    }
}

impl std::fmt::Display for OpcodePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{:X}, {:X}, {:X}]",
            self.nibbles[0], self.nibbles[1], self.nibbles[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(word: u16) -> Instruction {
        Instruction::from(Opcode::from(word))
    }

    #[test]
    fn test_opcode_fields() {
        let opcode = Opcode::new(&[0xAB, 0xCD]);
        assert_eq!(opcode.instruction_class(), 0xA);
        assert_eq!(opcode.payload().address(), 0xBCD);
        assert_eq!(opcode.payload().reg_and_value(), (0xB, 0xCD));
        assert_eq!(opcode.payload().operands(), (0xB, 0xC, 0xD));
        assert_eq!(opcode.word(), 0xABCD);
        assert_eq!(opcode.to_string(), "ABCD");
        assert_eq!(opcode.payload().to_string(), "[B, C, D]");
    }

    #[test]
    fn test_decode_system() {
        assert_eq!(decode(0x00E0), Instruction::Cls);
        assert_eq!(decode(0x00EE), Instruction::Ret);
        assert_eq!(decode(0x0123), Instruction::Unknown(Opcode::from(0x0123)));
    }

    #[test]
    fn test_decode_address_instructions() {
        assert_eq!(decode(0x1CAF), Instruction::Jmp { address: 0xCAF });
        assert_eq!(decode(0x2CAF), Instruction::Call { address: 0xCAF });
        assert_eq!(decode(0xA123), Instruction::Ldi { address: 0x123 });
        assert_eq!(decode(0xB123), Instruction::Jmpr { address: 0x123 });
    }

    #[test]
    fn test_decode_reg_and_value_instructions() {
        assert_eq!(decode(0x34AF), Instruction::Se { reg: 4, value: 0xAF });
        assert_eq!(decode(0x44AF), Instruction::Sne { reg: 4, value: 0xAF });
        assert_eq!(decode(0x6A12), Instruction::Ldr { reg: 0xA, value: 0x12 });
        assert_eq!(decode(0x7A12), Instruction::Add { reg: 0xA, value: 0x12 });
        assert_eq!(decode(0xC30F), Instruction::Rnd { reg: 3, mask: 0x0F });
    }

    #[test]
    fn test_decode_register_pairs_ignore_low_nibble() {
        assert_eq!(decode(0x5120), Instruction::Sre { x: 1, y: 2 });
        assert_eq!(decode(0x5127), Instruction::Sre { x: 1, y: 2 });
        assert_eq!(decode(0x9120), Instruction::Srne { x: 1, y: 2 });
    }

    #[test]
    fn test_decode_alu() {
        let ops: [(u16, AluOp); 9] = [
            (0x0, AluOp::Load),
            (0x1, AluOp::Or),
            (0x2, AluOp::And),
            (0x3, AluOp::Xor),
            (0x4, AluOp::Add),
            (0x5, AluOp::Sub),
            (0x6, AluOp::Shr),
            (0x7, AluOp::SubN),
            (0xE, AluOp::Shl),
        ];
        for (n, op) in ops.iter() {
            assert_eq!(decode(0x8120 | n), Instruction::Alu { op: *op, x: 1, y: 2 });
        }
        for n in &[0x8u16, 0x9, 0xA, 0xB, 0xC, 0xD, 0xF] {
            assert!(matches!(decode(0x8120 | n), Instruction::Unknown(_)));
        }
    }

    #[test]
    fn test_decode_draw() {
        assert_eq!(decode(0xD125), Instruction::Drw { x: 1, y: 2, n: 5 });
    }

    #[test]
    fn test_decode_keys() {
        assert_eq!(decode(0xE39E), Instruction::Skp { reg: 3 });
        assert_eq!(decode(0xE3A1), Instruction::Sknp { reg: 3 });
        assert!(matches!(decode(0xE3A2), Instruction::Unknown(_)));
    }

    #[test]
    fn test_decode_f_family() {
        assert_eq!(decode(0xF507), Instruction::LdDelay { reg: 5 });
        assert_eq!(decode(0xF50A), Instruction::WaitKey { reg: 5 });
        assert_eq!(decode(0xF515), Instruction::SetDelay { reg: 5 });
        assert_eq!(decode(0xF518), Instruction::SetSound { reg: 5 });
        assert_eq!(decode(0xF51E), Instruction::AddIndex { reg: 5 });
        assert_eq!(decode(0xF529), Instruction::LdFont { reg: 5 });
        assert_eq!(decode(0xF533), Instruction::Bcd { reg: 5 });
        assert_eq!(decode(0xF555), Instruction::Store { reg: 5 });
        assert_eq!(decode(0xF565), Instruction::Load { reg: 5 });
        assert!(matches!(decode(0xF575), Instruction::Unknown(_)));
    }
}
