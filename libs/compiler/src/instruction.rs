use std::{
    fmt,
    io::{BufWriter, Write},
    ops::{Deref, DerefMut},
};

/// The register file is r0 through r15
pub const REGISTER_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(u8);

impl Register {
    pub fn new(index: usize) -> Option<Self> {
        if index < REGISTER_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub(crate) usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Everything that can appear after an opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    /// A raw location: the output port `o`, a device port `d0`..`d5`, `db`, or a
    /// register named directly in source
    Location(String),
    /// Literal number text, kept exactly as it will be written out
    Number(String),
    /// Property names, reagent modes and alias names
    Identifier(String),
    /// A branch target that has not been resolved yet
    Label(Label),
    /// A branch target after backpatching
    Address(usize),
}

impl Operand {
    pub fn number(text: impl Into<String>) -> Self {
        Self::Number(text.into())
    }

    pub fn identifier(text: impl Into<String>) -> Self {
        Self::Identifier(text.into())
    }

    pub fn zero() -> Self {
        Self::number("0")
    }
}

impl From<Register> for Operand {
    fn from(value: Register) -> Self {
        Self::Register(value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Location(l) => write!(f, "{}", l),
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Identifier(i) => write!(f, "{}", i),
            Operand::Label(l) => write!(f, "{{{}}}", l),
            Operand::Address(a) => write!(f, "{}", a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Move,
    Alias,
    And,
    Or,
    Xor,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Slt,
    Sgt,
    Sle,
    Sge,
    Seq,
    Sne,
    Beq,
    Bne,
    J,
    /// `l dst device property`
    L,
    /// `ls dst device slot property`
    Ls,
    /// `lr dst device mode reagent`
    Lr,
    /// `s device property value`
    S,
    Min,
    Max,
    Abs,
    Acos,
    Asin,
    Sin,
    Cos,
    Tan,
    Exp,
    Floor,
    Ceil,
    Trunc,
    Log,
    Round,
    Sqrt,
    Rand,
    Sleep,
    Yield,
}

impl Opcode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "move",
            Opcode::Alias => "alias",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Slt => "slt",
            Opcode::Sgt => "sgt",
            Opcode::Sle => "sle",
            Opcode::Sge => "sge",
            Opcode::Seq => "seq",
            Opcode::Sne => "sne",
            Opcode::Beq => "beq",
            Opcode::Bne => "bne",
            Opcode::J => "j",
            Opcode::L => "l",
            Opcode::Ls => "ls",
            Opcode::Lr => "lr",
            Opcode::S => "s",
            Opcode::Min => "min",
            Opcode::Max => "max",
            Opcode::Abs => "abs",
            Opcode::Acos => "acos",
            Opcode::Asin => "asin",
            Opcode::Sin => "sin",
            Opcode::Cos => "cos",
            Opcode::Tan => "tan",
            Opcode::Exp => "exp",
            Opcode::Floor => "floor",
            Opcode::Ceil => "ceil",
            Opcode::Trunc => "trunc",
            Opcode::Log => "log",
            Opcode::Round => "round",
            Opcode::Sqrt => "sqrt",
            Opcode::Rand => "rand",
            Opcode::Sleep => "sleep",
            Opcode::Yield => "yield",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    /// Human readable note, written as a trailing comment in debug output
    pub description: String,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>, description: impl Into<String>) -> Self {
        Self {
            opcode,
            operands,
            description: description.into(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

/// A finalized instruction stream: every label operand has been replaced by its address.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Program(Vec<Instruction>);

impl Deref for Program {
    type Target = Vec<Instruction>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Program {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self(instructions)
    }

    /// Writes one instruction per line. With `debug` set every line carries its
    /// description as a `#` comment.
    pub fn write<W: Write>(&self, writer: &mut BufWriter<W>, debug: bool) -> Result<(), std::io::Error> {
        for instruction in &self.0 {
            if debug {
                writeln!(writer, "{} # {}", instruction, instruction.description)?;
            } else {
                writeln!(writer, "{}", instruction)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.0 {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
