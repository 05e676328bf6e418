//! Token kinds and the static descriptor table.
//!
//! Every token kind has exactly one [`TokenDescriptor`], stored in
//! [`DESCRIPTORS`] at the index of its discriminant. Precedence numbers
//! follow the C convention: a lower number binds tighter.

/// Operator associativity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    None,
    Left,
    Right,
}

/// Number of operands a token consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Pushes one value.
    Nullary,
    /// Replaces the top value.
    Unary,
    /// Replaces the top two values with one.
    Binary,
    /// Parentheses: only meaningful to the infix converter.
    Structural,
}

impl Arity {
    /// Net change in stack depth when a token of this arity runs.
    ///
    /// `None` for structural tokens, which have no stack effect and must
    /// never reach a compiled program.
    pub const fn stack_effect(self) -> Option<i32> {
        match self {
            Arity::Nullary => Some(1),
            Arity::Unary => Some(0),
            Arity::Binary => Some(-1),
            Arity::Structural => None,
        }
    }
}

/// A classified lexical unit.
///
/// The discriminant indexes [`DESCRIPTORS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Token {
    Invert,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,

    Not,
    And,
    Or,

    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,

    Power,

    Sqrt,
    Cbrt,

    Exp,
    Exp2,
    Log,
    Log2,
    Log10,

    Abs,

    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,

    /// Numeric literal; the value lives in the program's literal table.
    Number,

    Pi,
    TwoPi,
    HalfPi,
    E,

    Random,

    /// `fs`: seconds since the free-running clock started.
    FreeSeconds,
    /// `f`: samples since the free-running clock started.
    FreeSamples,
    /// `ps`: seconds since host transport start.
    PositionSeconds,
    /// `p`: samples since host transport start.
    PositionSamples,
    /// `rs`: seconds since the current note started.
    NoteSeconds,
    /// `r`: samples since the current note started.
    NoteSamples,
    /// `n`: note phase, 256 steps per note cycle.
    NotePhase,
    /// `t`: the classic 8 kHz bytebeat counter, reset per note.
    ByteTime,

    /// `nf`: active note frequency in Hz.
    NoteFrequency,
    /// `sr`: sample rate in Hz.
    SampleRate,
    /// `bps`: host beats per second.
    BeatsPerSecond,

    InputA,
    InputB,
    InputC,
    InputD,

    LeftParen,
    RightParen,

    Invalid,
}

/// Static properties of one token kind.
#[derive(Clone, Copy, Debug)]
pub struct TokenDescriptor {
    pub token: Token,
    /// Source spelling; empty for kinds that are never looked up by name.
    pub spelling: &'static str,
    pub precedence: u8,
    pub assoc: Assoc,
    pub arity: Arity,
}

const fn op(
    token: Token,
    spelling: &'static str,
    precedence: u8,
    assoc: Assoc,
    arity: Arity,
) -> TokenDescriptor {
    TokenDescriptor {
        token,
        spelling,
        precedence,
        assoc,
        arity,
    }
}

const fn unary(token: Token, spelling: &'static str) -> TokenDescriptor {
    op(token, spelling, 2, Assoc::Right, Arity::Unary)
}

const fn binary(token: Token, spelling: &'static str, precedence: u8) -> TokenDescriptor {
    op(token, spelling, precedence, Assoc::Left, Arity::Binary)
}

const fn value(token: Token, spelling: &'static str) -> TokenDescriptor {
    op(token, spelling, 0, Assoc::None, Arity::Nullary)
}

/// Number of token kinds.
pub const TOKEN_COUNT: usize = Token::Invalid as usize + 1;

/// Descriptor table, indexed by `Token as usize`.
pub static DESCRIPTORS: [TokenDescriptor; TOKEN_COUNT] = [
    // `_` is the explicit unary minus.
    unary(Token::Invert, "_"),
    binary(Token::Add, "+", 6),
    binary(Token::Subtract, "-", 6),
    binary(Token::Multiply, "*", 5),
    binary(Token::Divide, "/", 5),
    binary(Token::Modulo, "%", 5),
    unary(Token::BitNot, "~"),
    binary(Token::BitAnd, "&", 11),
    binary(Token::BitOr, "|", 13),
    binary(Token::BitXor, "^", 12),
    binary(Token::ShiftLeft, "<<", 7),
    binary(Token::ShiftRight, ">>", 7),
    unary(Token::Not, "!"),
    binary(Token::And, "&&", 14),
    binary(Token::Or, "||", 15),
    binary(Token::Equal, "==", 10),
    binary(Token::NotEqual, "!=", 10),
    binary(Token::Less, "<", 9),
    binary(Token::LessOrEqual, "<=", 9),
    binary(Token::Greater, ">", 9),
    binary(Token::GreaterOrEqual, ">=", 9),
    op(Token::Power, "**", 3, Assoc::Right, Arity::Binary),
    unary(Token::Sqrt, "sqrt"),
    unary(Token::Cbrt, "cbrt"),
    unary(Token::Exp, "exp"),
    unary(Token::Exp2, "exp2"),
    unary(Token::Log, "log"),
    unary(Token::Log2, "log2"),
    unary(Token::Log10, "log10"),
    unary(Token::Abs, "abs"),
    unary(Token::Sin, "sin"),
    unary(Token::Cos, "cos"),
    unary(Token::Tan, "tan"),
    unary(Token::Asin, "asin"),
    unary(Token::Acos, "acos"),
    unary(Token::Atan, "atan"),
    value(Token::Number, ""),
    value(Token::Pi, "pi"),
    value(Token::TwoPi, "twoPi"),
    value(Token::HalfPi, "halfPi"),
    value(Token::E, "e"),
    value(Token::Random, "rand"),
    value(Token::FreeSeconds, "fs"),
    value(Token::FreeSamples, "f"),
    value(Token::PositionSeconds, "ps"),
    value(Token::PositionSamples, "p"),
    value(Token::NoteSeconds, "rs"),
    value(Token::NoteSamples, "r"),
    value(Token::NotePhase, "n"),
    value(Token::ByteTime, "t"),
    value(Token::NoteFrequency, "nf"),
    value(Token::SampleRate, "sr"),
    value(Token::BeatsPerSecond, "bps"),
    value(Token::InputA, "a"),
    value(Token::InputB, "b"),
    value(Token::InputC, "c"),
    value(Token::InputD, "d"),
    op(Token::LeftParen, "(", 0, Assoc::None, Arity::Structural),
    op(Token::RightParen, ")", 0, Assoc::None, Arity::Structural),
    op(Token::Invalid, "", 0, Assoc::None, Arity::Structural),
];

impl Token {
    /// Look up a token by its exact spelling. Returns [`Token::Invalid`] on no match.
    pub fn lookup(spelling: &str) -> Token {
        if spelling.is_empty() {
            return Token::Invalid;
        }
        DESCRIPTORS
            .iter()
            .find(|d| d.spelling == spelling)
            .map(|d| d.token)
            .unwrap_or(Token::Invalid)
    }

    pub fn descriptor(self) -> &'static TokenDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn arity(self) -> Arity {
        self.descriptor().arity
    }

    pub fn precedence(self) -> u8 {
        self.descriptor().precedence
    }

    pub fn assoc(self) -> Assoc {
        self.descriptor().assoc
    }

    pub fn spelling(self) -> &'static str {
        self.descriptor().spelling
    }

    /// True for tokens that may appear in a compiled program.
    pub fn is_executable(self) -> bool {
        self.arity() != Arity::Structural
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Token::Number => f.write_str("<number>"),
            Token::Invalid => f.write_str("<invalid>"),
            other => f.write_str(other.spelling()),
        }
    }
}
