//! Compile-time error types.

use arrayvec::ArrayString;
use core::fmt;

/// Longest offending spelling kept in an error; longer text is truncated.
pub const SPELLING_CAPACITY: usize = 16;

/// Offending source text, stored inline.
pub type Spelling = ArrayString<SPELLING_CAPACITY>;

pub(crate) fn spelling(text: &str) -> Spelling {
    let mut s = Spelling::new();
    for ch in text.chars() {
        if s.try_push(ch).is_err() {
            break;
        }
    }
    s
}

/// Tokenizer failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    /// A word that names no token.
    UnknownWord { text: Spelling, offset: usize },
    /// A symbol run matching no token in either its one- or two-character form.
    UnknownSymbol { text: Spelling, offset: usize },
    /// Literal text that does not parse as a decimal number.
    MalformedNumber { text: Spelling, offset: usize },
    /// A named unary operator written with call parentheses, e.g. `sin(0)`.
    CallSyntax { text: Spelling, offset: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnknownWord { text, offset } => {
                write!(f, "unknown word '{}' at {}", text, offset)
            }
            LexError::UnknownSymbol { text, offset } => {
                write!(f, "unknown symbol '{}' at {}", text, offset)
            }
            LexError::MalformedNumber { text, offset } => {
                write!(f, "malformed number '{}' at {}", text, offset)
            }
            LexError::CallSyntax { text, offset } => write!(
                f,
                "'{}(' at {}: operators take their operand without call parentheses",
                text, offset
            ),
        }
    }
}

/// Grammar failure found by the validator or the infix converter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxError {
    /// An operator ran out of operands at token `position`.
    StackUnderflow { position: usize },
    /// The sequence left `depth` values on the stack instead of one.
    UnbalancedResult { depth: usize },
    /// A parenthesis or invalid token in what should be postfix form.
    StructuralToken { position: usize },
    /// A `)` without `(` or a `(` never closed.
    MismatchedParen,
    /// The program needs more stack than the evaluator has.
    StackTooDeep { depth: usize, capacity: usize },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::StackUnderflow { position } => {
                write!(f, "missing operand for token {}", position)
            }
            SyntaxError::UnbalancedResult { depth } => {
                write!(f, "expression leaves {} values instead of one", depth)
            }
            SyntaxError::StructuralToken { position } => {
                write!(f, "unexpected token {} in postfix form", position)
            }
            SyntaxError::MismatchedParen => write!(f, "mismatched parentheses"),
            SyntaxError::StackTooDeep { depth, capacity } => write!(
                f,
                "expression needs stack depth {} (limit {})",
                depth, capacity
            ),
        }
    }
}

/// Any compile failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    Lex(LexError),
    Syntax(SyntaxError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "lex error: {}", e),
            CompileError::Syntax(e) => write!(f, "syntax error: {}", e),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<SyntaxError> for CompileError {
    fn from(e: SyntaxError) -> Self {
        CompileError::Syntax(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LexError {}

#[cfg(feature = "std")]
impl std::error::Error for SyntaxError {}

#[cfg(feature = "std")]
impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Lex(e) => Some(e),
            CompileError::Syntax(e) => Some(e),
        }
    }
}
