//! Compiled programs and the compile pipeline.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::CompileError;
use crate::lexer::tokenize;
use crate::postfix::validate;
use crate::shunting_yard::infix_to_postfix;
use crate::token::Token;

/// A validated postfix program, ready for repeated evaluation.
///
/// Running `tokens` from an empty stack never underflows, never exceeds
/// `stack_depth`, and leaves exactly one value. An empty program has no
/// tokens and evaluates to zero.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledProgram {
    source: String,
    tokens: Box<[Token]>,
    literals: Box<[f64]>,
    stack_depth: usize,
}

impl CompiledProgram {
    /// The program that produces silence.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            tokens: Box::new([]),
            literals: Box::new([]),
            stack_depth: 0,
        }
    }

    /// The expression text this program was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Postfix token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Literal values in the order `Token::Number` consumes them.
    pub fn literals(&self) -> &[f64] {
        &self.literals
    }

    /// Stack capacity the program needs.
    pub fn stack_depth(&self) -> usize {
        self.stack_depth
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when evaluation reads the random source.
    pub fn uses_random(&self) -> bool {
        self.tokens.contains(&Token::Random)
    }
}

impl Default for CompiledProgram {
    fn default() -> Self {
        Self::empty()
    }
}

/// Renders the postfix form, with literals in place of `Token::Number`.
impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut literals = self.literals.iter();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if *token == Token::Number {
                write!(f, "{}", literals.next().copied().unwrap_or(0.0))?;
            } else {
                write!(f, "{}", token)?;
            }
        }
        Ok(())
    }
}

/// Compile expression text.
///
/// The token sequence is first tried as postfix; only if that fails is it
/// converted from infix and validated again. Empty text yields the empty
/// program.
pub fn compile(text: &str) -> Result<CompiledProgram, CompileError> {
    let stream = tokenize(text)?;
    if stream.is_empty() {
        return Ok(CompiledProgram {
            source: String::from(text),
            ..CompiledProgram::empty()
        });
    }

    let (tokens, stack_depth) = match validate(&stream.tokens) {
        Ok(depth) => (stream.tokens, depth),
        Err(_) => {
            let postfix: Vec<Token> = infix_to_postfix(&stream.tokens)?;
            let depth = validate(&postfix)?;
            (postfix, depth)
        }
    };

    Ok(CompiledProgram {
        source: String::from(text),
        tokens: tokens.into_boxed_slice(),
        literals: stream.literals.into_boxed_slice(),
        stack_depth,
    })
}
