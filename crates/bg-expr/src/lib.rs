//! Expression compiler and stack VM for bytegraph.
//!
//! Turns expression text such as `t*(t>>5|t>>8)` into a postfix program
//! that is evaluated once per sample. Compilation allocates and may fail;
//! evaluation never allocates and never fails.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod inputs;
mod lexer;
mod postfix;
mod processor;
mod program;
mod shunting_yard;
mod token;
mod vm;

pub use error::{CompileError, LexError, Spelling, SyntaxError};
pub use inputs::{GlobalValues, RuntimeInputs, INPUT_CHANNELS};
pub use lexer::{tokenize, TokenStream};
pub use postfix::{validate, MAX_STACK_DEPTH};
pub use processor::ExpressionProcessor;
pub use program::{compile, CompiledProgram};
pub use shunting_yard::infix_to_postfix;
pub use token::{Arity, Assoc, Token, TokenDescriptor, DESCRIPTORS, TOKEN_COUNT};
pub use vm::{approximately_equal, Evaluator};
