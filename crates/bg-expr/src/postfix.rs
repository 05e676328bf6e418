//! Postfix validation by stack-depth simulation.

use crate::error::SyntaxError;
use crate::token::Token;

/// Largest stack depth a compiled program may require.
pub const MAX_STACK_DEPTH: usize = 128;

/// Check that `tokens` is a well-formed postfix program.
///
/// Returns the maximum stack depth reached, which is the capacity the
/// evaluator needs. The depth never drops below one after the first token
/// and ends at exactly one.
pub fn validate(tokens: &[Token]) -> Result<usize, SyntaxError> {
    let mut depth: i32 = 0;
    let mut max_depth: i32 = 0;

    for (position, token) in tokens.iter().enumerate() {
        let effect = token
            .arity()
            .stack_effect()
            .ok_or(SyntaxError::StructuralToken { position })?;

        depth += effect;
        if depth < 1 {
            return Err(SyntaxError::StackUnderflow { position });
        }
        max_depth = max_depth.max(depth);
    }

    if depth != 1 {
        return Err(SyntaxError::UnbalancedResult {
            depth: depth as usize,
        });
    }

    let required = max_depth as usize;
    if required > MAX_STACK_DEPTH {
        return Err(SyntaxError::StackTooDeep {
            depth: required,
            capacity: MAX_STACK_DEPTH,
        });
    }
    Ok(required)
}
