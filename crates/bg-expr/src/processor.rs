//! Single-owner compile/evaluate pair.

use crate::inputs::RuntimeInputs;
use crate::program::{compile, CompiledProgram};
use crate::vm::Evaluator;

/// Holds the last successfully compiled program and evaluates it.
///
/// A failed [`update`](Self::update) keeps the previous program running and
/// only clears the validity flag. For cross-thread use the program is
/// compiled separately and handed to the audio thread instead.
pub struct ExpressionProcessor {
    program: CompiledProgram,
    evaluator: Evaluator,
    valid: bool,
}

impl ExpressionProcessor {
    pub fn new() -> Self {
        Self {
            program: CompiledProgram::empty(),
            evaluator: Evaluator::new(),
            valid: true,
        }
    }

    /// Compile `text` and install it on success.
    pub fn update(&mut self, text: &str) -> bool {
        match compile(text) {
            Ok(program) => {
                log::debug!("compiled '{}' -> [{}]", text, program);
                self.program = program;
                self.valid = true;
            }
            Err(e) => {
                log::debug!("rejected '{}': {}", text, e);
                self.valid = false;
            }
        }
        self.valid
    }

    /// Evaluate the installed program for one sample.
    pub fn process(&mut self, inputs: &RuntimeInputs) -> f64 {
        self.evaluator.evaluate(&self.program, inputs)
    }

    /// Whether the most recent `update` succeeded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }
}

impl Default for ExpressionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_update_keeps_previous_program() {
        let mut p = ExpressionProcessor::new();
        assert!(p.update("(1+2)*3"));
        assert_eq!(p.process(&RuntimeInputs::default()), 9.0);

        assert!(!p.update("1+2) * 3"));
        assert!(!p.is_valid());
        assert_eq!(p.process(&RuntimeInputs::default()), 9.0);
        assert_eq!(p.program().source(), "(1+2)*3");

        assert!(p.update("a+b"));
        assert!(p.is_valid());
        assert_eq!(p.process(&RuntimeInputs::from_channels([3.0, 4.0, 0.0, 0.0])), 7.0);
    }

    #[test]
    fn starts_silent() {
        let mut p = ExpressionProcessor::new();
        assert_eq!(p.process(&RuntimeInputs::default()), 0.0);
        assert!(p.update(""));
        assert_eq!(p.process(&RuntimeInputs::default()), 0.0);
    }
}
