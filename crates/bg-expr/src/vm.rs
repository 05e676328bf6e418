//! Stack machine evaluator.
//!
//! Runs on the audio thread: no allocation, no locking, no error paths.
//! Stack bounds are guaranteed by [`validate`](crate::postfix::validate)
//! when the program is compiled, so evaluation only asserts them in
//! debug builds.

use core::f64::consts::{E, FRAC_PI_2, PI, TAU};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::inputs::RuntimeInputs;
use crate::postfix::MAX_STACK_DEPTH;
use crate::program::CompiledProgram;
use crate::token::Token;

const DEFAULT_SEED: u64 = 0x6279_7465_6772_6170;

#[inline]
fn int(v: f64) -> i32 {
    v as i32
}

#[inline]
fn truth(v: bool) -> f64 {
    if v {
        1.0
    } else {
        0.0
    }
}

/// Equality within a relative epsilon, with an absolute floor near zero.
#[inline]
pub fn approximately_equal(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = libm::fabs(a - b);
    diff <= f64::MIN_POSITIVE || diff <= f64::EPSILON * libm::fabs(a).max(libm::fabs(b))
}

/// Evaluation state: the fixed value stack and the `rand` source.
///
/// One evaluator belongs to one voice; it can run any compiled program.
pub struct Evaluator {
    stack: [f64; MAX_STACK_DEPTH],
    rng: SmallRng,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Evaluator whose `rand` sequence is fixed by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            stack: [0.0; MAX_STACK_DEPTH],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Run `program` once and return its finite result.
    ///
    /// Non-finite results are clamped to zero; intermediate values are not.
    pub fn evaluate(&mut self, program: &CompiledProgram, inputs: &RuntimeInputs) -> f64 {
        if program.is_empty() {
            return 0.0;
        }
        debug_assert!(program.stack_depth() <= MAX_STACK_DEPTH);

        let stack = &mut self.stack[..program.stack_depth()];
        let literals = program.literals();
        let globals = &inputs.globals;
        let mut next_literal = 0;
        // Number of values on the stack; the top is `stack[len - 1]`.
        let mut len = 0usize;

        macro_rules! push {
            ($v:expr) => {{
                debug_assert!(len < stack.len());
                stack[len] = $v;
                len += 1;
            }};
        }
        macro_rules! unary {
            ($f:expr) => {{
                debug_assert!(len >= 1);
                stack[len - 1] = $f(stack[len - 1]);
            }};
        }
        macro_rules! binary {
            ($f:expr) => {{
                debug_assert!(len >= 2);
                len -= 1;
                stack[len - 1] = $f(stack[len - 1], stack[len]);
            }};
        }

        for &token in program.tokens() {
            match token {
                Token::Invert => unary!(|x: f64| -x),
                Token::Add => binary!(|a: f64, b: f64| a + b),
                Token::Subtract => binary!(|a: f64, b: f64| a - b),
                Token::Multiply => binary!(|a: f64, b: f64| a * b),
                Token::Divide => binary!(|a: f64, b: f64| a / b),
                Token::Modulo => binary!(libm::fmod),

                Token::BitNot => unary!(|x: f64| !int(x) as f64),
                Token::BitAnd => binary!(|a: f64, b: f64| (int(a) & int(b)) as f64),
                Token::BitOr => binary!(|a: f64, b: f64| (int(a) | int(b)) as f64),
                Token::BitXor => binary!(|a: f64, b: f64| (int(a) ^ int(b)) as f64),
                Token::ShiftLeft => {
                    binary!(|a: f64, b: f64| int(a).wrapping_shl(int(b) as u32) as f64)
                }
                Token::ShiftRight => {
                    binary!(|a: f64, b: f64| int(a).wrapping_shr(int(b) as u32) as f64)
                }

                Token::Not => unary!(|x: f64| truth(int(x) == 0)),
                Token::And => binary!(|a: f64, b: f64| truth(int(a) != 0 && int(b) != 0)),
                Token::Or => binary!(|a: f64, b: f64| truth(int(a) != 0 || int(b) != 0)),

                Token::Equal => binary!(|a: f64, b: f64| truth(approximately_equal(a, b))),
                Token::NotEqual => binary!(|a: f64, b: f64| truth(!approximately_equal(a, b))),
                Token::Less => binary!(|a: f64, b: f64| truth(a < b)),
                Token::LessOrEqual => {
                    binary!(|a: f64, b: f64| truth(a < b || approximately_equal(a, b)))
                }
                Token::Greater => binary!(|a: f64, b: f64| truth(a > b)),
                Token::GreaterOrEqual => {
                    binary!(|a: f64, b: f64| truth(a > b || approximately_equal(a, b)))
                }

                Token::Power => binary!(libm::pow),

                Token::Sqrt => unary!(libm::sqrt),
                Token::Cbrt => unary!(libm::cbrt),
                Token::Exp => unary!(libm::exp),
                Token::Exp2 => unary!(libm::exp2),
                Token::Log => unary!(libm::log),
                Token::Log2 => unary!(libm::log2),
                Token::Log10 => unary!(libm::log10),
                Token::Abs => unary!(libm::fabs),
                Token::Sin => unary!(libm::sin),
                Token::Cos => unary!(libm::cos),
                Token::Tan => unary!(libm::tan),
                Token::Asin => unary!(libm::asin),
                Token::Acos => unary!(libm::acos),
                Token::Atan => unary!(libm::atan),

                Token::Number => {
                    push!(literals[next_literal]);
                    next_literal += 1;
                }
                Token::Pi => push!(PI),
                Token::TwoPi => push!(TAU),
                Token::HalfPi => push!(FRAC_PI_2),
                Token::E => push!(E),
                Token::Random => push!(self.rng.random::<f64>()),

                Token::FreeSeconds => push!(globals.free_seconds),
                Token::FreeSamples => push!(globals.free_samples),
                Token::PositionSeconds => push!(globals.position_seconds),
                Token::PositionSamples => push!(globals.position_samples),
                Token::NoteSeconds => push!(globals.note_seconds),
                Token::NoteSamples => push!(globals.note_samples),
                Token::NotePhase => push!(globals.note_phase),
                Token::ByteTime => push!(globals.byte_time),
                Token::NoteFrequency => push!(globals.note_frequency),
                Token::SampleRate => push!(globals.sample_rate),
                Token::BeatsPerSecond => push!(globals.beats_per_second),

                Token::InputA => push!(inputs.channels[0]),
                Token::InputB => push!(inputs.channels[1]),
                Token::InputC => push!(inputs.channels[2]),
                Token::InputD => push!(inputs.channels[3]),

                // Never present in a compiled program.
                Token::LeftParen | Token::RightParen | Token::Invalid => {}
            }
        }

        debug_assert_eq!(len, 1);
        let result = stack[0];
        if result.is_finite() {
            result
        } else {
            0.0
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
