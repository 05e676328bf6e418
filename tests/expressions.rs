//! Integration test: compile expressions → evaluate → check values.

use bg_expr::{
    compile, validate, CompileError, Evaluator, ExpressionProcessor, GlobalValues, LexError,
    RuntimeInputs,
};

fn eval(text: &str) -> f64 {
    eval_with(text, RuntimeInputs::default())
}

fn eval_with(text: &str, inputs: RuntimeInputs) -> f64 {
    let program = compile(text).unwrap();
    Evaluator::new().evaluate(&program, &inputs)
}

fn at_time(t: f64) -> RuntimeInputs {
    RuntimeInputs::new(
        [0.0; 4],
        GlobalValues {
            byte_time: t,
            sample_rate: 8000.0,
            ..GlobalValues::default()
        },
    )
}

// --- Scenarios ---

#[test]
fn precedence() {
    assert_eq!(eval("2+3*4"), 14.0);
    assert_eq!(eval("(1+2)*3"), 9.0);
}

#[test]
fn division_by_zero_is_silent() {
    assert_eq!(eval("1/0"), 0.0);
}

#[test]
fn input_channels() {
    let inputs = RuntimeInputs::from_channels([3.0, 4.0, 0.0, 0.0]);
    assert_eq!(eval_with("a+b", inputs), 7.0);
}

#[test]
fn call_syntax_is_rejected_but_prefix_form_works() {
    assert!(matches!(
        compile("sin(0)"),
        Err(CompileError::Lex(LexError::CallSyntax { .. }))
    ));
    assert!(eval("sin pi").abs() < 1e-12);
}

#[test]
fn empty_text_is_silence() {
    let program = compile("").unwrap();
    assert!(program.is_empty());
    assert_eq!(Evaluator::new().evaluate(&program, &RuntimeInputs::default()), 0.0);
}

#[test]
fn failed_update_keeps_previous_program() {
    let mut processor = ExpressionProcessor::new();
    assert!(processor.update("(1+2)*3"));
    assert!(!processor.update("1+2) * 3"));
    assert!(!processor.is_valid());
    assert_eq!(processor.process(&RuntimeInputs::default()), 9.0);

    assert!(processor.update("2+3*4"));
    assert!(processor.is_valid());
    assert_eq!(processor.process(&RuntimeInputs::default()), 14.0);
}

#[test]
fn postfix_text_compiles_directly() {
    assert_eq!(eval("2 3 4 * +"), 14.0);
}

// --- Properties ---

#[test]
fn compiled_programs_revalidate_to_same_depth() {
    for text in ["t*(t>>5|t>>8)", "a + b * c - d", "sin (twoPi * n / 256)", "2 3 +"] {
        let program = compile(text).unwrap();
        assert_eq!(validate(program.tokens()), Ok(program.stack_depth()), "{}", text);
    }
}

#[test]
fn compiling_twice_is_idempotent() {
    let text = "t*(t>>11&t>>8&123&t>>3)";
    let first = compile(text).unwrap();
    let second = compile(text).unwrap();
    assert_eq!(first, second);

    let mut evaluator = Evaluator::new();
    for t in 0..1000 {
        let inputs = at_time(t as f64);
        assert_eq!(
            evaluator.evaluate(&first, &inputs).to_bits(),
            evaluator.evaluate(&second, &inputs).to_bits()
        );
    }
}

#[test]
fn output_is_always_finite() {
    for text in ["0/0", "log 0", "sqrt (0 - 1)", "10 ** 400", "tan halfPi / 0", "a / b"] {
        let Ok(program) = compile(text) else {
            continue;
        };
        let value = Evaluator::new().evaluate(&program, &RuntimeInputs::default());
        assert!(value.is_finite(), "{} gave {}", text, value);
    }
}

#[test]
fn classic_bytebeat_stays_in_byte_range() {
    let program = compile("t*(t>>5|t>>8) & 255").unwrap();
    let mut evaluator = Evaluator::new();
    for t in 0..20_000 {
        let value = evaluator.evaluate(&program, &at_time(t as f64));
        assert!((0.0..=255.0).contains(&value), "t={} gave {}", t, value);
    }
}

#[test]
fn random_is_seeded_per_evaluator() {
    let program = compile("rand").unwrap();
    let inputs = RuntimeInputs::default();
    let mut a = Evaluator::with_seed(7);
    let mut b = Evaluator::with_seed(7);
    for _ in 0..100 {
        let x = a.evaluate(&program, &inputs);
        assert!((0.0..1.0).contains(&x));
        assert_eq!(x, b.evaluate(&program, &inputs));
    }
}
