//! Allocation-free render path tests.
//!
//! These tests verify that evaluation and `RenderSequence::render_frame()`
//! do not allocate, including while new programs are being swapped in.
//!
//! Just run `cargo test`; no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use bg_engine::{Frame, Patch, RenderSequence, TransportSnapshot};
use bg_expr::{compile, Evaluator, GlobalValues, RuntimeInputs};

const EXPRESSIONS: &[&str] = &[
    "t*(t>>5|t>>8)",
    "t*(t>>11&t>>8&123&t>>3)",
    "sin (twoPi * n / 256) * 127 + 128",
    "rand * 255",
    "(a + b) * c - d / 2 % 7 ** 2",
    "t 8 >> t * 255 &",
];

fn build(patch: &Patch, sample_rate: f64) -> RenderSequence {
    let (sequence, mut handles) = RenderSequence::build(patch, sample_rate).unwrap();
    for handle in &mut handles {
        let text = patch.expression(handle.node).unwrap();
        handle.publisher.publish(compile(text).unwrap()).unwrap();
    }
    sequence
}

#[test]
fn evaluate_alloc_free() {
    let programs: Vec<_> = EXPRESSIONS.iter().map(|e| compile(e).unwrap()).collect();
    let mut evaluator = Evaluator::new();
    let mut inputs = RuntimeInputs::new(
        [1.0, 2.0, 3.0, 4.0],
        GlobalValues {
            sample_rate: 44100.0,
            ..GlobalValues::default()
        },
    );

    assert_no_alloc(|| {
        for t in 0..44100 {
            inputs.globals.byte_time = t as f64;
            inputs.globals.note_phase = (t % 256) as f64;
            for program in &programs {
                evaluator.evaluate(program, &inputs);
            }
        }
    });
}

#[test]
fn stereo_patch_alloc_free() {
    let mut patch = Patch::new();
    let left = patch.add_expression(EXPRESSIONS[0]);
    let right = patch.add_expression(EXPRESSIONS[1]);
    let mix = patch.add_expression("a / 2 + b / 2");
    let out = patch.add_output(true);
    patch.connect(left, out, 0);
    patch.connect(right, out, 1);
    patch.connect(left, mix, 0);
    patch.connect(right, mix, 1);
    patch.connect(mix, out, 0);

    let mut sequence = build(&patch, 44100.0);
    sequence.sync(&TransportSnapshot {
        playing: true,
        beats_per_second: 2.0,
        ..TransportSnapshot::default()
    });
    sequence.start_note(220.0);

    let mut block = [Frame::silence(); 512];
    assert_no_alloc(|| {
        for _ in 0..(44100 * 5 / 512) {
            sequence.render_block(&mut block);
        }
    });
}

#[test]
fn program_swaps_alloc_free() {
    let patch = Patch::single_expression(EXPRESSIONS[0]);
    let (mut sequence, mut handles) = RenderSequence::build(&patch, 44100.0).unwrap();
    let publisher = &mut handles[0].publisher;

    for round in 0..50 {
        // Compiling and publishing allocate; they happen on the control side.
        let text = EXPRESSIONS[round % EXPRESSIONS.len()];
        publisher.publish(compile(text).unwrap()).unwrap();

        assert_no_alloc(|| {
            for _ in 0..1000 {
                sequence.render_frame();
            }
        });
    }
    publisher.reclaim();
}
