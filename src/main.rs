//! bytegraph CLI: check, evaluate and render bytebeat expressions.
//!
//! Usage:
//!   bytegraph check "t*(t>>5|t>>8)"
//!   bytegraph eval "a + b * 2" -a 1 -b 3
//!   bytegraph render "t*(t>>5|t>>8)" --out beat.wav --seconds 30
//!   bytegraph render --patch stereo.toml --out stereo.wav

use anyhow::{bail, Context, Result};
use bg_expr::{compile, Evaluator, GlobalValues, RuntimeInputs};
use bg_master::Controller;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[cfg(all(feature = "alloc_check", debug_assertions))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

#[derive(Parser)]
#[command(name = "bytegraph", version, about = "Bytebeat expression compiler and renderer")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile an expression and print its postfix program
    Check {
        expression: String,
    },
    /// Evaluate an expression once
    Eval(EvalArgs),
    /// Render an expression or patch to a WAV file
    Render(RenderArgs),
}

#[derive(Args)]
struct EvalArgs {
    expression: String,
    #[arg(short = 'a', default_value_t = 0.0, allow_negative_numbers = true)]
    a: f64,
    #[arg(short = 'b', default_value_t = 0.0, allow_negative_numbers = true)]
    b: f64,
    #[arg(short = 'c', default_value_t = 0.0, allow_negative_numbers = true)]
    c: f64,
    #[arg(short = 'd', default_value_t = 0.0, allow_negative_numbers = true)]
    d: f64,
    /// Bytebeat time `t`
    #[arg(long = "t", default_value_t = 0.0)]
    t: f64,
    /// Note frequency `nf`
    #[arg(long, default_value_t = 0.0)]
    nf: f64,
    #[arg(long, default_value_t = 44100.0)]
    sample_rate: f64,
}

#[derive(Args)]
struct RenderArgs {
    /// Expression to render through a mono output
    #[arg(required_unless_present = "patch", conflicts_with = "patch")]
    expression: Option<String>,
    /// Patch file (TOML) to render instead of a single expression
    #[arg(long)]
    patch: Option<PathBuf>,
    #[arg(short, long)]
    out: PathBuf,
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,
    /// Start a note at this frequency before rendering
    #[arg(long)]
    note: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Check { expression } => check(&expression),
        Command::Eval(args) => eval(&args),
        Command::Render(args) => render(&args),
    }
}

fn check(expression: &str) -> Result<()> {
    let program = compile(expression)?;
    println!("postfix: {}", program);
    println!("depth:   {}", program.stack_depth());
    Ok(())
}

fn eval(args: &EvalArgs) -> Result<()> {
    let program = compile(&args.expression)?;
    let inputs = RuntimeInputs::new(
        [args.a, args.b, args.c, args.d],
        GlobalValues {
            byte_time: args.t,
            note_frequency: args.nf,
            sample_rate: args.sample_rate,
            ..GlobalValues::default()
        },
    );
    let value = Evaluator::new().evaluate(&program, &inputs);
    println!("{}", value);
    Ok(())
}

fn render(args: &RenderArgs) -> Result<()> {
    let mut ctrl = match (&args.expression, &args.patch) {
        (_, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut ctrl = Controller::new(args.sample_rate);
            ctrl.load_patch(&text)
                .with_context(|| format!("failed to load {}", path.display()))?;
            ctrl
        }
        (Some(expression), None) => Controller::from_expression(expression, args.sample_rate)?,
        (None, None) => bail!("nothing to render: give an expression or --patch"),
    };

    let invalid: Vec<_> = ctrl
        .patch()
        .expressions()
        .filter(|(id, _)| !ctrl.is_valid(*id))
        .map(|(id, text)| (id, text.to_owned()))
        .collect();
    for (id, text) in &invalid {
        if let Some(e) = ctrl.compile_error(*id) {
            eprintln!("node {}: '{}': {}", id, text, e);
        }
    }
    if !invalid.is_empty() {
        bail!("{} expression(s) failed to compile", invalid.len());
    }

    if let Some(frequency) = args.note {
        ctrl.start_note(frequency);
    }

    println!(
        "Rendering {:.1}s to {} at {} Hz...",
        args.seconds,
        args.out.display(),
        args.sample_rate
    );
    let wav = ctrl.render_to_wav(args.seconds)?;
    fs::write(&args.out, &wav)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Rendered {} bytes", wav.len());
    Ok(())
}
