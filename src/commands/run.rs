use clap::Args;
use std::io::{self, Cursor, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use std::{fs, thread};

use crate::cli_util::print_drive_error;
use crate::{Config, DriveError, Driver, EngineError, OnInvalid, Render, StepControl, Trace};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of executed instructions instead of output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Stream the program from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated program parts (stdin is streamed when omitted)
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// How `.` renders the tape (fallback SBF_FORMAT; default char)
    #[arg(long = "format", value_enum)]
    pub format: Option<Render>,

    /// Wall-clock timeout in milliseconds (fallback SBF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback SBF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Drop bytes that are not instructions instead of aborting
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,

    /// Treat unmatched ']' and unclosed '[' as errors
    #[arg(long = "strict")]
    pub strict: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Where the program bytes come from.
#[derive(Debug)]
pub enum Source {
    /// Program text already in memory (arguments or a file).
    Code(Vec<u8>),
    /// Streamed from stdin, never buffered whole.
    Stdin,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub debug: bool,
    pub skip_invalid: bool,
}

pub fn run(program: &str, args: RunArgs, mut config: Config) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        code,
        format,
        timeout_ms,
        max_steps,
        skip_invalid,
        strict,
        ..
    } = args;

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let source = if let Some(path) = file {
        match fs::read(&path) {
            Ok(bytes) => Source::Code(bytes),
            Err(e) => {
                eprintln!("{program}: failed to read code file: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else if !code.is_empty() {
        Source::Code(code.join("").into_bytes())
    } else if io::stdin().is_terminal() {
        usage_and_exit(program, 2);
    } else {
        Source::Stdin
    };

    // Resolve settings: flags -> env/file (already in config)
    if let Some(format) = format {
        config.output.format = format;
    }
    if let Some(ms) = timeout_ms {
        config.engine.timeout_ms = ms;
    }
    if max_steps.is_some() {
        config.engine.max_steps = max_steps;
    }
    if strict {
        config.engine.strict_loops = true;
    }
    if let Err(e) = config.validate() {
        eprintln!("{program}: {e}");
        let _ = io::stderr().flush();
        return 2;
    }

    execute(program, source, &config, RunOptions { debug, skip_invalid })
}

/// Drive `source` through a fresh engine on a worker thread, enforcing the
/// configured wall-clock timeout. Returns the process exit code.
pub fn execute(program: &str, source: Source, config: &Config, options: RunOptions) -> i32 {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Result<(), DriveError>>();
    let timeout_ms = config.engine.timeout_ms;

    let code = match &source {
        Source::Code(bytes) => Some(bytes.clone()),
        Source::Stdin => None,
    };

    let mut engine = config.build_engine();
    engine.set_step_control(StepControl::new(config.engine.max_steps, cancel.clone()));
    if options.debug {
        println!("{DEBUG_HEADER}");
        engine.set_output_sink(|_| {});
        engine.set_observer(|t: &Trace| println!("{}", trace_row(t)));
    }

    let mut driver = Driver::new(engine);
    if options.skip_invalid {
        driver.set_on_invalid(OnInvalid::Skip);
    }

    thread::spawn(move || {
        let res = match source {
            Source::Code(bytes) => driver.run(Cursor::new(bytes)),
            Source::Stdin => driver.run(io::stdin().lock()),
        };
        let _ = tx.send(res);
    });

    let timeout = Duration::from_millis(timeout_ms);
    let exit_code = match rx.recv_timeout(timeout) {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => match err.engine_error() {
            Some(EngineError::StepLimitExceeded { limit }) => {
                eprintln!("Execution aborted: step limit exceeded ({limit})");
                1
            }
            Some(EngineError::Canceled) => {
                eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
                1
            }
            _ => {
                print_drive_error(Some(program), code.as_deref(), &err);
                1
            }
        },
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    let _ = io::stderr().flush();
    let _ = io::stdout().flush();
    exit_code
}

const DEBUG_HEADER: &str = "STEP | DEPTH | PTR | CELL | INSTR | ACTION\n\
-----+-------+-----+------+-------+------------------------------------------------";

/// One row of the `--debug` table.
pub fn trace_row(t: &Trace) -> String {
    let action = match t.instruction {
        b'+' => format!("Increment cell[{}] from {} to {}", t.pointer_before, t.cell_before, t.cell),
        b'-' => format!("Decrement cell[{}] from {} to {}", t.pointer_before, t.cell_before, t.cell),
        b'<' | b'>' => format!("Moved pointer head to index {}", t.pointer),
        b'.' => format!("Output cell[{}] = {} (suppressed in debug)", t.pointer, t.cell),
        _ => String::new(),
    };
    let action = if t.replay { format!("(replay) {action}") } else { action };

    format!(
        "{:<4} | {:<5} | {:<3} | {:<4} |  {}    | {}",
        t.step, t.depth, t.pointer_before, t.cell_before, t.instruction as char, action
    )
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>
  {0} run [OPTIONS] < program.bf

Options:
  --file,  -f <PATH>  Stream the program from PATH instead of positional "<code>"
  --format <FMT>      How '.' renders output: char, decimal or tape
  --timeout <MS>      Wall-clock timeout (fallback SBF_TIMEOUT_MS; default 2000)
  --max-steps <N>     Step limit (fallback SBF_MAX_STEPS; default unlimited)
  --skip-invalid      Drop bytes that are not instructions instead of aborting
  --strict            Treat unmatched ']' and unclosed '[' as errors
  --debug, -d         Print a step-by-step table of operations instead of output
  --help,  -h         Show this help

Notes:
- Instructions are + - < > [ ] . ; newline and space are ignored.
- Every '.' prints one line, in execution order.
- The program is consumed one byte at a time; loops are replayed from a
  recording of their body, never by re-reading the source.

Examples:
- Run a file:
    {0} run --file ./program.bf
- Stream a program from another process:
    cat program.bf | {0} run --skip-invalid
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
