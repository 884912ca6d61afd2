use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::Config;
use crate::commands::run::{self, RunOptions, Source};
use crate::repl::{repl_loop, select_mode, ModeFlagOverride, ReplMode};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        if self.bare {
            ModeFlagOverride::Bare
        } else if self.editor {
            ModeFlagOverride::Editor
        } else {
            ModeFlagOverride::None
        }
    }
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, help: bool, mode_flag: ModeFlagOverride, config: Config) -> i32 {
    if help {
        usage_and_exit(program, 0);
    }

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(mode_flag) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    match mode {
        ReplMode::Editor => {
            // Print banners/prompts only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("Streaming Brainfuck REPL");
                eprintln!("Each line runs as soon as you press Enter; tape and open loops carry over.");
                eprintln!("Type :help for meta commands, Ctrl+d or :exit to leave.");
                let _ = io::stderr().flush();
            }

            if let Err(e) = repl_loop(&config) {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }

            0
        }
        // Bare mode: stream stdin into a single engine until EOF
        ReplMode::Bare => run::execute(
            program,
            Source::Stdin,
            &config,
            RunOptions {
                debug: false,
                skip_invalid: true,
            },
        ),
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a streaming REPL

Options:
  --help,   -h        Show this help
  --bare              Force non-interactive bare mode
  --editor            Force interactive editor mode (errors if stdin is not a TTY)

Description:
  Starts a REPL backed by one long-lived engine. Each submitted line is
  streamed into it, so the tape survives between lines and a loop opened on
  one line can be closed on a later one.

Meta commands (line starts with ":")
  :exit            Exit immediately (code 0)
  :help            Show meta command help
  :reset           Start over with a fresh tape
  :tape            Print every visited cell, the pointer cell bracketed

Notes:
    - Bytes that are not instructions are ignored.
    - Ctrl+D on an empty line or Ctrl+C exits the REPL.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: SBF_REPL_MODE=bare|editor overrides auto-detection.
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * Bare mode streams stdin through the engine once, honouring SBF_TIMEOUT_MS and SBF_MAX_STEPS.
        * Banners are suppressed if stderr is not a TTY.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
