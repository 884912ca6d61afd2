use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use stream_bf::commands::{repl, run};
use stream_bf::repl::ModeFlagOverride;
use stream_bf::{Config, logging};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [OPTIONS] "<code>"         # Stream code given as arguments (args are concatenated)
  {0} run  [OPTIONS] --file <PATH>    # Stream code from a file
  {0} run  [OPTIONS] < program.bf     # Stream code from stdin
  {0} repl [--bare|--editor]          # Start a streaming REPL

Running {0} with no subcommand starts the REPL.

Configuration is read from sbf.toml in the XDG config home, then SBF_* environment
variables, then flags. Set RUST_LOG=stream_bf=debug to trace loop recording and replay.

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "sbf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Repl(repl::ReplArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("sbf"));

    logging::init();
    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Some(Command::Run(args)) => run::run(&program, args, config),
        Some(Command::Repl(args)) => {
            let mode_flag = args.mode_flag();
            repl::run(&program, args.help, mode_flag, config)
        }
        None => repl::run(&program, false, ModeFlagOverride::None, config),
    };

    std::process::exit(code);
}
