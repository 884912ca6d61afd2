//! Streaming REPL.
//!
//! Every submitted line is pushed into one long-lived engine, so the tape and
//! even open loops carry over between submissions: a `[` typed on one line
//! can be closed on a later one.

use std::env;
use std::io::{self, Cursor, IsTerminal, Write};

use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, HistoryItem, Signal, StyledText};

use crate::cli_util::print_drive_error;
use crate::render::tape_view;
use crate::theme::Palette;
use crate::{Config, DriveError, Driver, Engine, EngineError, OnInvalid, StepControl, classify};

/// Lines starting with `:` are meta commands rather than code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Help,
    Reset,
    Tape,
    Unknown(String),
}

impl MetaCommand {
    /// Parse the text after the leading `:`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "exit" | "quit" | "q" => MetaCommand::Exit,
            "help" | "h" => MetaCommand::Help,
            "reset" => MetaCommand::Reset,
            "tape" => MetaCommand::Tape,
            other => MetaCommand::Unknown(other.to_string()),
        }
    }
}

/// A persistent engine plus the bookkeeping needed to report errors relative
/// to the submission that caused them.
pub struct Session {
    driver: Driver,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        let mut engine = config.build_engine();
        if config.engine.max_steps.is_some() {
            engine.set_step_control(StepControl::new(config.engine.max_steps, Default::default()));
        }
        Self::from_engine(engine)
    }

    /// Wrap an existing engine. Bytes that are not instructions are skipped,
    /// so prose around code is harmless.
    pub fn from_engine(engine: Engine) -> Self {
        let mut driver = Driver::new(engine);
        driver.set_on_invalid(OnInvalid::Skip);
        Self { driver }
    }

    /// Stream one submission into the engine and resolve a trailing loop so
    /// its output shows up now rather than on the next submission.
    ///
    /// Error offsets are relative to `code`. A step-limit abort leaves the
    /// engine in the middle of a loop, so the session is reset.
    pub fn submit(&mut self, code: &str) -> Result<(), DriveError> {
        let start = self.driver.offset();
        let mut result = self.driver.feed(Cursor::new(code.as_bytes()));
        if result.is_ok() {
            let offset = self.driver.offset();
            result = self
                .driver
                .engine_mut()
                .flush()
                .map_err(|source| DriveError::Engine { offset, source });
        }

        let Err(err) = result else {
            return Ok(());
        };
        if matches!(
            err.engine_error(),
            Some(EngineError::StepLimitExceeded { .. } | EngineError::Canceled)
        ) {
            self.reset();
        }
        Err(rebase(err, start))
    }

    pub fn reset(&mut self) {
        self.driver.engine_mut().reset();
    }

    /// Number of loops left open by previous submissions.
    pub fn depth(&self) -> usize {
        self.driver.engine().depth()
    }

    pub fn tape(&self) -> String {
        tape_view(self.driver.engine().tape())
    }
}

fn rebase(err: DriveError, start: usize) -> DriveError {
    match err {
        DriveError::Engine { offset, source } => DriveError::Engine {
            offset: offset.saturating_sub(start),
            source,
        },
        DriveError::Io { offset, source } => DriveError::Io {
            offset: offset.saturating_sub(start),
            source,
        },
    }
}

pub fn repl_loop(config: &Config) -> io::Result<()> {
    let mut editor = init_line_editor()?;
    let mut session = Session::new(config);

    loop {
        let Some(submission) = read_submission_interactive(&mut editor, session.depth())? else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        let trimmed = submission.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(meta) = trimmed.strip_prefix(':') {
            match MetaCommand::parse(meta) {
                MetaCommand::Exit => return Ok(()),
                MetaCommand::Help => print_meta_help(),
                MetaCommand::Reset => {
                    session.reset();
                    eprintln!("(engine reset)");
                }
                MetaCommand::Tape => println!("{}", session.tape()),
                MetaCommand::Unknown(cmd) => eprintln!("unknown command ':{cmd}' (try :help)"),
            }
            io::stdout().flush()?;
            continue;
        }

        if let Err(err) = session.submit(&submission) {
            eprint!("{}", Palette::error().paint("error: "));
            print_drive_error(None, Some(submission.as_bytes()), &err);
        }
        io::stdout().flush()?;
    }
}

fn print_meta_help() {
    eprintln!(
        r#"Meta commands:
  :exit    Leave the REPL
  :help    Show this help
  :reset   Start over with a fresh tape
  :tape    Print every visited cell, the pointer cell bracketed"#
    );
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{default_emacs_keybindings, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent};

    // Enter submits the line straight into the running engine.
    // Alt+Up/Alt+Down or Ctrl+Up/Ctrl+Down navigate history items.
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(StreamHighlighter))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

fn read_submission_interactive(
    editor: &mut reedline::Reedline,
    depth: usize,
) -> io::Result<Option<String>> {
    // Open loops show in the prompt: sbf[2]
    let label = if depth == 0 { "sbf".to_string() } else { format!("sbf[{depth}]") };
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic(label), DefaultPromptSegment::Empty);

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) => Ok(None),
        Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// Flags -> `SBF_REPL_MODE` -> auto-detect from stdin.
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    select_mode_with(flag, env::var("SBF_REPL_MODE").ok(), io::stdin().is_terminal())
}

fn select_mode_with(
    flag: ModeFlagOverride,
    env_mode: Option<String>,
    stdin_is_tty: bool,
) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !stdin_is_tty {
                return Err("cannot start editor: stdin is not a TTY (use --bare or SBF_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" if stdin_is_tty => Ok(ReplMode::Editor),
            "editor" => Err("cannot start editor: stdin is not a TTY (use SBF_REPL_MODE=bare)".to_string()),
            _ => Err(format!("invalid SBF_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if stdin_is_tty { Ok(ReplMode::Editor) } else { Ok(ReplMode::Bare) }
}

/// Colours each byte by the category the engine would give it.
struct StreamHighlighter;

impl Highlighter for StreamHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        let mut current = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let category = u8::try_from(ch).ok().and_then(|b| classify(b).ok());
            let style = Palette::style(category);

            match current {
                Some(s) if s == style => buffer.push(ch),
                Some(s) => {
                    out.push((s, std::mem::take(&mut buffer)));
                    current = Some(style);
                    buffer.push(ch);
                }
                None => {
                    current = Some(style);
                    buffer.push(ch);
                }
            }
        }

        if let Some(s) = current {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Render;
    use std::sync::{Arc, Mutex};

    fn session() -> (Session, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let mut engine = Engine::new();
        engine.set_render(Render::Decimal);
        engine.set_output_sink(move |line| sink.lock().unwrap().push(line.to_string()));
        (Session::from_engine(engine), lines)
    }

    #[test]
    fn tape_persists_across_submissions() {
        let (mut s, lines) = session();
        s.submit("+++").unwrap();
        s.submit(">++<.").unwrap();
        assert_eq!(lines.lock().unwrap().as_slice(), ["3"]);
        assert_eq!(s.tape(), "[3] 2");
    }

    #[test]
    fn a_loop_can_span_submissions() {
        let (mut s, lines) = session();
        s.submit("+++[").unwrap();
        assert_eq!(s.depth(), 1);
        s.submit(".-]").unwrap();
        assert_eq!(s.depth(), 0);
        assert_eq!(lines.lock().unwrap().as_slice(), ["3", "2", "1"]);
    }

    #[test]
    fn comments_are_skipped() {
        let (mut s, lines) = session();
        s.submit("two: ++ print: .").unwrap();
        assert_eq!(lines.lock().unwrap().as_slice(), ["2"]);
    }

    #[test]
    fn errors_are_relative_to_the_submission() {
        let mut engine = Engine::new();
        engine.set_strict_loops(true);
        let mut s = Session::from_engine(engine);
        s.submit("++++").unwrap();
        let err = s.submit("+]").unwrap_err();
        assert_eq!(err.offset(), 1);
    }

    #[test]
    fn step_limit_resets_the_session() {
        let mut engine = Engine::new();
        engine.set_step_control(StepControl::new(Some(20), Default::default()));
        let mut s = Session::from_engine(engine);
        let err = s.submit("+[]").unwrap_err();
        assert!(matches!(err.engine_error(), Some(EngineError::StepLimitExceeded { limit: 20 })));
        assert_eq!(s.depth(), 0);
        assert_eq!(s.tape(), "[0]");
    }

    #[test]
    fn parses_meta_commands() {
        assert_eq!(MetaCommand::parse("exit"), MetaCommand::Exit);
        assert_eq!(MetaCommand::parse(" tape "), MetaCommand::Tape);
        assert_eq!(MetaCommand::parse("reset"), MetaCommand::Reset);
        assert_eq!(MetaCommand::parse("nope"), MetaCommand::Unknown("nope".to_string()));
    }

    #[test]
    fn mode_flags_beat_env_and_tty() {
        assert_eq!(
            select_mode_with(ModeFlagOverride::Bare, Some("editor".into()), true),
            Ok(ReplMode::Bare)
        );
        assert!(select_mode_with(ModeFlagOverride::Editor, None, false).is_err());
    }

    #[test]
    fn mode_env_and_auto_detect() {
        assert_eq!(
            select_mode_with(ModeFlagOverride::None, Some("BARE".into()), true),
            Ok(ReplMode::Bare)
        );
        assert!(select_mode_with(ModeFlagOverride::None, Some("fancy".into()), true).is_err());
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, true), Ok(ReplMode::Editor));
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, false), Ok(ReplMode::Bare));
    }
}
