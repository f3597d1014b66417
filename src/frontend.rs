//! Interactive front-ends feeding complete input buffers to a [`Console`].

use crate::config::ConsoleConfig;
use crate::console::{Console, SymbolKind, STDIN_FILENAME};
use crate::library::ForeignInterpreter;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Editor, Helper, Highlighter, Hinter};
use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::{info, warn};

pub const BANNER: &str = "new0, a modern Python 0.9.1 interactive console";
pub const EXIT_MESSAGE: &str = "Exiting new0, a modern Python 0.9.1 console.";

/// Environment variable forcing the basic console.
pub const BASIC_REPL_ENV: &str = "PYTHON_BASIC_REPL";

/// Which interactive loop drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontEnd {
    /// Line editor with multi-line input. Calls `initall` before use.
    Advanced,
    /// Blocking read-eval loop. Leaves initialization to the library.
    Basic,
}

impl FrontEnd {
    /// Choose a front-end from the `--basic` flag, `PYTHON_BASIC_REPL` and
    /// whether standard input is a terminal.
    pub fn detect(force_basic: bool) -> Self {
        let env_basic = env::var_os(BASIC_REPL_ENV).is_some_and(|value| !value.is_empty());
        if force_basic || env_basic || !io::stdin().is_terminal() {
            FrontEnd::Basic
        } else {
            FrontEnd::Advanced
        }
    }
}

/// Returns `true` while `buffer` still needs more lines.
///
/// A buffer is incomplete while brackets or a triple-quoted string are still
/// open, when the last line ends in a backslash, or when the first line opens
/// a block that has not yet been closed by a blank line. A blank line never
/// completes an open bracket or string.
pub fn is_incomplete(buffer: &str) -> bool {
    let lines: Vec<&str> = buffer.split('\n').collect();
    let last = lines.last().copied().unwrap_or_default();

    let mut scanner = LineScanner::default();
    let mut first_line_code = None;
    for line in &lines {
        let code = scanner.scan_line(line);
        first_line_code.get_or_insert(code);
    }
    if scanner.depth > 0 || scanner.quote.is_some() {
        return true;
    }
    if last.trim_end().ends_with('\\') {
        return true;
    }
    let closed_by_blank_line = lines.len() > 1 && last.trim().is_empty();
    let opens_block = first_line_code.is_some_and(|code| code.trim_end().ends_with(':'));
    opens_block && !closed_by_blank_line
}

/// Bracket depth and string state carried from one line to the next.
#[derive(Debug, Default)]
struct LineScanner {
    depth: i32,
    quote: Option<&'static str>,
}

impl LineScanner {
    /// Strip the comment from `line`, tracking brackets outside strings.
    fn scan_line<'a>(&mut self, line: &'a str) -> &'a str {
        let mut escaped = false;
        let mut skip = 0;
        for (idx, ch) in line.char_indices() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            if let Some(delim) = self.quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if line[idx..].starts_with(delim) {
                    self.quote = None;
                    skip = delim.len() - 1;
                }
                continue;
            }
            match ch {
                '\'' | '"' => {
                    let delim = opening_quote(&line[idx..]);
                    self.quote = Some(delim);
                    skip = delim.len() - 1;
                }
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth -= 1,
                '#' => return &line[..idx],
                _ => {}
            }
        }
        // Only triple-quoted strings span lines.
        if self.quote.is_some_and(|delim| delim.len() == 1) {
            self.quote = None;
        }
        line
    }
}

fn opening_quote(rest: &str) -> &'static str {
    ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|delim| rest.starts_with(delim))
        .unwrap_or("'")
}

/// A history file that does not exist yet is the normal first-run state.
fn is_missing_history(err: &ReadlineError) -> bool {
    matches!(err, ReadlineError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound)
}

#[derive(Helper, Completer, Hinter, Highlighter)]
struct BlockValidator;

impl Validator for BlockValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_incomplete(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// An interactive session: startup hook, front-end selection and the loop.
pub struct Session<I: ForeignInterpreter> {
    console: Console<I>,
    config: ConsoleConfig,
    startup_hook: Option<Box<dyn FnOnce()>>,
}

impl<I: ForeignInterpreter> Session<I> {
    pub fn new(console: Console<I>, config: ConsoleConfig) -> Self {
        Self {
            console,
            config,
            startup_hook: None,
        }
    }

    /// Register a callback run once when the session starts.
    pub fn with_startup_hook(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.startup_hook = Some(Box::new(hook));
        self
    }

    pub fn console(&self) -> &Console<I> {
        &self.console
    }

    /// Run the session on the process's terminal until end of input.
    pub fn run(&mut self, front_end: FrontEnd) -> Result<()> {
        self.start();
        match front_end {
            FrontEnd::Advanced => {
                self.console.bridge().init_all()?;
                self.run_multiline()
            }
            FrontEnd::Basic => {
                let stdin = io::stdin();
                self.interact(stdin.lock(), io::stdout())
            }
        }
    }

    /// Emit the startup audit events and run the startup hook, if any.
    /// The hook runs at most once per session.
    pub fn start(&mut self) {
        info!(target: "new0::audit", event = "run_stdin");
        if let Some(hook) = self.startup_hook.take() {
            info!(target: "new0::audit", event = "run_interactivehook");
            hook();
        }
    }

    /// Blocking read-eval loop over `input`, prompting on `output`.
    pub fn interact<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{BANNER}")?;
        let mut buffer = String::new();
        let mut lines = input.lines();
        loop {
            let prompt = if buffer.is_empty() {
                &self.config.prompt
            } else {
                &self.config.continuation_prompt
            };
            write!(output, "{prompt}")?;
            output.flush()?;

            let Some(line) = lines.next().transpose()? else {
                if !buffer.is_empty() {
                    self.submit(&buffer)?;
                }
                writeln!(output)?;
                break;
            };
            if buffer.is_empty() && line.trim().is_empty() {
                continue;
            }
            if !buffer.is_empty() {
                buffer.push('\n');
            }
            buffer.push_str(&line);
            if !is_incomplete(&buffer) {
                self.submit(&buffer)?;
                buffer.clear();
            }
        }
        writeln!(output, "{EXIT_MESSAGE}")?;
        Ok(())
    }

    fn run_multiline(&mut self) -> Result<()> {
        let mut editor = Editor::<BlockValidator, DefaultHistory>::new()?;
        editor.set_helper(Some(BlockValidator));
        let history = self.config.history_path()?;
        if let Some(path) = &history {
            if let Err(err) = editor.load_history(path) {
                if !is_missing_history(&err) {
                    warn!(path = %path.display(), %err, "could not load history");
                }
            }
        }
        loop {
            match editor.readline(&self.config.prompt) {
                Ok(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(text.as_str());
                    self.submit(&text)?;
                }
                Err(ReadlineError::Interrupted) => {
                    eprintln!("KeyboardInterrupt");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("readline error: {err}");
                    break;
                }
            }
        }
        if let Some(path) = &history {
            if let Err(err) = editor.save_history(path) {
                warn!(path = %path.display(), %err, "could not save history");
            }
        }
        Ok(())
    }

    fn submit(&self, source: &str) -> Result<()> {
        self.console
            .run_source(source, STDIN_FILENAME, SymbolKind::Single)?;
        Ok(())
    }
}
