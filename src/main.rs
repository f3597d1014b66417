//! new0 entry point: run a snippet or start an interactive console.

use anyhow::Result;
use clap::Parser;
use new0::config::ConsoleConfig;
use new0::frontend::{FrontEnd, Session};
use new0::protocol::DEFAULT_FILENAME;
use new0::{run_code_string, Console};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "new0", version, about = "A modern Python 0.9.1 interactive console")]
struct Args {
    /// Interpreter shared library (overrides PYTHON0_LIB).
    #[arg(long, value_name = "PATH")]
    lib: Option<PathBuf>,

    /// Use the basic read-eval loop instead of the line editor.
    #[arg(long)]
    basic: bool,

    /// Run CODE and exit.
    #[arg(short = 'c', value_name = "CODE")]
    command: Option<String>,

    /// Print the interpreter's grammar table summary and exit.
    #[arg(long)]
    dump_grammar: bool,

    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<()> {
    new0::logging::init(args.verbose);
    let config = ConsoleConfig::load()?;
    // SAFETY: the library named by the user is trusted to be a Python 0.9.1
    // interpreter built with the layout mirrored in `new0::abi`.
    let console = unsafe { Console::open(args.lib.as_deref(), config.library.as_deref())? };

    if args.dump_grammar {
        let grammar = console.bridge().interpreter().grammar()?;
        println!(
            "grammar: {} dfas, start symbol {}",
            grammar.dfa_count(),
            grammar.start_symbol()
        );
        return Ok(());
    }

    if let Some(code) = args.command {
        run_code_string(console.bridge(), &code, DEFAULT_FILENAME)?;
        return Ok(());
    }

    let front_end = FrontEnd::detect(args.basic);
    Session::new(console, config).run(front_end)
}

fn main() {
    if let Err(error) = run(Args::parse()) {
        eprintln!("new0 error: {error:?}");
        std::process::exit(1);
    }
}
