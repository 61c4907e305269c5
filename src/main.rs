use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{config::Config as EditorConfig, Editor, Helper};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

mod lang;
mod repl;

use lang::runtime::{EvalResult, Runtime};
use lang::simple::SimpleRuntime;
use repl::{fixup_input, ReplHelper};

const HISTORY_FILE: &str = ".reckon_history";
const PROMPT: &str = "(reckon) ";

#[derive(Parser)]
#[command(version, about)]
struct Opt {
    /// Show debug output
    #[arg(short, long)]
    debug: bool,
    /// Only accept `<number> <operator> <number>`, including comparison operators
    #[arg(short, long)]
    simple: bool,
    /// Evaluate EXPR and exit
    #[arg(short, long, value_name = "EXPR")]
    expr: Option<String>,
    /// Evaluate every line of FILE in a single session instead of starting a REPL
    file: Option<PathBuf>,
}

/// The two calculator flavors behind one line-oriented interface
enum Calculator<'a> {
    Session(Runtime<'a>),
    Simple(SimpleRuntime<'a>),
}

impl<'a> Calculator<'a> {
    fn eval(&mut self, line: &str) -> EvalResult {
        match self {
            Calculator::Session(runtime) => runtime.eval(line),
            Calculator::Simple(runtime) => runtime.eval(line),
        }
    }
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn init_editor() -> Result<Editor<ReplHelper, DefaultHistory>> {
    let config = EditorConfig::builder().auto_add_history(true).build();
    let mut editor = Editor::with_config(config)?;
    let validator = ReplHelper::new();
    editor.set_helper(Some(validator));

    Ok(editor)
}

fn init_history<H: Helper>(editor: &mut Editor<H, DefaultHistory>) {
    let _ = editor.load_history(HISTORY_FILE);
}

fn save_history<H: Helper>(editor: &mut Editor<H, DefaultHistory>) -> Result<()> {
    match editor.save_history(HISTORY_FILE) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to save history: {}", e),
    }
}

fn welcome(simple: bool) {
    println!(r#"reckon v{}"#, env!("CARGO_PKG_VERSION"));
    if simple {
        println!("Enter expressions as 'num_left operator num_right'");
        println!("Supported operators: +, -, *, /, <, >, <=, >=, !=, ==");
    } else {
        println!("Supported operations: +, -, *, /");
        println!("Supported functions: pow, log, sin, sqrt, abs");
        println!("Multiple expressions can be separated by ';'");
        println!("Type 'help' for help");
    }
    println!("Enter 'q' to quit");
    println!();
}

fn run_once(calc: &mut Calculator, expr: &str) -> Result<()> {
    match calc.eval(expr) {
        EvalResult::Ok | EvalResult::Quit => Ok(()),
        EvalResult::Err(e) => bail!("{}", e),
    }
}

fn run_file(calc: &mut Calculator, path: &Path) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        info!("read: {}", &line);

        match calc.eval(&line) {
            EvalResult::Ok => (),
            EvalResult::Quit => break,
            EvalResult::Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

fn run_repl(calc: &mut Calculator, simple: bool) -> Result<()> {
    let mut editor = init_editor()?;
    init_history(&mut editor);
    welcome(simple);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                info!("read: {}", &line);

                match calc.eval(&fixup_input(&line)) {
                    EvalResult::Ok => (),
                    EvalResult::Quit => break,
                    EvalResult::Err(e) => {
                        eprintln!("Error: {}", e);
                        continue;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("Press Ctrl-D or type 'q' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("quit");
                break;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                println!("quit");
                break;
            }
        }
    }

    save_history(&mut editor)?;

    Ok(())
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;

    let mut stdout = io::stdout();
    let mut calc = if opts.simple {
        Calculator::Simple(SimpleRuntime::new(&mut stdout))
    } else {
        Calculator::Session(Runtime::new(&mut stdout))
    };

    if let Some(expr) = &opts.expr {
        return run_once(&mut calc, expr);
    }

    if let Some(path) = &opts.file {
        return run_file(&mut calc, path);
    }

    run_repl(&mut calc, opts.simple)
}
