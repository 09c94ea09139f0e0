mod frontend;
mod lang;
mod residual;
mod runtime;

use std::{fs, path::PathBuf, process};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::frontend::toplevel::run_top_level;
use crate::residual::disasm::print_quotes;
use crate::runtime::interpreter::{Interpreter, MachineConfig};

#[derive(Parser, Debug)]
#[command(name = "stagelisp")]
#[command(about = "Staged interpreter for a tiny stack-based Lisp")]
struct Args {
    /// Program file to run
    file: Option<PathBuf>,

    /// Run an inline program instead of a file
    #[arg(short = 'e', long = "eval", conflicts_with = "file")]
    eval: Option<String>,

    /// After the run, print the residual program of every definition
    #[arg(long)]
    quotes: bool,

    /// Maximum operand stack size
    #[arg(long = "max-stack")]
    max_stack: Option<usize>,

    /// Maximum number of executed operations
    #[arg(long = "max-steps")]
    max_steps: Option<usize>,

    /// Maximum nesting of running quotes
    #[arg(long = "max-depth")]
    max_depth: Option<usize>,
}

impl Args {
    fn config(&self) -> MachineConfig {
        let mut config = MachineConfig::default();
        if let Some(n) = self.max_stack {
            config.max_stack_size = n;
        }
        if self.max_steps.is_some() {
            config.max_steps = self.max_steps;
        }
        if let Some(n) = self.max_depth {
            config.max_call_depth = n;
        }
        config
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args = Args::parse();

    let source = match (&args.eval, &args.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                error!("Failed to read '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        (None, None) => {
            error!("nothing to run: pass a file or -e <program>");
            process::exit(1);
        }
    };

    run_program(&source, &args);
}

fn run_program(source: &str, args: &Args) {
    let mut interp = Interpreter::with_config(args.config());
    info!(bytes = source.len(), "running program");

    let result = run_top_level(source, &mut interp, |line| println!("{}", line));

    if args.quotes {
        print_quotes(interp.symbols());
    }

    info!(leftover = interp.stack().len(), "program finished");

    if let Err(e) = result {
        error!("{}: {}", e.kind(), e);
        process::exit(1);
    }
}
