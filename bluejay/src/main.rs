use bluejay_interpreter::Interpreter;
use bluejay_parser::parse_program_with_source;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, MietteHandlerOpts, NamedSource, Report, Result};
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;

mod repl;
mod sexpr;

use repl::{Repl, ReplConfig};

#[derive(Parser)]
#[command(
    name = "bluejay",
    version,
    about = "Interpreter for the BlueJay scripting language",
    long_about = "BlueJay is a small dynamically typed imperative language with blocks, loops and lexically scoped variables."
)]
struct Cli {
    /// Log filter directive (e.g. `debug`, `bluejay_interpreter=trace`); overrides RUST_LOG
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a BlueJay program
    Run {
        /// BlueJay source file to run (use '-' to read from stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse BlueJay source files and display their syntax tree
    Parse {
        /// BlueJay source files to parse (use '-' to read from stdin)
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Show the full tree with span information
        #[arg(short, long)]
        spans: bool,
    },

    /// Start an interactive session
    Repl {
        /// Neither load nor save line history
        #[arg(long)]
        no_history: bool,

        /// Where to keep line history
        #[arg(long, value_name = "PATH")]
        history_file: Option<PathBuf>,
    },
}

fn main() {
    setup_miette_handler();

    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Some(Commands::Run { file }) => run_file(&file),
        Some(Commands::Parse { files, spans }) => handle_parse_command(files, spans),
        Some(Commands::Repl {
            no_history,
            history_file,
        }) => start_repl(no_history, history_file),
        None => {
            // No subcommand provided, show help
            Cli::parse_from(["bluejay", "--help"]);
            Ok(())
        }
    };

    if let Err(report) = result {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

/// Configure miette for graphical error reports
fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

/// Logs go to stderr so program output on stdout stays clean
fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = match log_level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .try_init()
        .ok();
}

fn run_file(file_path: &Path) -> Result<()> {
    let (source, source_name) = read_source(file_path)?;
    let program = parse_program_with_source(&source, Some(source_name.clone()))?;
    debug!(file = %source_name, statements = program.statements.len(), "parsed program");

    let mut interpreter = Interpreter::new(BufWriter::new(io::stdout().lock()));
    let outcome = interpreter.run(&program);

    // Whatever the program printed before failing still reaches stdout
    let flushed = interpreter.into_output().flush();

    outcome.map_err(|error| {
        Report::new(error).with_source_code(NamedSource::new(source_name, source))
    })?;
    flushed.into_diagnostic()
}

fn handle_parse_command(files: Vec<PathBuf>, spans: bool) -> Result<()> {
    let mut failures = 0;
    let multiple_files = files.len() > 1;

    for file_path in files {
        match parse_single_file(&file_path, spans) {
            Ok(display_name) => {
                if multiple_files {
                    println!("ok: {display_name}");
                }
            }
            Err(report) => {
                eprintln!("{report:?}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(miette::miette!("{failures} file(s) failed to parse"));
    }
    Ok(())
}

fn parse_single_file(file_path: &Path, spans: bool) -> Result<String> {
    let (source, source_name) = read_source(file_path)?;
    let program = parse_program_with_source(&source, Some(source_name.clone()))?;

    if spans {
        println!("{program:#?}");
    } else {
        println!("{}", sexpr::format_program_as_sexpr(&program));
    }
    Ok(source_name)
}

fn start_repl(no_history: bool, history_file: Option<PathBuf>) -> Result<()> {
    let defaults = ReplConfig::default();
    let config = ReplConfig {
        persist_history: !no_history,
        history_file: history_file.or(defaults.history_file.clone()),
        ..defaults
    };

    let mut repl = Repl::new(config)?;
    repl.run()?;
    Ok(())
}

/// Read a `.bj` file, or stdin for `-`, returning the text and a display name
fn read_source(file_path: &Path) -> Result<(String, String)> {
    if file_path.to_str() == Some("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).into_diagnostic()?;
        return Ok((buffer, "<stdin>".to_string()));
    }

    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    if file_path.extension().and_then(|s| s.to_str()) != Some("bj") {
        return Err(miette::miette!(
            "Expected .bj file, got: {}",
            file_path.display()
        ));
    }

    let source = fs::read_to_string(file_path).into_diagnostic()?;
    Ok((source, file_path.display().to_string()))
}
