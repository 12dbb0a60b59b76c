use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::diagnostic::{self, Severity};
use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::pipeline;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the token stream as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a program and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Print the AST as JSON instead of prefix form
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a String
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename)
        .map_err(LoxError::from)
        .context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .map_err(LoxError::from)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf)
        .map_err(LoxError::from)
        .context(format!("File {:?} is not valid UTF-8", filename))?;

    Ok(source)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Prints every error with a source excerpt and exits with the status of the
/// first one.
fn fail(source: &str, errors: &[LoxError]) -> ! {
    for e in errors {
        debug!("Reporting error: {:?}", e);
        match e.position() {
            Some(position) => {
                diagnostic::emit(source, Severity::Error, position, &e.to_string())
            }
            None => eprintln!("{}", e),
        }
    }

    let code = errors.first().map_or(65, LoxError::exit_code);
    debug!("Exiting with code {}", code);
    std::process::exit(code);
}

/// Reads the input file or exits with the I/O status.
fn load(filename: PathBuf) -> String {
    read_file(filename).unwrap_or_else(|e| {
        let code = e.downcast_ref::<LoxError>().map_or(74, LoxError::exit_code);
        eprintln!("{:#}", e);
        std::process::exit(code);
    })
}

fn no_input(subcommand: &str) -> ! {
    info!("No filepath provided for {}", subcommand);
    println!("No input filepath was provided. Exiting...");
    std::process::exit(0);
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let Some(filename) = filename else {
                no_input("Tokenize");
            };
            info!("Running Tokenize subcommand");
            let source = load(filename);

            match pipeline::scan(&source) {
                Ok(tokens) if json => {
                    println!("{}", serde_json::to_string_pretty(&tokens)?);
                }
                Ok(tokens) => {
                    for token in tokens {
                        println!("{}", token);
                    }
                }
                Err(errors) => fail(&source, &errors),
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename, json } => {
            let Some(filename) = filename else {
                no_input("Parse");
            };
            info!("Running Parse subcommand");
            let source = load(filename);

            let statements = pipeline::scan(&source)
                .and_then(pipeline::parse)
                .unwrap_or_else(|errors| fail(&source, &errors));

            if json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                println!("{}", AstPrinter::print_program(&statements));
            }

            info!("Parse subcommand completed");
        }

        Commands::Evaluate { filename } => {
            let Some(filename) = filename else {
                no_input("Evaluate");
            };
            info!("Running Evaluate subcommand");
            let source = load(filename);

            let mut interpreter = Interpreter::new();
            match pipeline::evaluate(&source, &mut interpreter) {
                Ok(value) => {
                    debug!("Evaluated to: {}", value);
                    println!("{}", value);
                }
                Err(errors) => fail(&source, &errors),
            }

            info!("Evaluate subcommand completed");
        }

        Commands::Run { filename } => {
            let Some(filename) = filename else {
                no_input("Run");
            };
            info!("Running Run subcommand");
            let source = load(filename);
            info!("Provided input:\n {}", source);

            let statements = pipeline::scan(&source)
                .and_then(pipeline::parse)
                .unwrap_or_else(|errors| fail(&source, &errors));
            info!("Parsed {} statements", statements.len());

            let mut interpreter = Interpreter::new();
            let warnings = pipeline::resolve(&statements, &mut interpreter)
                .unwrap_or_else(|errors| fail(&source, &errors));

            for warning in &warnings {
                let position = (warning.token.line, warning.token.column);
                diagnostic::emit(&source, Severity::Warning, position, &warning.to_string());
            }

            if let Err(e) = interpreter.interpret(&statements) {
                fail(&source, &[e.into()]);
            }

            info!("Program executed successfully");
        }
    }

    Ok(())
}
