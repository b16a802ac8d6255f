//! Weft - template preprocessor
//!
//! Usage: weft [OPTIONS] <FILE>

use std::env;
use std::fs;
use std::process::ExitCode;

use log::info;

use weft_ast::pretty_print;
use weft_html::{preprocess, render, tokenize, SerializeConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    /// Print the tree in debug form
    Tree(String),
    /// Print the raw token stream
    Tokens(String),
    /// Re-serialize the tree as markup
    Html(String),
    /// Dump the tree as JSON
    Json(String),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("weft");

    let command = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_usage(program);
            ExitCode::SUCCESS
        }
        Command::Version => {
            println!("Weft {}", VERSION);
            ExitCode::SUCCESS
        }
        command => {
            if let Err(e) = run(command) {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Err("missing <FILE>".to_string());
    };

    let file = |name: &str| -> Result<String, String> {
        args.get(1)
            .cloned()
            .ok_or_else(|| format!("{} requires <FILE>", name))
    };

    let command = match first.as_str() {
        "--help" | "-h" => Command::Help,
        "--version" | "-V" => Command::Version,
        "--tokens" => Command::Tokens(file("--tokens")?),
        "--html" => Command::Html(file("--html")?),
        "--json" => Command::Json(file("--json")?),
        flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
        path => Command::Tree(path.to_string()),
    };
    Ok(command)
}

fn print_usage(program: &str) {
    println!(
        r#"Weft {} - HTML template preprocessor

USAGE:
    {} [OPTIONS] <FILE>

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version information
    --tokens <FILE>     Print the HTML token stream (directives left literal)
    --html <FILE>       Print the element tree re-serialized as markup
    --json <FILE>       Print the element tree as JSON

EXAMPLES:
    {} templates/index.hbs
    {} --json templates/index.hbs
"#,
        VERSION, program, program, program
    );
}

fn read_source(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    info!("Read {} bytes from {}", source.len(), path);
    Ok(source)
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Tree(path) => {
            let nodes = preprocess(&read_source(&path)?)?;
            print!("{}", pretty_print(&nodes));
        }
        Command::Tokens(path) => {
            let tokens = tokenize(&read_source(&path)?);
            for token in &tokens {
                println!("{:?}", token);
            }
            info!("{} tokens", tokens.len());
        }
        Command::Html(path) => {
            let nodes = preprocess(&read_source(&path)?)?;
            println!("{}", render(&nodes, &SerializeConfig::DEFAULT));
        }
        Command::Json(path) => {
            let nodes = preprocess(&read_source(&path)?)?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        Command::Help | Command::Version => {}
    }
    Ok(())
}
