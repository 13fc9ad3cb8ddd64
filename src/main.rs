use erdm::parser::{ParseOptions, Parser};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Json,
    Tree,
    Tokens,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input.erdm> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        eprintln!("  -t, --tree            Print the syntax tree instead of the model");
        eprintln!("      --tokens          Print the token stream instead of the model");
        eprintln!("  -p, --pretty          Colour rule names");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut output = Output::Json;
    let mut options = ParseOptions::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-t" | "--tree" => output = Output::Tree,
            "--tokens" => output = Output::Tokens,
            "-p" | "--pretty" => options.pretty = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let parsed = match Parser::with_options(&input, options).parse() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let text = match output {
        Output::Tree => parsed.print_syntax_tree(),
        Output::Tokens => parsed.tokens().to_string(),
        Output::Json => {
            let document = match parsed.execute() {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            };
            for diagnostic in &document.diagnostics {
                eprintln!("{}", diagnostic);
            }
            match serde_json::to_string_pretty(&document) {
                Ok(json) => json + "\n",
                Err(e) => {
                    eprintln!("Failed to serialize document: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &text) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", text),
    }
}
