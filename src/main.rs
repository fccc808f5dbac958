//! CLI entry point for enshutsu
//!
//! Repairs scene payloads, processes saved model responses and expands prompt
//! templates from the command line.

use enshutsu::cli::{self, CliOptions};
use std::fs;
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    if matches!(command, "--help" | "-h") {
        print_usage();
        return;
    }
    if !matches!(command, "repair" | "process" | "macros") {
        eprintln!("Error: Unknown command '{}'", command);
        eprintln!();
        print_usage();
        process::exit(1);
    }

    let Some(target) = args.get(2) else {
        eprintln!("Error: Missing argument for '{}'", command);
        eprintln!();
        print_usage();
        process::exit(1);
    };

    let options = match parse_options(&args[3..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };
    init_logging(options.debug);

    let result = match command {
        "repair" => read_file(target).and_then(|raw| cli::run_repair(&raw)),
        "process" => match read_file(target) {
            Ok(response) => cli::process::run_process(&response, &options).await,
            Err(err) => Err(err),
        },
        _ => cli::template::run_macros(target, &options).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {} failed", command);
        eprintln!("Reason: {:#}", err);
        process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" => options.debug = true,
            "--interactive" => options.interactive = true,
            "--state" | "--config" | "--assets" => {
                let value = iter
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| format!("'{}' needs a path", arg))?;
                match arg.as_str() {
                    "--state" => options.state_path = Some(value),
                    "--config" => options.config_path = Some(value),
                    _ => options.assets_path = Some(value),
                }
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }

    Ok(options)
}

fn init_logging(debug: bool) {
    let debug = debug || std::env::var(enshutsu::config::DEBUG_ENV).is_ok();
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_file(path: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).map_err(|err| anyhow::anyhow!("failed to read '{}': {}", path, err))
}

fn print_usage() {
    println!("enshutsu - Scene director for model-driven visual novels");
    println!();
    println!("USAGE:");
    println!("    enshutsu <command> <argument> [options]");
    println!();
    println!("COMMANDS:");
    println!("    repair <file>          Repair a scene payload and print the fixes");
    println!("    process <file>         Run a saved model response through the director");
    println!("    macros <template>      Expand {{{{ct_*}}}} macros in a prompt template");
    println!("    --help, -h             Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --state <file>     Scene snapshot to start from (process saves back to it)");
    println!("    --config <file>    Director configuration JSON");
    println!("    --assets <dir>     Asset directory for the asset macros");
    println!("    --interactive      Offer the response's choices on stdin (process)");
    println!("    --debug            Debug logging and scene state output");
    println!();
    println!("EXAMPLES:");
    println!("    enshutsu repair payload.txt");
    println!("    enshutsu process response.txt --state scene.json --interactive");
    println!("    enshutsu macros \"Backgrounds: {{{{ct_backgrounds}}}}\" --assets assets/");
}
