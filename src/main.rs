use std::io::Read;

use jsonsift::{recover, RecoverOptions};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: jsonsift [--no-fix] [--allow-partial] [--last] [--max-blocks N] [FILE]
Reads FILE (or stdin) and prints the recovered JSON value.";

fn main() {
    init_tracing();

    let (options, path) = parse_args().unwrap_or_else(|msg| {
        eprintln!("jsonsift: {msg}");
        eprintln!("{USAGE}");
        std::process::exit(2);
    });

    let input = read_input(path.as_deref()).unwrap_or_else(|e| {
        eprintln!("jsonsift: failed to read input: {e}");
        std::process::exit(1);
    });

    match recover(&input, &options) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| value.to_string());
            println!("{pretty}");
        }
        Err(e) => {
            eprintln!("jsonsift: {e}");
            std::process::exit(1);
        }
    }
}

/// Log filter comes from `JSONSIFT_LOG` (e.g. `debug`, `jsonsift=trace`),
/// defaulting to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("JSONSIFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> Result<(RecoverOptions, Option<String>), String> {
    let mut options = RecoverOptions::default();
    let mut path: Option<String> = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-fix" => options.attempt_fix = false,
            "--allow-partial" => options.allow_partial = true,
            "--last" => options.prefer_first = false,
            "--max-blocks" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--max-blocks requires a value".to_string())?;
                options.max_blocks = value
                    .parse()
                    .map_err(|_| format!("invalid --max-blocks value: {value}"))?;
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            _ => {
                if path.is_some() {
                    return Err("more than one input file given".to_string());
                }
                path = Some(arg);
            }
        }
    }
    Ok((options, path))
}

fn read_input(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
