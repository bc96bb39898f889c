mod debug_report;

use segugio::{Analysis, Case, Classifier, EvidenceClass, Options};
use serde::Serialize;
use std::io::{self, IsTerminal, Read};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "segugio=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let classifier = Classifier::default().with_options(config.options.clone());

    let (analysis, details) = match config.timeout {
        Some(timeout) => match classifier.classify_with_timeout(&config.input, timeout) {
            Ok(analysis) => (analysis, None),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        },
        None => {
            let (analysis, details) = classifier.classify_verbose(&config.input);
            (analysis, Some(details))
        }
    };

    if config.json {
        let report = JsonReport::new(&analysis, config.options.threshold);
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to serialize result: {err}");
                std::process::exit(1);
            }
        }
    } else {
        debug_report::print_run(&config.input, &analysis, details.as_ref(), config.options.threshold, config.color);
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    analysis: &'a Analysis,
    suggested_source: EvidenceClass,
    conflicting_cases: Vec<Case>,
}

impl<'a> JsonReport<'a> {
    fn new(analysis: &'a Analysis, threshold: f64) -> Self {
        let suggested_source = analysis.suggested_source(threshold);
        JsonReport { analysis, suggested_source, conflicting_cases: analysis.conflicting_cases(suggested_source) }
    }
}

struct CliConfig {
    input: String,
    options: Options,
    timeout: Option<Duration>,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut options = Options::default();
    let mut timeout = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            match inline.clone() {
                Some(value) => Ok(value),
                None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("segugio {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--threshold" => options.threshold = parse_threshold(&value("--threshold")?)?,
            "--max-input" => options.max_input_chars = parse_count("--max-input", &value("--max-input")?)?,
            "--timeout-ms" => {
                let ms = parse_count("--timeout-ms", &value("--timeout-ms")?)?;
                timeout = Some(Duration::from_millis(ms as u64));
            }
            "--input" | "-i" => {
                let value = value("--input")?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, options, timeout, json, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.trim().to_string())
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(t) if (0.0..=1.0).contains(&t) => Ok(t),
        _ => Err(format!("error: invalid --threshold '{value}' (expected a number between 0 and 1)")),
    }
}

fn parse_count(flag: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("error: invalid {flag} '{value}' (expected a positive integer)")),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    let defaults = Options::default();
    format!(
        "segugio {version}

Italian search-query intent classifier.

Usage:
  segugio [OPTIONS] [--] <query...>
  segugio [OPTIONS] --input <text>

Options:
  -i, --input <text>       Query to classify. If omitted, reads remaining args
                           or stdin when no args are provided.
  --json                   Print the result as JSON instead of the report.
  --threshold <p>          Probability at which the source suggestion falls
                           back to METADATA. Default: {threshold}
  --max-input <chars>      Longer queries are truncated. Default: {max_input}
  --timeout-ms <ms>        Give up (exit 1) if classification takes longer.
  --color                  Force ANSI color output.
  --no-color               Disable ANSI color output.
  -h, --help               Show this help message.
  -V, --version            Print version information.

Environment:
  RUST_LOG                 Log filter (default: segugio=warn).

Exit codes:
  0  Success.
  1  Internal error or timeout.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        threshold = defaults.threshold,
        max_input = defaults.max_input_chars,
    )
}
