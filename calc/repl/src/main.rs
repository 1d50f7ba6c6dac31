//! Calc REPL
//!
//! Line-oriented terminal front end for `calc-core`.
//!
//! # Usage
//!
//! ```bash
//! calc-repl
//! echo "1 2 + 3 0 =" | calc-repl
//!
//! # LLM tool-call responses for `chat` lines
//! calc-repl --extractor tool-call
//!
//! # With verbose logging (written to stderr)
//! RUST_LOG=debug calc-repl
//! ```
//!
//! # Input
//!
//! - `1 2 + 3 =`: key labels separated by whitespace, pressed in order
//! - `chat <text>` / `? <text>`: message for the configured assistant
//! - `tool <json>`: LLM response body for the tool-call assistant
//! - `request`: print the request body the conversation would send
//! - `help`, `quit`, `exit`
//!
//! After every line the display is printed, prefixed with `M` while memory
//! holds a non-zero value.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use calc_core::{
    default_config_path, load_config_from_path, Assistant, CalculatorConfig, CalculatorState,
    ConfigOverrides, ExtractorKind, Key,
};

/// Calc REPL - keypad and chat calculator in the terminal
#[derive(Parser, Debug)]
#[command(name = "calc-repl")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "CALC_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum typed significant digits (1-17)
    #[arg(long, value_name = "N")]
    max_digits: Option<usize>,

    /// Messages kept in chat history
    #[arg(long, value_name = "N")]
    history_limit: Option<usize>,

    /// Extractor for `chat` lines (pattern, tool-call)
    #[arg(short = 'e', long, value_name = "KIND")]
    extractor: Option<ExtractorKind>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "CALC_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// One line of REPL input
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Empty,
    Quit,
    Help,
    Request,
    Chat(&'a str),
    Tool(&'a str),
    Keys(&'a str),
}

impl<'a> Line<'a> {
    fn parse(input: &'a str) -> Self {
        let input = input.trim();
        let (head, rest) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(h, r)| (h, r.trim()));

        match head {
            "" => Self::Empty,
            "quit" | "exit" => Self::Quit,
            "help" if rest.is_empty() => Self::Help,
            "request" if rest.is_empty() => Self::Request,
            "chat" | "?" => Self::Chat(rest),
            "tool" => Self::Tool(rest),
            _ => Self::Keys(input),
        }
    }
}

const USAGE: &str = "\
keys:     0-9 . + - × / = C CE ± ⌫ MC MR MS M+ M-
chat:     chat <message>   (or: ? <message>)
llm:      tool <response json>
request:  print the LLM request body for this conversation
quit:     quit | exit";

/// Initialize logging on stderr so stdout carries only the display
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!("calc_repl={level},calc_core={level}"))
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    Ok(())
}

fn load_configuration(args: &Args) -> Result<CalculatorConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(digits) = args.max_digits {
        overrides = overrides.with_max_digits(digits);
    }
    if let Some(limit) = args.history_limit {
        overrides = overrides.with_history_limit(limit);
    }
    if let Some(extractor) = args.extractor {
        overrides = overrides.with_extractor(extractor);
    }
    overrides
        .apply(&mut config)
        .context("Invalid command-line option")?;

    info!(
        source = %config.source(),
        max_digits = config.max_digits,
        extractor = %config.extractor,
        "Configuration loaded"
    );
    Ok(config)
}

fn press_keys(calc: &mut CalculatorState, input: &str, err: &mut impl Write) -> Result<()> {
    for label in input.split_whitespace() {
        match label.parse::<Key>() {
            Ok(key) => calc.press(key),
            Err(e) => {
                debug!(label, "Skipping unknown key");
                writeln!(err, "{e}")?;
            }
        }
    }
    Ok(())
}

fn print_display(calc: &CalculatorState, out: &mut impl Write) -> Result<()> {
    let marker = if calc.memory().is_set() { "M" } else { " " };
    writeln!(out, "{marker} {}", calc.display_value())?;
    Ok(())
}

fn run(config: &CalculatorConfig) -> Result<()> {
    let mut calc = CalculatorState::with_max_digits(config.max_digits);
    let mut assistant = Assistant::from_config(config)?;
    let mut tool_assistant = Assistant::tool_call().with_history_limit(config.history_limit);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    print_display(&calc, &mut out)?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;

        match Line::parse(&line) {
            Line::Empty => continue,
            Line::Quit => break,
            Line::Help => {
                writeln!(out, "{USAGE}")?;
                continue;
            }
            Line::Request => {
                let request = assistant.request(&config.llm);
                writeln!(out, "{}", serde_json::to_string_pretty(&request)?)?;
                continue;
            }
            Line::Chat(text) => match assistant.respond(&mut calc, text) {
                Ok(reply) => writeln!(out, "{reply}")?,
                Err(e) => {
                    warn!(error = %e, "Chat message failed");
                    writeln!(err, "Sorry, I encountered an error processing your request: {e}")?;
                }
            },
            Line::Tool(body) => match tool_assistant.respond_with(&mut calc, "(tool call)", body) {
                Ok(reply) => writeln!(out, "{reply}")?,
                Err(e) => {
                    warn!(error = %e, "Tool call response rejected");
                    writeln!(err, "{e}")?;
                }
            },
            Line::Keys(input) => press_keys(&mut calc, input, &mut err)?,
        }

        print_display(&calc, &mut out)?;
        out.flush()?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = load_configuration(&args)?;
    run(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        assert_eq!(Line::parse("   "), Line::Empty);
        assert_eq!(Line::parse("quit"), Line::Quit);
        assert_eq!(Line::parse("help"), Line::Help);
        assert_eq!(Line::parse("request"), Line::Request);
        assert_eq!(Line::parse("chat calculate 2 + 2"), Line::Chat("calculate 2 + 2"));
        assert_eq!(Line::parse("? help"), Line::Chat("help"));
        assert_eq!(Line::parse("tool {\"content\": []}"), Line::Tool("{\"content\": []}"));
        assert_eq!(Line::parse("1 2 + 3 ="), Line::Keys("1 2 + 3 ="));
    }

    #[test]
    fn test_press_keys_skips_unknown() {
        let mut calc = CalculatorState::new();
        let mut err = Vec::new();
        press_keys(&mut calc, "4 foo 2", &mut err).unwrap();
        assert_eq!(calc.display_value(), "42");
        assert_eq!(String::from_utf8(err).unwrap(), "Unknown key: \"foo\"\n");
    }

    #[test]
    fn test_print_display_memory_marker() {
        let mut calc = CalculatorState::new();
        let mut out = Vec::new();
        print_display(&calc, &mut out).unwrap();
        calc.memory_store(1.0);
        print_display(&calc, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  0\nM 0\n");
    }
}
