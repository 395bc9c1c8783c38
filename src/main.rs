//! vtmodel - replay a recorded terminal session
//!
//! Feeds a captured byte stream (e.g. from `script -q` or a pty log)
//! through a headless terminal and prints the resulting screen.
//!
//! ```text
//! ┌────────────┐    ┌──────────────────────┐    ┌────────┐
//! │ file/stdin │ →  │ Terminal (vte + emu) │ →  │ stdout │
//! └────────────┘    └──────────┬───────────┘    └────────┘
//!                              ↓ replies
//!                         drain thread
//! ```

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;

use vtmodel::config::Config;
use vtmodel::constants::{DEFAULT_COLS, DEFAULT_ROWS};
use vtmodel::terminal::render;
use vtmodel::Terminal;

/// Bytes handed to the parser per write
const CHUNK_SIZE: usize = 4096;

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    cols: Option<usize>,
    rows: Option<usize>,
    styled: bool,
    scrollback: bool,
    config: Option<PathBuf>,
    input: Option<PathBuf>,
}

/// Print help message
fn print_help() {
    println!(
        r#"vtmodel {} - headless terminal screen model

USAGE:
    vtmodel [OPTIONS] [FILE]

Replays FILE (or stdin) through a virtual terminal and prints the final
screen contents.

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --cols=N                Terminal width (default {})
    --rows=N                Terminal height (default {})
    --styled                Keep colors and attributes as SGR sequences
    --scrollback            Print scrollback history before the screen
    --config=PATH           Use PATH instead of the default config file
    --print-config          Print the default config file and exit

CONFIG FILE:
    ~/.config/vtmodel/config.toml (override with VTMODEL_CONFIG)
"#,
        env!("CARGO_PKG_VERSION"),
        DEFAULT_COLS,
        DEFAULT_ROWS
    );
}

/// Accepts both `--flag=value` and `--flag value`
fn take_value(
    arg: &str,
    name: &str,
    rest: &mut impl Iterator<Item = String>,
) -> Result<Option<String>> {
    if let Some(value) = arg.strip_prefix(name).and_then(|s| s.strip_prefix('=')) {
        return Ok(Some(value.to_string()));
    }
    if arg == name {
        return rest
            .next()
            .map(Some)
            .ok_or_else(|| anyhow!("{} requires a value", name));
    }
    Ok(None)
}

fn parse_size(name: &str, value: &str) -> Result<usize> {
    let n: usize = value
        .parse()
        .with_context(|| format!("Invalid {}: {}", name, value))?;
    if n == 0 {
        bail!("{} must be at least 1", name);
    }
    Ok(n)
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(v) = take_value(&arg, "--cols", &mut iter)? {
            parsed.cols = Some(parse_size("--cols", &v)?);
        } else if let Some(v) = take_value(&arg, "--rows", &mut iter)? {
            parsed.rows = Some(parse_size("--rows", &v)?);
        } else if let Some(v) = take_value(&arg, "--config", &mut iter)? {
            parsed.config = Some(PathBuf::from(v));
        } else if arg == "--styled" {
            parsed.styled = true;
        } else if arg == "--scrollback" {
            parsed.scrollback = true;
        } else if arg.starts_with('-') && arg != "-" {
            bail!("Unknown option: {} (see --help)", arg);
        } else if parsed.input.is_none() {
            if arg != "-" {
                parsed.input = Some(PathBuf::from(arg));
            }
        } else {
            bail!("Unexpected argument: {}", arg);
        }
    }
    Ok(parsed)
}

fn read_input(input: Option<&PathBuf>) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    match input {
        Some(path) => {
            data = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
        }
        None => {
            io::stdin()
                .read_to_end(&mut data)
                .context("Failed to read stdin")?;
        }
    }
    Ok(data)
}

fn replay(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load(),
    };
    let cols = args.cols.unwrap_or(DEFAULT_COLS);
    let rows = args.rows.unwrap_or(DEFAULT_ROWS);
    let mut terminal = Terminal::new(config.to_options(cols, rows));

    // Device reports would otherwise fill the bounded reply pipe and block
    let mut replies = terminal.reply_reader();
    let drain = thread::spawn(move || io::copy(&mut replies, &mut io::sink()));

    let data = read_input(args.input.as_ref())?;
    info!("Replaying {} bytes into {}x{}", data.len(), cols, rows);
    for chunk in data.chunks(CHUNK_SIZE) {
        terminal.write(chunk)?;
    }
    terminal.close();
    let discarded = drain
        .join()
        .map_err(|_| anyhow!("reply drain thread panicked"))?
        .context("Failed to drain replies")?;
    debug!("Discarded {} reply bytes", discarded);

    let mut out = String::new();
    if args.scrollback {
        if let Some(history) = terminal.scrollback() {
            for row in history.iter() {
                if args.styled {
                    render::render_row(&mut out, row);
                } else {
                    out.push_str(&vtmodel::terminal::buffer::row_to_string(row));
                }
                out.push('\n');
            }
        }
    }
    if args.styled {
        out.push_str(&terminal.render());
    } else {
        out.push_str(&terminal.text());
    }
    out.push('\n');
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("vtmodel {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    let args = parse_args(args)?;
    let output = replay(&args)?;

    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(output.as_bytes())?;
    lock.flush()?;
    Ok(())
}
