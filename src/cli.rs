use anstyle::{AnsiColor, Color, Style};
use clap::Parser;
use clap::builder::Styles;

use crate::benchmark::{DEFAULT_ACCESSES, DEFAULT_WORKING_SET};

fn styles() -> Styles {
    let header = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    let literal = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let placeholder = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    let error = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(literal)
        .placeholder(placeholder)
        .error(error)
}

#[derive(Parser, Debug)]
#[command(name = "wrapload")]
#[command(version, about = "Wraparound-read microbenchmark for cache and TLB probing", long_about = None)]
#[command(styles = styles(), allow_negative_numbers = true)]
#[command(after_help = "Prints the accumulated sum of all reads. Time it externally, e.g. `time wrapload 100000000 4096`.")]
pub struct Args {
    /// Number of reads to perform
    #[arg(value_name = "N", default_value_t = DEFAULT_ACCESSES, value_parser = parse_count::<u64>)]
    pub accesses: u64,

    /// Working-set size in elements (must be at least 1)
    #[arg(value_name = "S", default_value_t = DEFAULT_WORKING_SET, value_parser = parse_count::<usize>)]
    pub working_set: usize,

    /// Check the result against the closed-form sum
    #[arg(long)]
    pub verify: bool,

    /// Diagnostics on stderr: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_filter(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Parses a non-negative integer, allowing `_` digit separators.
fn parse_count<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    let trimmed = s.trim();
    if trimmed.starts_with('-') {
        return Err(format!("'{}' must be non-negative", s));
    }

    let digits: String = trimmed.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a valid number", s));
    }

    digits
        .parse()
        .map_err(|_| format!("'{}' is out of range", s))
}
