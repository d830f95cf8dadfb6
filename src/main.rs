use std::process::ExitCode;

use clap::Parser;
use wrapload::benchmark::{self, BenchConfig};
use wrapload::cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_filter())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let result = BenchConfig::new(args.accesses, args.working_set).and_then(|config| {
        let stdout = std::io::stdout();
        benchmark::run_and_emit(&config, args.verify, &mut stdout.lock())
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
