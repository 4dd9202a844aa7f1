use clap::Parser;
use coinsignal::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
