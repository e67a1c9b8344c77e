use clap::Parser;
use indexdash::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
