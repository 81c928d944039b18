use clap::Parser;
use invtracker::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
