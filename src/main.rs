use clap::Parser;
use downsort::cli::{Cli, run};
use downsort::output::OutputFormatter;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
