use aprofiles_processor::cli::{run, Cli};
use aprofiles_processor::error::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
