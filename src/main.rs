use anyhow::Result;
use std::process::ExitCode;

mod app;
mod cli;
mod logging;

fn main() -> Result<ExitCode> {
    let args = cli::parse();
    app::run(args)
}
