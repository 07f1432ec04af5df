//! spriteswap - Command-line tool for compositing replacement sprites into animated templates

use std::process::ExitCode;

use spriteswap::cli;

fn main() -> ExitCode {
    cli::run()
}
