//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process::ExitCode;

use chuff::compression::compress::compress;
use chuff::compression::decompress::decompress;
use chuff::tools::cli::{huffopts_init, Mode, Verbosity};

use log::{error, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> ExitCode {
    // Available log levels are Error, Warn, Info, Debug, Trace. The real ceiling is set
    // from the command line once it has been parsed.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start the logger: {}", e);
    }

    let options = huffopts_init();

    //----- Figure how what we need to do and go do it
    let result = match options.op_mode {
        Mode::Compress => compress(&options).map(|_| ()),
        Mode::Decompress | Mode::Test => decompress(&options).map(|_| ()),
    };

    match result {
        Ok(()) => {
            if options.verbose > Verbosity::Quiet {
                println!("Done.");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {}", options.input.display(), e);
            ExitCode::FAILURE
        }
    }
}
