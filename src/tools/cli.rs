use std::{
    ffi::OsString,
    fmt::{Display, Formatter},
    path::PathBuf,
};

use clap::Parser;
use log::{info, LevelFilter};

/// Extension given to compressed files.
pub const SUFFIX: &str = "huf";

/// Verbosity of user information
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Compress, Decompress, Test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffOpts {
    /// File to read for input
    pub input: PathBuf,
    /// File to write, when not derived from the input name
    pub output: Option<PathBuf>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HuffOpts {
    pub fn new() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            force_overwrite: false,
            op_mode: Mode::Compress,
            verbose: Verbosity::Warnings,
        }
    }

    /// Where the result goes. Compressing `a.txt` gives `a.txt.huf`; decompressing
    /// `a.txt.huf` gives `a.txt`, and any other name just gets `.out` added.
    pub fn output_path(&self) -> PathBuf {
        if let Some(out) = &self.output {
            return out.clone();
        }
        match self.op_mode {
            Mode::Decompress if self.input.extension().map_or(false, |e| e == SUFFIX) => {
                self.input.with_extension("")
            }
            Mode::Compress => with_suffix(&self.input, SUFFIX),
            Mode::Decompress | Mode::Test => with_suffix(&self.input, "out"),
        }
    }
}

impl Default for HuffOpts {
    fn default() -> Self {
        Self::new()
    }
}

fn with_suffix(path: &std::path::Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A canonical Huffman file compressor",
    long_about = "
    Compresses a file with a single canonical Huffman code. Only the code lengths are
    stored; both sides rebuild identical codes from them.

    Compressing is the default. Without DEST, compressing writes SOURCE.huf and
    decompressing strips the .huf suffix."
)]
pub struct Args {
    /// File to read
    source: PathBuf,

    /// File to write
    dest: Option<PathBuf>,

    /// Compress the source file
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Decompress the source file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Check that the source decompresses cleanly, writing nothing
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Overwrite an existing output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Suppress everything except errors
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Be verbose (a 2nd -v gives more). Debug builds only: release builds keep just
    /// warnings and errors
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u8,
}

impl From<Args> for HuffOpts {
    fn from(args: Args) -> Self {
        let op_mode = if args.test {
            Mode::Test
        } else if args.decompress {
            Mode::Decompress
        } else {
            Mode::Compress
        };
        let verbose = match (args.quiet, args.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Warnings,
            (false, 1) => Verbosity::Info,
            (false, 2) => Verbosity::Debug,
            _ => Verbosity::Trace,
        };
        HuffOpts {
            input: args.source,
            output: args.dest,
            force_overwrite: args.force,
            op_mode,
            verbose,
        }
    }
}

/// Parse the command line into our options and set the log level from them.
pub fn huffopts_init() -> HuffOpts {
    let opts = HuffOpts::from(Args::parse());
    log::set_max_level(opts.verbose.level_filter());

    // Below we report initialization status to the user
    info!("---- Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Getting input from the file {}", opts.input.display());
    if opts.op_mode != Mode::Test {
        info!("Sending output to the file {}", opts.output_path().display());
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    info!("---- Initialization End ----");
    opts
}
