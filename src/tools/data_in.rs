use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use log::warn;

use crate::error::{HuffError, Result};

/// Anything that can hand out a fresh reader over the same finite byte sequence.
///
/// Compression reads its input twice (once to count, once to emit), so a source must be
/// restartable. Re-opening is the only way to restart it.
pub trait ByteSource {
    type Reader<'a>: io::Read
    where
        Self: 'a;

    /// Open a new reader positioned at the first byte.
    fn open(&self) -> io::Result<Self::Reader<'_>>;
}

/// A file on disk, re-opened for every pass.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    type Reader<'a> = BufReader<File>;

    fn open(&self) -> io::Result<Self::Reader<'_>> {
        Ok(BufReader::new(File::open(&self.path)?))
    }
}

impl ByteSource for [u8] {
    type Reader<'a> = &'a [u8];

    fn open(&self) -> io::Result<Self::Reader<'_>> {
        Ok(self)
    }
}

impl ByteSource for Vec<u8> {
    type Reader<'a> = &'a [u8];

    fn open(&self) -> io::Result<Self::Reader<'_>> {
        Ok(self.as_slice())
    }
}

/// Create the output file. An existing file is only replaced when `force` is set.
pub fn create_output(path: &Path, force: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            warn!("Not overwriting {}.", path.display());
            HuffError::OutputExists(path.to_path_buf())
        } else {
            HuffError::Io(e)
        }
    })
}

/// Remove an output file left incomplete by a failed run, so a retry isn't refused.
pub fn discard_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("Removed incomplete output {}.", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}
