//! Wordlist line readers.
//!
//! Large wordlists are memory-mapped, small ones go through a buffered
//! reader. Both paths yield lines with the trailing `\n` / `\r\n` removed and
//! decode invalid UTF-8 lossily, so a stray byte in a large wordlist does not
//! end the run.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Threshold in bytes above which we attempt to use mmap for reading.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send + 'static>;

/// Decide whether to use mmap based on file size and threshold.
pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

/// Iterate lines from a file path using a buffered reader (non-mmap).
pub fn iter_lines_bufread<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(Box::new(ReaderLines {
        reader: BufReader::new(file),
        buf: Vec::new(),
    }))
}

struct ReaderLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for ReaderLines<R> {
    type Item = io::Result<String>;
    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
                Some(Ok(line_from_bytes(line)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Iterate lines from a file path using mmap.
pub fn iter_lines_mmap<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    // SAFETY: the map is read-only; a wordlist truncated underneath us is the
    // caller's problem, same as for any mmap reader.
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.as_ref().display()))?;
    Ok(Box::new(MmapLines { mmap, pos: 0 }))
}

struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MmapLines {
    type Item = io::Result<String>;
    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let start = self.pos;
        if let Some(off) = memchr::memchr(b'\n', &data[self.pos..]) {
            let end = self.pos + off;
            self.pos = end + 1;
            Some(Ok(line_from_bytes(&data[start..end])))
        } else {
            // Last line without trailing newline
            self.pos = data.len();
            Some(Ok(line_from_bytes(&data[start..])))
        }
    }
}

fn line_from_bytes(bytes: &[u8]) -> String {
    let slice = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(slice).into_owned()
}

/// Choose mmap or bufread and return an iterator over lines. A threshold of
/// zero disables mmap.
pub fn iter_lines_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<LineIter> {
    let meta =
        std::fs::metadata(&path).with_context(|| format!("stat {}", path.as_ref().display()))?;
    if threshold_bytes > 0 && meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        iter_lines_mmap(path)
    } else {
        iter_lines_bufread(path)
    }
}
