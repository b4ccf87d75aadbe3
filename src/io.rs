use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Files at or above this size are memory-mapped instead of buffered.
/// Wordlists are routinely hundreds of megabytes; hash lists rarely are.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 8 * 1024 * 1024; // 8 MiB

pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send + 'static>;

/// Iterate lines through a buffered reader.
pub fn iter_lines_bufread<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(Box::new(BufReader::new(file).lines()))
}

/// Iterate lines over a memory-mapped file. Avoids read-ahead copies on
/// large inputs; each returned line still allocates its own String.
pub fn iter_lines_mmap<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.as_ref().display()))?;
    Ok(Box::new(MmapLines { mmap, offset: 0 }))
}

struct MmapLines {
    mmap: Mmap,
    offset: usize,
}

impl Iterator for MmapLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        let rest = &data[self.offset..];
        if rest.is_empty() {
            return None;
        }
        let (mut line, consumed) = match memchr::memchr(b'\n', rest) {
            Some(nl) => (&rest[..nl], nl + 1),
            None => (rest, rest.len()),
        };
        self.offset += consumed;
        if let [head @ .., b'\r'] = line {
            line = head; // CRLF input
        }
        Some(Ok(String::from_utf8_lossy(line).into_owned()))
    }
}

/// Pick mmap or bufread by file size.
pub fn iter_lines_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<LineIter> {
    let meta =
        std::fs::metadata(&path).with_context(|| format!("stat {}", path.as_ref().display()))?;
    if meta.is_file() && meta.len() >= threshold_bytes {
        iter_lines_mmap(path)
    } else {
        iter_lines_bufread(path)
    }
}

/// Collect the trimmed, non-empty lines of every file given. The workhorse
/// behind wordlist and target loading.
pub fn collect_words<P: AsRef<Path>>(paths: &[P], threshold_bytes: u64) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for p in paths {
        for line in iter_lines_auto(p, threshold_bytes)?.flatten() {
            let word = line.trim();
            if !word.is_empty() {
                words.push(word.to_string());
            }
        }
    }
    Ok(words)
}
