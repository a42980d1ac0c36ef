//! Where key sequences come from: trace files, an interactive prompt, or the
//! built-in demo sequence.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::Key;

/// Sequence on which LRU, FIFO and LFU visibly disagree at capacity 4.
pub const DEMO_SEQUENCE: [&str; 14] = [
    "A", "B", "C", "D", "A", "E", "A", "B", "A", "C", "D", "E", "D", "C",
];

pub fn demo_sequence() -> Vec<Key> {
    DEMO_SEQUENCE.iter().map(|k| k.to_string()).collect()
}

/// Loads keys from column `key_column` of a CSV trace. A file with one key
/// per line is a valid single-column trace.
pub fn load_keys(path: &Path, key_column: usize, has_headers: bool) -> Result<Vec<Key>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let keys = read_keys(BufReader::new(file), key_column, has_headers)?;
    debug!("loaded {} keys from {}", keys.len(), path.display());
    Ok(keys)
}

pub fn read_keys<R: Read>(reader: R, key_column: usize, has_headers: bool) -> Result<Vec<Key>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut keys = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let Some(field) = record.get(key_column) else {
            let line = record.position().map_or(idx as u64 + 1, |pos| pos.line());
            return Err(Error::MissingColumn {
                line,
                column: key_column,
            });
        };
        if !field.is_empty() {
            keys.push(field.to_string());
        }
    }
    Ok(keys)
}

/// Collects keys one per line until `RUN` (or `run`) or end of input.
/// Surrounding whitespace is trimmed and blank lines are ignored.
pub fn read_interactive<R: BufRead, W: Write>(mut input: R, mut prompt: W) -> Result<Vec<Key>> {
    let stdin = |e| Error::io("<stdin>", e);
    let stdout = |e| Error::io("<stdout>", e);
    writeln!(prompt, "Enter keys one per line (e.g. A, B, C). Type RUN when finished:")
        .map_err(stdout)?;

    let mut keys = Vec::new();
    let mut line = String::new();
    loop {
        write!(prompt, "> ").map_err(stdout)?;
        prompt.flush().map_err(stdout)?;
        line.clear();
        if input.read_line(&mut line).map_err(stdin)? == 0 {
            break;
        }
        let key = line.trim();
        if key == "RUN" || key == "run" {
            break;
        }
        if key.is_empty() {
            continue;
        }
        keys.push(key.to_string());
    }
    Ok(keys)
}
