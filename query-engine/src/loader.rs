//! Loadfile ingest: `<int key>,<quoted-or-bare value>` lines appended to
//! a table's record file and, when indexing, its secondary index.
//!
//! Parsing is ported from the original `SqlEngine::parseLoadLine`'s
//! `atoi`-plus-`strchr` approach rather than a regex or `nom` grammar, to
//! keep its exact edge cases: a missing comma is `InvalidFileFormat`, an
//! unterminated quote just takes the rest of the line, and the value
//! field defaults to empty when nothing follows the comma.

use std::io::{BufRead, BufReader};

use crate::catalog::TableInfo;
use crate::{QueryError, Result};

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

/// C-style `atoi`: leading sign, then digits, stopping at the first
/// non-digit byte. Returns 0 if no digits are present.
fn atoi(s: &str) -> i32 {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut neg = false;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        neg = bytes[i] == b'-';
        i += 1;
    }
    let mut value: i64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value * 10 + (bytes[i] - b'0') as i64;
        i += 1;
    }
    if neg {
        value = -value;
    }
    value as i32
}

/// Parses a single loadfile line into `(key, value)`.
pub fn parse_loadfile_line(line: &str) -> Result<(i32, String)> {
    let bytes = line.as_bytes();
    let start = skip_ws(bytes, 0);
    let key = atoi(&line[start..]);

    let comma = line[start..]
        .find(',')
        .map(|p| p + start)
        .ok_or_else(|| QueryError::InvalidFileFormat(line.to_string()))?;

    let after_comma = skip_ws(bytes, comma + 1);
    if after_comma >= bytes.len() {
        return Ok((key, String::new()));
    }

    let delim = bytes[after_comma] as char;
    let value = if delim == '\'' || delim == '"' {
        let rest = &line[after_comma + 1..];
        match rest.find(delim) {
            Some(end) => rest[..end].to_string(),
            None => rest.to_string(),
        }
    } else {
        line[after_comma..].to_string()
    };

    Ok((key, value))
}

/// Loads `loadfile_path` into `table`: appends each parsed line to the
/// record file and, if `table` has an index, inserts `(key, locator)`
/// into it. A parse error is reported and the line skipped; loading
/// stops at the first blank line, matching the original loader's
/// end-of-input convention. An append or index-insert error aborts the
/// load immediately.
pub fn load_table(table: &TableInfo, loadfile_path: &str) -> Result<u64> {
    let file = std::fs::File::open(loadfile_path)?;
    let reader = BufReader::new(file);
    let mut loaded = 0u64;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            break;
        }

        match parse_loadfile_line(&line) {
            Ok((key, value)) => {
                let locator = table.record_file.append(key, &value)?;
                if let Some(index) = &table.index {
                    index.insert(key, locator)?;
                }
                loaded += 1;
            }
            Err(err) => {
                tracing::warn!(
                    loadfile = loadfile_path,
                    line = line_num + 1,
                    %err,
                    "skipping unparsable loadfile line"
                );
            }
        }
    }

    Ok(loaded)
}
