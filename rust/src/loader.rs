//! Process list loader.
//!
//! Reads one process per line: `id,name,priority,cycles[,resource]`.
//! Lines with fewer than four fields are skipped. A malformed number aborts the
//! whole load. Resource names the scheduler does not know are ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::log_changes;
use crate::models::{PriorityBand, ProcessRecord, ResourceKind};

/// Errors that abort loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("process file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read process file: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: invalid {field} {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: duplicate process id {id}")]
    DuplicateId { line: usize, id: u32 },
}

/// Load records from a file.
pub fn load_from_path(
    path: impl AsRef<Path>,
    verbosity: u8,
) -> Result<Vec<ProcessRecord>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })?;
    parse_records(BufReader::new(file), verbosity)
}

/// Parse records from any line source, in file order.
pub fn parse_records<R: BufRead>(
    reader: R,
    verbosity: u8,
) -> Result<Vec<ProcessRecord>, LoadError> {
    let mut records: Vec<ProcessRecord> = Vec::new();
    let mut seen: FxHashSet<u32> = FxHashSet::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(|s| s.trim()).collect();
        if parts.len() < 4 {
            continue;
        }

        let id: u32 = parse_field(parts[0], line_no, "id")?;
        let name = parts[1];
        let band = parse_priority(parts[2], line_no)?;
        let cycles: u32 = parse_field(parts[3], line_no, "cycles")?;
        let resource = match parts.get(4).filter(|field| !field.is_empty()) {
            Some(field) => {
                let kind = ResourceKind::from_name(field);
                if kind.is_none() {
                    log_changes!(
                        verbosity,
                        "line {}: ignoring unknown resource {:?} for process {}",
                        line_no,
                        field,
                        id
                    );
                }
                kind
            }
            None => None,
        };

        if !seen.insert(id) {
            return Err(LoadError::DuplicateId { line: line_no, id });
        }

        records.push(ProcessRecord::new(
            id,
            name,
            band,
            cycles,
            resource,
        ));
    }

    Ok(records)
}

/// Parse the priority level. Integers too large for `i64` fall into Low like
/// any other level outside 1-2.
fn parse_priority(value: &str, line: usize) -> Result<PriorityBand, LoadError> {
    match value.parse::<i64>() {
        Ok(level) => Ok(PriorityBand::from_level(level)),
        Err(_) if is_integer_literal(value) => Ok(PriorityBand::Low),
        Err(_) => Err(LoadError::InvalidNumber {
            line,
            field: "priority",
            value: value.to_string(),
        }),
    }
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    line: usize,
    field: &'static str,
) -> Result<T, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}
