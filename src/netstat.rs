// Parsing of the `IpExt` table in /proc/net/netstat

use crate::models::NetworkCounters;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Line prefix of the extended IP counters table.
pub const IP_EXT_PREFIX: &str = "IpExt:";

const RECEIVED_FIELD: &str = "InOctets";
const SENT_FIELD: &str = "OutOctets";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid value '{value}' in column {column}: {source}")]
    InvalidValue {
        value: String,
        column: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("no value for field '{field}' (header has {header_len} columns, content has {content_len})")]
    MissingValue {
        field: String,
        header_len: usize,
        content_len: usize,
    },
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("cannot read {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no IpExt header/content pair in {}", .path.display())]
    MissingTable { path: PathBuf },

    #[error("malformed IpExt table: {0}")]
    Parse(#[from] ParseError),
}

/// Maps every header field to its value and picks out the byte counters.
/// Fields missing from the header count as zero; a header column without a
/// matching value is an error.
pub fn parse_counters(header: &str, content: &str) -> Result<NetworkCounters, ParseError> {
    let values = content
        .split_whitespace()
        .enumerate()
        .map(|(column, token)| {
            token.parse::<u64>().map_err(|source| ParseError::InvalidValue {
                value: token.to_string(),
                column,
                source,
            })
        })
        .collect::<Result<Vec<u64>, _>>()?;

    let fields: Vec<&str> = header.split_whitespace().collect();
    let mut mapped: HashMap<&str, u64> = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let value = values.get(i).copied().ok_or_else(|| ParseError::MissingValue {
            field: field.to_string(),
            header_len: fields.len(),
            content_len: values.len(),
        })?;
        mapped.insert(*field, value);
    }

    Ok(NetworkCounters {
        received_octets: mapped.get(RECEIVED_FIELD).copied().unwrap_or(0),
        sent_octets: mapped.get(SENT_FIELD).copied().unwrap_or(0),
    })
}

/// Finds the first `IpExt:` header line and the first `IpExt:` line after it.
/// Returned strings have the prefix stripped.
pub fn scan_ip_ext<B: BufRead>(reader: B) -> std::io::Result<Option<(String, String)>> {
    let mut header: Option<String> = None;
    for line in reader.lines() {
        let line = line?;
        let Some(rest) = line.strip_prefix(IP_EXT_PREFIX) else {
            continue;
        };
        let rest = rest.trim().to_string();
        match header.take() {
            None => header = Some(rest),
            Some(header) => return Ok(Some((header, rest))),
        }
    }
    Ok(None)
}

/// Reads the counters from `path` as seen by the calling thread's network namespace.
pub fn read_counters(path: &Path) -> Result<NetworkCounters, StatsError> {
    let unavailable = |source| StatsError::Unavailable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unavailable)?;
    let (header, content) = scan_ip_ext(BufReader::new(file))
        .map_err(unavailable)?
        .ok_or_else(|| StatsError::MissingTable {
            path: path.to_path_buf(),
        })?;
    Ok(parse_counters(&header, &content)?)
}
