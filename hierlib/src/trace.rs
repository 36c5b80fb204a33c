use std::fmt;
use std::io::Write;
use lazy_static::lazy_static;
use regex::Regex;
use crate::cache::AccessKind;
use crate::error::TraceError;

lazy_static! {
    static ref TRACE_LINE: Regex = Regex::new(r"^(?:(?P<kind>[RrWw])\s+)?(?P<address>0[xX][0-9a-fA-F]+|[0-9]+)$").unwrap();
}

/// One access in a trace. Untyped accesses carry no kind
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TraceEntry {
    pub address: u64,
    pub kind: Option<AccessKind>,
}

impl TraceEntry {
    pub fn untyped(address: u64) -> Self {
        Self { address, kind: None }
    }

    pub fn load(address: u64) -> Self {
        Self { address, kind: Some(AccessKind::Load) }
    }

    pub fn store(address: u64) -> Self {
        Self { address, kind: Some(AccessKind::Store) }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            None => write!(f, "{:#x}", self.address),
            Some(AccessKind::Load) => write!(f, "R {:#x}", self.address),
            Some(AccessKind::Store) => write!(f, "W {:#x}", self.address),
        }
    }
}

/// Parses a single trace line
///
/// returns: Ok(None) for blank lines and `#` comments
///
/// # Examples
///
/// ```
/// use hierlib::trace::{parse_line, TraceEntry};
/// assert_eq!(parse_line("W 0x1000", 1).unwrap(), Some(TraceEntry::store(4096)));
/// assert_eq!(parse_line("# warm up", 2).unwrap(), None);
/// ```
pub fn parse_line(input: &str, line: usize) -> Result<Option<TraceEntry>, TraceError> {
    let input = input.trim();
    if input.is_empty() || input.starts_with('#') {
        return Ok(None);
    }
    let captures = TRACE_LINE.captures(input).ok_or_else(|| TraceError::Malformed {
        line,
        content: input.to_string(),
    })?;
    let address = &captures["address"];
    let address = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => address.parse::<u64>(),
    }
    .map_err(|source| TraceError::InvalidAddress { line, source })?;
    let kind = captures.name("kind").map(|k| match k.as_str() {
        "W" | "w" => AccessKind::Store,
        _ => AccessKind::Load,
    });
    Ok(Some(TraceEntry { address, kind }))
}

/// Parses a whole trace held in memory, such as a memory mapped file
///
/// Lines are numbered from 1 in errors
pub fn parse_trace(bytes: &[u8]) -> Result<Vec<TraceEntry>, TraceError> {
    let mut entries = Vec::new();
    for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = index + 1;
        let text = std::str::from_utf8(raw).map_err(|_| TraceError::Encoding { line })?;
        if let Some(entry) = parse_line(text, line)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Writes entries in the text format accepted by [`parse_trace`], one per line
pub fn write_trace<W: Write>(mut out: W, entries: &[TraceEntry]) -> Result<(), TraceError> {
    for entry in entries {
        writeln!(out, "{entry}")?;
    }
    out.flush()?;
    Ok(())
}
