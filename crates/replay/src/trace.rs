//! Line-oriented event-trace loader.
//!
//! The CLI replays recorded pipeline events against the bridge. One event
//! per line, fields whitespace-separated, `#` starts a comment:
//!
//! ```text
//! insert <addr> <seq> <epoch> [thread] [type]
//! check  <addr> <seq> <epoch> [thread] [type]
//! squash <addr> <seq> <epoch> [thread] [type]
//! retire <addr> <seq> <epoch> [thread] [type]
//! clear  <addr> <seq> <epoch> [thread] [type]
//! refer  <pc> <tick> [thread]
//! fetch  <pc> <tick> [thread]
//! ```
//!
//! Numbers parse as decimal or `0x`-prefixed hexadecimal. Malformed lines
//! fail the load with their line number.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::inst::InstDescriptor;

/// One recorded pipeline event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// Squashed instruction recorded in the buffer.
    Insert(InstDescriptor),
    /// Pre-issue replay query.
    Check(InstDescriptor),
    /// Squash event reported to the buffer.
    Squash(InstDescriptor),
    /// Instruction commit.
    Retire(InstDescriptor),
    /// Generation/epoch ageing.
    Clear(InstDescriptor),
    /// Counter-cache reference.
    Refer {
        /// Hardware thread whose cache is referenced.
        thread: usize,
        /// Program counter of the load.
        pc: u64,
        /// Current simulation tick.
        tick: u64,
    },
    /// Counter-cache fill.
    Fetch {
        /// Hardware thread whose cache is filled.
        thread: usize,
        /// Program counter of the load.
        pc: u64,
        /// Current simulation tick.
        tick: u64,
    },
}

/// Failure while loading a trace file.
#[derive(Debug)]
pub enum TraceError {
    /// The file could not be read.
    Io(io::Error),
    /// A line did not parse.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(e) => write!(f, "trace file unreadable: {}", e),
            TraceError::Parse { line, message } => write!(f, "trace line {}: {}", line, message),
        }
    }
}

impl std::error::Error for TraceError {}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        TraceError::Io(e)
    }
}

fn parse_u64(field: &str) -> Result<u64, String> {
    let parsed = if let Some(hex) = field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        field.parse()
    };
    parsed.map_err(|_| format!("bad number `{}`", field))
}

fn parse_inst(fields: &[&str]) -> Result<InstDescriptor, String> {
    if fields.len() < 3 || fields.len() > 5 {
        return Err(format!(
            "expected `<addr> <seq> <epoch> [thread] [type]`, got {} fields",
            fields.len()
        ));
    }
    let addr = parse_u64(fields[0])?;
    let seq = parse_u64(fields[1])?;
    let epoch = parse_u64(fields[2])?;
    let thread = match fields.get(3) {
        Some(f) => u16::try_from(parse_u64(f)?).map_err(|_| format!("thread `{}` too large", f))?,
        None => 0,
    };
    let mut inst = InstDescriptor::new(addr, seq, epoch, thread);
    if let Some(code) = fields.get(4) {
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => inst.type_code = c,
            _ => return Err(format!("type code `{}` is not a single character", code)),
        }
    }
    Ok(inst)
}

fn parse_cache(fields: &[&str]) -> Result<(usize, u64, u64), String> {
    if fields.len() < 2 || fields.len() > 3 {
        return Err(format!(
            "expected `<pc> <tick> [thread]`, got {} fields",
            fields.len()
        ));
    }
    let pc = parse_u64(fields[0])?;
    let tick = parse_u64(fields[1])?;
    let thread = match fields.get(2) {
        Some(f) => parse_u64(f)? as usize,
        None => 0,
    };
    Ok((thread, pc, tick))
}

/// Parses one trace line; blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<TraceEvent>, String> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (op, rest) = (fields[0], &fields[1..]);
    let event = match op {
        "insert" => TraceEvent::Insert(parse_inst(rest)?),
        "check" => TraceEvent::Check(parse_inst(rest)?),
        "squash" => TraceEvent::Squash(parse_inst(rest)?),
        "retire" => TraceEvent::Retire(parse_inst(rest)?),
        "clear" => TraceEvent::Clear(parse_inst(rest)?),
        "refer" => {
            let (thread, pc, tick) = parse_cache(rest)?;
            TraceEvent::Refer { thread, pc, tick }
        }
        "fetch" => {
            let (thread, pc, tick) = parse_cache(rest)?;
            TraceEvent::Fetch { thread, pc, tick }
        }
        other => return Err(format!("unknown event `{}`", other)),
    };
    Ok(Some(event))
}

/// Loads every event from the file at `path`.
pub fn load_trace(path: &Path) -> Result<Vec<TraceEvent>, TraceError> {
    let contents = fs::read_to_string(path)?;
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(message) => {
                return Err(TraceError::Parse {
                    line: index + 1,
                    message,
                })
            }
        }
    }
    Ok(events)
}
