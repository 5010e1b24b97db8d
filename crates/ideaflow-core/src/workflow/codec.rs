//! Workflow log codec — the text format shared with every log consumer.
//!
//! One entry per agent transition:
//!
//! ```text
//! [Design] received: eco-friendly water bottle
//! [Design] response: Three design directions...
//! [Marketing] received: Three design directions...
//! ```
//!
//! A serialized log is the encoded entries joined with `\n`. Content may span
//! several lines; it runs until the line break that precedes the next marker
//! (or the end of the log). Markers are only recognised at the start of a line,
//! so content is well-formed as long as none of its own lines begins with
//! `[Name] received:` or `[Name] response:`.
//!
//! Decoding is deliberately permissive: text before the first marker is
//! dropped, and bracketed text that is not a marker stays part of the current
//! entry's content. Decoding never fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const RECEIVED_TAG: &str = "received";
const RESPONSE_TAG: &str = "response";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("agent name must not be empty")]
    EmptyAgent,

    #[error("agent name {0:?} contains a bracket or line break")]
    InvalidAgentName(String),

    #[error("unknown direction {0:?} (expected \"received\" or \"response\")")]
    UnknownDirection(String),
}

/// Which side of an agent transition an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The input handed to the agent
    Received,
    /// The text the agent produced
    Response,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Received => RECEIVED_TAG,
            Direction::Response => RESPONSE_TAG,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            RECEIVED_TAG => Ok(Direction::Received),
            RESPONSE_TAG => Ok(Direction::Response),
            other => Err(EncodeError::UnknownDirection(other.to_string())),
        }
    }
}

/// A single in-memory log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowLogEntry {
    pub agent: String,
    pub direction: Direction,
    pub content: String,
}

impl WorkflowLogEntry {
    pub fn received(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            direction: Direction::Received,
            content: content.into(),
        }
    }

    pub fn response(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            direction: Direction::Response,
            content: content.into(),
        }
    }

    /// Build an entry from untyped parts, e.g. values coming off the wire.
    pub fn from_parts(agent: &str, direction: &str, content: &str) -> Result<Self, EncodeError> {
        validate_agent_name(agent)?;
        Ok(Self {
            agent: agent.to_string(),
            direction: direction.parse()?,
            content: content.to_string(),
        })
    }
}

/// A step reconstructed from serialized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedStep {
    pub agent_name: String,
    #[serde(rename = "type")]
    pub step_type: Direction,
    pub content: String,
}

impl From<DecodedStep> for WorkflowLogEntry {
    fn from(step: DecodedStep) -> Self {
        Self {
            agent: step.agent_name,
            direction: step.step_type,
            content: step.content,
        }
    }
}

impl From<&WorkflowLogEntry> for DecodedStep {
    fn from(entry: &WorkflowLogEntry) -> Self {
        Self {
            agent_name: entry.agent.clone(),
            step_type: entry.direction,
            content: entry.content.clone(),
        }
    }
}

/// Check that a name can appear inside a `[Name]` marker.
pub fn validate_agent_name(name: &str) -> Result<(), EncodeError> {
    if name.is_empty() {
        return Err(EncodeError::EmptyAgent);
    }
    if !is_marker_name(name) {
        return Err(EncodeError::InvalidAgentName(name.to_string()));
    }
    Ok(())
}

fn is_marker_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['[', ']', '\r', '\n'])
}

/// Encode one entry as `[<agent>] <direction>: <content>`.
pub fn encode(entry: &WorkflowLogEntry) -> Result<String, EncodeError> {
    validate_agent_name(&entry.agent)?;
    Ok(format_entry(entry))
}

/// Encode a sequence of entries into one serialized log.
pub fn encode_log<'a, I>(entries: I) -> Result<String, EncodeError>
where
    I: IntoIterator<Item = &'a WorkflowLogEntry>,
{
    let lines = entries
        .into_iter()
        .map(encode)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

pub(crate) fn format_entry(entry: &WorkflowLogEntry) -> String {
    format!("[{}] {}: {}", entry.agent, entry.direction, entry.content)
}

/// A marker found at the start of a line.
struct Marker<'a> {
    /// Byte offset of the `[` that opens the marker
    line_start: usize,
    /// Byte offset where the entry's content begins
    content_start: usize,
    agent: &'a str,
    direction: Direction,
}

/// Parse a marker at the very beginning of `line`.
///
/// Returns the agent name, direction, and the number of bytes the marker
/// occupies (including the single space after the colon, when present).
fn parse_marker(line: &str) -> Option<(&str, Direction, usize)> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let agent = &rest[..close];
    if !is_marker_name(agent) {
        return None;
    }

    let after_name = rest[close + 1..].strip_prefix(' ')?;
    let (direction, tail) = if let Some(tail) = after_name.strip_prefix("received:") {
        (Direction::Received, tail)
    } else if let Some(tail) = after_name.strip_prefix("response:") {
        (Direction::Response, tail)
    } else {
        return None;
    };

    let mut consumed = line.len() - tail.len();
    if tail.starts_with(' ') {
        consumed += 1;
    }
    Some((agent, direction, consumed))
}

fn scan_markers(serialized: &str) -> Vec<Marker<'_>> {
    let mut markers = Vec::new();
    let mut line_start = 0;

    loop {
        let line = &serialized[line_start..];
        if let Some((agent, direction, len)) = parse_marker(line) {
            markers.push(Marker {
                line_start,
                content_start: line_start + len,
                agent,
                direction,
            });
        }
        match line.find('\n') {
            Some(offset) => line_start += offset + 1,
            None => break,
        }
    }

    markers
}

/// Decode a serialized log into its steps, in log order.
pub fn decode(serialized: &str) -> Vec<DecodedStep> {
    let markers = scan_markers(serialized);

    markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            // Content stops at the line break in front of the next marker.
            let end = markers
                .get(i + 1)
                .map(|next| next.line_start - 1)
                .unwrap_or(serialized.len());
            DecodedStep {
                agent_name: marker.agent.to_string(),
                step_type: marker.direction,
                content: serialized[marker.content_start..end].to_string(),
            }
        })
        .collect()
}

/// Decode the wire form of a log: one encoded entry per element.
pub fn decode_lines<S: AsRef<str>>(lines: &[S]) -> Vec<DecodedStep> {
    let joined = lines
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    decode(&joined)
}
