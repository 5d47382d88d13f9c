//! Marker reports: the `QR:` line parser and the single-slot store the
//! state machine reads from.
//!
//! Wire form, one report per line:
//!
//! ```text
//! QR:<id>,<cx>,<cy>,<width>,<height>
//! ```
//!
//! `<cx>`/`<cy>` may carry a leading `-`, width and height may not. The id is
//! everything up to the first comma and is cut down to 31 bytes. Bytes that
//! are not UTF-8 become U+FFFD.

use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::config::NavigationConfig;

pub const REPORT_PREFIX: &[u8; 3] = b"QR:";
pub const MARKER_ID_CAPACITY: usize = 31;

pub type MarkerId = heapless::String<MARKER_ID_CAPACITY>;

/// The latest sighting of the target marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkerObservation {
    pub id: MarkerId,
    pub center_x: i32,
    pub center_y: i32,
    pub width: u32,
    pub height: u32,
    pub valid: bool,
    pub observed_at: u64,
}

impl MarkerObservation {
    /// Signed horizontal distance from the frame centre, positive to the right.
    pub fn x_offset(&self, frame_center_x: i32) -> i64 {
        i64::from(self.center_x) - i64::from(frame_center_x)
    }

    /// Positive when the marker looks bigger (closer) than `target`.
    pub fn width_error(&self, target: u32) -> i64 {
        i64::from(self.width) - i64::from(target)
    }
}

/// Which field of the report a parse failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    CenterX,
    CenterY,
    Width,
    Height,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Id => "id",
            Field::CenterX => "center x",
            Field::CenterY => "center y",
            Field::Width => "width",
            Field::Height => "height",
        })
    }
}

/// Why a line did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line is not a marker report")]
    NotAReport,
    #[error("marker id is empty")]
    EmptyId,
    #[error("missing ',' after {0}")]
    MissingDelimiter(Field),
    #[error("no digits in {0}")]
    MissingDigits(Field),
    #[error("{0} does not fit in 32 bits")]
    Overflow(Field),
    #[error("unexpected bytes after height")]
    TrailingBytes,
    #[error("marker width {width} outside {min}..={max}")]
    WidthOutOfRange { width: u32, min: u32, max: u32 },
}

/// Fields decoded from one report line, before any range checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerReport {
    pub id: MarkerId,
    pub center_x: i32,
    pub center_y: i32,
    pub width: u32,
    pub height: u32,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.pos..).unwrap_or_default()
    }

    fn comma_after(&mut self, field: Field) -> Result<(), ParseError> {
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(ParseError::MissingDelimiter(field)),
        }
    }

    fn id_run(&mut self) -> &'a [u8] {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b',' | b'\n' | b'\r') {
                break;
            }
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }

    fn unsigned(&mut self, field: Field) -> Result<u32, ParseError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(byte @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(byte - b'0')))
                .ok_or(ParseError::Overflow(field))?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ParseError::MissingDigits(field));
        }
        Ok(value)
    }

    fn signed(&mut self, field: Field) -> Result<i32, ParseError> {
        let negative = self.peek() == Some(b'-');
        if negative {
            self.pos += 1;
        }
        let magnitude = i64::from(self.unsigned(field)?);
        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value).map_err(|_| ParseError::Overflow(field))
    }

    fn end_of_line(&self) -> Result<(), ParseError> {
        match self.rest() {
            b"" | b"\n" | b"\r" | b"\r\n" => Ok(()),
            _ => Err(ParseError::TrailingBytes),
        }
    }
}

fn bounded_id(raw: &[u8]) -> MarkerId {
    let mut id = MarkerId::new();
    for ch in String::from_utf8_lossy(raw).chars() {
        if id.push(ch).is_err() {
            break;
        }
    }
    id
}

/// Decodes one `QR:` line. Purely syntactic: the width range is checked by
/// [`ObservationStore::accept`].
///
/// Stricter than the detector's own reader: empty numeric fields and any
/// bytes after the height other than a line ending are rejected.
pub fn parse_report(line: &[u8]) -> Result<MarkerReport, ParseError> {
    let body = line
        .strip_prefix(REPORT_PREFIX.as_slice())
        .ok_or(ParseError::NotAReport)?;
    let mut cursor = Cursor { bytes: body, pos: 0 };

    let raw_id = cursor.id_run();
    cursor.comma_after(Field::Id)?;
    if raw_id.is_empty() {
        return Err(ParseError::EmptyId);
    }
    let id = bounded_id(raw_id);

    let center_x = cursor.signed(Field::CenterX)?;
    cursor.comma_after(Field::CenterX)?;
    let center_y = cursor.signed(Field::CenterY)?;
    cursor.comma_after(Field::CenterY)?;
    let width = cursor.unsigned(Field::Width)?;
    cursor.comma_after(Field::Width)?;
    let height = cursor.unsigned(Field::Height)?;
    cursor.end_of_line()?;

    Ok(MarkerReport {
        id,
        center_x,
        center_y,
        width,
        height,
    })
}

/// Borrowed view of the store with the staleness check already applied.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub observation: &'a MarkerObservation,
    pub valid: bool,
}

/// Holds the single most recent accepted observation.
#[derive(Debug, Clone)]
pub struct ObservationStore {
    held: MarkerObservation,
    last_update: u64,
    width_range: RangeInclusive<u32>,
    timeout_ms: u64,
}

impl ObservationStore {
    pub fn new(width_range: RangeInclusive<u32>, timeout_ms: u64) -> Self {
        ObservationStore {
            held: MarkerObservation::default(),
            last_update: 0,
            width_range,
            timeout_ms,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.width_min..=config.width_max, config.timeout_ms)
    }

    /// Parses `line` and records it when it passes every check.
    /// Leaves the store untouched on any error.
    pub fn ingest(&mut self, line: &[u8], now: u64) -> Result<(), ParseError> {
        let report = parse_report(line)?;
        self.accept(report, now)
    }

    pub fn accept(&mut self, report: MarkerReport, now: u64) -> Result<(), ParseError> {
        if !self.width_range.contains(&report.width) {
            return Err(ParseError::WidthOutOfRange {
                width: report.width,
                min: *self.width_range.start(),
                max: *self.width_range.end(),
            });
        }
        self.record(
            MarkerObservation {
                id: report.id,
                center_x: report.center_x,
                center_y: report.center_y,
                width: report.width,
                height: report.height,
                valid: true,
                observed_at: now,
            },
            now,
        );
        Ok(())
    }

    /// Overwrites the held value, last write wins.
    pub fn record(&mut self, observation: MarkerObservation, now: u64) {
        self.held = observation;
        self.last_update = now;
    }

    pub fn current(&self, now: u64) -> Snapshot<'_> {
        Snapshot {
            observation: &self.held,
            valid: self.held.valid && !self.timed_out(now),
        }
    }

    /// Held value still claims to be valid but the timeout has passed.
    pub fn is_stale(&self, now: u64) -> bool {
        self.held.valid && self.timed_out(now)
    }

    /// Clears the valid flag of a stale value. Returns whether it did.
    pub fn expire(&mut self, now: u64) -> bool {
        if self.is_stale(now) {
            self.held.valid = false;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.held = MarkerObservation::default();
        self.last_update = 0;
    }

    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    fn timed_out(&self, now: u64) -> bool {
        now.saturating_sub(self.last_update) > self.timeout_ms
    }
}
