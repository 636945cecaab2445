use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseIntError;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::hash_table::{HashTable, HashTableError};
use crate::reservation::Reservation;

/// Date layout of the check-in and check-out fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of comma-separated fields in a reservation line
pub const FIELD_COUNT: usize = 5;

/// What the loader does with a line whose room number or dates fail to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorPolicy {
    /// Fail the whole load; no table is produced
    #[default]
    Abort,
    /// Log the line, count it and keep going
    Skip,
}

/// A reservation line with the right shape but an unparsable field
#[derive(Debug)]
pub enum RecordError {
    RoomNumber { value: String, source: ParseIntError },
    /// Not laid out as `yyyy-MM-dd` with zero-padded fields
    DateShape { field: &'static str, value: String },
    Date { field: &'static str, value: String, source: chrono::ParseError },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::RoomNumber { value, source } => {
                write!(f, "invalid room number '{}': {}", value, source)
            }
            RecordError::DateShape { field, value } => {
                write!(f, "invalid {} date '{}': expected yyyy-MM-dd", field, value)
            }
            RecordError::Date { field, value, source } => {
                write!(f, "invalid {} date '{}': {}", field, value, source)
            }
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::RoomNumber { source, .. } => Some(source),
            RecordError::DateShape { .. } => None,
            RecordError::Date { source, .. } => Some(source),
        }
    }
}

/// Reasons a load produces no table
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    /// The source had no first line
    MissingBucketCount,
    /// The first line is not a positive integer
    InvalidBucketCount(String),
    /// A field failed to parse under `ParseErrorPolicy::Abort`; `line` is 1-based
    Record { line: usize, source: RecordError },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "IO error: {}", e),
            LoadError::MissingBucketCount => write!(f, "missing bucket count line"),
            LoadError::InvalidBucketCount(value) => {
                write!(f, "bucket count must be a positive integer, got '{}'", value)
            }
            LoadError::Record { line, source } => write!(f, "line {}: {}", line, source),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Record { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        LoadError::Io(error)
    }
}

/// Counts gathered while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines that produced a put (overwrites included)
    pub loaded: usize,
    /// Lines without exactly five fields
    pub skipped_shape: usize,
    /// Lines dropped under `ParseErrorPolicy::Skip`
    pub skipped_invalid: usize,
}

/// Builds a reservation table from the line-oriented text format:
/// a bucket count on the first line, then `code,hotel,room,checkin,checkout` records
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    policy: ParseErrorPolicy,
}

impl Loader {
    pub fn new(policy: ParseErrorPolicy) -> Loader {
        Loader { policy }
    }

    pub fn policy(&self) -> ParseErrorPolicy {
        self.policy
    }

    /// Opens `path` and loads it
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<(HashTable<Reservation>, LoadReport), LoadError> {
        let path = path.as_ref();
        debug!("loading reservations from {}", path.display());
        let file = File::open(path)?;
        self.load_reader(BufReader::new(file))
    }

    /// Loads from any buffered source
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<(HashTable<Reservation>, LoadReport), LoadError> {
        let mut lines = reader.lines();

        let first = lines.next().ok_or(LoadError::MissingBucketCount)??;
        let mut table = HashTable::new(parse_bucket_count(&first)?)
            .map_err(|_: HashTableError| LoadError::InvalidBucketCount(first.trim().to_string()))?;
        let mut report = LoadReport::default();

        for (offset, line) in lines.enumerate() {
            let line = line?;
            let line_number = offset + 2;

            match parse_record(&line) {
                Ok(Some((code, reservation))) => {
                    table.put(&code, reservation);
                    report.loaded += 1;
                }
                Ok(None) => {
                    debug!("line {}: skipped, expected {} fields", line_number, FIELD_COUNT);
                    report.skipped_shape += 1;
                }
                Err(e) => match self.policy {
                    ParseErrorPolicy::Abort => {
                        return Err(LoadError::Record { line: line_number, source: e });
                    }
                    ParseErrorPolicy::Skip => {
                        warn!("line {}: skipped, {}", line_number, e);
                        report.skipped_invalid += 1;
                    }
                },
            }
        }

        info!(
            "loaded {} reservations into {} buckets ({} malformed lines, {} invalid lines skipped)",
            table.len(),
            table.num_buckets(),
            report.skipped_shape,
            report.skipped_invalid
        );
        Ok((table, report))
    }
}

fn parse_bucket_count(line: &str) -> Result<usize, LoadError> {
    let value = line.trim();
    let count: i64 = value
        .parse()
        .map_err(|_| LoadError::InvalidBucketCount(value.to_string()))?;
    if count <= 0 {
        return Err(LoadError::InvalidBucketCount(value.to_string()));
    }
    usize::try_from(count).map_err(|_| LoadError::InvalidBucketCount(value.to_string()))
}

/// Parses one `code,hotel,room,checkin,checkout` line.
/// Returns `Ok(None)` when the line does not have exactly five fields.
pub fn parse_record(line: &str) -> Result<Option<(String, Reservation)>, RecordError> {
    let fields = split_fields(line);
    if fields.len() != FIELD_COUNT {
        return Ok(None);
    }

    let code = fields[0].trim();
    let hotel_name = fields[1].trim();

    let room = fields[2].trim();
    let room_number = room.parse::<u32>().map_err(|source| RecordError::RoomNumber {
        value: room.to_string(),
        source,
    })?;

    let check_in = parse_date("check-in", fields[3])?;
    let check_out = parse_date("check-out", fields[4])?;

    Ok(Some((code.to_string(), Reservation::new(hotel_name, room_number, check_in, check_out))))
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, RecordError> {
    let value = raw.trim();
    // chrono's %Y/%m/%d also take unpadded or short fields
    if !has_date_shape(value) {
        return Err(RecordError::DateShape { field, value: value.to_string() });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| RecordError::Date {
        field,
        value: value.to_string(),
        source,
    })
}

/// Four-digit year, two-digit month and day, dash separated
fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, byte)| match i {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Splits on commas, dropping trailing empty fields so that `a,b,c,d,`
/// counts as four fields
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.len() > 1 && fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}
