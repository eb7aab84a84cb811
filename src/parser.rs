use crate::error::{ConvertError, FormatError};
use crate::timecode::Timecode;

use std::collections::HashMap;
use std::iter::Enumerate;

use tracing::debug;

const EVENTS_HEADER: &str = "[Events]";
const FORMAT_PREFIX: &str = "Format:";
const DIALOGUE_PREFIX: &str = "Dialogue:";

/// Trims a raw line and blanks it out if it is a `;` comment.
pub fn preprocess_line(line: &str) -> &str {
    let line = line.trim();
    if line.starts_with(';') {
        ""
    } else {
        line
    }
}

/// Column names declared by the `Format:` line of the `[Events]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<String>,
}

impl ColumnLayout {
    pub fn from_header(line: &str) -> ColumnLayout {
        let payload = line.strip_prefix(FORMAT_PREFIX).unwrap_or(line);
        let columns = payload
            .split(',')
            .map(|c| c.trim().to_lowercase())
            .collect();
        ColumnLayout { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Maps the values of a `Dialogue:` line onto the declared columns.
    ///
    /// The last column takes the rest of the line, commas included.
    pub fn format(&self, line: &str) -> Result<DialogueRecord, FormatError> {
        let payload = line.strip_prefix(DIALOGUE_PREFIX).unwrap_or(line);
        let values: Vec<&str> = payload.splitn(self.columns.len(), ',').collect();
        if values.len() < self.columns.len() {
            return Err(FormatError::TooFewColumns {
                expected: self.columns.len(),
                found: values.len(),
            });
        }

        let fields: HashMap<String, String> = self
            .columns
            .iter()
            .cloned()
            .zip(values.into_iter().map(String::from))
            .collect();

        let timecode = |name: &'static str| {
            fields
                .get(name)
                .ok_or(FormatError::MissingColumn(name))
                .and_then(|value| Timecode::parse(value))
        };
        let start = timecode("start")?;
        let end = timecode("end")?;
        if !fields.contains_key("text") {
            return Err(FormatError::MissingColumn("text"));
        }

        Ok(DialogueRecord { fields, start, end })
    }
}

/// One `Dialogue:` line keyed by column name.
#[derive(Debug, Clone)]
pub struct DialogueRecord {
    fields: HashMap<String, String>,
    pub start: Timecode,
    pub end: Timecode,
}

impl DialogueRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        self.get("text").unwrap_or_default()
    }

    /// Empty when the layout has no `Effect` column.
    pub fn effect(&self) -> &str {
        self.get("effect").unwrap_or_default()
    }
}

/// The dialogue lines of an `[Events]` section, read lazily from the
/// underlying line source.
///
/// Yields each `Dialogue:` line with its 1-based line number and stops at
/// the next section header.
pub struct EventsTable<I> {
    layout: ColumnLayout,
    lines: Enumerate<I>,
    finished: bool,
}

impl<I> EventsTable<I> {
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }
}

/// Skips ahead to the `[Events]` section and reads its `Format:` header.
pub fn locate_events<I, S>(lines: I) -> Result<EventsTable<I::IntoIter>, ConvertError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter().enumerate();

    for (_, line) in lines.by_ref() {
        if preprocess_line(line.as_ref()).starts_with(EVENTS_HEADER) {
            break;
        }
    }

    for (idx, line) in lines.by_ref() {
        let line = preprocess_line(line.as_ref());
        if line.starts_with(FORMAT_PREFIX) {
            let layout = ColumnLayout::from_header(line);
            debug!(line = idx + 1, columns = ?layout.columns(), "found Events format header");
            return Ok(EventsTable {
                layout,
                lines,
                finished: false,
            });
        }
    }

    Err(ConvertError::MissingFormat)
}

impl<I, S> Iterator for EventsTable<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = (usize, String);

    fn next(&mut self) -> Option<(usize, String)> {
        if self.finished {
            return None;
        }
        for (idx, line) in self.lines.by_ref() {
            let line = preprocess_line(line.as_ref());
            if line.starts_with('[') {
                self.finished = true;
                return None;
            }
            if line.starts_with(DIALOGUE_PREFIX) {
                return Some((idx + 1, line.to_string()));
            }
        }
        self.finished = true;
        None
    }
}
