//! Converts ASS/SSA subtitles into SRT, WebVTT or a small XML format.
//!
//! ```
//! let ass = "[Events]\n\
//!            Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
//!            Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,Hello {\\i1}world{\\i0}\n";
//! let srt = asstosrt::convert(ass.lines(), None, &Default::default()).unwrap();
//! assert_eq!(srt, "1\r\n00:00:01,000 --> 00:00:03,000\r\nHello world\r\n\r\n");
//! ```

pub mod batch;
pub mod error;
pub mod parser;
pub mod processor;
pub mod serialiser;
pub mod subtitle;
pub mod timecode;
pub mod translate;

pub use crate::error::{ConvertError, FormatError};
pub use crate::subtitle::{OutputFormat, Subtitle};
pub use crate::timecode::{Timecode, TimecodeStyle};
pub use crate::translate::{DictionaryTranslator, Translator};

use crate::processor::ProcessOpts;

use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Drop dialogue that has anything in its `Effect` column.
    pub no_effect: bool,
    /// Keep only the first line of multi-line dialogue.
    pub only_first_line: bool,
    pub output_format: OutputFormat,
    /// Skip dialogue lines that fail to parse instead of aborting.
    pub skip_malformed: bool,
}

/// Converts the lines of an ASS/SSA file into a complete output document.
///
/// The line source is read once, front to back. Unless
/// `skip_malformed` is set, the first malformed dialogue line aborts the
/// conversion.
pub fn convert<I, S>(
    lines: I,
    translator: Option<&dyn Translator>,
    opts: &ConvertOptions,
) -> Result<String, ConvertError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let table = parser::locate_events(lines)?;
    let layout = table.layout().clone();
    let process_opts = ProcessOpts {
        no_effect: opts.no_effect,
        only_first_line: opts.only_first_line,
        translator,
    };

    let mut subs = Vec::new();
    for (line, dialogue) in table {
        let record = match layout.format(&dialogue) {
            Ok(record) => record,
            Err(source) if opts.skip_malformed => {
                warn!(line, error = %source, "skipping malformed dialogue");
                continue;
            }
            Err(source) => return Err(ConvertError::Format { line, source }),
        };
        if let Some(sub) = processor::process(&record, &process_opts) {
            subs.push(sub);
        }
    }
    debug!(events = subs.len(), format = ?opts.output_format, "rendering subtitles");

    Ok(serialiser::serialise(subs, opts.output_format)?)
}
