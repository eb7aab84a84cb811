use crate::timecode::{Timecode, TimecodeStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub start: Timecode,
    pub end: Timecode,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Srt,
    Vtt,
    Xml,
}

impl OutputFormat {
    /// Looks up a format by name. Only the exact names `vtt` and `xml`
    /// are recognised; every other name means SRT.
    pub fn from_name(name: &str) -> OutputFormat {
        match name {
            "vtt" => OutputFormat::Vtt,
            "xml" => OutputFormat::Xml,
            _ => OutputFormat::Srt,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Xml => "xml",
        }
    }

    /// XML shares the dot-punctuated flavour with WebVTT.
    pub fn timecode_style(self) -> TimecodeStyle {
        match self {
            OutputFormat::Vtt | OutputFormat::Xml => TimecodeStyle::Vtt,
            OutputFormat::Srt => TimecodeStyle::Srt,
        }
    }
}
