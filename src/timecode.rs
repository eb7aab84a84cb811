use crate::error::FormatError;

use std::fmt;
use std::ops::Sub;

use nom::bytes::complete::tag;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::error::VerboseError;
use nom::sequence::pair;
use nom::IResult;

/// Punctuation used when a timecode is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeStyle {
    /// `HH:MM:SS,mmm`
    Srt,
    /// `HH:MM:SS.mmm`
    Vtt,
}

impl TimecodeStyle {
    fn millis_separator(self) -> char {
        match self {
            TimecodeStyle::Srt => ',',
            TimecodeStyle::Vtt => '.',
        }
    }
}

/// A point in time on the subtitle track.
///
/// `subsecond` holds milliseconds. Ordering is lexicographic over the
/// fields, hour first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub subsecond: u32,
}

impl Timecode {
    /// Parses an ASS timestamp such as `0:01:02.34`.
    ///
    /// The fractional part is in centiseconds. A negative fractional part
    /// is accepted and clamped to zero.
    pub fn parse(input: &str) -> Result<Timecode, FormatError> {
        match all_consuming(ass_timestamp)(input.trim()) {
            Ok((_, (hour, minute, second, centis))) => {
                let subsecond = if centis < 0 {
                    0
                } else {
                    centis
                        .checked_mul(10)
                        .and_then(|ms| u32::try_from(ms).ok())
                        .ok_or_else(|| FormatError::InvalidTimecode(input.to_string()))?
                };
                Ok(Timecode {
                    hour,
                    minute,
                    second,
                    subsecond,
                })
            }
            Err(_) => Err(FormatError::InvalidTimecode(input.to_string())),
        }
    }

    pub fn display(self, style: TimecodeStyle) -> StyledTimecode {
        StyledTimecode {
            timecode: self,
            style,
        }
    }

    pub fn to_srt_string(self) -> String {
        self.display(TimecodeStyle::Srt).to_string()
    }

    pub fn to_vtt_string(self) -> String {
        self.display(TimecodeStyle::Vtt).to_string()
    }
}

/// Seconds elapsed from `other` to `self`; negative when `self` is earlier.
impl Sub for Timecode {
    type Output = f64;

    fn sub(self, other: Timecode) -> f64 {
        let diff = |a: u32, b: u32| f64::from(a) - f64::from(b);
        diff(self.hour, other.hour) * 3600.0
            + diff(self.minute, other.minute) * 60.0
            + diff(self.second, other.second)
            + diff(self.subsecond, other.subsecond) / 1000.0
    }
}

pub struct StyledTimecode {
    timecode: Timecode,
    style: TimecodeStyle,
}

impl fmt::Display for StyledTimecode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tc = &self.timecode;
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:03}",
            tc.hour,
            tc.minute,
            tc.second,
            self.style.millis_separator(),
            tc.subsecond
        )
    }
}

fn ass_timestamp(input: &str) -> IResult<&str, (u32, u32, u32, i64), VerboseError<&str>> {
    let (input, hour) = unsigned(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minute) = unsigned(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, second) = unsigned(input)?;
    let (input, _) = tag(".")(input)?;
    let (input, centis) = signed(input)?;
    Ok((input, (hour, minute, second, centis)))
}

fn unsigned(input: &str) -> IResult<&str, u32, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}

fn signed(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    map_res(recognize(pair(opt(tag("-")), digit1)), |s: &str| s.parse())(input)
}
