use crate::subtitle::{OutputFormat, Subtitle};
use crate::timecode::TimecodeStyle;

use std::fmt::{self, Write};

use nom::bytes::complete::tag;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res};
use nom::error::VerboseError;
use nom::number::complete::double;
use nom::IResult;

const VTT_HEADER: &str = "WEBVTT\r\n\n";

/// Renders the subtitles as a complete document.
///
/// SRT and WebVTT output is ordered by start time; XML keeps input order.
pub fn serialise(mut subs: Vec<Subtitle>, format: OutputFormat) -> Result<String, fmt::Error> {
    let mut buf = String::new();
    match format {
        OutputFormat::Srt | OutputFormat::Vtt => {
            subs.sort_by_key(|s| s.start);
            if format == OutputFormat::Vtt {
                buf.push_str(VTT_HEADER);
            }
            write_subs(&mut buf, &subs, format.timecode_style())?;
        }
        OutputFormat::Xml => write_xml(&mut buf, &subs)?,
    }
    Ok(buf)
}

fn write_subs<W: Write>(buf: &mut W, subs: &[Subtitle], style: TimecodeStyle) -> fmt::Result {
    for (idx, sub) in subs.iter().enumerate() {
        write_sub(buf, idx + 1, sub, style)?;
    }
    Ok(())
}

fn write_sub<W: Write>(
    buf: &mut W,
    seqnum: usize,
    sub: &Subtitle,
    style: TimecodeStyle,
) -> fmt::Result {
    write!(
        buf,
        "{}\r\n{} --> {}\r\n{}\r\n\r\n",
        seqnum,
        sub.start.display(style),
        sub.end.display(style),
        sub.text
    )
}

#[derive(Debug, PartialEq, Eq)]
struct XmlEvent {
    start_ms: i64,
    end_ms: i64,
    content: String,
}

impl XmlEvent {
    fn from_subtitle(sub: &Subtitle) -> Option<XmlEvent> {
        Some(XmlEvent {
            start_ms: to_millis(&sub.start.to_vtt_string())?,
            end_ms: to_millis(&sub.end.to_vtt_string())?,
            content: sub.text.clone(),
        })
    }
}

fn write_xml<W: Write>(buf: &mut W, subs: &[Subtitle]) -> fmt::Result {
    buf.write_str("<xml>")?;
    for sub in subs {
        let event = XmlEvent::from_subtitle(sub).ok_or(fmt::Error)?;
        write!(
            buf,
            "<dia><st>{}</st><et>{}</et><sub><![CDATA[{}]]></sub></dia>",
            event.start_ms,
            event.end_ms,
            cdata_safe(&event.content)
        )?;
    }
    buf.write_str("</xml>")
}

/// Drops control characters XML 1.0 forbids and splits any `]]>` so the
/// text cannot terminate its CDATA section early.
fn cdata_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            !matches!(
                c,
                '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}'
            )
        })
        .collect::<String>()
        .replace("]]>", "]]]]><![CDATA[>")
}

/// Converts an `H:MM:SS(.frac)` timestamp to whole milliseconds.
fn to_millis(timestamp: &str) -> Option<i64> {
    let (_, seconds) = all_consuming(clock_seconds)(timestamp).ok()?;
    Some((seconds * 1000.0).round() as i64)
}

fn clock_seconds(input: &str) -> IResult<&str, f64, VerboseError<&str>> {
    let (input, hours) = whole(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = whole(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = double(input)?;
    Ok((input, hours * 3600.0 + minutes * 60.0 + seconds))
}

fn whole(input: &str) -> IResult<&str, f64, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}
