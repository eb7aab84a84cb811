use crate::error::ConvertError;
use crate::subtitle::OutputFormat;
use crate::translate::Translator;
use crate::{convert, ConvertOptions};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("input is not valid UTF-8")]
    Codec(#[from] FromUtf8Error),

    #[error(transparent)]
    Format(#[from] ConvertError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl FileError {
    fn label(&self) -> &'static str {
        match self {
            FileError::Codec(_) => "codec error",
            FileError::Format(_) => "irregular format",
            FileError::Io(_) => "IO error",
        }
    }
}

pub struct BatchOpts {
    pub output_dir: PathBuf,
    /// Overwrite output files that already exist.
    pub force: bool,
    pub convert: ConvertOptions,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub done: usize,
    pub ignored: usize,
    pub failed: usize,
}

/// Lists the non-hidden `.ass` and `.ssa` files in `dir`, sorted by name.
pub fn subtitle_files<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        let is_subtitle = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("ass") || e.eq_ignore_ascii_case("ssa"));
        if !hidden && is_subtitle && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn output_path(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

/// Decodes the input as UTF-8, dropping a leading byte order mark.
pub fn decode(bytes: Vec<u8>) -> Result<String, FromUtf8Error> {
    let mut text = String::from_utf8(bytes)?;
    if text.starts_with('\u{FEFF}') {
        text.drain(..'\u{FEFF}'.len_utf8());
    }
    Ok(text)
}

pub fn convert_file(
    input: &Path,
    output: &Path,
    translator: Option<&dyn Translator>,
    opts: &ConvertOptions,
) -> Result<(), FileError> {
    let text = decode(std::fs::read(input)?)?;
    let converted = convert(text.lines(), translator, opts)?;
    std::fs::write(output, converted)?;
    Ok(())
}

/// Converts every file, writing a progress report to `report`.
pub fn run<W: Write>(
    files: &[PathBuf],
    translator: Option<&dyn Translator>,
    opts: &BatchOpts,
    report: &mut W,
) -> io::Result<BatchReport> {
    let total = files.len();
    let mut counts = BatchReport::default();
    writeln!(report, "Found {} file(s), converting...", total)?;

    for (idx, input) in files.iter().enumerate() {
        write!(report, "\t({:02}/{:02}) is converting... ", idx + 1, total)?;
        let output = output_path(input, &opts.output_dir, opts.convert.output_format);
        if !opts.force && output.exists() {
            writeln!(report, "[ignore] (File exists)")?;
            counts.ignored += 1;
            continue;
        }
        match convert_file(input, &output, translator, &opts.convert) {
            Ok(()) => {
                writeln!(report, "[done]")?;
                counts.done += 1;
            }
            Err(err) => {
                writeln!(report, "[fail] ({})", err.label())?;
                warn!(
                    input = %input.display(),
                    error = %failure_detail(err),
                    "conversion failed"
                );
                counts.failed += 1;
            }
        }
    }

    writeln!(
        report,
        "All done:\n\t{} success, {} ignore, {} fail.",
        counts.done, counts.ignored, counts.failed
    )?;
    Ok(counts)
}

/// The error and its causes on one line.
fn failure_detail(err: FileError) -> String {
    format!("{:#}", anyhow::Error::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASS: &str = "\u{FEFF}[Script Info]\r\n\
                       [Events]\r\n\
                       Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\r\n\
                       Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,hi\r\n";

    fn opts(dir: &Path, force: bool) -> BatchOpts {
        BatchOpts {
            output_dir: dir.to_path_buf(),
            force,
            convert: ConvertOptions::default(),
        }
    }

    #[test]
    fn finds_subtitle_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.ass", "a.SSA", ".hidden.ass", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let names: Vec<String> = subtitle_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.SSA", "b.ass"]);
    }

    #[test]
    fn output_paths_follow_format() {
        let out = Path::new("/out");
        let input = Path::new("/in/show.ep1.ass");
        assert_eq!(
            output_path(input, out, OutputFormat::Srt),
            Path::new("/out/show.ep1.srt")
        );
        assert_eq!(
            output_path(input, out, OutputFormat::Xml),
            Path::new("/out/show.ep1.xml")
        );
    }

    #[test]
    fn failure_detail_includes_causes() {
        let err = FileError::Format(ConvertError::Format {
            line: 7,
            source: crate::error::FormatError::InvalidTimecode("later".to_string()),
        });
        assert_eq!(
            failure_detail(err),
            "malformed dialogue on line 7: invalid timecode: later"
        );
    }

    #[test]
    fn decode_strips_bom() {
        assert_eq!(decode(b"\xEF\xBB\xBFabc".to_vec()).unwrap(), "abc");
        assert!(decode(vec![0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn converts_ignores_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.ass");
        let broken = dir.path().join("broken.ass");
        let binary = dir.path().join("binary.ass");
        std::fs::write(&good, ASS).unwrap();
        std::fs::write(&broken, "[Script Info]\n").unwrap();
        std::fs::write(&binary, [0xffu8, 0x00, 0x12]).unwrap();
        let files = vec![good.clone(), broken, binary];

        let mut report = Vec::new();
        let counts = run(&files, None, &opts(dir.path(), false), &mut report).unwrap();
        assert_eq!(
            counts,
            BatchReport {
                done: 1,
                ignored: 0,
                failed: 2
            }
        );
        let report = String::from_utf8(report).unwrap();
        assert!(report.starts_with("Found 3 file(s), converting...\n"));
        assert!(report.contains("(01/03) is converting... [done]"));
        assert!(report.contains("(02/03) is converting... [fail] (irregular format)"));
        assert!(report.contains("(03/03) is converting... [fail] (codec error)"));
        assert!(report.ends_with("1 success, 0 ignore, 2 fail.\n"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("good.srt")).unwrap(),
            "1\r\n00:00:01,000 --> 00:00:03,000\r\nhi\r\n\r\n"
        );

        let mut report = Vec::new();
        let counts = run(&[good.clone()], None, &opts(dir.path(), false), &mut report).unwrap();
        assert_eq!(counts.ignored, 1);
        assert!(String::from_utf8(report).unwrap().contains("[ignore] (File exists)"));

        let counts = run(&[good], None, &opts(dir.path(), true), &mut io::sink()).unwrap();
        assert_eq!(counts.done, 1);
    }
}
