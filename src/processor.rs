use crate::parser::DialogueRecord;
use crate::subtitle::Subtitle;
use crate::translate::Translator;

use std::sync::OnceLock;

use regex::Regex;

/// Events shorter than this many milliseconds are dropped.
const MIN_DURATION_MS: f64 = 200.0;
const DRAWING_END: &str = r"{\p0}";
const LINE_BREAK: &str = "\r\n";

#[derive(Default)]
pub struct ProcessOpts<'a> {
    pub no_effect: bool,
    pub only_first_line: bool,
    pub translator: Option<&'a dyn Translator>,
}

fn override_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{.*?\}").expect("override block pattern is valid"))
}

/// Turns a dialogue record into a subtitle, or `None` if it is filtered out.
pub fn process(record: &DialogueRecord, opts: &ProcessOpts) -> Option<Subtitle> {
    // Whole milliseconds, so 0.9s -> 1.1s counts as a full 0.2s.
    if ((record.end - record.start) * 1000.0).round() < MIN_DURATION_MS {
        return None;
    }
    if opts.no_effect && !record.effect().is_empty() {
        return None;
    }
    // Suffix check only; drawings closed some other way survive.
    if record.text().ends_with(DRAWING_END) {
        return None;
    }

    let mut text = clean_text(record.text());
    if opts.only_first_line {
        if let Some(idx) = text.find(LINE_BREAK) {
            text.truncate(idx);
        }
    }
    if let Some(translator) = opts.translator {
        text = translator.convert(&text);
    }

    Some(Subtitle {
        start: record.start,
        end: record.end,
        text,
    })
}

/// Strips override blocks and expands `\N` and `\n` into hard line breaks.
pub fn clean_text(raw: &str) -> String {
    override_block()
        .replace_all(raw, "")
        .replace(r"\N", LINE_BREAK)
        .replace(r"\n", LINE_BREAK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ColumnLayout;

    fn record(start: &str, end: &str, effect: &str, text: &str) -> DialogueRecord {
        ColumnLayout::from_header("Format: Start, End, Effect, Text")
            .format(&format!("Dialogue: {},{},{},{}", start, end, effect, text))
            .unwrap()
    }

    macro_rules! test_clean_text {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;
                assert_eq!(clean_text(input), expected);
            }
        )*
        }
    }

    test_clean_text! {
        test_clean_text_0: ("plain", "plain"),
        test_clean_text_1: (r"Hello {\i1}world{\i0}", "Hello world"),
        test_clean_text_2: (r"{\pos(10,20)\c&H00FF00&}green", "green"),
        test_clean_text_3: (r"one\Ntwo", "one\r\ntwo"),
        test_clean_text_4: (r"one\ntwo\Nthree", "one\r\ntwo\r\nthree"),
        test_clean_text_5: (r"{\an8}top{}", "top"),
        test_clean_text_6: ("a { b", "a { b"),
    }

    #[test]
    fn keeps_ordinary_dialogue() {
        let sub = process(
            &record("0:00:01.00", "0:00:03.00", "", r"Hello {\b1}there"),
            &ProcessOpts::default(),
        )
        .unwrap();
        assert_eq!(sub.text, "Hello there");
        assert_eq!(sub.start.second, 1);
        assert_eq!(sub.end.second, 3);
    }

    #[test]
    fn duration_boundary() {
        let opts = ProcessOpts::default();
        assert!(process(&record("0:00:01.00", "0:00:01.19", "", "x"), &opts).is_none());
        assert!(process(&record("0:00:01.00", "0:00:01.20", "", "x"), &opts).is_some());
        assert!(process(&record("0:00:03.00", "0:00:01.00", "", "x"), &opts).is_none());
    }

    #[test]
    fn duration_boundary_across_seconds() {
        let opts = ProcessOpts::default();
        assert!(process(&record("0:00:00.90", "0:00:01.10", "", "x"), &opts).is_some());
        assert!(process(&record("0:00:00.90", "0:00:01.09", "", "x"), &opts).is_none());
        assert!(process(&record("0:00:59.90", "0:01:00.10", "", "x"), &opts).is_some());
        assert!(process(&record("0:59:59.95", "1:00:00.14", "", "x"), &opts).is_none());
    }

    #[test]
    fn effect_filter_only_when_enabled() {
        let fx = record("0:00:01.00", "0:00:03.00", "fx", "x");
        assert!(process(&fx, &ProcessOpts::default()).is_some());
        let opts = ProcessOpts {
            no_effect: true,
            ..Default::default()
        };
        assert!(process(&fx, &opts).is_none());
        assert!(process(&record("0:00:01.00", "0:00:03.00", "", "x"), &opts).is_some());
    }

    #[test]
    fn drops_trailing_drawing() {
        let drawing = record(
            "0:00:01.00",
            "0:00:03.00",
            "",
            r"{\p1}m 0 0 l 100 0 100 100{\p0}",
        );
        assert!(process(&drawing, &ProcessOpts::default()).is_none());
    }

    #[test]
    fn only_first_line() {
        let opts = ProcessOpts {
            only_first_line: true,
            ..Default::default()
        };
        let multi_line = record("0:00:01.00", "0:00:03.00", "", r"Line1\NLine2");
        let sub = process(&multi_line, &opts).unwrap();
        assert_eq!(sub.text, "Line1");
    }

    #[test]
    fn translator_sees_clean_text() {
        let upper = |text: &str| format!("<{}>", text.to_uppercase());
        let opts = ProcessOpts {
            translator: Some(&upper),
            ..Default::default()
        };
        let styled = record("0:00:01.00", "0:00:03.00", "", r"{\i1}ab\Ncd");
        let sub = process(&styled, &opts).unwrap();
        assert_eq!(sub.text, "<AB\r\nCD>");
    }
}
