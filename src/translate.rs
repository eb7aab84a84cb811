use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Rewrites cleaned subtitle text, e.g. between Simplified and
/// Traditional Chinese.
pub trait Translator {
    fn convert(&self, text: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn convert(&self, text: &str) -> String {
        self(text)
    }
}

/// Phrase-table translator using OpenCC-style dictionaries.
///
/// Each line maps a phrase to one or more space-separated replacements,
/// separated by a tab. Only the first replacement is used. Text is
/// converted by greedy longest match.
#[derive(Debug, Default)]
pub struct DictionaryTranslator {
    phrases: HashMap<String, String>,
    longest: usize,
}

impl DictionaryTranslator {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = std::fs::read_to_string(path)
            .context(format!("Failed to read translation table: '{}'", path.display()))?;
        Self::from_table(&table)
    }

    pub fn from_table(table: &str) -> Result<Self> {
        let mut translator = DictionaryTranslator::default();
        let entries = table
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'));
        for (line_no, line) in entries {
            let (from, to) = line
                .split_once('\t')
                .ok_or_else(|| anyhow!("Missing tab separator on line {}.", line_no))?;
            let to = to
                .split_whitespace()
                .next()
                .ok_or_else(|| anyhow!("Missing replacement on line {}.", line_no))?;
            translator.insert(from, to);
        }
        Ok(translator)
    }

    pub fn insert(&mut self, from: &str, to: &str) {
        if from.is_empty() {
            return;
        }
        self.longest = self.longest.max(from.chars().count());
        self.phrases.insert(from.to_string(), to.to_string());
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Translator for DictionaryTranslator {
    fn convert(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        'outer: while let Some(first) = rest.chars().next() {
            // Byte offsets of the candidate phrase ends, longest first.
            let ends: Vec<usize> = rest
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .chain(std::iter::once(rest.len()))
                .take(self.longest)
                .collect();
            for &end in ends.iter().rev() {
                if let Some(to) = self.phrases.get(&rest[..end]) {
                    out.push_str(to);
                    rest = &rest[end..];
                    continue 'outer;
                }
            }
            out.push(first);
            rest = &rest[first.len_utf8()..];
        }
        out
    }
}
