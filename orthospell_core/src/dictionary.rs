//! The dictionary façade: loading and the two query entry points.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::aff_data::{parse_aff, AffData};
use crate::checker::Checker;
use crate::dic_data::parse_dic;
use crate::error::LoadError;
use crate::suggester::Suggester;
use crate::word_list::WordList;

/// Inputs longer than this are rejected without lookup.
const MAX_WORD_LEN: usize = 360;

/// A loaded dictionary. Immutable after construction; any number of threads
/// may query it concurrently.
#[derive(Debug)]
pub struct Dictionary {
    aff: AffData,
    words: WordList,
}

impl Dictionary {
    /// Loads from already-opened `.aff` and `.dic` streams.
    pub fn load(aff: impl BufRead, dic: impl BufRead) -> Result<Dictionary, LoadError> {
        let aff = parse_aff(aff)?;
        let mut words = WordList::new();
        parse_dic(dic, &aff, &mut words)?;
        Ok(Dictionary { aff, words })
    }

    /// Loads from the path of the `.aff` file; the `.dic` path is derived
    /// by replacing the extension.
    pub fn load_path(aff_path: impl AsRef<Path>) -> Result<Dictionary, LoadError> {
        let aff_path = aff_path.as_ref();
        let aff_file = File::open(aff_path).map_err(|_| {
            LoadError::Other(format!("aff file {} not found", aff_path.display()))
        })?;
        let dic_path = aff_path.with_extension("dic");
        let dic_file = File::open(&dic_path).map_err(|_| {
            LoadError::Other(format!("dic file {} not found", dic_path.display()))
        })?;
        Dictionary::load(BufReader::new(aff_file), BufReader::new(dic_file))
    }

    /// The parsed affix data, for callers that need the declared encoding
    /// or option values.
    pub fn aff_data(&self) -> &AffData {
        &self.aff
    }

    /// Number of entries in the word list.
    pub fn entry_count(&self) -> usize {
        self.words.len()
    }

    /// Checks one word. Never panics; oversize input is simply incorrect.
    pub fn spell(&self, word: &str) -> bool {
        if word.len() > MAX_WORD_LEN {
            return false;
        }
        Checker::new(&self.aff, &self.words).spell(word)
    }

    /// Fills `out` with ordered suggestions for a misspelled word. The
    /// buffer is cleared first; oversize input yields an empty list.
    pub fn suggest(&self, word: &str, out: &mut Vec<String>) {
        out.clear();
        if word.len() > MAX_WORD_LEN {
            return;
        }
        Suggester::new(&self.aff, &self.words).suggest(word, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn load_and_query() {
        let d = Dictionary::load(
            Cursor::new("SET UTF-8\nSFX S Y 1\nSFX S 0 s .\n"),
            Cursor::new("1\napple/S\n"),
        )
        .expect("dictionary should load");
        assert_eq!(d.entry_count(), 1);
        assert!(d.spell("apple"));
        assert!(d.spell("apples"));
        assert!(!d.spell("appel"));
    }

    #[test]
    fn oversize_input_is_rejected_quietly() {
        let d = Dictionary::load(Cursor::new(""), Cursor::new("1\nword\n")).unwrap();
        let long = "a".repeat(400);
        assert!(!d.spell(&long));
        let mut out = vec!["stale".to_string()];
        d.suggest(&long, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn load_error_carries_line_number() {
        let err = Dictionary::load(
            Cursor::new("SET UTF-8\nFLAG bogus\n"),
            Cursor::new("0\n"),
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn suggestion_buffer_is_cleared_on_entry() {
        let d = Dictionary::load(Cursor::new("TRY l\n"), Cursor::new("1\nhello\n")).unwrap();
        let mut out = vec!["stale".to_string()];
        d.suggest("helo", &mut out);
        assert!(!out.contains(&"stale".to_string()));
        assert!(out.contains(&"hello".to_string()));
    }
}
