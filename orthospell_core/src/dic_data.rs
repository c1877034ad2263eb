//! Parser for the `.dic` word list.

use std::io::BufRead;

use crate::aff_data::{read_raw_lines, AffData};
use crate::casing::{classify_casing, Casing};
use crate::encoding::EncodingConverter;
use crate::error::{LoadError, ParseErrorKind};
use crate::flags::{parse_flags_or_alias, FlagSet, HIDDEN_HOMONYM_FLAG};
use crate::strings::erase_chars;
use crate::word_list::WordList;

/// Parses a `.dic` stream into `words`, using the flag syntax, encoding and
/// casing configuration of the already-parsed affix data.
pub fn parse_dic(
    reader: impl BufRead,
    aff: &AffData,
    words: &mut WordList,
) -> Result<(), LoadError> {
    let lines = read_raw_lines(reader)?;
    let converter = EncodingConverter::new(&aff.encoding);
    let mut first_error: Option<(usize, ParseErrorKind)> = None;
    let mut entry_lines = &lines[..];
    let mut line_offset = 1;

    // the first line is an approximate entry count; treat a malformed one
    // as a regular entry line
    match lines.first() {
        None => return Ok(()),
        Some(first) => {
            let as_text = String::from_utf8_lossy(first);
            match as_text.trim().parse::<usize>() {
                Ok(count) => {
                    words.reserve(count);
                    entry_lines = &lines[1..];
                    line_offset = 2;
                }
                Err(_) => {
                    tracing::warn!("first line of the word list is not an entry count");
                }
            }
        }
    }

    for (idx, raw) in entry_lines.iter().enumerate() {
        let line_no = idx + line_offset;
        let Some(mut line) = converter.to_utf8(raw) else {
            let kind = if aff.is_utf8() {
                ParseErrorKind::InvalidUtf8
            } else {
                ParseErrorKind::EncodingConversion
            };
            tracing::error!(line = line_no, %kind, "bad character encoding in word list line");
            if first_error.is_none() {
                first_error = Some((line_no, kind));
            }
            continue;
        };
        if let Err(kind) = parse_dic_line(&mut line, aff, words) {
            tracing::error!(line = line_no, %kind, text = %line, "could not parse word list line");
            if first_error.is_none() {
                first_error = Some((line_no, kind));
            }
        }
    }
    match first_error {
        Some((line, kind)) => Err(LoadError::parse(line, kind)),
        None => Ok(()),
    }
}

/// Finds where the stem ends: at the first unescaped `/` (the escape
/// backslash is removed from the line), at a tab, or at a space followed by
/// a two-letter `xx:` morphological tag.
fn find_stem_end(line: &mut String) -> Option<usize> {
    let mut i = 0;
    while i < line.len() {
        let bytes = line.as_bytes();
        match bytes[i] {
            b'/' => {
                if i == 0 {
                    i += 1;
                    continue;
                }
                if bytes[i - 1] == b'\\' {
                    line.remove(i - 1);
                    // the slash is now at i - 1, scanning continues after it
                    continue;
                }
                return Some(i);
            }
            b'\t' => return Some(i),
            b' ' => {
                let rest = line[i..].trim_start();
                let is_morph_tag = rest.len() >= 3
                    && rest.as_bytes()[0].is_ascii_lowercase()
                    && rest.as_bytes()[1].is_ascii_lowercase()
                    && rest.as_bytes()[2] == b':';
                if rest.is_empty() || is_morph_tag {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn parse_dic_line(
    line: &mut String,
    aff: &AffData,
    words: &mut WordList,
) -> Result<(), ParseErrorKind> {
    let stem_end = find_stem_end(line);
    let mut flags = FlagSet::new();
    let stem = match stem_end {
        Some(end) if line.as_bytes()[end] == b'/' => {
            let flags_part: String = line[end + 1..]
                .chars()
                .take_while(|c| !c.is_whitespace())
                .collect();
            match parse_flags_or_alias(&flags_part, aff.flag_type, aff.is_utf8(), &aff.flag_aliases)
            {
                Ok(f) => flags = f,
                Err(ParseErrorKind::MissingFlags) => {
                    tracing::warn!(text = line.as_str(), "no flags after slash");
                }
                Err(e) => return Err(e),
            }
            &line[..end]
        }
        Some(end) => &line[..end],
        None => line.as_str(),
    };
    if stem.is_empty() {
        return Ok(());
    }
    let stem = erase_chars(stem, &aff.ignored_chars);
    let casing = classify_casing(&stem);
    words.insert(stem.clone(), flags.clone());

    // hidden homonym: a title-cased twin that lets affixed lookups on
    // lowered input find this entry
    let wants_hidden = match casing {
        Casing::AllCapital => !flags.is_empty(),
        Casing::Pascal | Casing::Camel => true,
        _ => false,
    };
    if wants_hidden && !flags.contains(aff.forbiddenword_flag) {
        let titled = aff.case_mapper.title(&stem);
        flags.insert(HIDDEN_HOMONYM_FLAG);
        words.insert(titled, flags);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aff_data::parse_aff;
    use crate::flags::Flag;
    use std::io::Cursor;

    fn load(aff: &str, dic: &str) -> (AffData, WordList) {
        let aff = parse_aff(Cursor::new(aff)).expect("aff should parse");
        let mut words = WordList::new();
        parse_dic(Cursor::new(dic), &aff, &mut words).expect("dic should parse");
        (aff, words)
    }

    #[test]
    fn stems_and_flags() {
        let (_, words) = load("SET UTF-8\n", "3\nvirus\nberry/T\nnitidament/ \n");
        assert!(words.contains("virus"));
        assert!(words.get("virus")[0].is_empty());
        assert!(words.get("berry")[0].contains(b'T' as Flag));
        assert!(words.contains("nitidament"));
    }

    #[test]
    fn escaped_slash_is_literal() {
        let (_, words) = load("SET UTF-8\n", "1\nkm\\/h\n");
        assert!(words.contains("km/h"));
    }

    #[test]
    fn tab_and_morph_fields_end_the_stem() {
        let (_, words) = load("SET UTF-8\n", "2\nwalk\tpo:verb\nrun st:run\n");
        assert!(words.contains("walk"));
        assert!(words.contains("run"));
        assert!(!words.contains("run st:run"));
    }

    #[test]
    fn missing_count_line_is_tolerated() {
        let (_, words) = load("SET UTF-8\n", "virus\nberry/T\n");
        assert!(words.contains("virus"));
        assert!(words.contains("berry"));
    }

    #[test]
    fn ignore_chars_are_stripped_from_stems() {
        let (_, words) = load("IGNORE -\n", "1\nx-y-z\n");
        assert!(words.contains("xyz"));
    }

    #[test]
    fn hidden_homonyms_for_all_caps_with_flags() {
        let (_, words) = load("SET UTF-8\n", "2\nENIAC/X\nNASA\n");
        assert!(words.contains("ENIAC"));
        let hidden = words.get("Eniac");
        assert_eq!(hidden.len(), 1);
        assert!(hidden[0].contains(HIDDEN_HOMONYM_FLAG));
        assert!(hidden[0].contains(b'X' as Flag));
        // all-caps without flags gets no twin
        assert!(words.get("Nasa").is_empty());
    }

    #[test]
    fn hidden_homonyms_for_mixed_case() {
        let (_, words) = load("SET UTF-8\n", "1\nOpenOffice\n");
        assert!(words.contains("OpenOffice"));
        assert!(words.get("Openoffice")[0].contains(HIDDEN_HOMONYM_FLAG));
    }

    #[test]
    fn forbidden_entries_get_no_hidden_twin() {
        let (_, words) = load("FORBIDDENWORD X\n", "1\nENIAC/X\n");
        assert!(words.contains("ENIAC"));
        assert!(words.get("Eniac").is_empty());
    }

    #[test]
    fn invalid_utf8_entry_in_utf8_file_is_an_error() {
        let aff = parse_aff(Cursor::new("SET UTF-8\n")).unwrap();
        let mut words = WordList::new();
        let mut dic = b"2\ngood\n".to_vec();
        dic.extend_from_slice(b"b\xffd\n");
        let err = parse_dic(Cursor::new(dic), &aff, &mut words).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                line: 3,
                kind: ParseErrorKind::InvalidUtf8
            }
        ));
        // the good line before it was still inserted
        assert!(words.contains("good"));
    }

    #[test]
    fn numeric_alias_flags() {
        let (_, words) = load("AF 1\nAF TS\n", "1\nberry/1\n");
        assert!(words.get("berry")[0].contains(b'T' as Flag));
        assert!(words.get("berry")[0].contains(b'S' as Flag));
    }

    #[test]
    fn duplicate_stems_accumulate() {
        let (_, words) = load("SET UTF-8\n", "2\nbank/A\nbank/B\n");
        assert_eq!(words.get("bank").len(), 2);
    }
}
