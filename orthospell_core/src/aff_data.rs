//! Parsed contents of the `.aff` file and the line-oriented parser that
//! builds them.

use std::io::BufRead;

use hashbrown::HashMap;

use crate::affix::{Affix, AffixSide, AffixTable};
use crate::casing::CaseMapper;
use crate::compounding::{CompoundPattern, CompoundRuleTable};
use crate::condition::Condition;
use crate::containers::{BreakTable, ReplacementTable, SimilarityGroup, SubstrReplacer};
use crate::encoding::{Encoding, EncodingConverter};
use crate::error::{LoadError, ParseErrorKind};
use crate::flags::{
    parse_compound_rule, parse_flag_sequence, parse_flags_or_alias, CompoundRuleElem, Flag,
    FlagSet, FlagType,
};
use crate::phonet::PhoneticTable;
use crate::strings::erase_chars;

/// Everything the recognizer and the suggester read from the affix file.
/// Immutable once loading finishes.
#[derive(Debug, Clone)]
pub struct AffData {
    // lookup structures
    pub input_conv: SubstrReplacer,
    pub output_conv: SubstrReplacer,
    pub break_table: BreakTable,
    pub ignored_chars: String,
    pub prefixes: AffixTable,
    pub suffixes: AffixTable,
    pub compound_patterns: Vec<CompoundPattern>,
    pub replacements: ReplacementTable,
    pub similarities: Vec<SimilarityGroup>,
    pub keyboard_closeness: String,
    pub try_chars: String,
    pub phonetic_table: PhoneticTable,

    // general options
    pub encoding: Encoding,
    pub flag_type: FlagType,
    pub lang: String,
    pub case_mapper: CaseMapper,
    pub complex_prefixes: bool,
    pub fullstrip: bool,
    pub checksharps: bool,
    pub forbid_warn: bool,
    pub circumfix_flag: Flag,
    pub forbiddenword_flag: Flag,
    pub keepcase_flag: Flag,
    pub need_affix_flag: Flag,
    pub substandard_flag: Flag,
    pub warn_flag: Flag,
    pub flag_aliases: Vec<FlagSet>,
    pub wordchars: String,

    // suggestion options
    pub nosuggest_flag: Flag,
    pub max_compound_suggestions: u16,
    pub max_ngram_suggestions: u16,
    pub max_diff_factor: u16,
    pub only_max_diff: bool,
    pub no_split_suggestions: bool,
    pub suggest_with_dots: bool,

    // compounding options
    pub compound_min_length: u16,
    pub compound_max_word_count: u16,
    pub compound_flag: Flag,
    pub compound_begin_flag: Flag,
    pub compound_last_flag: Flag,
    pub compound_middle_flag: Flag,
    pub compound_onlyin_flag: Flag,
    pub compound_permit_flag: Flag,
    pub compound_forbid_flag: Flag,
    pub compound_force_uppercase: Flag,
    pub compound_check_duplicate: bool,
    pub compound_check_rep: bool,
    pub compound_check_case: bool,
    pub compound_check_triple: bool,
    pub compound_simplified_triple: bool,
    pub compound_rules: CompoundRuleTable,
    pub compound_syllable_max: u16,
    pub compound_syllable_vowels: String,
}

impl Default for AffData {
    fn default() -> Self {
        AffData {
            input_conv: SubstrReplacer::default(),
            output_conv: SubstrReplacer::default(),
            break_table: BreakTable::default(),
            ignored_chars: String::new(),
            prefixes: AffixTable::new(AffixSide::Prefix),
            suffixes: AffixTable::new(AffixSide::Suffix),
            compound_patterns: Vec::new(),
            replacements: ReplacementTable::default(),
            similarities: Vec::new(),
            keyboard_closeness: String::new(),
            try_chars: String::new(),
            phonetic_table: PhoneticTable::default(),
            encoding: Encoding::default(),
            flag_type: FlagType::default(),
            lang: String::new(),
            case_mapper: CaseMapper::default(),
            complex_prefixes: false,
            fullstrip: false,
            checksharps: false,
            forbid_warn: false,
            circumfix_flag: 0,
            forbiddenword_flag: 0,
            keepcase_flag: 0,
            need_affix_flag: 0,
            substandard_flag: 0,
            warn_flag: 0,
            flag_aliases: Vec::new(),
            wordchars: String::new(),
            nosuggest_flag: 0,
            max_compound_suggestions: 3,
            max_ngram_suggestions: 4,
            max_diff_factor: 5,
            only_max_diff: false,
            no_split_suggestions: false,
            suggest_with_dots: false,
            compound_min_length: 3,
            compound_max_word_count: 0,
            compound_flag: 0,
            compound_begin_flag: 0,
            compound_last_flag: 0,
            compound_middle_flag: 0,
            compound_onlyin_flag: 0,
            compound_permit_flag: 0,
            compound_forbid_flag: 0,
            compound_force_uppercase: 0,
            compound_check_duplicate: false,
            compound_check_rep: false,
            compound_check_case: false,
            compound_check_triple: false,
            compound_simplified_triple: false,
            compound_rules: CompoundRuleTable::default(),
            compound_syllable_max: 0,
            compound_syllable_vowels: String::new(),
        }
    }
}

impl AffData {
    pub fn is_utf8(&self) -> bool {
        self.encoding.is_utf8()
    }
}

/// Reads the stream into lines of raw bytes, stripping an optional UTF-8 BOM
/// from the first line and `\r` from every line end.
pub(crate) fn read_raw_lines(mut reader: impl BufRead) -> Result<Vec<Vec<u8>>, LoadError> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        lines.push(buf.clone());
    }
    if let Some(first) = lines.first_mut() {
        if first.starts_with(&[0xEF, 0xBB, 0xBF]) {
            first.drain(..3);
        }
    }
    Ok(lines)
}

/// Per-file parsing state that does not survive into [`AffData`].
#[derive(Default)]
struct ParserState {
    // array commands: remaining entry count per command
    array_counts: HashMap<String, usize>,
    // affix blocks: (cross product, remaining count) per flag
    affix_headers: HashMap<(char, Flag), (bool, usize)>,
    encoding_seen: bool,
    break_seen: bool,
    prefixes: Vec<Affix>,
    suffixes: Vec<Affix>,
    break_patterns: Vec<String>,
    replacements: Vec<(String, String)>,
    phonetic_pairs: Vec<(String, String)>,
    input_pairs: Vec<(String, String)>,
    output_pairs: Vec<(String, String)>,
    map_strings: Vec<String>,
    rules: Vec<Vec<CompoundRuleElem>>,
    first_error: Option<(usize, ParseErrorKind)>,
}

impl ParserState {
    fn error(&mut self, line_no: usize, line: &str, kind: ParseErrorKind) {
        tracing::error!(line = line_no, %kind, text = line, "could not parse affix file line");
        if self.first_error.is_none() {
            self.first_error = Some((line_no, kind));
        }
    }
}

/// Parses an `.aff` stream. Every offending line is reported through
/// `tracing`; the first fatal one is returned as the load error after the
/// whole stream has been read.
pub fn parse_aff(reader: impl BufRead) -> Result<AffData, LoadError> {
    let lines = read_raw_lines(reader)?;
    let mut data = AffData::default();
    let mut st = ParserState::default();

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let converter = EncodingConverter::new(&data.encoding);
        let Some(line) = converter.to_utf8(raw) else {
            let kind = if data.is_utf8() {
                ParseErrorKind::InvalidUtf8
            } else {
                ParseErrorKind::EncodingConversion
            };
            st.error(line_no, &String::from_utf8_lossy(raw), kind);
            continue;
        };
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Err(kind) = parse_line(&mut data, &mut st, trimmed) {
            st.error(line_no, trimmed, kind);
        }
    }

    finalize(&mut data, st)
}

fn parse_line(data: &mut AffData, st: &mut ParserState, line: &str) -> Result<(), ParseErrorKind> {
    let mut tokens = line.split_whitespace();
    let Some(raw_command) = tokens.next() else {
        return Ok(());
    };
    let command = raw_command.to_ascii_uppercase();
    let utf8 = data.is_utf8();

    match command.as_str() {
        "PFX" => parse_affix_line(data, st, AffixSide::Prefix, &mut tokens),
        "SFX" => parse_affix_line(data, st, AffixSide::Suffix, &mut tokens),

        "IGNORE" | "KEY" | "TRY" => {
            let value = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
            let target = match command.as_str() {
                "IGNORE" => &mut data.ignored_chars,
                "KEY" => &mut data.keyboard_closeness,
                _ => &mut data.try_chars,
            };
            if target.is_empty() {
                *target = value.to_string();
            } else {
                tracing::warn!(%command, "multiple entries of the same command");
            }
            Ok(())
        }
        "WORDCHARS" => {
            data.wordchars = tokens.next().ok_or(ParseErrorKind::MissingToken)?.to_string();
            Ok(())
        }

        "COMPLEXPREFIXES" => set_true(&mut data.complex_prefixes),
        "ONLYMAXDIFF" => set_true(&mut data.only_max_diff),
        "NOSPLITSUGS" => set_true(&mut data.no_split_suggestions),
        "SUGSWITHDOTS" => set_true(&mut data.suggest_with_dots),
        "FORBIDWARN" => set_true(&mut data.forbid_warn),
        "FULLSTRIP" => set_true(&mut data.fullstrip),
        "CHECKSHARPS" => set_true(&mut data.checksharps),
        "CHECKCOMPOUNDDUP" => set_true(&mut data.compound_check_duplicate),
        "CHECKCOMPOUNDREP" => set_true(&mut data.compound_check_rep),
        "CHECKCOMPOUNDCASE" => set_true(&mut data.compound_check_case),
        "CHECKCOMPOUNDTRIPLE" => set_true(&mut data.compound_check_triple),
        "SIMPLIFIEDTRIPLE" => set_true(&mut data.compound_simplified_triple),

        "MAXCPDSUGS" | "MAXNGRAMSUGS" | "MAXDIFF" | "COMPOUNDMIN" | "COMPOUNDWORDMAX" => {
            let value: u16 = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or(ParseErrorKind::MissingToken)?;
            match command.as_str() {
                "MAXCPDSUGS" => data.max_compound_suggestions = value,
                "MAXNGRAMSUGS" => data.max_ngram_suggestions = value,
                "MAXDIFF" => {
                    data.max_diff_factor = if value > 10 { 5 } else { value };
                }
                "COMPOUNDMIN" => {
                    data.compound_min_length = value.max(1);
                }
                _ => data.compound_max_word_count = value,
            }
            Ok(())
        }

        "NOSUGGEST" | "WARN" | "COMPOUNDFLAG" | "COMPOUNDBEGIN" | "COMPOUNDEND"
        | "COMPOUNDMIDDLE" | "ONLYINCOMPOUND" | "COMPOUNDPERMITFLAG" | "COMPOUNDFORBIDFLAG"
        | "FORCEUCASE" | "CIRCUMFIX" | "FORBIDDENWORD" | "KEEPCASE"
        | "NEEDAFFIX" | "SUBSTANDARD" => {
            let token = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
            let flag = *parse_flag_sequence(token, data.flag_type, utf8)?
                .first()
                .ok_or(ParseErrorKind::MissingFlags)?;
            *match command.as_str() {
                "NOSUGGEST" => &mut data.nosuggest_flag,
                "WARN" => &mut data.warn_flag,
                "COMPOUNDFLAG" => &mut data.compound_flag,
                "COMPOUNDBEGIN" => &mut data.compound_begin_flag,
                "COMPOUNDEND" => &mut data.compound_last_flag,
                "COMPOUNDMIDDLE" => &mut data.compound_middle_flag,
                "ONLYINCOMPOUND" => &mut data.compound_onlyin_flag,
                "COMPOUNDPERMITFLAG" => &mut data.compound_permit_flag,
                "COMPOUNDFORBIDFLAG" => &mut data.compound_forbid_flag,
                "FORCEUCASE" => &mut data.compound_force_uppercase,
                "CIRCUMFIX" => &mut data.circumfix_flag,
                "FORBIDDENWORD" => &mut data.forbiddenword_flag,
                "KEEPCASE" => &mut data.keepcase_flag,
                "NEEDAFFIX" => &mut data.need_affix_flag,
                _ => &mut data.substandard_flag,
            } = flag;
            Ok(())
        }

        "SET" => {
            if st.encoding_seen {
                tracing::warn!("multiple SET commands, keeping the first");
                return Ok(());
            }
            let token = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
            data.encoding = Encoding::new(token)?;
            st.encoding_seen = true;
            Ok(())
        }
        "FLAG" => {
            let token = tokens
                .next()
                .ok_or(ParseErrorKind::MissingToken)?
                .to_ascii_uppercase();
            data.flag_type = match token.as_str() {
                "LONG" => FlagType::DoubleChar,
                "NUM" => FlagType::Number,
                "UTF-8" => FlagType::Utf8,
                _ => return Err(ParseErrorKind::InvalidFlagType),
            };
            Ok(())
        }
        "LANG" => {
            let token = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
            if token.is_empty()
                || !token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ParseErrorKind::InvalidLangCode);
            }
            data.lang = token.to_string();
            data.case_mapper = CaseMapper::new(token);
            Ok(())
        }
        "COMPOUNDSYLLABLE" => {
            data.compound_syllable_max = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or(ParseErrorKind::MissingToken)?;
            data.compound_syllable_vowels =
                tokens.next().ok_or(ParseErrorKind::MissingToken)?.to_string();
            Ok(())
        }
        // recognized so their lines do not error, but nothing in the
        // recognizer or suggester consumes them
        "COMPOUNDROOT" | "SYLLABLENUM" | "COMPOUNDMORESUFFIXES" => Ok(()),

        "AF" => {
            let flag_type = data.flag_type;
            let entry = array_entry(st, "AF", &mut tokens, |toks| {
                let token = toks.next().ok_or(ParseErrorKind::MissingToken)?;
                Ok(FlagSet::from(parse_flag_sequence(token, flag_type, utf8)?))
            })?;
            if let Some(flags) = entry {
                data.flag_aliases.push(flags);
            }
            Ok(())
        }
        "AM" => Ok(()), // morphological aliases are out of scope
        "MAP" => {
            let entry = array_entry(st, "MAP", &mut tokens, |toks| {
                Ok(toks
                    .next()
                    .ok_or(ParseErrorKind::MissingToken)?
                    .to_string())
            })?;
            if let Some(s) = entry {
                st.map_strings.push(s);
            }
            Ok(())
        }
        "BREAK" => {
            st.break_seen = true;
            let entry = array_entry(st, "BREAK", &mut tokens, |toks| {
                Ok(toks
                    .next()
                    .ok_or(ParseErrorKind::MissingToken)?
                    .to_string())
            })?;
            if let Some(s) = entry {
                st.break_patterns.push(s);
            }
            Ok(())
        }
        "REP" | "PHONE" | "ICONV" | "OCONV" => {
            let entry = array_entry(st, &command, &mut tokens, |toks| {
                let a = toks.next().ok_or(ParseErrorKind::MissingToken)?.to_string();
                let b = toks.next().ok_or(ParseErrorKind::MissingToken)?.to_string();
                Ok((a, b))
            })?;
            if let Some(pair) = entry {
                match command.as_str() {
                    "REP" => st.replacements.push(pair),
                    "PHONE" => st.phonetic_pairs.push(pair),
                    "ICONV" => st.input_pairs.push(pair),
                    _ => st.output_pairs.push(pair),
                }
            }
            Ok(())
        }
        "COMPOUNDRULE" => {
            let flag_type = data.flag_type;
            let entry = array_entry(st, "COMPOUNDRULE", &mut tokens, |toks| {
                let token = toks.next().ok_or(ParseErrorKind::MissingToken)?;
                parse_compound_rule(token, flag_type, utf8)
            })?;
            if let Some(rule) = entry {
                st.rules.push(rule);
            }
            Ok(())
        }
        "CHECKCOMPOUNDPATTERN" => {
            let flag_type = data.flag_type;
            let aliases = &data.flag_aliases;
            let entry = array_entry(st, "CHECKCOMPOUNDPATTERN", &mut tokens, |toks| {
                parse_compound_pattern(toks, flag_type, utf8, aliases)
            })?;
            if let Some(p) = entry {
                data.compound_patterns.push(p);
            }
            Ok(())
        }

        _ => {
            tracing::debug!(%command, "unhandled affix command");
            Ok(())
        }
    }
}

fn set_true(target: &mut bool) -> Result<(), ParseErrorKind> {
    *target = true;
    Ok(())
}

/// The array-command protocol: the first occurrence declares the entry
/// count, each following occurrence contributes one entry until the count is
/// exhausted, and further occurrences only warn.
fn array_entry<'t, T>(
    st: &mut ParserState,
    command: &str,
    tokens: &mut std::str::SplitWhitespace<'t>,
    parse: impl FnOnce(&mut std::str::SplitWhitespace<'t>) -> Result<T, ParseErrorKind>,
) -> Result<Option<T>, ParseErrorKind> {
    if let Some(remaining) = st.array_counts.get_mut(command) {
        if *remaining > 0 {
            *remaining -= 1;
            return parse(tokens).map(Some);
        }
        tracing::warn!(%command, "extra entries of array command");
        return Ok(None);
    }
    // first occurrence declares the count
    let count = tokens
        .next()
        .and_then(|t| t.parse::<usize>().ok())
        .filter(|&c| c > 0);
    st.array_counts
        .insert(command.to_string(), count.unwrap_or(0));
    match count {
        Some(_) => Ok(None),
        None => Err(ParseErrorKind::ArrayCommandNoCount),
    }
}

fn parse_affix_line(
    data: &mut AffData,
    st: &mut ParserState,
    side: AffixSide,
    tokens: &mut std::str::SplitWhitespace,
) -> Result<(), ParseErrorKind> {
    let utf8 = data.is_utf8();
    let flag_token = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
    let flag = *parse_flag_sequence(flag_token, data.flag_type, utf8)?
        .first()
        .ok_or(ParseErrorKind::MissingFlags)?;
    let side_char = match side {
        AffixSide::Prefix => 'P',
        AffixSide::Suffix => 'S',
    };
    let key = (side_char, flag);
    let Some(&(cross_product, remaining)) = st.affix_headers.get(&key) else {
        // header line: cross-product character and entry count
        let cross_token = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
        let cross = match cross_token {
            "Y" => true,
            "N" => false,
            _ => return Err(ParseErrorKind::AffixCrossCharInvalid),
        };
        let count: usize = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(ParseErrorKind::MissingToken)?;
        st.affix_headers.insert(key, (cross, count));
        return Ok(());
    };
    if remaining == 0 {
        tracing::warn!(%flag, "extra entries in affix block");
        return Ok(());
    }
    st.affix_headers.insert(key, (cross_product, remaining - 1));
    let mut stripping = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
    if stripping == "0" {
        stripping = "";
    }
    let append_token = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
    let (mut appending, cont_flags) = match append_token.split_once('/') {
        Some((a, flags_part)) => (
            a,
            parse_flags_or_alias(flags_part, data.flag_type, utf8, &data.flag_aliases)?,
        ),
        None => (append_token, FlagSet::new()),
    };
    if appending == "0" {
        appending = "";
    }
    let condition_token = tokens.next().unwrap_or(".");
    let condition =
        Condition::new(condition_token).map_err(|_| ParseErrorKind::AffixConditionInvalid)?;
    // any remaining tokens are morphological fields, which are out of scope
    let affix = Affix {
        side,
        flag,
        cross_product,
        stripping: stripping.to_string(),
        appending: appending.to_string(),
        cont_flags,
        condition,
    };
    match side {
        AffixSide::Prefix => st.prefixes.push(affix),
        AffixSide::Suffix => st.suffixes.push(affix),
    }
    Ok(())
}

fn parse_compound_pattern(
    tokens: &mut std::str::SplitWhitespace,
    flag_type: FlagType,
    utf8: bool,
    aliases: &[FlagSet],
) -> Result<CompoundPattern, ParseErrorKind> {
    let mut pattern = CompoundPattern::default();
    let first = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
    let (mut end, end_flag) = split_word_flag(first, flag_type, utf8, aliases)?;
    if end == "0" {
        end = String::new();
        pattern.match_first_only_unaffixed = true;
    }
    pattern.first_word_end = end;
    pattern.first_word_flag = end_flag;
    let second = tokens.next().ok_or(ParseErrorKind::MissingToken)?;
    let (begin, begin_flag) = split_word_flag(second, flag_type, utf8, aliases)?;
    pattern.second_word_begin = begin;
    pattern.second_word_flag = begin_flag;
    if let Some(rep) = tokens.next() {
        pattern.replacement = rep.to_string();
    }
    Ok(pattern)
}

/// Splits `word/flags` and decodes the single flag after the slash, if any.
fn split_word_flag(
    token: &str,
    flag_type: FlagType,
    utf8: bool,
    aliases: &[FlagSet],
) -> Result<(String, Flag), ParseErrorKind> {
    match token.split_once('/') {
        Some((word, flags_part)) => {
            let flags = parse_flags_or_alias(flags_part, flag_type, utf8, aliases)?;
            let flag = flags.iter().next().unwrap_or(0);
            Ok((word.to_string(), flag))
        }
        None => Ok((token.to_string(), 0)),
    }
}

fn finalize(data: &mut AffData, st: ParserState) -> Result<AffData, LoadError> {
    let mut st = st;
    if !st.break_seen {
        st.break_patterns = vec!["-".to_string(), "^-".to_string(), "-$".to_string()];
    }
    for (_, replacement) in &mut st.replacements {
        *replacement = replacement.replace('_', " ");
    }
    data.break_table = BreakTable::new(st.break_patterns);
    data.replacements = ReplacementTable::new(st.replacements);
    data.similarities = st.map_strings.iter().map(|s| SimilarityGroup::parse(s)).collect();
    data.input_conv = SubstrReplacer::new(st.input_pairs);
    data.output_conv = SubstrReplacer::new(st.output_pairs);
    data.phonetic_table = PhoneticTable::new(st.phonetic_pairs);
    data.compound_rules = CompoundRuleTable::new(st.rules);
    for mut affix in st.prefixes {
        affix.appending = erase_chars(&affix.appending, &data.ignored_chars);
        data.prefixes.insert(affix);
    }
    for mut affix in st.suffixes {
        affix.appending = erase_chars(&affix.appending, &data.ignored_chars);
        data.suffixes.insert(affix);
    }

    match st.first_error {
        Some((line, kind)) => Err(LoadError::parse(line, kind)),
        None => Ok(std::mem::take(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(aff: &str) -> AffData {
        parse_aff(Cursor::new(aff)).expect("aff should parse")
    }

    #[test]
    fn scalar_and_bool_options() {
        let d = parse(
            "SET UTF-8\nTRY abc\nKEY qwerty|asdf\nFULLSTRIP\nCOMPLEXPREFIXES\n\
             MAXDIFF 7\nCOMPOUNDMIN 1\nWORDCHARS 0123456789'\n",
        );
        assert!(d.is_utf8());
        assert_eq!(d.try_chars, "abc");
        assert_eq!(d.keyboard_closeness, "qwerty|asdf");
        assert!(d.fullstrip);
        assert!(d.complex_prefixes);
        assert_eq!(d.max_diff_factor, 7);
        assert_eq!(d.compound_min_length, 1);
        assert_eq!(d.wordchars, "0123456789'");
    }

    #[test]
    fn out_of_range_numbers_are_clamped() {
        let d = parse("MAXDIFF 99\nCOMPOUNDMIN 0\n");
        assert_eq!(d.max_diff_factor, 5);
        assert_eq!(d.compound_min_length, 1);
    }

    #[test]
    fn single_flag_options() {
        let d = parse("NOSUGGEST !\nFORBIDDENWORD X\nKEEPCASE K\n");
        assert_eq!(d.nosuggest_flag, b'!' as Flag);
        assert_eq!(d.forbiddenword_flag, b'X' as Flag);
        assert_eq!(d.keepcase_flag, b'K' as Flag);
    }

    #[test]
    fn affix_blocks_build_tables() {
        let d = parse("SFX T Y 1\nSFX T y ies [^aeiou]y\nPFX A Y 1\nPFX A 0 pre .\n");
        let sfx: Vec<&Affix> = d.suffixes.affixes_of("berries").collect();
        assert_eq!(sfx.len(), 1);
        assert_eq!(sfx[0].flag, b'T' as Flag);
        assert_eq!(sfx[0].stripping, "y");
        assert!(sfx[0].cross_product);
        let pfx: Vec<&Affix> = d.prefixes.affixes_of("predrink").collect();
        assert_eq!(pfx.len(), 1);
        assert_eq!(pfx[0].appending, "pre");
    }

    #[test]
    fn affix_entry_with_continuation_flags() {
        let d = parse("SFX A Y 1\nSFX A r ción/S ar\n");
        let sfx: Vec<&Affix> = d.suffixes.affixes_of("lición").collect();
        assert_eq!(sfx.len(), 1);
        assert!(sfx[0].cont_flags.contains(b'S' as Flag));
    }

    #[test]
    fn missing_condition_defaults_to_dot() {
        let d = parse("SFX Z Y 1\nSFX Z 0 s\n");
        let sfx: Vec<&Affix> = d.suffixes.affixes_of("cats").collect();
        assert_eq!(sfx[0].condition.length(), 1);
    }

    #[test]
    fn bad_cross_product_char_is_an_error() {
        let err = parse_aff(Cursor::new("SFX T Q 1\nSFX T y ies .\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                line: 1,
                kind: ParseErrorKind::AffixCrossCharInvalid
            }
        ));
    }

    #[test]
    fn array_command_without_count_is_an_error() {
        let err = parse_aff(Cursor::new("REP x\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                line: 1,
                kind: ParseErrorKind::ArrayCommandNoCount
            }
        ));
        let err = parse_aff(Cursor::new("REP 0\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                kind: ParseErrorKind::ArrayCommandNoCount,
                ..
            }
        ));
    }

    #[test]
    fn rep_underscore_becomes_space() {
        let d = parse("REP 1\nREP alot a_lot\n");
        assert_eq!(
            d.replacements.any_place(),
            &[("alot".to_string(), "a lot".to_string())]
        );
    }

    #[test]
    fn break_defaults_apply_when_absent() {
        let d = parse("SET UTF-8\n");
        assert_eq!(d.break_table.middle_word_breaks(), &["-".to_string()]);
        assert_eq!(d.break_table.start_word_breaks(), &["-".to_string()]);
        assert_eq!(d.break_table.end_word_breaks(), &["-".to_string()]);
        let d = parse("BREAK 1\nBREAK +\n");
        assert_eq!(d.break_table.middle_word_breaks(), &["+".to_string()]);
        assert!(d.break_table.start_word_breaks().is_empty());
    }

    #[test]
    fn ignore_chars_are_stripped_from_appendings() {
        let d = parse("IGNORE x\nSFX T Y 1\nSFX T 0 axbx .\n");
        let sfx: Vec<&Affix> = d.suffixes.affixes_of("catab").collect();
        assert_eq!(sfx.len(), 1);
        assert_eq!(sfx[0].appending, "ab");
    }

    #[test]
    fn flag_aliases_via_af() {
        let d = parse("AF 2\nAF AB\nAF CD\nSFX X Y 1\nSFX X 0 s/1 .\n");
        assert_eq!(d.flag_aliases.len(), 2);
        let sfx: Vec<&Affix> = d.suffixes.affixes_of("cats").collect();
        assert!(sfx[0].cont_flags.contains(b'A' as Flag));
        assert!(sfx[0].cont_flags.contains(b'B' as Flag));
    }

    #[test]
    fn long_flag_type_changes_decoding() {
        let d = parse("FLAG long\nCOMPOUNDFLAG Aa\n");
        assert_eq!(d.compound_flag, (b'A' as Flag) << 8 | b'a' as Flag);
    }

    #[test]
    fn compound_pattern_entries() {
        let d = parse("CHECKCOMPOUNDPATTERN 1\nCHECKCOMPOUNDPATTERN o/X b/Y z\n");
        assert_eq!(d.compound_patterns.len(), 1);
        let p = &d.compound_patterns[0];
        assert_eq!(p.first_word_end, "o");
        assert_eq!(p.second_word_begin, "b");
        assert_eq!(p.first_word_flag, b'X' as Flag);
        assert_eq!(p.second_word_flag, b'Y' as Flag);
        assert_eq!(p.replacement, "z");
    }

    #[test]
    fn invalid_utf8_line_in_utf8_file_is_an_error() {
        let mut aff = b"SET UTF-8\n".to_vec();
        aff.extend_from_slice(b"TRY \xff\xfe\n");
        let err = parse_aff(Cursor::new(aff)).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                line: 2,
                kind: ParseErrorKind::InvalidUtf8
            }
        ));
    }

    #[test]
    fn inert_compound_commands_are_accepted() {
        let d = parse("COMPOUNDROOT R\nSYLLABLENUM JK\nCOMPOUNDMORESUFFIXES\n");
        assert_eq!(d.compound_syllable_max, 0);
    }

    #[test]
    fn latin1_default_encoding_converts_lines() {
        let mut aff = b"TRY caf\xe9\n".to_vec();
        aff.extend_from_slice(b"SET ISO8859-1\n");
        let d = parse_aff(Cursor::new(aff)).unwrap();
        assert_eq!(d.try_chars, "café");
    }
}
