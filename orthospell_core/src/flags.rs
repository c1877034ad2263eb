//! Flags, flag sets and the four flag syntaxes of the affix file format.

use crate::error::ParseErrorKind;

/// A flag is a 16-bit identifier tagging stems and affixes.
pub type Flag = u16;

/// Flag attached to automatically inserted cased variants of dictionary
/// entries, so that lookups for differently cased inputs find the
/// originally-cased entry without the variant leaking into suggestions.
pub const HIDDEN_HOMONYM_FLAG: Flag = u16::MAX;

/// How flags are written in the `.aff` and `.dic` files, selected by the
/// `FLAG` command. The default is one character per flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagType {
    #[default]
    SingleChar,
    /// `FLAG long`: two characters combined big-endian into one value.
    DoubleChar,
    /// `FLAG num`: decimal integers separated by commas.
    Number,
    /// `FLAG UTF-8`: one code point per flag, must be within the BMP.
    Utf8,
}

/// An ordered, duplicate-free collection of flags. Small, so a sorted vector
/// beats any tree or hash structure here.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlagSet(Vec<Flag>);

impl FlagSet {
    pub fn new() -> Self {
        FlagSet(Vec::new())
    }

    pub fn from_unsorted(mut flags: Vec<Flag>) -> Self {
        flags.sort_unstable();
        flags.dedup();
        FlagSet(flags)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, flag: Flag) -> bool {
        flag != 0 && self.0.binary_search(&flag).is_ok()
    }

    pub fn insert(&mut self, flag: Flag) {
        if let Err(pos) = self.0.binary_search(&flag) {
            self.0.insert(pos, flag);
        }
    }

    /// Merge `other` into `self`, keeping the set sorted and unique.
    pub fn union_with(&mut self, other: &FlagSet) {
        for &f in &other.0 {
            self.insert(f);
        }
    }

    /// True when the two sets share at least one flag. Linear merge walk.
    pub fn intersects(&self, other: &FlagSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<Flag>> for FlagSet {
    fn from(v: Vec<Flag>) -> Self {
        FlagSet::from_unsorted(v)
    }
}

/// Decodes a flag token into the sequence of flags it denotes, in written
/// order. The caller turns the sequence into a [`FlagSet`] or takes the
/// first element for single-flag commands.
///
/// For byte-oriented syntaxes in a UTF-8 file the token is read byte by
/// byte, for backward compatibility with dictionaries that mix encodings in
/// their flag fields; a warning is emitted when such bytes are above ASCII.
pub fn parse_flag_sequence(
    token: &str,
    flag_type: FlagType,
    file_is_utf8: bool,
) -> Result<Vec<Flag>, ParseErrorKind> {
    if token.is_empty() {
        return Err(ParseErrorKind::MissingFlags);
    }
    let mut out = Vec::new();
    match flag_type {
        FlagType::SingleChar => {
            if file_is_utf8 {
                if !token.is_ascii() {
                    warn_lone_bytes();
                }
                out.extend(token.bytes().map(Flag::from));
            } else {
                out.extend(token.chars().map(|c| c as u32 as Flag));
            }
        }
        FlagType::DoubleChar => {
            if file_is_utf8 && !token.is_ascii() {
                warn_lone_bytes();
            }
            let units: Vec<u16> = if file_is_utf8 {
                token.bytes().map(u16::from).collect()
            } else {
                token.chars().map(|c| c as u32 as u16).collect()
            };
            if units.len() % 2 == 1 {
                return Err(ParseErrorKind::UnpairedLongFlag);
            }
            for pair in units.chunks_exact(2) {
                out.push(pair[0].wrapping_shl(8) | (pair[1] & 0xff));
            }
        }
        FlagType::Number => {
            for num in token.split(',') {
                match num.parse::<u32>() {
                    Ok(n) if n <= u32::from(u16::MAX) => out.push(n as Flag),
                    Ok(_) => return Err(ParseErrorKind::FlagAbove65535),
                    Err(_) => return Err(ParseErrorKind::InvalidNumericFlag),
                }
            }
        }
        FlagType::Utf8 => {
            for c in token.chars() {
                let cp = c as u32;
                if cp > 0xFFFF {
                    return Err(ParseErrorKind::FlagAbove65535);
                }
                out.push(cp as Flag);
            }
        }
    }
    Ok(out)
}

fn warn_lone_bytes() {
    tracing::warn!(
        "bytes above 127 in flags in a UTF-8 file are treated as lone bytes \
         for backward compatibility; consider FLAG UTF-8"
    );
}

/// Decodes a flag token that may instead be a numeric index into the `AF`
/// alias table. Aliases are one-based.
pub fn parse_flags_or_alias(
    token: &str,
    flag_type: FlagType,
    file_is_utf8: bool,
    aliases: &[FlagSet],
) -> Result<FlagSet, ParseErrorKind> {
    if aliases.is_empty() {
        return parse_flag_sequence(token, flag_type, file_is_utf8).map(FlagSet::from);
    }
    let idx: usize = token
        .parse()
        .map_err(|_| ParseErrorKind::InvalidNumericAlias)?;
    if idx == 0 || idx > aliases.len() {
        return Err(ParseErrorKind::InvalidNumericAlias);
    }
    Ok(aliases[idx - 1].clone())
}

/// One element of a compound rule: a flag atom or a quantifier applying to
/// the preceding atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundRuleElem {
    Flag(Flag),
    /// `?`: the preceding atom matches zero or one stem.
    Optional,
    /// `*`: the preceding atom matches any number of stems.
    ZeroOrMore,
}

/// Decodes one `COMPOUNDRULE` pattern. For the double-character and numeric
/// flag syntaxes the atoms are parenthesized; quantifiers stay bare.
pub fn parse_compound_rule(
    token: &str,
    flag_type: FlagType,
    file_is_utf8: bool,
) -> Result<Vec<CompoundRuleElem>, ParseErrorKind> {
    use CompoundRuleElem::*;
    if token.is_empty() {
        return Err(ParseErrorKind::MissingFlags);
    }
    let mut out = Vec::new();
    match flag_type {
        FlagType::SingleChar | FlagType::Utf8 => {
            for f in parse_flag_sequence(token, flag_type, file_is_utf8)? {
                out.push(match f {
                    0x3F => Optional,   // '?'
                    0x2A => ZeroOrMore, // '*'
                    _ => Flag(f),
                });
            }
        }
        FlagType::DoubleChar | FlagType::Number => {
            let bytes = token.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                if bytes[i] != b'(' {
                    return Err(ParseErrorKind::CompoundRuleInvalid);
                }
                let close = token[i..]
                    .find(')')
                    .map(|k| i + k)
                    .ok_or(ParseErrorKind::CompoundRuleInvalid)?;
                if close == i + 1 {
                    return Err(ParseErrorKind::CompoundRuleInvalid);
                }
                let atom = &token[i + 1..close];
                let seq = parse_flag_sequence(atom, flag_type, file_is_utf8)?;
                if seq.len() != 1 {
                    return Err(ParseErrorKind::CompoundRuleInvalid);
                }
                out.push(Flag(seq[0]));
                i = close + 1;
                if i < bytes.len() && (bytes[i] == b'?' || bytes[i] == b'*') {
                    out.push(if bytes[i] == b'?' { Optional } else { ZeroOrMore });
                    i += 1;
                }
            }
        }
    }
    // a quantifier must follow an atom
    let mut prev_was_atom = false;
    for e in &out {
        match e {
            Flag(_) => prev_was_atom = true,
            Optional | ZeroOrMore => {
                if !prev_was_atom {
                    return Err(ParseErrorKind::CompoundRuleInvalid);
                }
                prev_was_atom = false;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_membership_and_union() {
        let mut a = FlagSet::from_unsorted(vec![3, 1, 2, 2]);
        assert_eq!(a.len(), 3);
        assert!(a.contains(2));
        assert!(!a.contains(9));
        let b = FlagSet::from_unsorted(vec![9, 2]);
        a.union_with(&b);
        assert!(a.contains(9));
        assert_eq!(a.len(), 4);
        assert!(a.intersects(&b));
        assert!(!FlagSet::new().intersects(&b));
    }

    #[test]
    fn flag_zero_is_never_a_member() {
        let a = FlagSet::from_unsorted(vec![0, 1]);
        assert!(!a.contains(0));
    }

    #[test]
    fn single_char_flags_decode() {
        let seq = parse_flag_sequence("abz", FlagType::SingleChar, true).unwrap();
        assert_eq!(seq, vec![b'a' as Flag, b'b' as Flag, b'z' as Flag]);
    }

    #[test]
    fn long_flags_decode_big_endian() {
        let seq = parse_flag_sequence("aabb", FlagType::DoubleChar, true).unwrap();
        assert_eq!(seq, vec![0x6161, 0x6262]);
        assert_eq!(
            parse_flag_sequence("aab", FlagType::DoubleChar, true),
            Err(ParseErrorKind::UnpairedLongFlag)
        );
    }

    #[test]
    fn numeric_flags_decode() {
        let seq = parse_flag_sequence("1,999,65535", FlagType::Number, true).unwrap();
        assert_eq!(seq, vec![1, 999, 65535]);
        assert_eq!(
            parse_flag_sequence("65536", FlagType::Number, true),
            Err(ParseErrorKind::FlagAbove65535)
        );
        assert_eq!(
            parse_flag_sequence("12a", FlagType::Number, true),
            Err(ParseErrorKind::InvalidNumericFlag)
        );
    }

    #[test]
    fn utf8_flags_decode() {
        let seq = parse_flag_sequence("áb", FlagType::Utf8, true).unwrap();
        assert_eq!(seq, vec![0xE1, b'b' as Flag]);
        assert_eq!(
            parse_flag_sequence("😀", FlagType::Utf8, true),
            Err(ParseErrorKind::FlagAbove65535)
        );
    }

    #[test]
    fn decode_canonicalizes_to_equal_sets() {
        // same set written in different orders and syntaxes
        let a = FlagSet::from(parse_flag_sequence("ba", FlagType::SingleChar, true).unwrap());
        let b = FlagSet::from(parse_flag_sequence("ab", FlagType::SingleChar, true).unwrap());
        assert_eq!(a, b);
        let n = FlagSet::from(parse_flag_sequence("98,97", FlagType::Number, true).unwrap());
        assert_eq!(a, n);
    }

    #[test]
    fn aliases_resolve_one_based() {
        let aliases = vec![FlagSet::from_unsorted(vec![7])];
        let got = parse_flags_or_alias("1", FlagType::SingleChar, true, &aliases).unwrap();
        assert!(got.contains(7));
        assert_eq!(
            parse_flags_or_alias("2", FlagType::SingleChar, true, &aliases),
            Err(ParseErrorKind::InvalidNumericAlias)
        );
    }

    #[test]
    fn compound_rules_decode() {
        use CompoundRuleElem::*;
        let r = parse_compound_rule("mn*t?", FlagType::SingleChar, true).unwrap();
        assert_eq!(
            r,
            vec![
                Flag(b'm' as u16),
                Flag(b'n' as u16),
                ZeroOrMore,
                Flag(b't' as u16),
                Optional
            ]
        );
        let r = parse_compound_rule("(aa)(bb)*", FlagType::DoubleChar, true).unwrap();
        assert_eq!(r, vec![Flag(0x6161), Flag(0x6262), ZeroOrMore]);
        let r = parse_compound_rule("(11)(22)?", FlagType::Number, true).unwrap();
        assert_eq!(r, vec![Flag(11), Flag(22), Optional]);
        assert!(parse_compound_rule("11)", FlagType::Number, true).is_err());
    }
}
