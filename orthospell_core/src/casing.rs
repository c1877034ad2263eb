//! Casing classification and case mapping.
//!
//! Classification looks only at cased code points; digits and other neutral
//! characters do not influence the result.

/// Capitalization pattern of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// No uppercase at all.
    Small,
    /// Exactly the first cased character is uppercase.
    InitCapital,
    /// No lowercase at all.
    AllCapital,
    /// First character lowercase, at least one uppercase later.
    Camel,
    /// First character uppercase, mixed case afterwards.
    Pascal,
}

pub fn classify_casing(s: &str) -> Casing {
    let mut upper = 0usize;
    let mut lower = 0usize;
    for c in s.chars() {
        if c.is_uppercase() {
            upper += 1;
        } else if c.is_lowercase() {
            lower += 1;
        }
    }
    if upper == 0 {
        return Casing::Small;
    }
    let first_capital = s.chars().next().is_some_and(|c| c.is_uppercase());
    if first_capital && upper == 1 {
        return Casing::InitCapital;
    }
    if lower == 0 {
        return Casing::AllCapital;
    }
    if first_capital {
        Casing::Pascal
    } else {
        Casing::Camel
    }
}

/// Locale-aware case mapping. Unicode's case tables cover everything the
/// dictionaries need except the Turkic dotted/dotless i, which is keyed off
/// the `LANG` option.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseMapper {
    turkic: bool,
}

impl CaseMapper {
    pub fn new(lang: &str) -> Self {
        let primary = lang
            .split(|c| c == '_' || c == '-')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        CaseMapper {
            turkic: primary == "tr" || primary == "az",
        }
    }

    pub fn lower(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            self.push_lower(&mut out, c);
        }
        out
    }

    pub fn upper(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            self.push_upper(&mut out, c);
        }
        out
    }

    /// First code point uppercased, the rest lowered.
    pub fn title(&self, s: &str) -> String {
        let mut chars = s.chars();
        let mut out = String::with_capacity(s.len());
        if let Some(first) = chars.next() {
            self.push_upper(&mut out, first);
        }
        for c in chars {
            self.push_lower(&mut out, c);
        }
        out
    }

    fn push_lower(&self, out: &mut String, c: char) {
        if self.turkic {
            match c {
                'I' => return out.push('ı'),
                'İ' => return out.push('i'),
                _ => {}
            }
        }
        out.extend(c.to_lowercase());
    }

    fn push_upper(&self, out: &mut String, c: char) {
        if self.turkic {
            match c {
                'i' => return out.push('İ'),
                'ı' => return out.push('I'),
                _ => {}
            }
        }
        out.extend(c.to_uppercase());
    }
}

/// Checks whether the code points on the two sides of byte position `i` make
/// an uppercase letter touch an alphabetic one. Used by CHECKCOMPOUNDCASE.
pub fn has_uppercase_at_boundary(word: &str, i: usize) -> bool {
    let Some(next) = word[i..].chars().next() else {
        return false;
    };
    let Some(prev) = word[..i].chars().next_back() else {
        return false;
    };
    (next.is_uppercase() && prev.is_alphabetic())
        || (prev.is_uppercase() && next.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", Casing::Small)]
    #[case("orange", Casing::Small)]
    #[case("'s-gravenhage", Casing::Small)]
    #[case("Orange", Casing::InitCapital)]
    #[case("ORANGE", Casing::AllCapital)]
    #[case("UN1CEF", Casing::AllCapital)]
    #[case("OpenOffice", Casing::Pascal)]
    #[case("openOffice", Casing::Camel)]
    fn classification(#[case] word: &str, #[case] expected: Casing) {
        assert_eq!(classify_casing(word), expected);
    }

    #[test]
    fn title_and_lower() {
        let m = CaseMapper::default();
        assert_eq!(m.title("ORANGE"), "Orange");
        assert_eq!(m.lower("Orange"), "orange");
        assert_eq!(m.upper("naïve"), "NAÏVE");
        assert_eq!(m.title(""), "");
    }

    #[test]
    fn turkic_dotted_i() {
        let tr = CaseMapper::new("tr_TR");
        assert_eq!(tr.lower("I"), "ı");
        assert_eq!(tr.upper("i"), "İ");
        assert_eq!(tr.title("istanbul"), "İstanbul");
        let en = CaseMapper::new("en_US");
        assert_eq!(en.lower("I"), "i");
    }

    #[test]
    fn boundary_case_check() {
        // boundary between "BAZ" and "baz" has uppercase on the left
        let w = "BAZbaz";
        assert!(has_uppercase_at_boundary(w, 3));
        let w = "bazbaz";
        assert!(!has_uppercase_at_boundary(w, 3));
        let w = "bazBaz";
        assert!(has_uppercase_at_boundary(w, 3));
    }
}
