//! The `PHONE` table: aspell-style phonetic replacement rules used by the
//! phonetic suggestion strategy.
//!
//! A rule's left side is a literal with optional metacharacters: `(...)` a
//! character class, `<` go back one position after replacing, `-` (possibly
//! repeated) go back that many characters before replacing, a digit sets the
//! rule priority, `^` anchors at the start (`^^` re-anchors the next match),
//! `$` anchors at the end.

#[derive(Debug, Clone)]
struct PhoneticRule {
    pattern: Vec<char>,
    first: char,
    replacement: Vec<char>,
}

#[derive(Debug, Clone, Copy)]
struct PhonetMatch {
    count_matched: usize,
    go_back_before: usize,
    priority: u8,
    go_back_after: bool,
    treat_next_as_begin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PhoneticTable {
    rules: Vec<PhoneticRule>,
}

impl PhoneticTable {
    pub fn new(table: Vec<(String, String)>) -> Self {
        let mut rules: Vec<PhoneticRule> = table
            .into_iter()
            .filter(|(pat, _)| !pat.is_empty())
            .map(|(pat, rep)| {
                let pattern: Vec<char> = pat.chars().collect();
                let first = pattern[0];
                let replacement = if rep == "_" {
                    Vec::new()
                } else {
                    rep.chars().collect()
                };
                PhoneticRule {
                    pattern,
                    first,
                    replacement,
                }
            })
            .collect();
        rules.sort_by_key(|r| r.first);
        PhoneticTable { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn bucket(&self, c: char) -> &[PhoneticRule] {
        let lo = self.rules.partition_point(|r| r.first < c);
        let hi = self.rules.partition_point(|r| r.first <= c);
        &self.rules[lo..hi]
    }

    fn match_rule(
        word: &[char],
        i: usize,
        pattern: &[char],
        at_begin: bool,
    ) -> Option<PhonetMatch> {
        let is_meta = |c: char| matches!(c, '(' | '<' | '-' | '0'..='9' | '^' | '$');
        let mut j = pattern
            .iter()
            .position(|&c| is_meta(c))
            .unwrap_or(pattern.len());
        if word.len() - i < j || word[i..i + j] != pattern[..j] {
            return None;
        }
        let mut m = PhonetMatch {
            count_matched: j,
            go_back_before: 0,
            priority: 5,
            go_back_after: false,
            treat_next_as_begin: false,
        };
        if j == pattern.len() {
            return Some(m);
        }
        if pattern[j] == '(' {
            let close = pattern[j..].iter().position(|&c| c == ')').map(|k| j + k)?;
            let next = word.get(i + j)?;
            if !pattern[j + 1..close].contains(next) {
                return None;
            }
            j = close + 1;
            m.count_matched += 1;
        }
        if j == pattern.len() {
            return Some(m);
        }
        if pattern[j] == '<' {
            m.go_back_after = true;
            j += 1;
        }
        let dashes_end = pattern[j..]
            .iter()
            .position(|&c| c != '-')
            .map(|k| j + k)
            .unwrap_or(pattern.len());
        m.go_back_before = dashes_end - j;
        if m.go_back_before >= m.count_matched && m.go_back_before > 0 {
            return None; // bad rule
        }
        j = dashes_end;
        if j == pattern.len() {
            return Some(m);
        }
        if pattern[j].is_ascii_digit() {
            m.priority = pattern[j] as u8 - b'0';
            j += 1;
        }
        if j == pattern.len() {
            return Some(m);
        }
        if pattern[j] == '^' {
            if !at_begin {
                return None;
            }
            j += 1;
        }
        if j == pattern.len() {
            return Some(m);
        }
        if pattern[j] == '^' {
            m.treat_next_as_begin = true;
            j += 1;
        }
        if j == pattern.len() {
            return Some(m);
        }
        if pattern[j] != '$' {
            return None; // bad rule
        }
        if i + m.count_matched == word.len() {
            return Some(m);
        }
        None
    }

    /// Applies the table to a word, returning its phonetic code, or `None`
    /// when no rule fired at all. A cap on `<`-driven rewinds prevents
    /// rule sets with overlapping rules from looping.
    pub fn phonet(&self, word: &str) -> Option<String> {
        if self.rules.is_empty() {
            return None;
        }
        let mut w: Vec<char> = word.chars().collect();
        let mut applied = false;
        let mut at_begin = true;
        let mut go_backs_after = 0usize;
        let mut i = 0usize;
        'scan: while i < w.len() {
            for rule in self.bucket(w[i]) {
                let Some(mut m) = Self::match_rule(&w, i, &rule.pattern, at_begin) else {
                    continue;
                };
                let mut chosen = rule;
                if m.go_back_before == 0 && m.count_matched > 0 {
                    // a higher-priority rule starting at the last matched
                    // character may take over
                    let j = i + m.count_matched - 1;
                    for rule2 in self.bucket(w[j]) {
                        if let Some(m2) = Self::match_rule(&w, j, &rule2.pattern, false) {
                            if m2.priority >= m.priority {
                                i = j;
                                chosen = rule2;
                                m = m2;
                                break;
                            }
                        }
                    }
                }
                let mut replacement = chosen.replacement.clone();
                if m.priority == 1 && i > 0 {
                    // suppress a duplicate letter at the seam
                    if replacement.first() == w.get(i - 1) {
                        replacement.remove(0);
                    }
                }
                let del = m.count_matched - m.go_back_before;
                let rep_len = replacement.len();
                w.splice(i..i + del, replacement);
                at_begin = m.treat_next_as_begin;
                applied = true;
                if m.go_back_after && go_backs_after < 100 {
                    go_backs_after += 1;
                } else {
                    i += rep_len;
                }
                continue 'scan;
            }
            at_begin = false;
            i += 1;
        }
        applied.then(|| w.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rules: &[(&str, &str)]) -> PhoneticTable {
        PhoneticTable::new(
            rules
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        )
    }

    #[test]
    fn literal_rules_rewrite() {
        let t = table(&[("PH", "F"), ("SCH", "SH")]);
        assert_eq!(t.phonet("PHOTO").unwrap(), "FOTO");
        assert_eq!(t.phonet("SCHOOL").unwrap(), "SHOOL");
        assert_eq!(t.phonet("DOG"), None);
    }

    #[test]
    fn underscore_means_empty_replacement() {
        let t = table(&[("H", "_")]);
        assert_eq!(t.phonet("OHO").unwrap(), "OO");
    }

    #[test]
    fn start_anchor_only_fires_at_begin() {
        let t = table(&[("KN^", "N")]);
        assert_eq!(t.phonet("KNIFE").unwrap(), "NIFE");
        assert_eq!(t.phonet("AKNIFE"), None);
    }

    #[test]
    fn end_anchor_only_fires_at_end() {
        let t = table(&[("GH$", "F")]);
        assert_eq!(t.phonet("TOUGH").unwrap(), "TOUF");
        assert_eq!(t.phonet("GHOST"), None);
    }

    #[test]
    fn character_class_matches_one() {
        let t = table(&[("C(EI)", "S")]);
        // C followed by E or I becomes S, consuming both
        assert_eq!(t.phonet("CE").unwrap(), "S");
        assert_eq!(t.phonet("CO"), None);
    }

    #[test]
    fn same_code_for_similar_words() {
        let t = table(&[
            ("PH", "F"),
            ("SHUN$", "XN"),
            ("TION$", "XN"),
            ("A", "*"),
            ("E", "*"),
            ("I", "*"),
            ("O", "*"),
            ("U", "*"),
        ]);
        assert_eq!(t.phonet("STASHUN"), t.phonet("STATION"));
    }
}
