//! String tables backing the recognizer and the suggester: substring
//! replacement (ICONV/OCONV), the REP table, BREAK patterns and MAP groups.

/// Longest-leftmost substring replacer, used for `ICONV` and `OCONV`.
///
/// The table is sorted by pattern; at every position of the input the
/// longest pattern starting there wins.
#[derive(Debug, Clone, Default)]
pub struct SubstrReplacer {
    table: Vec<(String, String)>,
    max_pattern_len: usize,
}

impl SubstrReplacer {
    pub fn new(mut table: Vec<(String, String)>) -> Self {
        table.retain(|(k, _)| !k.is_empty());
        table.sort_by(|a, b| a.0.cmp(&b.0));
        table.dedup_by(|a, b| a.0 == b.0);
        let max_pattern_len = table.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        SubstrReplacer {
            table,
            max_pattern_len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn find_match(&self, rest: &[u8]) -> Option<&(String, String)> {
        let max = self.max_pattern_len.min(rest.len());
        for len in (1..=max).rev() {
            if let Ok(i) = self
                .table
                .binary_search_by(|(k, _)| k.as_bytes().cmp(&rest[..len]))
            {
                return Some(&self.table[i]);
            }
        }
        None
    }

    pub fn replace(&self, s: &str) -> String {
        if self.table.is_empty() {
            return s.to_string();
        }
        let bytes = s.as_bytes();
        let mut out = String::with_capacity(s.len());
        let mut i = 0;
        while i < bytes.len() {
            if let Some((pat, rep)) = self.find_match(&bytes[i..]) {
                out.push_str(rep);
                i += pat.len();
            } else if let Some(c) = s[i..].chars().next() {
                out.push(c);
                i += c.len_utf8();
            } else {
                break;
            }
        }
        out
    }
}

/// The `REP` table, partitioned by its `^`/`$` anchors.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    whole_word: Vec<(String, String)>,
    start_word: Vec<(String, String)>,
    end_word: Vec<(String, String)>,
    any_place: Vec<(String, String)>,
}

impl ReplacementTable {
    pub fn new(table: Vec<(String, String)>) -> Self {
        let mut t = ReplacementTable::default();
        for (mut pat, rep) in table {
            if pat.is_empty() || pat == "^" || pat == "$" {
                continue;
            }
            let anchored_start = pat.starts_with('^');
            if anchored_start {
                pat.remove(0);
            }
            let anchored_end = pat.ends_with('$');
            if anchored_end {
                pat.pop();
            }
            if pat.is_empty() {
                continue;
            }
            match (anchored_start, anchored_end) {
                (true, true) => t.whole_word.push((pat, rep)),
                (true, false) => t.start_word.push((pat, rep)),
                (false, true) => t.end_word.push((pat, rep)),
                (false, false) => t.any_place.push((pat, rep)),
            }
        }
        t
    }

    pub fn is_empty(&self) -> bool {
        self.whole_word.is_empty()
            && self.start_word.is_empty()
            && self.end_word.is_empty()
            && self.any_place.is_empty()
    }

    pub fn whole_word(&self) -> &[(String, String)] {
        &self.whole_word
    }

    pub fn start_word(&self) -> &[(String, String)] {
        &self.start_word
    }

    pub fn end_word(&self) -> &[(String, String)] {
        &self.end_word
    }

    pub fn any_place(&self) -> &[(String, String)] {
        &self.any_place
    }
}

/// The `BREAK` table: anchored patterns are stripped of their anchor and
/// kept apart from the interior ones.
#[derive(Debug, Clone, Default)]
pub struct BreakTable {
    start: Vec<String>,
    end: Vec<String>,
    middle: Vec<String>,
}

impl BreakTable {
    pub fn new(table: Vec<String>) -> Self {
        let mut t = BreakTable::default();
        for mut pat in table {
            if pat.is_empty() || pat == "^" || pat == "$" {
                continue;
            }
            if let Some(rest) = pat.strip_prefix('^') {
                t.start.push(rest.to_string());
            } else if pat.ends_with('$') {
                pat.pop();
                t.end.push(pat);
            } else {
                t.middle.push(pat);
            }
        }
        t
    }

    pub fn start_word_breaks(&self) -> &[String] {
        &self.start
    }

    pub fn end_word_breaks(&self) -> &[String] {
        &self.end
    }

    pub fn middle_word_breaks(&self) -> &[String] {
        &self.middle
    }
}

/// One `MAP` group of interchangeable characters and strings. Multi-code-
/// point members are written in parentheses.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGroup {
    pub chars: String,
    pub strings: Vec<String>,
}

impl SimilarityGroup {
    pub fn parse(s: &str) -> Self {
        let mut g = SimilarityGroup::default();
        let mut rest = s;
        loop {
            match rest.find('(') {
                None => {
                    g.chars.push_str(rest);
                    break;
                }
                Some(open) => {
                    g.chars.push_str(&rest[..open]);
                    let after = &rest[open + 1..];
                    match after.find(')') {
                        None => break,
                        Some(close) => {
                            let member = &after[..close];
                            if member.chars().count() == 1 {
                                g.chars.push_str(member);
                            } else if !member.is_empty() {
                                g.strings.push(member.to_string());
                            }
                            rest = &after[close + 1..];
                        }
                    }
                }
            }
        }
        g
    }

    /// All members, single characters first.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.chars
            .char_indices()
            .map(move |(i, c)| &self.chars[i..i + c.len_utf8()])
            .chain(self.strings.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn replacer_prefers_longest_leftmost() {
        let r = SubstrReplacer::new(pairs(&[("aa", "X"), ("a", "Y")]));
        assert_eq!(r.replace("aaa"), "XY");
        assert_eq!(r.replace("baab"), "bXb");
        assert_eq!(r.replace(""), "");
    }

    #[test]
    fn replacer_ignores_empty_patterns() {
        let r = SubstrReplacer::new(pairs(&[("", "X"), ("b", "c")]));
        assert_eq!(r.replace("abc"), "acc");
    }

    #[test]
    fn replacer_is_utf8_clean() {
        let r = SubstrReplacer::new(pairs(&[("oe", "ö")]));
        assert_eq!(r.replace("koeln"), "köln");
        let r = SubstrReplacer::new(pairs(&[("ö", "oe")]));
        assert_eq!(r.replace("köln"), "koeln");
    }

    #[test]
    fn replacement_table_partitions_by_anchor() {
        let t = ReplacementTable::new(pairs(&[
            ("^foo$", "bar"),
            ("^pre", "post"),
            ("shun$", "tion"),
            ("ph", "f"),
        ]));
        assert_eq!(t.whole_word(), &[("foo".to_string(), "bar".to_string())]);
        assert_eq!(t.start_word(), &[("pre".to_string(), "post".to_string())]);
        assert_eq!(t.end_word(), &[("shun".to_string(), "tion".to_string())]);
        assert_eq!(t.any_place(), &[("ph".to_string(), "f".to_string())]);
    }

    #[test]
    fn break_table_partitions_by_anchor() {
        let t = BreakTable::new(vec![
            "-".to_string(),
            "^-".to_string(),
            "-$".to_string(),
            "^".to_string(),
        ]);
        assert_eq!(t.start_word_breaks(), &["-".to_string()]);
        assert_eq!(t.end_word_breaks(), &["-".to_string()]);
        assert_eq!(t.middle_word_breaks(), &["-".to_string()]);
    }

    #[test]
    fn similarity_group_parses_parenthesized_members() {
        let g = SimilarityGroup::parse("a(á)(ae)");
        assert_eq!(g.chars, "aá");
        assert_eq!(g.strings, vec!["ae".to_string()]);
        let members: Vec<&str> = g.members().collect();
        assert_eq!(members, vec!["a", "á", "ae"]);
    }
}
