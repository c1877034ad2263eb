//! Compound rules and compound patterns.

use crate::flags::{CompoundRuleElem, Flag, FlagSet};

/// The `COMPOUNDRULE` table: each rule is a regex over flag sets, where an
/// atom matches a stem whose flag set contains that flag.
#[derive(Debug, Clone, Default)]
pub struct CompoundRuleTable {
    rules: Vec<Vec<CompoundRuleElem>>,
    all_flags: FlagSet,
}

impl CompoundRuleTable {
    pub fn new(rules: Vec<Vec<CompoundRuleElem>>) -> Self {
        let mut all_flags = FlagSet::new();
        for rule in &rules {
            for elem in rule {
                if let CompoundRuleElem::Flag(f) = elem {
                    all_flags.insert(*f);
                }
            }
        }
        CompoundRuleTable { rules, all_flags }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Quick pre-filter: can a stem with these flags appear in any rule at
    /// all?
    pub fn has_any_of_flags(&self, flags: &FlagSet) -> bool {
        self.all_flags.intersects(flags)
    }

    /// Matches the flag sets of the stems along a compound split against
    /// every rule.
    pub fn match_any_rule(&self, data: &[&FlagSet]) -> bool {
        self.rules.iter().any(|r| match_at(r, data, 0, 0))
    }
}

fn match_at(rule: &[CompoundRuleElem], data: &[&FlagSet], ri: usize, di: usize) -> bool {
    use CompoundRuleElem::*;
    if ri == rule.len() {
        return di == data.len();
    }
    let Flag(f) = rule[ri] else {
        // a quantifier with no preceding atom; rejected at parse time
        return false;
    };
    match rule.get(ri + 1) {
        Some(Optional) => {
            if match_at(rule, data, ri + 2, di) {
                return true;
            }
            di < data.len() && data[di].contains(f) && match_at(rule, data, ri + 2, di + 1)
        }
        Some(ZeroOrMore) => {
            let mut k = di;
            loop {
                if match_at(rule, data, ri + 2, k) {
                    return true;
                }
                if k < data.len() && data[k].contains(f) {
                    k += 1;
                } else {
                    return false;
                }
            }
        }
        _ => di < data.len() && data[di].contains(f) && match_at(rule, data, ri + 1, di + 1),
    }
}

/// One `CHECKCOMPOUNDPATTERN` entry, constraining how two adjacent compound
/// parts may join.
#[derive(Debug, Clone, Default)]
pub struct CompoundPattern {
    pub first_word_end: String,
    pub second_word_begin: String,
    pub first_word_flag: Flag,
    pub second_word_flag: Flag,
    pub replacement: String,
    /// Set when the first-end field was written as `0`: the pattern then
    /// applies only when the first part matched as a bare, unaffixed word.
    pub match_first_only_unaffixed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::parse_compound_rule;
    use crate::flags::FlagType;

    fn fs(flags: &[Flag]) -> FlagSet {
        FlagSet::from_unsorted(flags.to_vec())
    }

    fn table(rules: &[&str]) -> CompoundRuleTable {
        CompoundRuleTable::new(
            rules
                .iter()
                .map(|r| parse_compound_rule(r, FlagType::SingleChar, true).unwrap())
                .collect(),
        )
    }

    #[test]
    fn plain_sequence_rule() {
        let t = table(&["np"]);
        let n = fs(&[b'n' as Flag]);
        let p = fs(&[b'p' as Flag]);
        assert!(t.match_any_rule(&[&n, &p]));
        assert!(!t.match_any_rule(&[&p, &n]));
        assert!(!t.match_any_rule(&[&n]));
    }

    #[test]
    fn star_and_question_quantifiers() {
        // numbers like "1n*t?" style rules
        let t = table(&["mn*t?"]);
        let m = fs(&[b'm' as Flag]);
        let n = fs(&[b'n' as Flag]);
        let x = fs(&[b't' as Flag]);
        assert!(t.match_any_rule(&[&m]));
        assert!(t.match_any_rule(&[&m, &n, &n, &n]));
        assert!(t.match_any_rule(&[&m, &x]));
        assert!(t.match_any_rule(&[&m, &n, &x]));
        assert!(!t.match_any_rule(&[&n, &m]));
        assert!(!t.match_any_rule(&[&m, &x, &x]));
    }

    #[test]
    fn atom_matches_on_set_membership() {
        let t = table(&["ab"]);
        let both = fs(&[b'a' as Flag, b'b' as Flag]);
        assert!(t.match_any_rule(&[&both, &both]));
        assert!(t.has_any_of_flags(&both));
        assert!(!t.has_any_of_flags(&fs(&[b'z' as Flag])));
    }
}
