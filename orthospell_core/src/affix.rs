//! Affix entries and the tables that index them by their appended text.

use hashbrown::HashMap;

use crate::condition::Condition;
use crate::flags::{Flag, FlagSet};

/// Which end of the stem an affix touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffixSide {
    Prefix,
    Suffix,
}

/// One `PFX`/`SFX` entry. Prefixes and suffixes share every field and
/// differ only in which end of the word they rewrite.
#[derive(Debug, Clone)]
pub struct Affix {
    pub side: AffixSide,
    pub flag: Flag,
    pub cross_product: bool,
    pub stripping: String,
    pub appending: String,
    pub cont_flags: FlagSet,
    pub condition: Condition,
}

impl Affix {
    /// Inverts the affixation on a surface word whose edge equals
    /// `appending`: removes the appended text and restores the stripped one.
    pub fn to_root(&self, word: &str) -> String {
        match self.side {
            AffixSide::Prefix => {
                let mut root = self.stripping.clone();
                root.push_str(&word[self.appending.len()..]);
                root
            }
            AffixSide::Suffix => {
                let mut root = word[..word.len() - self.appending.len()].to_string();
                root.push_str(&self.stripping);
                root
            }
        }
    }

    /// Applies the affix to a stem whose edge equals `stripping`.
    pub fn to_derived(&self, root: &str) -> String {
        match self.side {
            AffixSide::Prefix => {
                let mut w = self.appending.clone();
                w.push_str(&root[self.stripping.len()..]);
                w
            }
            AffixSide::Suffix => {
                let mut w = root[..root.len() - self.stripping.len()].to_string();
                w.push_str(&self.appending);
                w
            }
        }
    }

    /// The condition is checked on the root, at the edge the affix touches.
    pub fn check_condition(&self, root: &str) -> bool {
        match self.side {
            AffixSide::Prefix => self.condition.match_prefix(root),
            AffixSide::Suffix => self.condition.match_suffix(root),
        }
    }
}

/// Multimap of affixes keyed by their `appending` text, supporting the
/// all-prefixes-of / all-suffixes-of walk the recognizer needs. The walk is
/// bounded by the longest appending in the table.
#[derive(Debug, Clone)]
pub struct AffixTable {
    side: AffixSide,
    table: HashMap<String, Vec<Affix>>,
    all_cont_flags: FlagSet,
    max_appending_len: usize,
}

impl AffixTable {
    pub fn new(side: AffixSide) -> Self {
        AffixTable {
            side,
            table: HashMap::new(),
            all_cont_flags: FlagSet::new(),
            max_appending_len: 0,
        }
    }

    pub fn side(&self) -> AffixSide {
        self.side
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn insert(&mut self, affix: Affix) {
        debug_assert_eq!(affix.side, self.side);
        self.all_cont_flags.union_with(&affix.cont_flags);
        self.max_appending_len = self.max_appending_len.max(affix.appending.len());
        self.table
            .entry(affix.appending.clone())
            .or_default()
            .push(affix);
    }

    pub fn has_continuation_flags(&self) -> bool {
        !self.all_cont_flags.is_empty()
    }

    pub fn has_continuation_flag(&self, flag: Flag) -> bool {
        self.all_cont_flags.contains(flag)
    }

    /// All entries whose appending matches the relevant edge of `word`:
    /// every prefix of `word` for a prefix table, every suffix for a suffix
    /// table, the empty appending included.
    pub fn affixes_of<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a Affix> + 'a {
        let bounds: Vec<&'a str> = match self.side {
            AffixSide::Prefix => std::iter::once(0)
                .chain(word.char_indices().map(|(i, c)| i + c.len_utf8()))
                .take_while(|&end| end <= self.max_appending_len)
                .map(|end| &word[..end])
                .collect(),
            AffixSide::Suffix => std::iter::once(word.len())
                .chain(word.char_indices().rev().map(|(i, _)| i))
                .take_while(|&start| word.len() - start <= self.max_appending_len)
                .map(|start| &word[start..])
                .collect(),
        };
        bounds
            .into_iter()
            .filter_map(move |key| self.table.get(key))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffix(flag: Flag, strip: &str, append: &str, cond: &str) -> Affix {
        Affix {
            side: AffixSide::Suffix,
            flag,
            cross_product: true,
            stripping: strip.to_string(),
            appending: append.to_string(),
            cont_flags: FlagSet::new(),
            condition: Condition::new(cond).unwrap(),
        }
    }

    #[test]
    fn root_and_derived_are_inverse_on_suffixes() {
        let a = suffix(1, "y", "ies", "[^aeiou]y");
        assert_eq!(a.to_root("berries"), "berry");
        assert_eq!(a.to_derived("berry"), "berries");
        assert!(a.check_condition("berry"));
        assert!(!a.check_condition("may"));
    }

    #[test]
    fn root_and_derived_are_inverse_on_prefixes() {
        let a = Affix {
            side: AffixSide::Prefix,
            flag: 2,
            cross_product: true,
            stripping: String::new(),
            appending: "pre".to_string(),
            cont_flags: FlagSet::new(),
            condition: Condition::new(".").unwrap(),
        };
        assert_eq!(a.to_root("predrink"), "drink");
        assert_eq!(a.to_derived("drink"), "predrink");
    }

    #[test]
    fn derivation_round_trip() {
        let a = suffix(1, "er", "ingly", "er");
        let stem = "bolder";
        let derived = a.to_derived(stem);
        assert_eq!(a.to_derived(&a.to_root(&derived)), derived);
    }

    #[test]
    fn suffix_table_walks_all_suffixes_of_query() {
        let mut t = AffixTable::new(AffixSide::Suffix);
        t.insert(suffix(1, "", "s", "."));
        t.insert(suffix(2, "", "es", "."));
        t.insert(suffix(3, "", "ses", "."));
        t.insert(suffix(4, "", "zzzz", "."));
        let found: Vec<Flag> = t.affixes_of("buses").map(|a| a.flag).collect();
        assert_eq!(found, vec![1, 2, 3]);
    }

    fn prefix(flag: Flag, append: &str) -> Affix {
        Affix {
            side: AffixSide::Prefix,
            flag,
            cross_product: false,
            stripping: String::new(),
            appending: append.to_string(),
            cont_flags: FlagSet::new(),
            condition: Condition::new(".").unwrap(),
        }
    }

    #[test]
    fn prefix_table_walks_all_prefixes_of_query() {
        let mut t = AffixTable::new(AffixSide::Prefix);
        t.insert(prefix(1, "p"));
        t.insert(prefix(2, "pre"));
        t.insert(prefix(3, "press"));
        let found: Vec<Flag> = t.affixes_of("prefix").map(|x| x.flag).collect();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn continuation_flags_are_aggregated() {
        let mut t = AffixTable::new(AffixSide::Suffix);
        let mut a = suffix(1, "", "s", ".");
        a.cont_flags = FlagSet::from_unsorted(vec![42]);
        t.insert(a);
        assert!(t.has_continuation_flag(42));
        assert!(!t.has_continuation_flag(43));
    }
}
