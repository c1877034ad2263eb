//! The recognizer: decides whether a word is valid by exploring casing
//! variants, affix strips and compound splits against the word list.

use crate::aff_data::AffData;
use crate::affix::Affix;
use crate::casing::{classify_casing, has_uppercase_at_boundary, Casing};
use crate::flags::{FlagSet, HIDDEN_HOMONYM_FLAG};
use crate::strings::{count_occurrences_of, erase_chars, is_number};
use crate::word_list::WordList;

/// Where in a word an affix-stripped candidate sits. Compound parts get
/// extra constraints on which affixes and stems are admissible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AffixingMode {
    FullWord,
    AtCompoundBegin,
    AtCompoundMiddle,
    AtCompoundEnd,
}

/// A matched compound part: its flags and whether affixes took part in the
/// match.
type PartMatch<'a> = (&'a FlagSet, bool);

const MAX_BREAK_DEPTH: usize = 9;
const MAX_SHARPS_DEPTH: usize = 5;

pub struct Checker<'a> {
    aff: &'a AffData,
    words: &'a WordList,
}

impl<'a> Checker<'a> {
    pub fn new(aff: &'a AffData, words: &'a WordList) -> Self {
        Checker { aff, words }
    }

    /// Full spell pipeline for one input word, already valid UTF-8 and
    /// within the length bound.
    pub fn spell(&self, word: &str) -> bool {
        let converted = self.aff.input_conv.replace(word);
        let mut s = erase_chars(&converted, &self.aff.ignored_chars);
        while s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() {
            return true;
        }
        if is_number(&s) {
            return true;
        }
        self.spell_break(&s, 0)
    }

    /// Checks one token, retrying on break patterns when the direct check
    /// fails. A hit on a forbidden or warn-forbidden entry blocks the break
    /// retry on purpose.
    fn spell_break(&self, s: &str, depth: usize) -> bool {
        if let Some(flags) = self.spell_casing(s, true) {
            if flags.contains(self.aff.forbiddenword_flag) {
                return false;
            }
            if self.aff.forbid_warn && flags.contains(self.aff.warn_flag) {
                return false;
            }
            return true;
        }
        if depth == MAX_BREAK_DEPTH {
            return false;
        }
        for pat in self.aff.break_table.start_word_breaks() {
            if s.len() > pat.len() && s.starts_with(pat.as_str())
                && self.spell_break(&s[pat.len()..], depth + 1)
            {
                return true;
            }
        }
        for pat in self.aff.break_table.end_word_breaks() {
            if s.len() > pat.len() && s.ends_with(pat.as_str())
                && self.spell_break(&s[..s.len() - pat.len()], depth + 1)
            {
                return true;
            }
        }
        for pat in self.aff.break_table.middle_word_breaks() {
            if let Some(i) = s.find(pat.as_str()) {
                if i > 0
                    && i + pat.len() < s.len()
                    && self.spell_break(&s[..i], depth + 1)
                    && self.spell_break(&s[i + pat.len()..], depth + 1)
                {
                    return true;
                }
            }
        }
        false
    }

    /// Dispatches on the casing class of the input and returns the flags of
    /// the accepted entry, if any. `with_compound` lets callers probe
    /// whether a word is valid without its compound reading.
    pub(crate) fn spell_casing(&self, s: &str, with_compound: bool) -> Option<&'a FlagSet> {
        match classify_casing(s) {
            Casing::Small | Casing::Camel | Casing::Pascal => {
                self.check_word(s, false, true, with_compound)
            }
            Casing::AllCapital => self.spell_casing_upper(s, with_compound),
            Casing::InitCapital => self.spell_casing_title(s, with_compound),
        }
    }

    fn spell_casing_upper(&self, s: &str, with_compound: bool) -> Option<&'a FlagSet> {
        // hidden homonyms were inserted precisely to serve this path
        if let Some(res) = self.check_word(s, true, false, with_compound) {
            return Some(res);
        }
        if self.aff.checksharps && s.contains("SS") {
            let base = self.aff.case_mapper.lower(s);
            if let Some(res) = self.spell_sharps(&base, 0, 0, 0) {
                return Some(res);
            }
        }
        let title = self.aff.case_mapper.title(s);
        if let Some(res) = self.check_word(&title, true, false, with_compound) {
            if !res.contains(self.aff.keepcase_flag) {
                return Some(res);
            }
        }
        let lower = self.aff.case_mapper.lower(s);
        if let Some(res) = self.check_word(&lower, true, false, with_compound) {
            if !res.contains(self.aff.keepcase_flag) {
                return Some(res);
            }
        }
        None
    }

    /// Tries `ß` in place of each combination of `ss` occurrences.
    fn spell_sharps(
        &self,
        base: &str,
        start: usize,
        depth: usize,
        replacements: usize,
    ) -> Option<&'a FlagSet> {
        if depth < MAX_SHARPS_DEPTH {
            if let Some(p) = base[start..].find("ss") {
                let pos = start + p;
                let mut with_sharp = String::with_capacity(base.len());
                with_sharp.push_str(&base[..pos]);
                with_sharp.push('ß');
                with_sharp.push_str(&base[pos + 2..]);
                let after = pos + 'ß'.len_utf8();
                if let Some(res) =
                    self.spell_sharps(&with_sharp, after, depth + 1, replacements + 1)
                {
                    return Some(res);
                }
                return self.spell_sharps(base, pos + 2, depth + 1, replacements);
            }
        }
        if replacements > 0 {
            return self.check_word(base, true, false, true);
        }
        None
    }

    fn spell_casing_title(&self, s: &str, with_compound: bool) -> Option<&'a FlagSet> {
        if let Some(res) = self.check_word(s, true, true, with_compound) {
            return Some(res);
        }
        let lower = self.aff.case_mapper.lower(s);
        let res = self.check_word(&lower, true, true, with_compound)?;
        // a KEEPCASE lowercase entry does not serve its title-cased form,
        // except for sharp-s words under CHECKSHARPS
        if res.contains(self.aff.keepcase_flag) && !(self.aff.checksharps && lower.contains('ß')) {
            return None;
        }
        Some(res)
    }

    /// One casing variant: simple lookup, then affix strips, then compound
    /// splits.
    pub(crate) fn check_word(
        &self,
        s: &str,
        allow_bad_forceucase: bool,
        skip_hidden: bool,
        with_compound: bool,
    ) -> Option<&'a FlagSet> {
        if let Some(res) = self.check_simple_word(s, skip_hidden) {
            return Some(res);
        }
        if let Some(res) = self.check_affixed(s, AffixingMode::FullWord, skip_hidden) {
            return Some(res);
        }
        if with_compound {
            self.check_compound(s, allow_bad_forceucase)
        } else {
            None
        }
    }

    /// Like [`check_word`] but without the compound path; used by the
    /// CHECKCOMPOUNDREP heuristic.
    fn check_non_compound(&self, s: &str) -> Option<&'a FlagSet> {
        if let Some(res) = self.check_simple_word(s, true) {
            return Some(res);
        }
        self.check_affixed(s, AffixingMode::FullWord, true)
    }

    fn check_simple_word(&self, s: &str, skip_hidden: bool) -> Option<&'a FlagSet> {
        let entries = self.words.get(s);
        // a forbidden entry wins over every homonym
        if self.aff.forbiddenword_flag != 0 {
            if let Some(f) = entries
                .iter()
                .find(|f| f.contains(self.aff.forbiddenword_flag))
            {
                return Some(f);
            }
        }
        for flags in entries {
            if skip_hidden && flags.contains(HIDDEN_HOMONYM_FLAG) {
                continue;
            }
            if flags.contains(self.aff.need_affix_flag) {
                continue;
            }
            if flags.contains(self.aff.compound_onlyin_flag) {
                continue;
            }
            return Some(flags);
        }
        None
    }

    fn check_affixed(
        &self,
        s: &str,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> Option<&'a FlagSet> {
        if let Some(res) = self.strip_suffix_only(s, mode, skip_hidden) {
            return Some(res);
        }
        if let Some(res) = self.strip_prefix_only(s, mode, skip_hidden) {
            return Some(res);
        }
        if let Some(res) = self.strip_prefix_then_suffix(s, mode, skip_hidden) {
            return Some(res);
        }
        if self.aff.complex_prefixes {
            self.strip_prefix_then_prefix(s, mode, skip_hidden)
        } else {
            self.strip_suffix_then_suffix(s, mode, skip_hidden)
        }
    }

    /// Constraints an affix must satisfy when it participates in a given
    /// position. Interior compound boundaries need COMPOUNDPERMITFLAG.
    fn affix_allowed_in_mode(&self, affix: &Affix, mode: AffixingMode) -> bool {
        use crate::affix::AffixSide::*;
        match mode {
            AffixingMode::FullWord => {
                !affix.cont_flags.contains(self.aff.compound_onlyin_flag)
            }
            _ if affix.cont_flags.contains(self.aff.compound_forbid_flag) => false,
            AffixingMode::AtCompoundBegin => {
                affix.side == Prefix
                    || affix.cont_flags.contains(self.aff.compound_permit_flag)
            }
            AffixingMode::AtCompoundEnd => {
                affix.side == Suffix
                    || affix.cont_flags.contains(self.aff.compound_permit_flag)
            }
            AffixingMode::AtCompoundMiddle => {
                affix.cont_flags.contains(self.aff.compound_permit_flag)
            }
        }
    }

    /// Constraints on the stem entry found after stripping.
    fn stem_allowed(
        &self,
        flags: &FlagSet,
        affix: &Affix,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> bool {
        if !flags.contains(affix.flag) {
            return false;
        }
        if skip_hidden && flags.contains(HIDDEN_HOMONYM_FLAG) {
            return false;
        }
        if flags.contains(self.aff.forbiddenword_flag) {
            return false;
        }
        if mode == AffixingMode::FullWord && flags.contains(self.aff.compound_onlyin_flag) {
            return false;
        }
        // an affix that itself needs an affix does not discharge NEEDAFFIX
        if flags.contains(self.aff.need_affix_flag)
            && affix.cont_flags.contains(self.aff.need_affix_flag)
        {
            return false;
        }
        self.compound_position_ok(flags, Some(&affix.cont_flags), mode)
    }

    /// Positional compound flag requirement on a matched part.
    fn compound_position_ok(
        &self,
        stem_flags: &FlagSet,
        affix_cont: Option<&FlagSet>,
        mode: AffixingMode,
    ) -> bool {
        let has = |flag| {
            flag != 0
                && (stem_flags.contains(flag)
                    || affix_cont.is_some_and(|c| c.contains(flag)))
        };
        match mode {
            AffixingMode::FullWord => true,
            AffixingMode::AtCompoundBegin => {
                has(self.aff.compound_flag) || has(self.aff.compound_begin_flag)
            }
            AffixingMode::AtCompoundMiddle => {
                has(self.aff.compound_flag) || has(self.aff.compound_middle_flag)
            }
            AffixingMode::AtCompoundEnd => {
                has(self.aff.compound_flag) || has(self.aff.compound_last_flag)
            }
        }
    }

    fn strip_suffix_only(
        &self,
        s: &str,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> Option<&'a FlagSet> {
        for sfx in self.aff.suffixes.affixes_of(s) {
            if !self.aff.fullstrip && sfx.appending.len() == s.len() {
                continue;
            }
            if sfx.cont_flags.contains(self.aff.circumfix_flag) {
                continue;
            }
            if !self.affix_allowed_in_mode(sfx, mode) {
                continue;
            }
            let root = sfx.to_root(s);
            if !sfx.check_condition(&root) {
                continue;
            }
            for flags in self.words.get(&root) {
                if self.stem_allowed(flags, sfx, mode, skip_hidden) {
                    return Some(flags);
                }
            }
        }
        None
    }

    fn strip_prefix_only(
        &self,
        s: &str,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> Option<&'a FlagSet> {
        for pfx in self.aff.prefixes.affixes_of(s) {
            if !self.aff.fullstrip && pfx.appending.len() == s.len() {
                continue;
            }
            if pfx.cont_flags.contains(self.aff.circumfix_flag) {
                continue;
            }
            if !self.affix_allowed_in_mode(pfx, mode) {
                continue;
            }
            let root = pfx.to_root(s);
            if !pfx.check_condition(&root) {
                continue;
            }
            for flags in self.words.get(&root) {
                if self.stem_allowed(flags, pfx, mode, skip_hidden) {
                    return Some(flags);
                }
            }
        }
        None
    }

    /// Cross-product strip: an outer prefix and an outer suffix on the same
    /// stem. Both entries must opt in via their cross-product bit, and a
    /// circumfix-flagged affix needs a circumfix-flagged partner.
    fn strip_prefix_then_suffix(
        &self,
        s: &str,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> Option<&'a FlagSet> {
        for pfx in self.aff.prefixes.affixes_of(s) {
            if !pfx.cross_product {
                continue;
            }
            if !self.aff.fullstrip && pfx.appending.len() == s.len() {
                continue;
            }
            if !self.affix_allowed_in_mode(pfx, mode) {
                continue;
            }
            let mid = pfx.to_root(s);
            if !pfx.check_condition(&mid) {
                continue;
            }
            let pfx_circum = pfx.cont_flags.contains(self.aff.circumfix_flag);
            for sfx in self.aff.suffixes.affixes_of(&mid) {
                if !sfx.cross_product {
                    continue;
                }
                if !self.aff.fullstrip && sfx.appending.len() == mid.len() {
                    continue;
                }
                if sfx.cont_flags.contains(self.aff.circumfix_flag) != pfx_circum {
                    continue;
                }
                if !self.affix_allowed_in_mode(sfx, mode) {
                    continue;
                }
                let root = sfx.to_root(&mid);
                if !sfx.check_condition(&root) {
                    continue;
                }
                for flags in self.words.get(&root) {
                    if !flags.contains(pfx.flag) {
                        continue;
                    }
                    if !(flags.contains(sfx.flag) || pfx.cont_flags.contains(sfx.flag)) {
                        continue;
                    }
                    if skip_hidden && flags.contains(HIDDEN_HOMONYM_FLAG) {
                        continue;
                    }
                    if flags.contains(self.aff.forbiddenword_flag) {
                        continue;
                    }
                    if mode == AffixingMode::FullWord
                        && flags.contains(self.aff.compound_onlyin_flag)
                    {
                        continue;
                    }
                    if !self.compound_position_ok(flags, Some(&pfx.cont_flags), mode)
                        && !self.compound_position_ok(flags, Some(&sfx.cont_flags), mode)
                    {
                        continue;
                    }
                    return Some(flags);
                }
            }
        }
        None
    }

    /// Two stacked suffixes: the inner one's continuation flags must list
    /// the outer one's flag.
    fn strip_suffix_then_suffix(
        &self,
        s: &str,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> Option<&'a FlagSet> {
        if !self.aff.suffixes.has_continuation_flags() {
            return None;
        }
        for outer in self.aff.suffixes.affixes_of(s) {
            if !self.aff.fullstrip && outer.appending.len() == s.len() {
                continue;
            }
            if outer.cont_flags.contains(self.aff.circumfix_flag) {
                continue;
            }
            if !self.affix_allowed_in_mode(outer, mode) {
                continue;
            }
            if !self.aff.suffixes.has_continuation_flag(outer.flag) {
                continue;
            }
            let mid = outer.to_root(s);
            if !outer.check_condition(&mid) {
                continue;
            }
            for inner in self.aff.suffixes.affixes_of(&mid) {
                if !inner.cont_flags.contains(outer.flag) {
                    continue;
                }
                if inner.cont_flags.contains(self.aff.circumfix_flag) {
                    continue;
                }
                if !self.aff.fullstrip && inner.appending.len() == mid.len() {
                    continue;
                }
                let root = inner.to_root(&mid);
                if !inner.check_condition(&root) {
                    continue;
                }
                for flags in self.words.get(&root) {
                    if self.stem_allowed(flags, inner, mode, skip_hidden) {
                        return Some(flags);
                    }
                }
            }
        }
        None
    }

    /// Two stacked prefixes, the COMPLEXPREFIXES counterpart of
    /// [`strip_suffix_then_suffix`].
    fn strip_prefix_then_prefix(
        &self,
        s: &str,
        mode: AffixingMode,
        skip_hidden: bool,
    ) -> Option<&'a FlagSet> {
        if !self.aff.prefixes.has_continuation_flags() {
            return None;
        }
        for outer in self.aff.prefixes.affixes_of(s) {
            if !self.aff.fullstrip && outer.appending.len() == s.len() {
                continue;
            }
            if outer.cont_flags.contains(self.aff.circumfix_flag) {
                continue;
            }
            if !self.affix_allowed_in_mode(outer, mode) {
                continue;
            }
            if !self.aff.prefixes.has_continuation_flag(outer.flag) {
                continue;
            }
            let mid = outer.to_root(s);
            if !outer.check_condition(&mid) {
                continue;
            }
            for inner in self.aff.prefixes.affixes_of(&mid) {
                if !inner.cont_flags.contains(outer.flag) {
                    continue;
                }
                if inner.cont_flags.contains(self.aff.circumfix_flag) {
                    continue;
                }
                if !self.aff.fullstrip && inner.appending.len() == mid.len() {
                    continue;
                }
                let root = inner.to_root(&mid);
                if !inner.check_condition(&root) {
                    continue;
                }
                for flags in self.words.get(&root) {
                    if self.stem_allowed(flags, inner, mode, skip_hidden) {
                        return Some(flags);
                    }
                }
            }
        }
        None
    }

    // ---- compounding ----

    fn compounding_by_flags_enabled(&self) -> bool {
        self.aff.compound_flag != 0
            || self.aff.compound_begin_flag != 0
            || self.aff.compound_middle_flag != 0
            || self.aff.compound_last_flag != 0
    }

    fn check_compound(&self, word: &str, allow_bad_forceucase: bool) -> Option<&'a FlagSet> {
        if self.compounding_by_flags_enabled() {
            if let Some(res) = self.check_compound_flags(word, 0, 1, None, allow_bad_forceucase) {
                return Some(res);
            }
        }
        if !self.aff.compound_rules.is_empty() {
            let mut data = Vec::new();
            if let Some(res) = self.check_compound_rules(word, 0, &mut data) {
                return Some(res);
            }
        }
        None
    }

    /// Byte offsets at which `word[start..]` may be split so that both sides
    /// have at least `COMPOUNDMIN` code points.
    fn split_points(&self, word: &str, start: usize) -> Vec<usize> {
        let min = self.aff.compound_min_length as usize;
        let tail = &word[start..];
        let total = tail.chars().count();
        if total < 2 * min {
            return Vec::new();
        }
        tail.char_indices()
            .enumerate()
            .filter(|&(k, _)| k >= min && total - k >= min)
            .map(|(_, (off, _))| start + off)
            .collect()
    }

    fn word_count_ok(&self, word: &str, count: usize) -> bool {
        let max = self.aff.compound_max_word_count;
        if max == 0 || count <= max as usize {
            return true;
        }
        // Hungarian-style relaxation: short words (by syllables) may exceed
        // the word count limit
        self.aff.compound_syllable_max > 0
            && count_occurrences_of(word, &self.aff.compound_syllable_vowels)
                <= self.aff.compound_syllable_max as usize
    }

    /// Validates the boundary between the previous part and the part that
    /// starts at byte `at`.
    fn boundary_ok(
        &self,
        word: &str,
        at: usize,
        prev: (&str, &FlagSet, bool),
        cur: (&str, &FlagSet, bool),
    ) -> bool {
        let (prev_str, prev_flags, prev_affixed) = prev;
        let (cur_str, cur_flags, _) = cur;
        if self.aff.compound_check_duplicate && prev_str == cur_str {
            return false;
        }
        if self.aff.compound_check_case && has_uppercase_at_boundary(word, at) {
            return false;
        }
        if self.aff.compound_check_triple && self.triple_at_boundary(word, at) {
            return false;
        }
        for pat in &self.aff.compound_patterns {
            if pat.match_first_only_unaffixed && prev_affixed {
                continue;
            }
            if !pat.first_word_end.is_empty() && !prev_str.ends_with(&pat.first_word_end) {
                continue;
            }
            if !pat.second_word_begin.is_empty() && !cur_str.starts_with(&pat.second_word_begin) {
                continue;
            }
            if pat.first_word_flag != 0 && !prev_flags.contains(pat.first_word_flag) {
                continue;
            }
            if pat.second_word_flag != 0 && !cur_flags.contains(pat.second_word_flag) {
                continue;
            }
            if !pat.replacement.is_empty() {
                let spans_boundary = (1..pat.replacement.len()).any(|k| {
                    pat.replacement.is_char_boundary(k)
                        && prev_str.ends_with(&pat.replacement[..k])
                        && cur_str.starts_with(&pat.replacement[k..])
                });
                if !spans_boundary {
                    continue;
                }
            }
            return false;
        }
        if self.aff.compound_check_rep {
            let mut join = String::with_capacity(prev_str.len() + cur_str.len());
            join.push_str(prev_str);
            join.push_str(cur_str);
            if self.is_rep_similar(&join) {
                return false;
            }
        }
        true
    }

    fn triple_at_boundary(&self, word: &str, at: usize) -> bool {
        let mut before = word[..at].chars().rev();
        let p1 = before.next();
        let p2 = before.next();
        let mut after = word[at..].chars();
        let n1 = after.next();
        let n2 = after.next();
        if p1.is_none() || n1.is_none() || p1 != n1 {
            return false;
        }
        (p2.is_some() && p2 == p1) || (n2.is_some() && n2 == n1)
    }

    /// Would applying some REP entry to the join produce a valid simple
    /// word? Catches misspellings split by chance.
    fn is_rep_similar(&self, s: &str) -> bool {
        let valid = |candidate: &str| {
            self.check_non_compound(candidate)
                .is_some_and(|f| !f.contains(self.aff.forbiddenword_flag))
        };
        for (pat, rep) in self.aff.replacements.whole_word() {
            if s == pat.as_str() && valid(rep) {
                return true;
            }
        }
        for (pat, rep) in self.aff.replacements.start_word() {
            if let Some(rest) = s.strip_prefix(pat.as_str()) {
                let candidate = format!("{rep}{rest}");
                if valid(&candidate) {
                    return true;
                }
            }
        }
        for (pat, rep) in self.aff.replacements.end_word() {
            if let Some(head) = s.strip_suffix(pat.as_str()) {
                let candidate = format!("{head}{rep}");
                if valid(&candidate) {
                    return true;
                }
            }
        }
        for (pat, rep) in self.aff.replacements.any_place() {
            let mut from = 0;
            while let Some(i) = s[from..].find(pat.as_str()).map(|i| i + from) {
                let mut candidate = String::with_capacity(s.len());
                candidate.push_str(&s[..i]);
                candidate.push_str(rep);
                candidate.push_str(&s[i + pat.len()..]);
                if valid(&candidate) {
                    return true;
                }
                from = i + pat.len();
            }
        }
        false
    }

    /// One compound part: direct lookup first, then affixed forms, all
    /// under the positional flag requirements of `mode`.
    fn check_compound_part(&self, s: &str, mode: AffixingMode) -> Option<PartMatch<'a>> {
        let entries = self.words.get(s);
        if self.aff.forbiddenword_flag != 0
            && entries
                .iter()
                .any(|f| f.contains(self.aff.forbiddenword_flag))
        {
            return None;
        }
        for flags in entries {
            if flags.contains(HIDDEN_HOMONYM_FLAG) {
                continue;
            }
            if flags.contains(self.aff.need_affix_flag) {
                continue;
            }
            if !self.compound_position_ok(flags, None, mode) {
                continue;
            }
            return Some((flags, false));
        }
        self.check_affixed(s, mode, true).map(|f| (f, true))
    }

    /// A part candidate, with the SIMPLIFIEDTRIPLE variant that restores a
    /// letter collapsed at the boundary.
    fn check_compound_part_variants(
        &self,
        word: &str,
        start: usize,
        end: usize,
        mode: AffixingMode,
    ) -> Option<(String, PartMatch<'a>)> {
        let part = &word[start..end];
        if let Some(m) = self.check_compound_part(part, mode) {
            return Some((part.to_string(), m));
        }
        if self.aff.compound_simplified_triple {
            let last = word[..end].chars().next_back();
            let next = word[end..].chars().next();
            if let (Some(c), Some(n)) = (last, next) {
                if c == n {
                    let mut extended = part.to_string();
                    extended.push(c);
                    if let Some(m) = self.check_compound_part(&extended, mode) {
                        return Some((extended, m));
                    }
                }
            }
        }
        None
    }

    fn check_compound_flags(
        &self,
        word: &str,
        start: usize,
        num_part: usize,
        prev: Option<(&str, &FlagSet, bool)>,
        allow_bad_forceucase: bool,
    ) -> Option<&'a FlagSet> {
        let tail = &word[start..];
        // close the compound with the tail as its last part
        if prev.is_some() && self.word_count_ok(word, num_part) {
            if let Some((tail_str, (flags, affixed))) = self.check_compound_part_variants(
                word,
                start,
                word.len(),
                AffixingMode::AtCompoundEnd,
            ) {
                let force = flags.contains(self.aff.compound_force_uppercase);
                let boundary_fine = match prev {
                    Some(p) => self.boundary_ok(word, start, p, (tail_str.as_str(), flags, affixed)),
                    None => true,
                };
                if boundary_fine && !(force && !allow_bad_forceucase) {
                    let min = self.aff.compound_min_length as usize;
                    if tail.chars().count() >= min {
                        return Some(flags);
                    }
                }
            }
        }
        // or split one more part off the front of the tail
        for at in self.split_points(word, start) {
            let mode = if prev.is_none() {
                AffixingMode::AtCompoundBegin
            } else {
                AffixingMode::AtCompoundMiddle
            };
            let Some((part_str, (flags, affixed))) =
                self.check_compound_part_variants(word, start, at, mode)
            else {
                continue;
            };
            if let Some(p) = prev {
                if !self.boundary_ok(word, start, p, (part_str.as_str(), flags, affixed)) {
                    continue;
                }
            }
            if let Some(res) = self.check_compound_flags(
                word,
                at,
                num_part + 1,
                Some((part_str.as_str(), flags, affixed)),
                allow_bad_forceucase,
            ) {
                return Some(res);
            }
        }
        None
    }

    /// Compounds driven by `COMPOUNDRULE`: every part is a bare stem and
    /// the sequence of flag sets must match one of the rules.
    fn check_compound_rules(
        &self,
        word: &str,
        start: usize,
        data: &mut Vec<&'a FlagSet>,
    ) -> Option<&'a FlagSet> {
        let tail = &word[start..];
        let min = self.aff.compound_min_length as usize;
        if !data.is_empty()
            && tail.chars().count() >= min
            && self.word_count_ok(word, data.len() + 1)
        {
            for flags in self.words.get(tail) {
                if flags.contains(HIDDEN_HOMONYM_FLAG)
                    || flags.contains(self.aff.forbiddenword_flag)
                {
                    continue;
                }
                if !self.aff.compound_rules.has_any_of_flags(flags) {
                    continue;
                }
                data.push(flags);
                let matched = self.aff.compound_rules.match_any_rule(data);
                data.pop();
                if matched {
                    return Some(flags);
                }
            }
        }
        for at in self.split_points(word, start) {
            let part = &word[start..at];
            for flags in self.words.get(part) {
                if flags.contains(HIDDEN_HOMONYM_FLAG)
                    || flags.contains(self.aff.forbiddenword_flag)
                {
                    continue;
                }
                if !self.aff.compound_rules.has_any_of_flags(flags) {
                    continue;
                }
                data.push(flags);
                let res = self.check_compound_rules(word, at, data);
                data.pop();
                if let Some(res) = res {
                    return Some(res);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aff_data::parse_aff;
    use crate::dic_data::parse_dic;
    use std::io::Cursor;

    struct Fixture {
        aff: AffData,
        words: WordList,
    }

    impl Fixture {
        fn new(aff: &str, dic: &str) -> Self {
            let aff = parse_aff(Cursor::new(aff)).expect("aff should parse");
            let mut words = WordList::new();
            parse_dic(Cursor::new(dic), &aff, &mut words).expect("dic should parse");
            Fixture { aff, words }
        }

        fn spell(&self, word: &str) -> bool {
            Checker::new(&self.aff, &self.words).spell(word)
        }
    }

    #[test]
    fn plain_words_and_numbers() {
        let f = Fixture::new("SET UTF-8\n", "2\nhello\nworld\n");
        assert!(f.spell("hello"));
        assert!(f.spell("world"));
        assert!(!f.spell("helo"));
        assert!(f.spell("42"));
        assert!(f.spell("-3,14"));
        assert!(f.spell(""));
    }

    #[test]
    fn suffix_stripping_with_condition() {
        let f = Fixture::new(
            "SET UTF-8\nSFX T Y 1\nSFX T y ies [^aeiou]y\n",
            "3\nberry/T\nMay/T\nvary\n",
        );
        assert!(f.spell("berry"));
        assert!(f.spell("berries"));
        assert!(f.spell("May"));
        assert!(f.spell("vary"));
        assert!(!f.spell("varies"));
        assert!(!f.spell("Maies"));
    }

    #[test]
    fn cross_product_prefix_and_suffix() {
        let f = Fixture::new(
            "SET UTF-8\nPFX A Y 1\nPFX A 0 pre .\nSFX B Y 1\nSFX B 0 able .\n",
            "1\ndrink/AB\n",
        );
        assert!(f.spell("drink"));
        assert!(f.spell("drinkable"));
        assert!(f.spell("predrink"));
        assert!(f.spell("predrinkable"));
        assert!(!f.spell("able"));
    }

    #[test]
    fn cross_product_requires_the_bit() {
        let f = Fixture::new(
            "SET UTF-8\nPFX A N 1\nPFX A 0 pre .\nSFX B N 1\nSFX B 0 able .\n",
            "1\ndrink/AB\n",
        );
        assert!(f.spell("drinkable"));
        assert!(f.spell("predrink"));
        assert!(!f.spell("predrinkable"));
    }

    #[test]
    fn two_suffixes_via_continuation() {
        let f = Fixture::new(
            "SET UTF-8\nSFX A Y 1\nSFX A 0 ful .\nSFX S Y 1\nSFX S 0 s .\nSFX Q Y 1\nSFX Q 0 ness/S .\n",
            "1\ncare/AQ\n",
        );
        assert!(f.spell("care"));
        assert!(f.spell("careful"));
        assert!(f.spell("careness"));
        assert!(f.spell("carenesss")); // inner Q carries continuation S
        assert!(!f.spell("cares")); // S only continues Q, stem lacks S
    }

    #[test]
    fn needaffix_stems_are_not_bare_words() {
        let f = Fixture::new(
            "SET UTF-8\nNEEDAFFIX N\nSFX S Y 1\nSFX S 0 s .\n",
            "1\npseudo/NS\n",
        );
        assert!(!f.spell("pseudo"));
        assert!(f.spell("pseudos"));
    }

    #[test]
    fn circumfix_requires_both_sides() {
        let f = Fixture::new(
            "SET UTF-8\nCIRCUMFIX X\nPFX P Y 1\nPFX P 0 ge/X .\nSFX S Y 1\nSFX S 0 t/X .\n",
            "1\nlauf/PS\n",
        );
        assert!(f.spell("gelauft"));
        assert!(!f.spell("gelauf"));
        assert!(!f.spell("lauft"));
    }

    #[test]
    fn forbidden_word_rejects_even_when_derivable() {
        let f = Fixture::new(
            "SET UTF-8\nFORBIDDENWORD X\nSFX S Y 1\nSFX S 0 s .\n",
            "2\nfoo/S\nfoos/X\n",
        );
        assert!(f.spell("foo"));
        assert!(!f.spell("foos"));
    }

    #[test]
    fn fullstrip_allows_whole_word_appendings() {
        let aff = "SET UTF-8\nSFX S Y 1\nSFX S abc xyz .\n";
        let without = Fixture::new(aff, "1\nabc/S\n");
        assert!(!without.spell("xyz"));
        let with = Fixture::new(&format!("{aff}FULLSTRIP\n"), "1\nabc/S\n");
        assert!(with.spell("xyz"));
    }

    #[test]
    fn casing_variants_all_caps_and_title() {
        let f = Fixture::new("SET UTF-8\n", "2\nhello\nBudapest\n");
        assert!(f.spell("Hello"));
        assert!(f.spell("HELLO"));
        assert!(f.spell("BUDAPEST"));
        assert!(f.spell("Budapest"));
        assert!(!f.spell("budapest"));
    }

    #[test]
    fn keepcase_pins_the_written_form() {
        let f = Fixture::new("SET UTF-8\nKEEPCASE K\n", "1\nmd/K\n");
        assert!(f.spell("md"));
        assert!(!f.spell("Md"));
        assert!(!f.spell("MD"));
    }

    #[test]
    fn all_caps_entry_serves_affixed_title_lookup() {
        let f = Fixture::new(
            "SET UTF-8\nSFX S Y 1\nSFX S 0 's .\n",
            "1\nUNICEF/S\n",
        );
        assert!(f.spell("UNICEF"));
        assert!(f.spell("UNICEF'S"));
        // the hidden homonym must not validate title case input directly
        assert!(!f.spell("Unicef"));
    }

    #[test]
    fn compound_via_begin_and_end_flags() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDMIN 3\nCOMPOUNDBEGIN B\nCOMPOUNDEND L\n",
            "4\ncook/B\nbook/L\nphoto/B\ncar\n",
        );
        assert!(f.spell("cookbook"));
        assert!(f.spell("photobook"));
        assert!(!f.spell("bookcook"));
        assert!(!f.spell("carbook"));
        // position flags do not forbid standalone use
        assert!(f.spell("cook"));
        assert!(f.spell("book"));
    }

    #[test]
    fn compound_flag_alone_allows_any_position() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\n",
            "2\nfoo/C\nbar/C\n",
        );
        assert!(f.spell("foobar"));
        assert!(f.spell("barfoo"));
        assert!(f.spell("foobarfoo"));
        assert!(!f.spell("foobaz"));
    }

    #[test]
    fn compound_word_max_limits_parts() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\nCOMPOUNDWORDMAX 2\n",
            "1\nfoo/C\n",
        );
        assert!(f.spell("foofoo"));
        assert!(!f.spell("foofoofoo"));
    }

    #[test]
    fn only_in_compound_stems() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nONLYINCOMPOUND O\nCOMPOUNDMIN 3\n",
            "2\nfoo/C\nbar/CO\n",
        );
        assert!(!f.spell("bar"));
        assert!(f.spell("foobar"));
    }

    #[test]
    fn check_compound_dup_rejects_doubled_parts() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\nCHECKCOMPOUNDDUP\n",
            "2\nfoo/C\nbar/C\n",
        );
        assert!(f.spell("foobar"));
        assert!(!f.spell("foofoo"));
    }

    #[test]
    fn check_compound_triple_rejects_triplets() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\nCHECKCOMPOUNDTRIPLE\n",
            "2\nglass/C\nsky/C\n",
        );
        assert!(f.spell("skyglass"));
        assert!(!f.spell("glasssky"));
    }

    #[test]
    fn simplified_triple_restores_collapsed_letter() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\nCHECKCOMPOUNDTRIPLE\nSIMPLIFIEDTRIPLE\n",
            "2\nglass/C\nskål/C\n",
        );
        assert!(f.spell("glasskål"));
    }

    #[test]
    fn check_compound_case_rejects_inner_capitals() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\nCHECKCOMPOUNDCASE\n",
            "2\nfoo/C\nBar/C\n",
        );
        assert!(!f.spell("fooBar"));
    }

    #[test]
    fn compound_rules_match_flag_sequences() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDMIN 1\nCOMPOUNDRULE 1\nCOMPOUNDRULE nm*t\n",
            "3\n1/n\n2/m\nth/t\n",
        );
        assert!(f.spell("1th"));
        assert!(f.spell("12th"));
        assert!(f.spell("122th"));
        assert!(!f.spell("21th"));
        assert!(!f.spell("thth"));
    }

    #[test]
    fn force_uppercase_on_last_part() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 3\nFORCEUCASE U\n",
            "2\nfoo/C\nbaz/CU\n",
        );
        assert!(!f.spell("foobaz"));
        assert!(f.spell("Foobaz"));
        assert!(f.spell("FOOBAZ"));
    }

    #[test]
    fn break_patterns_split_words() {
        let f = Fixture::new("SET UTF-8\n", "2\nuser\ninterface\n");
        // default break table splits on "-"
        assert!(f.spell("user-interface"));
        assert!(!f.spell("user-interfaces"));
        assert!(f.spell("-user"));
        assert!(f.spell("user-"));
    }

    #[test]
    fn warn_plus_forbidwarn_blocks_break_retry() {
        let f = Fixture::new(
            "SET UTF-8\nWARN W\nFORBIDWARN\nBREAK 2\nBREAK -\nBREAK ^-\n",
            "3\nuser\ninterface\ninterface-interface/W\n",
        );
        assert!(f.spell("user-interface"));
        assert!(!f.spell("interface-interface"));
    }

    #[test]
    fn checksharps_accepts_ss_for_sharp_s() {
        let f = Fixture::new("SET UTF-8\nCHECKSHARPS\n", "1\naußen\n");
        assert!(f.spell("außen"));
        assert!(f.spell("AUSSEN"));
        assert!(!f.spell("aussen"));
    }

    #[test]
    fn check_compound_rep_rejects_rep_similar_joins() {
        let f = Fixture::new(
            "SET UTF-8\nCOMPOUNDFLAG C\nCOMPOUNDMIN 2\nCHECKCOMPOUNDREP\nREP 1\nREP ij y\n",
            "3\nva/C\nnij/C\nvany\n",
        );
        assert!(!f.spell("vanij"));
    }
}
