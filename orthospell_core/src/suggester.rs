//! The suggestion pipeline: orthographic, phonetic and edit-distance
//! strategies, tried in a fixed order, each validated through the
//! recognizer before admission.

use crate::aff_data::AffData;
use crate::casing::{classify_casing, Casing};
use crate::checker::Checker;
use crate::flags::HIDDEN_HOMONYM_FLAG;
use crate::strings::erase_chars;
use crate::word_list::WordList;

const MAX_SUGGESTIONS: usize = 15;
const MAX_PHONETIC_SUGGESTIONS: usize = 2;
const MAX_MAP_SUBSTITUTIONS: usize = 100;
const MOVE_CHAR_RANGE: usize = 4;

pub struct Suggester<'a> {
    aff: &'a AffData,
    words: &'a WordList,
    checker: Checker<'a>,
}

impl<'a> Suggester<'a> {
    pub fn new(aff: &'a AffData, words: &'a WordList) -> Self {
        Suggester {
            aff,
            words,
            checker: Checker::new(aff, words),
        }
    }

    /// Fills `out` with ordered, deduplicated corrections for `word`.
    pub fn suggest(&self, word: &str, out: &mut Vec<String>) {
        out.clear();
        let converted = self.aff.input_conv.replace(word);
        let mut input = erase_chars(&converted, &self.aff.ignored_chars);
        let mut dots = 0;
        while input.ends_with('.') {
            input.pop();
            dots += 1;
        }
        if input.is_empty() {
            return;
        }
        let casing = classify_casing(&input);
        let mut compound_sugs = 0usize;

        // the normalized input itself may already be the correction
        if converted != word && self.admissible(&converted, &mut compound_sugs) {
            out.push(converted.clone());
        }

        let mut targets = vec![input.clone()];
        match casing {
            Casing::AllCapital | Casing::InitCapital => {
                let lowered = self.aff.case_mapper.lower(&input);
                if lowered != input {
                    targets.push(lowered);
                }
            }
            _ => {}
        }
        for target in &targets {
            self.run_strategies(target, &input, &mut compound_sugs, out);
        }
        self.finish(casing, dots, out);
    }

    fn run_strategies(
        &self,
        w: &str,
        input: &str,
        compound_sugs: &mut usize,
        out: &mut Vec<String>,
    ) {
        self.rep_suggest(w, input, compound_sugs, out);
        self.case_split_suggest(input, compound_sugs, out);
        self.map_suggest(w, input, compound_sugs, out);
        self.swap_suggest(w, input, compound_sugs, out);
        self.keyboard_and_bad_char_suggest(w, input, compound_sugs, out);
        self.extra_char_suggest(w, input, compound_sugs, out);
        self.forgotten_char_suggest(w, input, compound_sugs, out);
        self.move_char_suggest(w, input, compound_sugs, out);
        self.split_suggest(w, out);
        self.phonetic_suggest(w, input, compound_sugs, out);
        self.ngram_suggest(w, input, compound_sugs, out);
    }

    /// Is this candidate a word we are allowed to offer? Forbidden,
    /// no-suggest, compound-only-part and substandard entries are out, and
    /// the compound suggestion budget is enforced.
    fn admissible(&self, candidate: &str, compound_sugs: &mut usize) -> bool {
        let Some(flags) = self.checker.spell_casing(candidate, true) else {
            return false;
        };
        if flags.contains(self.aff.forbiddenword_flag)
            || (self.aff.forbid_warn && flags.contains(self.aff.warn_flag))
            || flags.contains(self.aff.nosuggest_flag)
            || flags.contains(self.aff.substandard_flag)
            || flags.contains(self.aff.compound_onlyin_flag)
        {
            return false;
        }
        let compound_only = self.checker.spell_casing(candidate, false).is_none();
        if compound_only {
            if *compound_sugs >= self.aff.max_compound_suggestions as usize {
                return false;
            }
            *compound_sugs += 1;
        }
        true
    }

    fn try_add(
        &self,
        candidate: String,
        input: &str,
        compound_sugs: &mut usize,
        out: &mut Vec<String>,
    ) {
        if out.len() >= MAX_SUGGESTIONS
            || candidate == input
            || out.iter().any(|s| *s == candidate)
        {
            return;
        }
        if self.admissible(&candidate, compound_sugs) {
            out.push(candidate);
        }
    }

    /// `REP` table entries, honoring their anchors. A replacement with a
    /// space offers a two-word suggestion when both words pass.
    fn rep_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        let reps = &self.aff.replacements;
        for (pat, rep) in reps.whole_word() {
            if w == pat.as_str() {
                self.try_rep_candidate(rep.clone(), input, cs, out);
            }
        }
        for (pat, rep) in reps.start_word() {
            if let Some(rest) = w.strip_prefix(pat.as_str()) {
                self.try_rep_candidate(format!("{rep}{rest}"), input, cs, out);
            }
        }
        for (pat, rep) in reps.end_word() {
            if let Some(head) = w.strip_suffix(pat.as_str()) {
                self.try_rep_candidate(format!("{head}{rep}"), input, cs, out);
            }
        }
        for (pat, rep) in reps.any_place() {
            let mut from = 0;
            while let Some(i) = w[from..].find(pat.as_str()).map(|i| i + from) {
                let mut candidate = String::with_capacity(w.len());
                candidate.push_str(&w[..i]);
                candidate.push_str(rep);
                candidate.push_str(&w[i + pat.len()..]);
                self.try_rep_candidate(candidate, input, cs, out);
                from = i + pat.len();
            }
        }
    }

    fn try_rep_candidate(
        &self,
        candidate: String,
        input: &str,
        cs: &mut usize,
        out: &mut Vec<String>,
    ) {
        if candidate.contains(' ') {
            if out.len() >= MAX_SUGGESTIONS || out.iter().any(|s| *s == candidate) {
                return;
            }
            if candidate
                .split(' ')
                .all(|part| !part.is_empty() && self.admissible(part, cs))
            {
                out.push(candidate);
            }
            return;
        }
        self.try_add(candidate, input, cs, out);
    }

    /// Lowered and title-cased forms of the input.
    fn case_split_suggest(&self, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        self.try_add(self.aff.case_mapper.lower(input), input, cs, out);
        self.try_add(self.aff.case_mapper.title(input), input, cs, out);
    }

    /// `MAP` groups: substitute every member for every other, across all
    /// positions, breadth first with a bounded number of substitutions.
    fn map_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        if self.aff.similarities.is_empty() {
            return;
        }
        let mut budget = MAX_MAP_SUBSTITUTIONS;
        let mut queue: Vec<(String, usize)> = vec![(w.to_string(), 0)];
        let mut next = 0;
        while next < queue.len() {
            let (current, from) = queue[next].clone();
            next += 1;
            for group in &self.aff.similarities {
                for i in from..current.len() {
                    if !current.is_char_boundary(i) {
                        continue;
                    }
                    for member in group.members() {
                        if !current[i..].starts_with(member) {
                            continue;
                        }
                        for other in group.members() {
                            if other == member {
                                continue;
                            }
                            if budget == 0 {
                                return;
                            }
                            budget -= 1;
                            let mut candidate = String::with_capacity(current.len());
                            candidate.push_str(&current[..i]);
                            candidate.push_str(other);
                            candidate.push_str(&current[i + member.len()..]);
                            self.try_add(candidate.clone(), input, cs, out);
                            queue.push((candidate, i + other.len()));
                        }
                    }
                }
            }
        }
    }

    /// Adjacent swaps, the first-last swap, and distance-2 swaps.
    fn swap_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        let chars: Vec<char> = w.chars().collect();
        let n = chars.len();
        if n < 2 {
            return;
        }
        for i in 0..n - 1 {
            let mut c = chars.clone();
            c.swap(i, i + 1);
            self.try_add(c.into_iter().collect(), input, cs, out);
        }
        if n > 2 {
            let mut c = chars.clone();
            c.swap(0, n - 1);
            self.try_add(c.into_iter().collect(), input, cs, out);
            for i in 0..n - 2 {
                let mut c = chars.clone();
                c.swap(i, i + 2);
                self.try_add(c.into_iter().collect(), input, cs, out);
            }
        }
    }

    /// Keyboard-neighbor replacement from `KEY`, case-variant replacement,
    /// and replacement with each `TRY` character.
    fn keyboard_and_bad_char_suggest(
        &self,
        w: &str,
        input: &str,
        cs: &mut usize,
        out: &mut Vec<String>,
    ) {
        let chars: Vec<char> = w.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            for row in self.aff.keyboard_closeness.split('|') {
                let row_chars: Vec<char> = row.chars().collect();
                for (j, &rc) in row_chars.iter().enumerate() {
                    if rc != c {
                        continue;
                    }
                    if j > 0 {
                        self.substitute(&chars, i, row_chars[j - 1], input, cs, out);
                    }
                    if j + 1 < row_chars.len() {
                        self.substitute(&chars, i, row_chars[j + 1], input, cs, out);
                    }
                }
            }
            let mut upper_it = c.to_uppercase();
            if let (Some(up), None) = (upper_it.next(), upper_it.next()) {
                if up != c {
                    self.substitute(&chars, i, up, input, cs, out);
                }
            }
            let mut lower_it = c.to_lowercase();
            if let (Some(low), None) = (lower_it.next(), lower_it.next()) {
                if low != c {
                    self.substitute(&chars, i, low, input, cs, out);
                }
            }
            for t in self.aff.try_chars.chars() {
                if t != c {
                    self.substitute(&chars, i, t, input, cs, out);
                }
            }
        }
    }

    fn substitute(
        &self,
        chars: &[char],
        at: usize,
        with: char,
        input: &str,
        cs: &mut usize,
        out: &mut Vec<String>,
    ) {
        let mut c = chars.to_vec();
        c[at] = with;
        self.try_add(c.into_iter().collect(), input, cs, out);
    }

    /// Delete one code point at each position.
    fn extra_char_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        for (i, c) in w.char_indices() {
            let mut candidate = String::with_capacity(w.len());
            candidate.push_str(&w[..i]);
            candidate.push_str(&w[i + c.len_utf8()..]);
            self.try_add(candidate, input, cs, out);
        }
    }

    /// Insert one `TRY` character at each position.
    fn forgotten_char_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        for t in self.aff.try_chars.chars() {
            let mut positions: Vec<usize> = w.char_indices().map(|(i, _)| i).collect();
            positions.push(w.len());
            for &i in &positions {
                let mut candidate = String::with_capacity(w.len() + t.len_utf8());
                candidate.push_str(&w[..i]);
                candidate.push(t);
                candidate.push_str(&w[i..]);
                self.try_add(candidate, input, cs, out);
            }
        }
    }

    /// Move one code point up to four positions away in both directions.
    fn move_char_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        let chars: Vec<char> = w.chars().collect();
        let n = chars.len();
        for i in 0..n {
            for d in 2..=MOVE_CHAR_RANGE {
                if i + d < n {
                    let mut c = chars.clone();
                    let moved = c.remove(i);
                    c.insert(i + d, moved);
                    self.try_add(c.into_iter().collect(), input, cs, out);
                }
                if i >= d {
                    let mut c = chars.clone();
                    let moved = c.remove(i);
                    c.insert(i - d, moved);
                    self.try_add(c.into_iter().collect(), input, cs, out);
                }
            }
        }
    }

    /// Insert a space at each interior position; both halves must pass.
    fn split_suggest(&self, w: &str, out: &mut Vec<String>) {
        if self.aff.no_split_suggestions {
            return;
        }
        for (i, _) in w.char_indices().skip(1) {
            if out.len() >= MAX_SUGGESTIONS {
                return;
            }
            let (head, tail) = (&w[..i], &w[i..]);
            let mut scratch = 0usize;
            if self.admissible(head, &mut scratch) && self.admissible(tail, &mut scratch) {
                let candidate = format!("{head} {tail}");
                if !out.iter().any(|s| *s == candidate) {
                    out.push(candidate);
                }
            }
        }
    }

    fn suggestable_entry(&self, flags: &crate::flags::FlagSet) -> bool {
        !(flags.contains(HIDDEN_HOMONYM_FLAG)
            || flags.contains(self.aff.forbiddenword_flag)
            || flags.contains(self.aff.nosuggest_flag)
            || flags.contains(self.aff.compound_onlyin_flag)
            || flags.contains(self.aff.substandard_flag))
    }

    /// Dictionary stems with the same phonetic code as the input, ranked by
    /// n-gram similarity.
    fn phonetic_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        if self.aff.phonetic_table.is_empty() {
            return;
        }
        let upper = self.aff.case_mapper.upper(w);
        let Some(target) = self.aff.phonetic_table.phonet(&upper) else {
            return;
        };
        let w_chars: Vec<char> = w.chars().collect();
        let mut scored: Vec<(f64, &str)> = Vec::new();
        for (stem, flags) in self.words.iter() {
            if !self.suggestable_entry(flags) {
                continue;
            }
            let stem_chars = stem.chars().count();
            if stem_chars.abs_diff(w_chars.len()) > 3 {
                continue;
            }
            let stem_upper = self.aff.case_mapper.upper(stem);
            let code = self.aff.phonetic_table.phonet(&stem_upper);
            let near = match &code {
                Some(c) => *c == target || c.starts_with(&target) || target.starts_with(c),
                None => false,
            };
            if !near {
                continue;
            }
            let stem_lower = self.aff.case_mapper.lower(stem);
            let score = ngram_similarity(&w_chars, &stem_lower);
            scored.push((score, stem));
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, stem) in scored.into_iter().take(MAX_PHONETIC_SUGGESTIONS) {
            self.try_add(stem.to_string(), input, cs, out);
        }
    }

    /// Last resort: score every stem by subsequence, prefix and n-gram
    /// overlap and emit the best matches.
    fn ngram_suggest(&self, w: &str, input: &str, cs: &mut usize, out: &mut Vec<String>) {
        let budget = self.aff.max_ngram_suggestions as usize;
        if budget == 0 || out.len() >= MAX_SUGGESTIONS {
            return;
        }
        let w_chars: Vec<char> = w.chars().collect();
        let mut scored: Vec<(f64, f64, &str)> = Vec::new();
        for (stem, flags) in self.words.iter() {
            if !self.suggestable_entry(flags) {
                continue;
            }
            let stem_chars_count = stem.chars().count();
            if stem_chars_count.abs_diff(w_chars.len()) > 5 {
                continue;
            }
            let stem_lower = self.aff.case_mapper.lower(stem);
            let c_chars: Vec<char> = stem_lower.chars().collect();
            // at least half the input must survive as a subsequence
            if lcs_len(&w_chars, &c_chars) * 2 < w_chars.len() {
                continue;
            }
            let score = ngram_score(&w_chars, &c_chars);
            if score <= 0.0 {
                continue;
            }
            let tiebreak = common_char_score(&w_chars, &stem_lower);
            scored.push((score, tiebreak, stem));
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.total_cmp(&a.1)));
        let threshold = if self.aff.only_max_diff {
            w_chars.len() as f64 * f64::from(self.aff.max_diff_factor) / 10.0
        } else {
            0.0
        };
        let mut emitted = 0;
        for (score, _, stem) in scored {
            if emitted == budget || out.len() >= MAX_SUGGESTIONS {
                break;
            }
            if score < threshold {
                break;
            }
            let before = out.len();
            self.try_add(stem.to_string(), input, cs, out);
            if out.len() > before {
                emitted += 1;
            }
        }
    }

    /// Restores the input casing on the produced suggestions, applies
    /// `OCONV` and re-appends abbreviation dots.
    fn finish(&self, casing: Casing, dots: usize, out: &mut Vec<String>) {
        for s in out.iter_mut() {
            match casing {
                Casing::AllCapital => {
                    if !matches!(classify_casing(s), Casing::Camel | Casing::Pascal) {
                        *s = self.aff.case_mapper.upper(s);
                    }
                }
                Casing::InitCapital => {
                    if classify_casing(s) == Casing::Small {
                        *s = self.aff.case_mapper.title(s);
                    }
                }
                _ => {}
            }
            *s = self.aff.output_conv.replace(s);
            if self.aff.suggest_with_dots {
                for _ in 0..dots {
                    s.push('.');
                }
            }
        }
        let mut seen = hashbrown::HashSet::new();
        out.retain(|s| seen.insert(s.clone()));
    }
}

/// Rough similarity used to rank phonetic candidates.
fn ngram_similarity(w: &[char], candidate: &str) -> f64 {
    let c_chars: Vec<char> = candidate.chars().collect();
    let lcs = lcs_len(w, &c_chars) as f64;
    let hits2 = ngram_hits(2, w, &c_chars) as f64;
    2.0 * lcs + hits2 - w.len().abs_diff(c_chars.len()) as f64
}

/// The combined n-gram score of the last-resort strategy.
fn ngram_score(w: &[char], c_chars: &[char]) -> f64 {
    let lcs = lcs_len(w, c_chars) as f64;
    let lcp = common_prefix_len(w, c_chars) as f64;
    let n2 = ngram_hits(2, w, c_chars) as f64;
    let n3 = ngram_hits(3, w, c_chars) as f64;
    let n4 = ngram_hits(4, w, c_chars) as f64;
    2.0 * lcs + lcp + 0.5 * n2 + n3 + n4 - w.len().abs_diff(c_chars.len()) as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Number of length-`n` windows of `w` that occur in `c`.
fn ngram_hits(n: usize, w: &[char], c: &[char]) -> usize {
    if w.len() < n || c.len() < n {
        return 0;
    }
    w.windows(n)
        .filter(|win| c.windows(n).any(|cw| cw == *win))
        .count()
}

/// Positionally weighted count of input characters present in the
/// candidate; earlier characters weigh more.
fn common_char_score(w: &[char], candidate: &str) -> f64 {
    let mut score = 0.0;
    for (i, c) in w.iter().enumerate() {
        if candidate.contains(*c) {
            score += 1.0 / (i + 1) as f64;
        }
    }
    score
}
