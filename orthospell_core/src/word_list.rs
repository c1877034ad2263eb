//! The word list: a hash multimap from stem to the flag sets of all entries
//! sharing that stem.

use hashbrown::HashMap;

use crate::flags::FlagSet;

#[derive(Debug, Clone, Default)]
pub struct WordList {
    map: HashMap<String, Vec<FlagSet>>,
    entries: usize,
}

impl WordList {
    pub fn new() -> Self {
        WordList::default()
    }

    /// Pre-sizes the map from the count on the first line of the `.dic`
    /// file. The count is only a hint.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    pub fn insert(&mut self, stem: String, flags: FlagSet) {
        self.map.entry(stem).or_default().push(flags);
        self.entries += 1;
    }

    /// All flag sets recorded for `stem`; empty when the stem is unknown.
    pub fn get(&self, stem: &str) -> &[FlagSet] {
        self.map.get(stem).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.map.contains_key(stem)
    }

    /// Number of entries, counting homonyms separately.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Iterates over every (stem, flag set) pair. Used by the phonetic and
    /// n-gram suggestion sweeps.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagSet)> {
        self.map
            .iter()
            .flat_map(|(k, v)| v.iter().map(move |f| (k.as_str(), f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multimap_keeps_homonyms() {
        let mut w = WordList::new();
        w.insert("bank".to_string(), FlagSet::from_unsorted(vec![1]));
        w.insert("bank".to_string(), FlagSet::from_unsorted(vec![2]));
        assert_eq!(w.get("bank").len(), 2);
        assert_eq!(w.len(), 2);
        assert!(w.get("river").is_empty());
        assert!(w.contains("bank"));
    }
}
