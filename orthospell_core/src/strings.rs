//! Small string helpers shared by the parsers and the recognizer.

/// Removes every occurrence of the `IGNORE` characters from a string.
pub fn erase_chars(s: &str, ignore: &str) -> String {
    if ignore.is_empty() {
        return s.to_string();
    }
    s.chars().filter(|c| !ignore.contains(*c)).collect()
}

/// Tests whether a word is a number. Dot, dash and comma are allowed between
/// digit groups but not doubled.
pub fn is_number(s: &str) -> bool {
    let mut rest = s.strip_prefix('-').unwrap_or(s);
    if rest.is_empty() {
        return false;
    }
    loop {
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return false;
        }
        rest = &rest[digits..];
        match rest.chars().next() {
            None => return true,
            Some('.') | Some(',') | Some('-') => rest = &rest[1..],
            Some(_) => return false,
        }
    }
}

/// Counts the code points of `haystack` that occur in `needles`.
pub fn count_occurrences_of(haystack: &str, needles: &str) -> usize {
    haystack.chars().filter(|c| needles.contains(*c)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erasing_ignored_chars() {
        assert_eq!(erase_chars("كتاب", ""), "كتاب");
        assert_eq!(erase_chars("x-y-z", "-"), "xyz");
        assert_eq!(erase_chars("naïve", "ï"), "nave");
    }

    #[test]
    fn number_recognition() {
        assert!(is_number("12"));
        assert!(is_number("-12.3,4"));
        assert!(!is_number(""));
        assert!(!is_number("-"));
        assert!(!is_number("12..3"));
        assert!(!is_number("12a"));
        assert!(!is_number("a12"));
        assert!(!is_number("12."));
    }

    #[test]
    fn occurrence_counting() {
        assert_eq!(count_occurrences_of("banana", "a"), 3);
        assert_eq!(count_occurrences_of("banana", "ae"), 3);
        assert_eq!(count_occurrences_of("", "a"), 0);
    }
}
