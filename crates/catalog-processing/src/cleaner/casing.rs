//! Word-by-word title casing.

/// Title-case a string: for every space-separated word, upper-case the first
/// character and lower-case the rest.
///
/// This is lossy on purpose: acronyms (`"USA"`) and mixed-case names
/// (`"McDonald"`) come out as `"Usa"` and `"Mcdonald"`. Empty words produced by
/// repeated spaces are skipped, so the output never contains double spaces.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for word in value.split(' ').filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            // `ß` upper-cases to `SS`; keep such characters as they are
            let mut upper = first.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => out.push(single),
                _ => out.push(first),
            }
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("the shawshank redemption"), "The Shawshank Redemption");
        assert_eq!(title_case("THE OFFICE"), "The Office");
    }

    #[test]
    fn test_title_case_edge_cases() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("a"), "A");
        assert_eq!(title_case("a b c"), "A B C");
        assert_eq!(title_case("  spaced   out "), "Spaced Out");
    }

    #[test]
    fn test_title_case_does_not_preserve_acronyms() {
        assert_eq!(title_case("USA"), "Usa");
        assert_eq!(title_case("TV Shows"), "Tv Shows");
    }

    #[test]
    fn test_title_case_keeps_punctuation_attached() {
        assert_eq!(title_case("united states, india"), "United States, India");
        assert_eq!(title_case("9-1-1: lone star"), "9-1-1: Lone Star");
    }

    #[test]
    fn test_title_case_keeps_expanding_first_char() {
        assert_eq!(title_case("ßtraße"), "ßtraße");
        assert_eq!(title_case("ÉCOLE"), "École");
    }

    #[test]
    fn test_title_case_is_idempotent() {
        let inputs = [
            "the shawshank redemption",
            "ÉLITE",
            "o'brien",
            "dark",
            "jeans & co",
            "ßtraße",
            "ﬁnding ǆenan",
        ];
        for input in inputs {
            let once = title_case(input);
            assert_eq!(title_case(&once), once, "input: {:?}", input);
        }
    }
}
