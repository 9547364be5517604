//! Whitespace normalization for header and question text.

/// Collapse every whitespace run (newlines included) to a single space and
/// trim both ends.
///
/// This is the only way question text is compared across the response and
/// meta tables, so both sides of a join must go through it.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_and_newlines() {
        assert_eq!(normalize("A  B\n C"), "A B C");
        assert_eq!(normalize("\tWhat is\r\n your   name? "), "What is your name?");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn idempotent() {
        for s in ["A  B\n C", "  x ", "", "already normal", "a\u{a0}\u{a0}b"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
