//! Deterministic keyword routing for quick actions.

use curdmate_types::conversation::Mode;

/// Keyword table, checked in order; the first group with a match wins.
const KEYWORDS: [(&[&str], Mode); 4] = [
    (&["create", "add", "new"], Mode::Creating),
    (&["search", "find", "show", "list", "view"], Mode::Searching),
    (&["update", "edit", "modify", "change"], Mode::Updating),
    (&["delete", "remove"], Mode::Deleting),
];

/// Map input to the guided flow it names, by lower-cased substring match.
pub fn match_keyword(input: &str) -> Option<Mode> {
    let lowered = input.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| lowered.contains(w)))
        .map(|(_, mode)| *mode)
}
