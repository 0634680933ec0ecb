//! Confirmation gate for irreversible or flagged operations.
//!
//! The only way to obtain a [`Confirmed`] value is through [`guided`] or
//! [`free_text`] observing an affirmative reply. The executor's delete path
//! takes a `Confirmed<RecordId>`, so a delete cannot run without one.

/// A value the user explicitly confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmed<T>(T);

impl<T> Confirmed<T> {
    pub fn get(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// Carry the confirmation over to a value derived from the confirmed one.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Confirmed<U> {
        Confirmed(f(self.0))
    }
}

/// What to do with a pending operation after the user's reply.
#[derive(Debug)]
pub enum Gate<T> {
    Proceed(Confirmed<T>),
    Cancel,
    /// Neither yes nor no: ask again, state unchanged.
    Reprompt,
}

const AFFIRMATIVE: [&str; 3] = ["yes", "confirm", "ok"];
const NEGATIVE: [&str; 6] = ["no", "not", "cancel", "stop", "dont", "don't"];

/// Guided delete confirmation: exactly `yes` or `no`, anything else re-prompts.
pub fn guided<T>(pending: T, input: &str) -> Gate<T> {
    match input.trim().to_lowercase().as_str() {
        "yes" => Gate::Proceed(Confirmed(pending)),
        "no" => Gate::Cancel,
        _ => Gate::Reprompt,
    }
}

/// Free-text confirmation of a pending NLP intent.
///
/// Proceeds on an affirmative token with no negative token. A reply carrying
/// both is ambiguous and re-prompts. Anything else cancels.
pub fn free_text<T>(pending: T, input: &str) -> Gate<T> {
    let lowered = input.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect();
    let affirmed = tokens.iter().any(|t| AFFIRMATIVE.contains(t));
    let denied = tokens.iter().any(|t| NEGATIVE.contains(t));
    match (affirmed, denied) {
        (true, false) => Gate::Proceed(Confirmed(pending)),
        (true, true) => Gate::Reprompt,
        _ => Gate::Cancel,
    }
}
