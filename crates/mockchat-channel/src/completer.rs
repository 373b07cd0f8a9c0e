use std::collections::HashSet;

use mockchat_types::{AVATAR_URL, RichText};

use crate::capability::Capability;
use crate::messenger::Messenger;

/// One suggestion for the word being completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    /// Text that replaces the word.
    pub raw: String,
    /// What the frontend shows.
    pub text: RichText,
    pub icon_url: String,
}

impl CompletionEntry {
    pub fn plain(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            text: RichText::plain(raw),
            icon_url: AVATAR_URL.to_string(),
        }
    }
}

pub fn entries(raws: &[&str]) -> Vec<CompletionEntry> {
    raws.iter().map(|raw| CompletionEntry::plain(raw)).collect()
}

/// True when `words[i]` is a prefix of `this` and the word before it is
/// exactly `prev`.
pub fn lookback(words: &[&str], i: usize, prev: &str, this: &str) -> bool {
    i > 0 && this.starts_with(words[i]) && words[i - 1] == prev
}

/// The fixed keyword grammar. `None` when no rule applies.
fn grammar(words: &[&str], i: usize) -> Option<Vec<CompletionEntry>> {
    let word = words[i];

    if "complete".starts_with(word) {
        return Some(entries(&[
            "complete",
            "complete me",
            "complete you",
            "complete everyone",
        ]));
    }

    for target in ["me", "you", "everyone"] {
        if lookback(words, i, "complete", target) {
            return Some(entries(&[target]));
        }
    }

    if lookback(words, i, "best", "femboys:") {
        return Some(entries(&[
            "trap: Astolfo",
            "trap: Hackadoll No. 3",
            "trap: Totsuka",
            "trap: Felix Argyle",
        ]));
    }

    None
}

impl Messenger {
    /// Complete `words[index]`: keywords first, otherwise the names of
    /// authors in the current backlog that start with the word, each once,
    /// in the order they first appear.
    pub fn complete(&self, words: &[&str], index: usize) -> Vec<CompletionEntry> {
        if !self.capabilities().has(Capability::Complete) || index >= words.len() {
            return Vec::new();
        }

        if let Some(found) = grammar(words, index) {
            return found;
        }

        let prefix = words[index];
        let mut seen = HashSet::new();

        self.snapshot()
            .into_iter()
            .filter(|m| m.author_name().starts_with(prefix))
            .filter(|m| seen.insert(m.author_name().to_string()))
            .map(|m| CompletionEntry {
                raw: m.author_name().to_string(),
                icon_url: m.author.avatar().to_string(),
                text: m.author.name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(found: &[CompletionEntry]) -> Vec<&str> {
        found.iter().map(|e| e.raw.as_str()).collect()
    }

    #[test]
    fn keyword_prefix() {
        let found = grammar(&["comp"], 0).unwrap();
        assert_eq!(raws(&found)[0], "complete");
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn lookback_completion() {
        let found = grammar(&["complete", "ev"], 1).unwrap();
        assert_eq!(raws(&found), vec!["everyone"]);

        let found = grammar(&["best", "fem"], 1).unwrap();
        assert_eq!(found.len(), 4);
        assert!(raws(&found).iter().all(|r| r.starts_with("trap: ")));
    }

    #[test]
    fn lookback_needs_exact_previous_word() {
        assert!(!lookback(&["completely", "me"], 1, "complete", "me"));
        assert!(!lookback(&["me"], 0, "complete", "me"));
        assert!(grammar(&["hello", "zz"], 1).is_none());
    }
}
