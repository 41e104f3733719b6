//! Text matcher implementations.

use quill_core::ports::TextMatcher;

/// Case-insensitive substring match over title or content.
///
/// The default matcher for the in-memory store; the MongoDB adapter realizes
/// the same contract with a case-insensitive regex server-side.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstringMatcher;

impl TextMatcher for SubstringMatcher {
    fn matches(&self, query: &str, title: &str, content: &str) -> bool {
        let query = query.to_lowercase();
        title.to_lowercase().contains(&query) || content.to_lowercase().contains(&query)
    }
}
