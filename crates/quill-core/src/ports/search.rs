/// Free-text search facade - keeps repository queries backend-agnostic.
///
/// The contract is case-insensitive substring match over title OR content.
/// The in-memory store evaluates this per document; a server-side backend
/// realizes the same semantics in its own query language (the MongoDB
/// adapter uses a case-insensitive regex).
pub trait TextMatcher: Send + Sync {
    fn matches(&self, query: &str, title: &str, content: &str) -> bool;
}
