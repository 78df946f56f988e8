use aho_corasick::AhoCorasick;

/// Case-insensitive denylist matcher for content that flags a file as not
/// ready for transformation.
pub struct SensitiveMatcher {
    automaton: AhoCorasick,
    keywords: Vec<String>,
}

impl SensitiveMatcher {
    /// Build from a list of denylisted keywords.
    pub fn new(keywords: Vec<String>) -> Self {
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&keywords)
            .expect("valid aho-corasick patterns");
        Self {
            automaton,
            keywords,
        }
    }

    /// Default denylist: features that must not be touched by automated
    /// code enrichment (payments, embedded web content, scripting bridges).
    pub fn default_keywords() -> Vec<String> {
        vec![
            "payment".into(),
            "webview".into(),
            "javascript".into(),
            "evaluateJavaScript".into(),
            "purchase".into(),
            "in-app".into(),
            "billing".into(),
            "paypal".into(),
            "stripe".into(),
        ]
    }

    /// True if any denylisted keyword occurs in the content.
    pub fn is_sensitive(&self, content: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        self.automaton.is_match(content)
    }

    /// The first matched keyword, if any.
    pub fn first_match(&self, content: &str) -> Option<&str> {
        self.automaton
            .find(content)
            .map(|m| self.keywords[m.pattern().as_usize()].as_str())
    }
}

impl Default for SensitiveMatcher {
    fn default() -> Self {
        Self::new(Self::default_keywords())
    }
}

/// Fixed framework marker substrings. Advisory only: presence never affects
/// scan correctness or ledger state.
pub const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("uikit", "UIKit"),
    ("foundation", "Foundation"),
    ("gcd", "DispatchQueue"),
    ("swiftui", "SwiftUI"),
    ("combine", "Combine"),
];

/// Detect which framework markers occur in the content (exact substring).
pub fn detect_frameworks(content: &str) -> Vec<String> {
    FRAMEWORK_MARKERS
        .iter()
        .filter(|(_, needle)| content.contains(needle))
        .map(|(tag, _)| tag.to_string())
        .collect()
}
