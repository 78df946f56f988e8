pub mod keywords;

pub use keywords::{detect_frameworks, SensitiveMatcher};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Coarse size classification from line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

/// Heuristic complexity classification. Derived from line count and
/// declaration counts, not from parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

/// Source language family, keyed off the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Swift,
    Objc,
    Cpp,
    Other,
}

impl FileKind {
    pub fn from_path(path: &str) -> Self {
        match path.rsplit('.').next().map(|e| e.to_ascii_lowercase()) {
            Some(ext) if ext == "swift" => FileKind::Swift,
            Some(ext) if ext == "m" || ext == "h" || ext == "mm" => FileKind::Objc,
            Some(ext) if ext == "cpp" || ext == "cc" || ext == "c" => FileKind::Cpp,
            _ => FileKind::Other,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Swift => write!(f, "swift"),
            FileKind::Objc => write!(f, "objc"),
            FileKind::Cpp => write!(f, "cpp"),
            FileKind::Other => write!(f, "other"),
        }
    }
}

/// Per-file attribute record produced by analysis. Created fresh on every
/// scan, never mutated; a later scan of the same path supersedes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Project-relative path. Unique key within a scan.
    pub path: String,

    /// Source language family.
    pub kind: FileKind,

    /// Newline-delimited line count (`str::lines`).
    pub line_count: usize,

    /// Type declarations found (class / @interface).
    pub type_count: usize,

    /// Function declarations found (func / ObjC method).
    pub function_count: usize,

    pub size_bucket: SizeBucket,
    pub complexity: Complexity,

    /// Framework marker tags detected in content. Advisory only.
    pub frameworks: Vec<String>,

    /// True if any denylisted keyword matched, or the file was unreadable.
    pub sensitive: bool,

    /// Set when the file could not be read or decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

static SWIFT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:class|struct|enum)\s+\w+").expect("valid regex"));
static SWIFT_FUNC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"func\s+\w+").expect("valid regex"));
static OBJC_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(?:interface|implementation)\s+\w+").expect("valid regex"));
static OBJC_FUNC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]\s*\(").expect("valid regex"));

/// Size bucket thresholds, in lines.
const SMALL_MAX: usize = 100;
const MEDIUM_MAX: usize = 300;

/// Complexity score cutoffs over `lines + 4*types + 2*functions`.
const LOW_SCORE_MAX: usize = 100;
const HIGH_SCORE_MIN: usize = 250;

/// Classifies a single file's content into a [`FileRecord`]. Pure function
/// of its inputs; identical input always yields an identical record.
pub struct FileAnalyzer {
    sensitive: SensitiveMatcher,
}

impl FileAnalyzer {
    pub fn new(sensitive: SensitiveMatcher) -> Self {
        Self { sensitive }
    }

    pub fn analyze(&self, path: &str, content: &str) -> FileRecord {
        let kind = FileKind::from_path(path);
        let line_count = content.lines().count();

        let (type_count, function_count) = match kind {
            FileKind::Swift => (
                SWIFT_TYPE_RE.find_iter(content).count(),
                SWIFT_FUNC_RE.find_iter(content).count(),
            ),
            FileKind::Objc => (
                OBJC_TYPE_RE.find_iter(content).count(),
                OBJC_FUNC_RE.find_iter(content).count(),
            ),
            // C/C++ headers and sources get line-count-only classification.
            FileKind::Cpp | FileKind::Other => (0, 0),
        };

        FileRecord {
            path: path.to_string(),
            kind,
            line_count,
            type_count,
            function_count,
            size_bucket: size_bucket(line_count),
            complexity: complexity(line_count, type_count, function_count),
            frameworks: detect_frameworks(content),
            sensitive: self.sensitive.is_sensitive(content),
            analysis_error: None,
        }
    }

    /// Record for a file whose content could not be read or decoded.
    /// Fail safe: unreadable content is treated as not ready.
    pub fn unreadable(&self, path: &str, reason: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            kind: FileKind::from_path(path),
            line_count: 0,
            type_count: 0,
            function_count: 0,
            size_bucket: SizeBucket::Small,
            complexity: Complexity::Low,
            frameworks: Vec::new(),
            sensitive: true,
            analysis_error: Some(reason.to_string()),
        }
    }
}

impl Default for FileAnalyzer {
    fn default() -> Self {
        Self::new(SensitiveMatcher::default())
    }
}

fn size_bucket(line_count: usize) -> SizeBucket {
    if line_count < SMALL_MAX {
        SizeBucket::Small
    } else if line_count < MEDIUM_MAX {
        SizeBucket::Medium
    } else {
        SizeBucket::Large
    }
}

fn complexity(line_count: usize, type_count: usize, function_count: usize) -> Complexity {
    let score = line_count + 4 * type_count + 2 * function_count;
    if score < LOW_SCORE_MAX {
        Complexity::Low
    } else if score >= HIGH_SCORE_MIN {
        Complexity::High
    } else {
        Complexity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swift_lines(n: usize) -> String {
        (0..n).map(|i| format!("let v{i} = {i}\n")).collect()
    }

    #[test]
    fn test_analyze_is_pure() {
        let analyzer = FileAnalyzer::default();
        let content = "import UIKit\nclass Foo {\n  func bar() {}\n}\n";
        let a = analyzer.analyze("Foo.swift", content);
        let b = analyzer.analyze("Foo.swift", content);
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
    }

    #[test]
    fn test_counts_swift_declarations() {
        let analyzer = FileAnalyzer::default();
        let record = analyzer.analyze(
            "Shop.swift",
            "class Shop {}\nstruct Item {}\nfunc render() {}\nfunc layout() {}\n",
        );
        assert_eq!(record.kind, FileKind::Swift);
        assert_eq!(record.type_count, 2);
        assert_eq!(record.function_count, 2);
        assert_eq!(record.line_count, 4);
    }

    #[test]
    fn test_counts_objc_declarations() {
        let analyzer = FileAnalyzer::default();
        let record = analyzer.analyze(
            "Cart.m",
            "@implementation Cart\n- (void)checkout;\n+ (instancetype)shared;\n@end\n",
        );
        assert_eq!(record.kind, FileKind::Objc);
        assert_eq!(record.type_count, 1);
        assert_eq!(record.function_count, 2);
    }

    #[test]
    fn test_size_buckets() {
        let analyzer = FileAnalyzer::default();
        assert_eq!(
            analyzer.analyze("a.swift", &swift_lines(50)).size_bucket,
            SizeBucket::Small
        );
        assert_eq!(
            analyzer.analyze("a.swift", &swift_lines(150)).size_bucket,
            SizeBucket::Medium
        );
        assert_eq!(
            analyzer.analyze("a.swift", &swift_lines(400)).size_bucket,
            SizeBucket::Large
        );
    }

    #[test]
    fn test_complexity_ordering() {
        let analyzer = FileAnalyzer::default();
        assert_eq!(
            analyzer.analyze("a.swift", &swift_lines(30)).complexity,
            Complexity::Low
        );
        assert_eq!(
            analyzer.analyze("a.swift", &swift_lines(150)).complexity,
            Complexity::Medium
        );
        assert_eq!(
            analyzer.analyze("a.swift", &swift_lines(300)).complexity,
            Complexity::High
        );
    }

    #[test]
    fn test_sensitive_flag() {
        let analyzer = FileAnalyzer::default();
        let record = analyzer.analyze("Pay.swift", "func startPayment() {}");
        assert!(record.sensitive);
        let clean = analyzer.analyze("View.swift", "func layout() {}");
        assert!(!clean.sensitive);
    }

    #[test]
    fn test_unreadable_is_fail_safe() {
        let analyzer = FileAnalyzer::default();
        let record = analyzer.unreadable("Broken.m", "invalid utf-8");
        assert!(record.sensitive);
        assert_eq!(record.line_count, 0);
        assert_eq!(record.analysis_error.as_deref(), Some("invalid utf-8"));
    }

    #[test]
    fn test_empty_content_has_zero_lines() {
        let analyzer = FileAnalyzer::default();
        assert_eq!(analyzer.analyze("Empty.swift", "").line_count, 0);
    }
}
