//! Content problems found while loading the store

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// What is wrong with a content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// File could not be read at all
    Unreadable { message: String },
    /// Front matter is present but does not parse
    MalformedFrontMatter { message: String },
    MissingTitle,
    MissingDescription,
    /// Date key present but not in a recognised format
    InvalidDate { value: String },
    /// Another file already produced this slug
    DuplicateSlug { slug: String, first: String },
    /// Relative link, image or include target that does not exist
    BrokenReference { target: String },
}

impl IssueKind {
    /// Errors exclude the file from the renderable set (or fail the generator)
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::MissingDescription | IssueKind::InvalidDate { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Unreadable { message } => write!(f, "unreadable: {}", message),
            IssueKind::MalformedFrontMatter { message } => write!(f, "{}", message),
            IssueKind::MissingTitle => write!(f, "missing title"),
            IssueKind::MissingDescription => write!(f, "missing description"),
            IssueKind::InvalidDate { value } => write!(f, "unrecognised date {:?}", value),
            IssueKind::DuplicateSlug { slug, first } => {
                write!(f, "slug {:?} already used by {}", slug, first)
            }
            IssueKind::BrokenReference { target } => {
                write!(f, "referenced file not found: {}", target)
            }
        }
    }
}

/// A problem with one content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentIssue {
    /// Source path relative to the content directory
    pub source: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl ContentIssue {
    pub fn new(source: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            source: source.into(),
            severity: kind.severity(),
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", level, self.source, self.kind)
    }
}
