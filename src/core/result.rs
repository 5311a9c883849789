use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a single result item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// File-format sanity failure. Processing still continues.
    Fatal,
    /// An external collaborator failed and was downgraded to a diagnostic.
    Exception,
    /// A specific rule was violated.
    Error,
    /// Reserved; no rule currently emits warnings.
    Warning,
}

impl Severity {
    /// Lowercase name, also used as the XML element name in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Exception => "exception",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the document a result item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Part {
    /// The PDF container.
    #[default]
    Pdf,
}

impl Part {
    /// Lowercase name used in the report's `part` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding of a validation run.
///
/// Items are immutable once built; the builder-style setters consume `self`
/// and are meant to be chained right after [`ResultItem::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    severity: Severity,
    message: String,
    section: u32,
    part: Part,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stacktrace: Option<String>,
}

impl ResultItem {
    /// Create an item with section 0 and part `pdf`.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            section: 0,
            part: Part::default(),
            stacktrace: None,
        }
    }

    /// Shorthand for an `error` item with section and part set.
    pub fn error(message: impl Into<String>, section: u32, part: Part) -> Self {
        Self::new(Severity::Error, message)
            .with_section(section)
            .with_part(part)
    }

    /// Set the rule's section code.
    pub fn with_section(mut self, section: u32) -> Self {
        self.section = section;
        self
    }

    /// Set the document part.
    pub fn with_part(mut self, part: Part) -> Self {
        self.part = part;
        self
    }

    /// Attach diagnostic detail, such as an error's cause chain.
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn section(&self) -> u32 {
        self.section
    }

    pub fn part(&self) -> Part {
        self.part
    }

    pub fn stacktrace(&self) -> Option<&str> {
        self.stacktrace.as_deref()
    }
}

impl fmt::Display for ResultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}/{}] {}",
            self.severity, self.part, self.section, self.message
        )
    }
}
