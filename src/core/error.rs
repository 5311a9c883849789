use thiserror::Error;

/// Errors that can occur while setting up or running a validation job.
///
/// Only [`ValidatorError::Irrecoverable`] aborts a job. The other variants are
/// produced by collaborators and end up as result items or log events.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidatorError {
    /// Required inputs were missing or could not be accepted.
    #[error("irrecoverable validation error: {0}")]
    Irrecoverable(String),

    /// The PDF container could not be loaded or navigated.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// XML (XMP metadata or attachment payload) could not be parsed.
    #[error("XML error: {0}")]
    Xml(String),

    /// Metadata or embedded files could not be extracted.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// A producer signature table could not be compiled.
    #[error("signature pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Render an error and its `source()` chain, one cause per line.
///
/// Used as the stack-trace text of `exception` result items.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
