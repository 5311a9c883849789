//! Seams to the external tools a validation run relies on.

use super::PdfaFlavour;
use crate::core::{Part, ResultItem, ValidatorError};

/// Structured outcome of a PDF/A validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfaOutcome {
    pub compliant: bool,
    pub flavour: PdfaFlavour,
    /// Serialized report, usually an XML document with a declaration.
    pub report: String,
}

/// Full PDF/A structural validation.
pub trait PdfaValidator {
    /// Validate one file. Called exactly once per job.
    fn validate(&self, filename: &str, contents: &[u8]) -> Result<PdfaOutcome, ValidatorError>;
}

/// Everything pulled out of a ZUGFeRD / Factur-X container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// XMP packet text; empty when the document has none.
    pub xmp: String,
    /// The embedded invoice XML, if any.
    pub invoice_xml: Option<String>,
    /// Additional-data files, in document order.
    pub attachments: Vec<Attachment>,
}

/// One embedded additional-data file.
///
/// Filenames are not unique: two file specifications may carry the same
/// name, or none at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// Create an attachment from its filename and raw bytes.
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Reads XMP metadata and embedded files from a PDF.
pub trait MetadataExtractor {
    fn extract(&self, contents: &[u8]) -> Result<ExtractedMetadata, ValidatorError>;
}

/// Validates an XML payload against a schema resource.
///
/// Violations come back as result items using `default_section` and
/// `default_part` unless the validator knows better.
pub trait SchemaValidator {
    fn validate_schema(
        &self,
        xml: &[u8],
        schema: &str,
        default_section: u32,
        default_part: Part,
    ) -> Vec<ResultItem>;
}
