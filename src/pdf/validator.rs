use std::borrow::Cow;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::additional_data::{AdditionalDataValidator, WellFormedXml};
use super::collaborators::{
    ExtractedMetadata, MetadataExtractor, PdfaOutcome, PdfaValidator, SchemaValidator,
};
use super::{ByteSignatureScanner, PdfaFlavour};
use crate::core::xml_utils::{XmlWriter, strip_xml_declaration};
use crate::core::{Part, ResultItem, Severity, ValidationContext, ValidatorError, error_chain};
use crate::xmp::{XmpCheck, check_conformance};

/// Magic marker every PDF file starts with.
///
/// It must sit at offset 0. Files with leading bytes before the header are
/// reported as not a PDF, which is stricter than a search anywhere in the file.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

pub const SECTION_NOT_PDF: u32 = 20;
pub const SECTION_PDFA_EXCEPTION: u32 = 7;
pub const SECTION_NOT_PDFA3: u32 = 23;

/// Flavours that trigger the section 23 "Not a PDF/A-3" item.
///
/// The item fires when the detected flavour *equals* one of these, which is
/// the opposite of what the message suggests. Kept as-is until the intended
/// polarity is confirmed.
pub const PDFA3_FLAVOURS: [PdfaFlavour; 1] = [PdfaFlavour::Pdfa3A];

/// Runs every check on one PDF invoice and reports into a [`ValidationContext`].
///
/// Holds job-scoped state (filename, contents, detected signature, extracted
/// invoice XML); use one instance per job or serialize access to it.
pub struct PdfValidator {
    filename: Option<String>,
    contents: Option<Vec<u8>>,
    raw_xml: Option<String>,
    signature: Option<&'static str>,
    pdfa: Box<dyn PdfaValidator>,
    extractor: Box<dyn MetadataExtractor>,
    schema: Box<dyn SchemaValidator>,
    scanner: Cow<'static, ByteSignatureScanner>,
}

impl std::fmt::Debug for PdfValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfValidator")
            .field("filename", &self.filename)
            .field("contents_len", &self.contents.as_ref().map(Vec::len))
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "pdf")]
impl Default for PdfValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfValidator {
    /// Validator wired to the lopdf-backed default collaborators.
    #[cfg(feature = "pdf")]
    pub fn new() -> Self {
        Self::from_parts(
            Box::new(super::DeclaredFlavourValidator),
            Box::new(super::LopdfExtractor),
            Box::new(WellFormedXml),
            Cow::Borrowed(ByteSignatureScanner::builtin()),
        )
    }

    pub fn builder() -> PdfValidatorBuilder {
        PdfValidatorBuilder::default()
    }

    fn from_parts(
        pdfa: Box<dyn PdfaValidator>,
        extractor: Box<dyn MetadataExtractor>,
        schema: Box<dyn SchemaValidator>,
        scanner: Cow<'static, ByteSignatureScanner>,
    ) -> Self {
        Self {
            filename: None,
            contents: None,
            raw_xml: None,
            signature: None,
            pdfa,
            extractor,
            schema,
            scanner,
        }
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) -> Result<(), ValidatorError> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(ValidatorError::Irrecoverable(
                "filename must not be empty".into(),
            ));
        }
        self.filename = Some(filename);
        Ok(())
    }

    pub fn set_file_contents(&mut self, contents: impl Into<Vec<u8>>) -> Result<(), ValidatorError> {
        self.contents = Some(contents.into());
        Ok(())
    }

    /// The embedded invoice XML found by the last run, or `""`.
    pub fn raw_xml(&self) -> &str {
        self.raw_xml.as_deref().unwrap_or("")
    }

    /// The producer detected by the last run.
    pub fn signature(&self) -> Option<&'static str> {
        self.signature
    }

    /// Run all checks, appending findings to `ctx`.
    ///
    /// Only missing inputs abort with an error. Every other failure becomes a
    /// result item and the remaining checks still run.
    pub fn validate(&mut self, ctx: &mut ValidationContext) -> Result<(), ValidatorError> {
        let filename = self
            .filename
            .as_deref()
            .ok_or_else(|| ValidatorError::Irrecoverable("filename not set".into()))?;
        let contents = self
            .contents
            .as_deref()
            .ok_or_else(|| ValidatorError::Irrecoverable("file contents not set".into()))?;
        self.raw_xml = None;
        self.signature = None;
        info!(filename, size = contents.len(), "validating PDF");

        if !contents.starts_with(PDF_MAGIC) {
            ctx.add_result_item(
                ResultItem::new(Severity::Fatal, format!("Not a PDF file {filename}"))
                    .with_section(SECTION_NOT_PDF)
                    .with_part(Part::Pdf),
            );
        }

        let started = Instant::now();

        // PDF/A validation and extraction each get their own view of the same bytes.
        let pdfa = match self.pdfa.validate(filename, contents) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(filename, error = %e, "PDF/A validation failed");
                ctx.add_result_item(
                    ResultItem::new(Severity::Exception, e.to_string())
                        .with_section(SECTION_PDFA_EXCEPTION)
                        .with_part(Part::Pdf)
                        .with_stacktrace(error_chain(&e)),
                );
                None
            }
        };
        let pdf_report = pdfa
            .as_ref()
            .map(|o| strip_xml_declaration(&o.report))
            .unwrap_or_default();

        let metadata = self.extractor.extract(contents).unwrap_or_else(|e| {
            warn!(filename, error = %e, "could not extract metadata");
            ExtractedMetadata::default()
        });

        if let XmpCheck::Unparseable(e) = check_conformance(&metadata.xmp, ctx) {
            error!(filename, error = %e, "could not parse XMP metadata");
        }
        self.raw_xml = metadata.invoice_xml;

        self.signature = self.scanner.scan(contents);
        if let Some(signature) = self.signature {
            debug!(filename, signature, "detected producer signature");
            ctx.set_signature(signature);
        }

        AdditionalDataValidator::new(self.schema.as_ref()).validate(&metadata.attachments, ctx);

        let elapsed_ms = started.elapsed().as_millis();
        apply_verdict(pdfa.as_ref(), ctx);
        let info = info_xml(ctx.signature(), elapsed_ms)?;
        ctx.add_custom_xml(&pdf_report);
        ctx.add_custom_xml(&info);

        info!(
            filename,
            valid = ctx.is_valid(),
            items = ctx.result_items().len(),
            duration_ms = elapsed_ms as u64,
            "PDF validation finished"
        );
        Ok(())
    }
}

/// The verdict follows the PDF/A compliance flag alone.
fn apply_verdict(pdfa: Option<&PdfaOutcome>, ctx: &mut ValidationContext) {
    let Some(outcome) = pdfa else {
        return;
    };
    if !outcome.compliant {
        ctx.set_invalid();
    }
    if PDFA3_FLAVOURS.contains(&outcome.flavour) {
        ctx.add_result_item(ResultItem::error(
            "Not a PDF/A-3",
            SECTION_NOT_PDFA3,
            Part::Pdf,
        ));
    }
}

fn info_xml(signature: Option<&str>, elapsed_ms: u128) -> Result<String, ValidatorError> {
    let mut w = XmlWriter::fragment();
    w.start_element("info")?;
    w.text_element("signature", signature.unwrap_or("unknown"))?;
    w.text_element_with_attrs("duration", &elapsed_ms.to_string(), &[("unit", "ms")])?;
    w.end_element("info")?;
    w.into_string()
}

/// Wires custom collaborators into a [`PdfValidator`].
#[derive(Default)]
pub struct PdfValidatorBuilder {
    pdfa: Option<Box<dyn PdfaValidator>>,
    extractor: Option<Box<dyn MetadataExtractor>>,
    schema: Option<Box<dyn SchemaValidator>>,
    scanner: Option<ByteSignatureScanner>,
}

impl PdfValidatorBuilder {
    pub fn pdfa_validator(mut self, pdfa: impl PdfaValidator + 'static) -> Self {
        self.pdfa = Some(Box::new(pdfa));
        self
    }

    pub fn metadata_extractor(mut self, extractor: impl MetadataExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    pub fn schema_validator(mut self, schema: impl SchemaValidator + 'static) -> Self {
        self.schema = Some(Box::new(schema));
        self
    }

    /// Replace the built-in producer table, e.g. with one from [`ByteSignatureScanner::new`].
    pub fn signature_scanner(mut self, scanner: ByteSignatureScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Collaborators left unset fall back to the defaults when the `pdf`
    /// feature is enabled; otherwise they are required.
    pub fn build(self) -> Result<PdfValidator, ValidatorError> {
        let pdfa = match self.pdfa {
            Some(pdfa) => pdfa,
            None => default_pdfa()?,
        };
        let extractor = match self.extractor {
            Some(extractor) => extractor,
            None => default_extractor()?,
        };
        Ok(PdfValidator::from_parts(
            pdfa,
            extractor,
            self.schema.unwrap_or_else(|| Box::new(WellFormedXml)),
            self.scanner
                .map_or(Cow::Borrowed(ByteSignatureScanner::builtin()), Cow::Owned),
        ))
    }
}

#[cfg(feature = "pdf")]
fn default_pdfa() -> Result<Box<dyn PdfaValidator>, ValidatorError> {
    Ok(Box::new(super::DeclaredFlavourValidator))
}

#[cfg(not(feature = "pdf"))]
fn default_pdfa() -> Result<Box<dyn PdfaValidator>, ValidatorError> {
    Err(ValidatorError::Irrecoverable(
        "no PDF/A validator configured".into(),
    ))
}

#[cfg(feature = "pdf")]
fn default_extractor() -> Result<Box<dyn MetadataExtractor>, ValidatorError> {
    Ok(Box::new(super::LopdfExtractor))
}

#[cfg(not(feature = "pdf"))]
fn default_extractor() -> Result<Box<dyn MetadataExtractor>, ValidatorError> {
    Err(ValidatorError::Irrecoverable(
        "no metadata extractor configured".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_fragment_defaults_to_unknown() {
        insta::assert_snapshot!(
            info_xml(None, 42).unwrap(),
            @r#"<info><signature>unknown</signature><duration unit="ms">42</duration></info>"#
        );
    }

    #[test]
    fn pdfa_3a_triggers_section_23() {
        let mut ctx = ValidationContext::new();
        let outcome = PdfaOutcome {
            compliant: true,
            flavour: PdfaFlavour::Pdfa3A,
            report: String::new(),
        };
        apply_verdict(Some(&outcome), &mut ctx);
        assert!(ctx.is_valid());
        assert_eq!(ctx.items_in_section(23).len(), 1);
    }

    #[test]
    fn other_flavours_do_not_trigger_section_23() {
        for flavour in [PdfaFlavour::Pdfa3B, PdfaFlavour::Pdfa2B, PdfaFlavour::NoFlavour] {
            let mut ctx = ValidationContext::new();
            let outcome = PdfaOutcome {
                compliant: false,
                flavour,
                report: String::new(),
            };
            apply_verdict(Some(&outcome), &mut ctx);
            assert!(!ctx.is_valid());
            assert!(ctx.result_items().is_empty());
        }
    }

    #[test]
    fn missing_outcome_leaves_verdict_alone() {
        let mut ctx = ValidationContext::new();
        apply_verdict(None, &mut ctx);
        assert!(ctx.is_valid());
        assert!(ctx.result_items().is_empty());
    }
}
