//! PDF-level checks for ZUGFeRD / Factur-X invoices.
//!
//! [`PdfValidator`] runs, in order: magic-byte check, PDF/A validation,
//! metadata extraction, XMP conformance rules, producer signature detection,
//! and attachment schema checks. The PDF/A validator, metadata extractor and
//! schema validator are pluggable via the traits in this module.
//!
//! # Sections
//!
//! | Section | Severity | Meaning |
//! |---------|----------|---------|
//! | 2 | error | Attachment failed schema validation |
//! | 7 | exception | PDF/A validator failed |
//! | 20 | fatal | Not a PDF file |
//! | 23 | error | PDF/A-3 flavour check |

mod additional_data;
mod collaborators;
#[cfg(feature = "pdf")]
mod extract;
mod flavour;
#[cfg(feature = "pdf")]
mod pdfa;
mod signature;
mod validator;

pub use additional_data::{
    ADDITIONAL_DATA_SCHEMA, AdditionalDataValidator, SECTION_ADDITIONAL_DATA, WellFormedXml,
};
pub use collaborators::*;
#[cfg(feature = "pdf")]
pub use extract::LopdfExtractor;
pub use flavour::PdfaFlavour;
#[cfg(feature = "pdf")]
pub use pdfa::DeclaredFlavourValidator;
pub use signature::{BUILTIN_SIGNATURES, ByteSignatureScanner, SignaturePattern};
pub use validator::*;
