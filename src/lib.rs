//! # zugferd-pdf-check
//!
//! Compliance checks for ZUGFeRD / Factur-X PDF invoices. One run takes the
//! raw file bytes and produces an ordered, severity-tagged list of findings,
//! the detected producer, a pass/fail verdict, and an XML report fragment.
//!
//! ## Quick Start
//!
//! ```no_run
//! use zugferd_pdf_check::{PdfValidator, ValidationContext};
//!
//! let bytes = std::fs::read("invoice.pdf").unwrap();
//! let mut validator = PdfValidator::new();
//! validator.set_filename("invoice.pdf").unwrap();
//! validator.set_file_contents(bytes).unwrap();
//!
//! let mut ctx = ValidationContext::new();
//! validator.validate(&mut ctx).unwrap();
//!
//! for item in ctx.result_items() {
//!     println!("{item}");
//! }
//! println!("{}", ctx.to_xml().unwrap());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `pdf` (default) | lopdf-backed metadata extractor and PDF/A declaration check |
//! | `json` | `ValidationContext::to_json` |

pub mod core;
pub mod pdf;
pub mod xmp;

pub use crate::core::*;
pub use crate::pdf::{ByteSignatureScanner, PdfValidator, PdfValidatorBuilder};
