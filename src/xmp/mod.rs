//! XMP metadata model and the ZUGFeRD / Factur-X conformance rules.
//!
//! The extension schema properties may be written as elements
//! (`<fx:ConformanceLevel>EN 16931</fx:ConformanceLevel>`) or as attributes
//! of `rdf:Description` (`fx:ConformanceLevel="EN 16931"`). Both are accepted.
//!
//! # Rules
//!
//! | Field | Not found | Invalid value |
//! |-------|-----------|---------------|
//! | ConformanceLevel | 11 | 12 |
//! | DocumentType | 13 | 14 |
//! | DocumentFileName | 21 | 19 |
//! | Version | 15 | 16 |

mod conformance;
mod document;

pub use conformance::*;
pub use document::{PDFAID_NS, XmpDocument};
