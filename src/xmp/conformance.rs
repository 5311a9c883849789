use tracing::debug;

use super::XmpDocument;
use crate::core::{Part, ResultItem, ValidationContext, ValidatorError};

/// Section code when the XMP packet is missing altogether.
pub const SECTION_XMP_MISSING: u32 = 17;

/// A ZUGFeRD / Factur-X extension-schema property that must carry a known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformanceField {
    /// Property name, matched as element local name or `Description` attribute.
    pub name: &'static str,
    /// Accepted values, compared exactly and case-sensitively.
    pub allowed: &'static [&'static str],
    pub not_found_section: u32,
    pub invalid_section: u32,
    pub not_found_message: &'static str,
    pub invalid_message: &'static str,
}

impl ConformanceField {
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed.contains(&value)
    }

    /// Check this field against a parsed document, appending any findings.
    ///
    /// A missing field yields both the not-found and the invalid-value item.
    pub fn check(&self, doc: &XmpDocument, ctx: &mut ValidationContext) {
        let values = doc.field_values(self.name);
        if values.is_empty() {
            ctx.add_result_item(ResultItem::error(
                self.not_found_message,
                self.not_found_section,
                Part::Pdf,
            ));
        }

        let valid = values.iter().any(|v| self.accepts(v));
        if !valid {
            ctx.add_result_item(ResultItem::error(
                self.invalid_message,
                self.invalid_section,
                Part::Pdf,
            ));
        }
        debug!(field = self.name, matches = values.len(), valid, "checked XMP field");
    }
}

pub const CONFORMANCE_LEVEL: ConformanceField = ConformanceField {
    name: "ConformanceLevel",
    allowed: &[
        "BASIC WL", "BASIC", "MINIMUM", "EN 16931", "COMFORT", "CIUS", "EXTENDED", "XRECHNUNG",
    ],
    not_found_section: 11,
    invalid_section: 12,
    not_found_message: "XMP Metadata: ConformanceLevel not found",
    invalid_message: "XMP Metadata: ConformanceLevel contains invalid value",
};

pub const DOCUMENT_TYPE: ConformanceField = ConformanceField {
    name: "DocumentType",
    allowed: &["INVOICE", "ORDER", "ORDER_RESPONSE", "ORDER_CHANGE"],
    not_found_section: 13,
    invalid_section: 14,
    not_found_message: "XMP Metadata: DocumentType not found",
    invalid_message: "XMP Metadata: DocumentType invalid",
};

pub const DOCUMENT_FILE_NAME: ConformanceField = ConformanceField {
    name: "DocumentFileName",
    allowed: &[
        "factur-x.xml",
        "ZUGFeRD-invoice.xml",
        "zugferd-invoice.xml",
        "xrechnung.xml",
        "order-x.xml",
    ],
    not_found_section: 21,
    invalid_section: 19,
    not_found_message: "XMP Metadata: DocumentFileName not found",
    invalid_message: "XMP Metadata: DocumentFileName contains invalid value",
};

// 1.2, 2.0 and 2.1 are XRechnung versions; 2p0 covers ZUGFeRD 2.0 through 2.1.1.
pub const VERSION: ConformanceField = ConformanceField {
    name: "Version",
    allowed: &["1.0", "2p0", "1.2", "2.0", "2.1"],
    not_found_section: 15,
    invalid_section: 16,
    not_found_message: "XMP Metadata: Version not found",
    invalid_message: "XMP Metadata: Version contains invalid value",
};

/// The four fields, in evaluation order.
pub const CONFORMANCE_FIELDS: [ConformanceField; 4] =
    [CONFORMANCE_LEVEL, DOCUMENT_TYPE, DOCUMENT_FILE_NAME, VERSION];

/// How the XMP packet was handled.
#[derive(Debug)]
pub enum XmpCheck {
    /// No packet; a single section 17 item was reported.
    Missing,
    /// Parsed, and all four fields were evaluated.
    Checked,
    /// The packet did not parse. Nothing was reported; the caller decides
    /// whether to log the error.
    Unparseable(ValidatorError),
}

/// Run the conformance-metadata rules against raw XMP text.
///
/// All four fields are always evaluated once the packet parses; a parse
/// failure skips them without adding items.
pub fn check_conformance(xmp: &str, ctx: &mut ValidationContext) -> XmpCheck {
    if xmp.is_empty() {
        ctx.add_result_item(ResultItem::error(
            "Invalid XMP Metadata not found",
            SECTION_XMP_MISSING,
            Part::Pdf,
        ));
        return XmpCheck::Missing;
    }

    let doc = match XmpDocument::parse(xmp) {
        Ok(doc) => doc,
        Err(e) => return XmpCheck::Unparseable(e),
    };

    for field in &CONFORMANCE_FIELDS {
        field.check(&doc, ctx);
    }
    XmpCheck::Checked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(ctx: &ValidationContext) -> Vec<u32> {
        ctx.result_items().iter().map(|i| i.section()).collect()
    }

    fn xmp(body: &str) -> String {
        format!(
            r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:fx="urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#">{body}</rdf:Description></rdf:RDF></x:xmpmeta>"#
        )
    }

    #[test]
    fn empty_xmp_reports_only_section_17() {
        let mut ctx = ValidationContext::new();
        assert!(matches!(check_conformance("", &mut ctx), XmpCheck::Missing));
        assert_eq!(sections(&ctx), vec![17]);
        assert_eq!(ctx.result_items()[0].message(), "Invalid XMP Metadata not found");
    }

    #[test]
    fn unparseable_xmp_reports_nothing() {
        let mut ctx = ValidationContext::new();
        let outcome = check_conformance("<x:xmpmeta><broken>", &mut ctx);
        assert!(matches!(outcome, XmpCheck::Unparseable(ValidatorError::Xml(_))));
        assert!(ctx.result_items().is_empty());
    }

    #[test]
    fn all_fields_missing_reports_pairs_in_order() {
        let mut ctx = ValidationContext::new();
        check_conformance(&xmp(""), &mut ctx);
        assert_eq!(sections(&ctx), vec![11, 12, 13, 14, 21, 19, 15, 16]);
    }

    #[test]
    fn valid_values_report_nothing() {
        let mut ctx = ValidationContext::new();
        let body = "<fx:ConformanceLevel>EN 16931</fx:ConformanceLevel>\
                    <fx:DocumentType>INVOICE</fx:DocumentType>\
                    <fx:DocumentFileName>factur-x.xml</fx:DocumentFileName>\
                    <fx:Version>1.0</fx:Version>";
        assert!(matches!(check_conformance(&xmp(body), &mut ctx), XmpCheck::Checked));
        assert!(ctx.result_items().is_empty());
    }

    #[test]
    fn any_match_wins() {
        let mut ctx = ValidationContext::new();
        let doc = XmpDocument::parse(&xmp(
            "<fx:Version>9</fx:Version><fx:Version>2p0</fx:Version>",
        ))
        .unwrap();
        VERSION.check(&doc, &mut ctx);
        assert!(ctx.result_items().is_empty());
    }

    #[test]
    fn whitelist_is_case_sensitive() {
        assert!(DOCUMENT_TYPE.accepts("INVOICE"));
        assert!(!DOCUMENT_TYPE.accepts("invoice"));
        assert!(!CONFORMANCE_LEVEL.accepts(" BASIC"));
        assert!(DOCUMENT_FILE_NAME.accepts("zugferd-invoice.xml"));
        assert!(!DOCUMENT_FILE_NAME.accepts("Factur-X.xml"));
    }

    #[test]
    fn document_type_uses_short_invalid_message() {
        let mut ctx = ValidationContext::new();
        let doc = XmpDocument::parse(&xmp("<fx:DocumentType>BILL</fx:DocumentType>")).unwrap();
        DOCUMENT_TYPE.check(&doc, &mut ctx);
        assert_eq!(sections(&ctx), vec![14]);
        assert_eq!(ctx.result_items()[0].message(), "XMP Metadata: DocumentType invalid");
    }
}
