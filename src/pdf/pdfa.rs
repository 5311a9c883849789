use lopdf::Document;
use tracing::debug;

use super::PdfaFlavour;
use super::collaborators::{PdfaOutcome, PdfaValidator};
use super::extract::{load, read_xmp};
use crate::core::ValidatorError;
use crate::core::xml_utils::XmlWriter;
use crate::xmp::{PDFAID_NS, XmpDocument};

/// Lightweight [`PdfaValidator`] that checks the document's own PDF/A claim.
///
/// It verifies the catalog, page tree, XMP metadata stream and `pdfaid`
/// identification, and reports the declared flavour. It does not inspect
/// fonts, colour spaces or content streams; use a full validator for that.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredFlavourValidator;

struct Check {
    id: &'static str,
    passed: bool,
    description: String,
}

impl PdfaValidator for DeclaredFlavourValidator {
    fn validate(&self, filename: &str, contents: &[u8]) -> Result<PdfaOutcome, ValidatorError> {
        let doc = load(contents)?;
        let (checks, flavour) = run_checks(&doc);
        let compliant = checks.iter().all(|c| c.passed);
        debug!(filename, %flavour, compliant, "checked declared PDF/A identification");

        Ok(PdfaOutcome {
            compliant,
            flavour,
            report: render_report(filename, flavour, compliant, &checks)?,
        })
    }
}

fn run_checks(doc: &Document) -> (Vec<Check>, PdfaFlavour) {
    let mut checks = Vec::new();

    let has_catalog = doc.catalog().is_ok();
    checks.push(Check {
        id: "catalog",
        passed: has_catalog,
        description: "document catalog is present".into(),
    });

    let pages = doc.get_pages().len();
    checks.push(Check {
        id: "pages",
        passed: pages > 0,
        description: format!("page tree has {pages} page(s)"),
    });

    let xmp = read_xmp(doc);
    checks.push(Check {
        id: "metadata",
        passed: xmp.is_some(),
        description: "catalog references an XMP metadata stream".into(),
    });

    let parsed = xmp.as_deref().map(XmpDocument::parse);
    let flavour = match &parsed {
        Some(Ok(xmp)) => xmp
            .property(PDFAID_NS, "part")
            .map(|part| PdfaFlavour::from_identification(part, xmp.property(PDFAID_NS, "conformance")))
            .unwrap_or_default(),
        _ => PdfaFlavour::NoFlavour,
    };
    let description = match &parsed {
        Some(Err(e)) => format!("XMP metadata is not well-formed: {e}"),
        _ if flavour == PdfaFlavour::NoFlavour => {
            "XMP metadata declares no valid pdfaid:part / pdfaid:conformance".to_string()
        }
        _ => format!("XMP metadata declares {flavour}"),
    };
    checks.push(Check {
        id: "identification",
        passed: flavour != PdfaFlavour::NoFlavour,
        description,
    });

    (checks, flavour)
}

fn render_report(
    filename: &str,
    flavour: PdfaFlavour,
    compliant: bool,
    checks: &[Check],
) -> Result<String, ValidatorError> {
    let passed = checks.iter().filter(|c| c.passed).count().to_string();
    let failed = checks.iter().filter(|c| !c.passed).count().to_string();
    let flavour_name = flavour.to_string();

    let mut w = XmlWriter::document()?;
    w.start_element_with_attrs(
        "validationReport",
        &[
            ("itemName", filename),
            ("profileName", flavour_name.as_str()),
            ("isCompliant", if compliant { "true" } else { "false" }),
        ],
    )?;
    w.start_element_with_attrs(
        "details",
        &[("passedRules", passed.as_str()), ("failedRules", failed.as_str())],
    )?;
    for check in checks {
        w.text_element_with_attrs(
            "rule",
            &check.description,
            &[
                ("id", check.id),
                ("status", if check.passed { "passed" } else { "failed" }),
            ],
        )?;
    }
    w.end_element("details")?;
    w.end_element("validationReport")?;
    w.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_rules_with_status() {
        let checks = vec![
            Check {
                id: "catalog",
                passed: true,
                description: "document catalog is present".into(),
            },
            Check {
                id: "identification",
                passed: false,
                description: "none".into(),
            },
        ];
        let report = render_report("a.pdf", PdfaFlavour::NoFlavour, false, &checks).unwrap();
        assert!(report.starts_with("<?xml"));
        assert!(report.contains(r#"isCompliant="false""#));
        assert!(report.contains(r#"passedRules="1" failedRules="1""#));
        assert!(report.contains(r#"<rule id="identification" status="failed">none</rule>"#));
    }

    #[test]
    fn garbage_is_an_error_not_a_verdict() {
        let err = DeclaredFlavourValidator
            .validate("x.pdf", b"hello")
            .unwrap_err();
        assert!(matches!(err, ValidatorError::Pdf(_)));
    }
}
