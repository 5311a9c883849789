//! Property-based tests for the signature scanner and XMP checks.
//!
//! Run with: `cargo test --test proptest_tests`

use proptest::prelude::*;

use zugferd_pdf_check::core::*;
use zugferd_pdf_check::pdf::{BUILTIN_SIGNATURES, ByteSignatureScanner};
use zugferd_pdf_check::xmp::{CONFORMANCE_FIELDS, XmpDocument, check_conformance};

/// Filler bytes that cannot form any built-in needle.
fn filler() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"0123456789 \n\r\t#$&*".to_vec()), 0..200)
}

fn xmp_with(fields: &[(&str, String)]) -> String {
    let body: String = fields
        .iter()
        .map(|(name, value)| format!("<fx:{name}>{value}</fx:{name}>"))
        .collect();
    format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description xmlns:fx="urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#">{body}</rdf:Description></rdf:RDF></x:xmpmeta>"#
    )
}

proptest! {
    #[test]
    fn highest_priority_signature_wins(
        picks in prop::collection::vec(0..BUILTIN_SIGNATURES.len(), 1..5),
        gaps in prop::collection::vec(filler(), 5),
    ) {
        let mut bytes = Vec::new();
        for (i, &idx) in picks.iter().enumerate() {
            bytes.extend_from_slice(&gaps[i]);
            bytes.extend_from_slice(BUILTIN_SIGNATURES[idx].needle.as_bytes());
        }
        let best = *picks.iter().min().unwrap();
        prop_assert_eq!(
            ByteSignatureScanner::builtin().scan(&bytes),
            Some(BUILTIN_SIGNATURES[best].producer)
        );
    }

    #[test]
    fn filler_alone_has_no_signature(bytes in filler()) {
        prop_assert_eq!(ByteSignatureScanner::builtin().scan(&bytes), None);
    }

    #[test]
    fn scan_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
        let _ = ByteSignatureScanner::builtin().scan(&bytes);
    }

    #[test]
    fn xmp_parse_never_panics(text in "\\PC{0,300}") {
        let _ = XmpDocument::parse(&text);
        let mut ctx = ValidationContext::new();
        let _ = check_conformance(&text, &mut ctx);
    }

    #[test]
    fn allowed_value_among_others_is_accepted(
        field in 0..CONFORMANCE_FIELDS.len(),
        pick in any::<prop::sample::Index>(),
        noise in prop::collection::vec("[A-Z]{3,8}", 0..3),
    ) {
        let f = CONFORMANCE_FIELDS[field];
        let allowed = pick.get(f.allowed).to_string();
        let mut values: Vec<(&str, String)> = noise.into_iter().map(|v| (f.name, v)).collect();
        values.push((f.name, allowed));

        let mut ctx = ValidationContext::new();
        check_conformance(&xmp_with(&values), &mut ctx);

        prop_assert!(ctx.items_in_section(f.not_found_section).is_empty());
        prop_assert!(ctx.items_in_section(f.invalid_section).is_empty());
    }

    #[test]
    fn values_are_not_trimmed(field in 0..CONFORMANCE_FIELDS.len(), pick in any::<prop::sample::Index>()) {
        let f = CONFORMANCE_FIELDS[field];
        let allowed = *pick.get(f.allowed);
        let mangled = format!(" {allowed}");

        let mut ctx = ValidationContext::new();
        check_conformance(&xmp_with(&[(f.name, mangled)]), &mut ctx);

        prop_assert_eq!(ctx.items_in_section(f.invalid_section).len(), 1);
        prop_assert!(ctx.items_in_section(f.not_found_section).is_empty());
    }
}
