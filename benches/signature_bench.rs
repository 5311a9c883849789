use criterion::{Criterion, black_box, criterion_group, criterion_main};

use zugferd_pdf_check::core::*;
use zugferd_pdf_check::pdf::ByteSignatureScanner;
use zugferd_pdf_check::xmp::check_conformance;

const XMP: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:fx="urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#"><fx:DocumentType>INVOICE</fx:DocumentType><fx:DocumentFileName>factur-x.xml</fx:DocumentFileName><fx:Version>1.0</fx:Version><fx:ConformanceLevel>EN 16931</fx:ConformanceLevel></rdf:Description></rdf:RDF></x:xmpmeta>"#;

/// ~20 MB of pseudo-random bytes with a producer fingerprint near the end.
fn large_pdf(signature: &[u8]) -> Vec<u8> {
    let mut bytes = b"%PDF-1.7\n".to_vec();
    let mut state = 0x2545_4F46_u32;
    while bytes.len() < 20 * 1024 * 1024 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        bytes.push((state % 200) as u8);
    }
    bytes.extend_from_slice(signature);
    bytes.extend_from_slice(b"\n%%EOF");
    bytes
}

fn bench_scan_large(c: &mut Criterion) {
    let scanner = ByteSignatureScanner::builtin();
    let hit = large_pdf(b"/Producer (Mustang via mustangproject)");
    let miss = large_pdf(b"/Producer (LibreOffice)");

    c.bench_function("scan_20mb_hit", |b| b.iter(|| scanner.scan(black_box(&hit))));
    c.bench_function("scan_20mb_miss", |b| b.iter(|| scanner.scan(black_box(&miss))));
}

fn bench_xmp_conformance(c: &mut Criterion) {
    c.bench_function("xmp_conformance", |b| {
        b.iter(|| {
            let mut ctx = ValidationContext::new();
            check_conformance(black_box(XMP), &mut ctx);
            ctx
        })
    });
}

criterion_group!(benches, bench_scan_large, bench_xmp_conformance);
criterion_main!(benches);
