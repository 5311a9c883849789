#![no_main]

use libfuzzer_sys::fuzz_target;
use zugferd_pdf_check::ValidationContext;
use zugferd_pdf_check::xmp::check_conformance;

fuzz_target!(|data: &[u8]| {
    if let Ok(xmp) = std::str::from_utf8(data) {
        let mut ctx = ValidationContext::new();
        let _ = check_conformance(xmp, &mut ctx);
    }
});
