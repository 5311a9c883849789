#![no_main]

use libfuzzer_sys::fuzz_target;
use zugferd_pdf_check::{PdfValidator, ValidationContext};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as PDF input; only a missing filename may error.
    let mut validator = PdfValidator::new();
    validator.set_filename("fuzz.pdf").unwrap();
    validator.set_file_contents(data).unwrap();
    let mut ctx = ValidationContext::new();
    validator.validate(&mut ctx).unwrap();
});
