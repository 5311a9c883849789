use regex::bytes::{RegexSet, RegexSetBuilder};
use std::sync::LazyLock;

use crate::core::ValidatorError;

/// A producer fingerprint: a literal byte string and the name it identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignaturePattern {
    pub needle: &'static str,
    pub producer: &'static str,
}

/// Known producers, highest priority first.
pub const BUILTIN_SIGNATURES: [SignaturePattern; 7] = [
    SignaturePattern { needle: "Symtrax", producer: "Symtrax" },
    SignaturePattern { needle: "via mustangproject", producer: "Mustang" },
    SignaturePattern { needle: "by Alexis de Lattre", producer: "Factur/X Python" },
    SignaturePattern { needle: "intarsys ", producer: "Intarsys" },
    SignaturePattern { needle: "Konik", producer: "Konik" },
    SignaturePattern { needle: "pdfMachine from Broadgun Software", producer: "pdfMachine" },
    SignaturePattern { needle: "%%Invocation:", producer: "Ghostscript" },
];

static BUILTIN: LazyLock<ByteSignatureScanner> = LazyLock::new(|| {
    ByteSignatureScanner::new(BUILTIN_SIGNATURES.to_vec())
        .expect("built-in signature literals compile")
});

/// Detects the producing software from fingerprints in the raw file bytes.
///
/// All patterns are compiled into one literal set and matched in a single
/// linear pass over the input. The winner is the matching pattern with the
/// highest priority, regardless of where in the file it occurs.
#[derive(Debug, Clone)]
pub struct ByteSignatureScanner {
    patterns: Vec<SignaturePattern>,
    set: RegexSet,
}

impl ByteSignatureScanner {
    /// Build a scanner over an ordered pattern table (index 0 wins).
    pub fn new(patterns: Vec<SignaturePattern>) -> Result<Self, ValidatorError> {
        let set = RegexSetBuilder::new(patterns.iter().map(|p| regex::escape(p.needle)))
            .unicode(false)
            .build()?;
        Ok(Self { patterns, set })
    }

    /// The scanner for [`BUILTIN_SIGNATURES`].
    pub fn builtin() -> &'static ByteSignatureScanner {
        &BUILTIN
    }

    pub fn patterns(&self) -> &[SignaturePattern] {
        &self.patterns
    }

    /// Name of the highest-priority producer whose fingerprint occurs in `bytes`.
    pub fn scan(&self, bytes: &[u8]) -> Option<&'static str> {
        self.set
            .matches(bytes)
            .iter()
            .next()
            .map(|idx| self.patterns[idx].producer)
    }
}
