use serde::{Deserialize, Serialize};
use std::fmt;

/// PDF/A part and conformance level a document was validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PdfaFlavour {
    #[default]
    NoFlavour,
    Pdfa1A,
    Pdfa1B,
    Pdfa2A,
    Pdfa2B,
    Pdfa2U,
    Pdfa3A,
    Pdfa3B,
    Pdfa3U,
    Pdfa4,
    Pdfa4E,
    Pdfa4F,
}

impl PdfaFlavour {
    /// Map a `pdfaid:part` / `pdfaid:conformance` pair to a flavour.
    ///
    /// Part 4 has no conformance level in the base profile; `E` and `F`
    /// select the engineering and file-attachment variants.
    pub fn from_identification(part: &str, conformance: Option<&str>) -> Self {
        let conformance = conformance.map(|c| c.trim().to_ascii_uppercase());
        match (part.trim(), conformance.as_deref()) {
            ("1", Some("A")) => Self::Pdfa1A,
            ("1", Some("B")) => Self::Pdfa1B,
            ("2", Some("A")) => Self::Pdfa2A,
            ("2", Some("B")) => Self::Pdfa2B,
            ("2", Some("U")) => Self::Pdfa2U,
            ("3", Some("A")) => Self::Pdfa3A,
            ("3", Some("B")) => Self::Pdfa3B,
            ("3", Some("U")) => Self::Pdfa3U,
            ("4", None | Some("")) => Self::Pdfa4,
            ("4", Some("E")) => Self::Pdfa4E,
            ("4", Some("F")) => Self::Pdfa4F,
            _ => Self::NoFlavour,
        }
    }

    /// Short identifier such as `3b`, or `none`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::NoFlavour => "none",
            Self::Pdfa1A => "1a",
            Self::Pdfa1B => "1b",
            Self::Pdfa2A => "2a",
            Self::Pdfa2B => "2b",
            Self::Pdfa2U => "2u",
            Self::Pdfa3A => "3a",
            Self::Pdfa3B => "3b",
            Self::Pdfa3U => "3u",
            Self::Pdfa4 => "4",
            Self::Pdfa4E => "4e",
            Self::Pdfa4F => "4f",
        }
    }

    /// The ISO 19005 part, or `None` for [`PdfaFlavour::NoFlavour`].
    pub fn part(&self) -> Option<u8> {
        match self {
            Self::NoFlavour => None,
            Self::Pdfa1A | Self::Pdfa1B => Some(1),
            Self::Pdfa2A | Self::Pdfa2B | Self::Pdfa2U => Some(2),
            Self::Pdfa3A | Self::Pdfa3B | Self::Pdfa3U => Some(3),
            Self::Pdfa4 | Self::Pdfa4E | Self::Pdfa4F => Some(4),
        }
    }
}

impl fmt::Display for PdfaFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFlavour => f.write_str("No flavour"),
            other => write!(f, "PDF/A-{}", other.id().to_ascii_uppercase()),
        }
    }
}
