//! Result items, the per-job validation context, and error types.
//!
//! Everything a validation run reports flows through [`ValidationContext`].

mod context;
mod error;
mod result;
pub(crate) mod xml_utils;

pub use context::ValidationContext;
pub use error::*;
pub use result::*;
pub use xml_utils::strip_xml_declaration;
