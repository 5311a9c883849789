use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::info;

use super::collaborators::{Attachment, SchemaValidator};
use crate::core::{Part, ResultItem, ValidationContext};

/// Schema resource every additional-data attachment is validated against.
pub const ADDITIONAL_DATA_SCHEMA: &str = "ad/basic/additional_data_base_schema.xsd";

/// Default section code for attachment findings.
pub const SECTION_ADDITIONAL_DATA: u32 = 2;

/// Forwards each embedded attachment to a [`SchemaValidator`].
pub struct AdditionalDataValidator<'a> {
    schema: &'a dyn SchemaValidator,
}

impl<'a> AdditionalDataValidator<'a> {
    pub fn new(schema: &'a dyn SchemaValidator) -> Self {
        Self { schema }
    }

    /// Validate every attachment; one failing attachment never stops the rest.
    pub fn validate(&self, attachments: &[Attachment], ctx: &mut ValidationContext) {
        for attachment in attachments {
            info!(
                filename = %attachment.filename,
                size = attachment.data.len(),
                "validating additional data"
            );
            let items = self.schema.validate_schema(
                &attachment.data,
                ADDITIONAL_DATA_SCHEMA,
                SECTION_ADDITIONAL_DATA,
                Part::Pdf,
            );
            ctx.add_result_items(items);
        }
    }
}

/// Schema validator that only checks XML well-formedness.
///
/// Stands in for a full XSD engine; plug one in via [`SchemaValidator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WellFormedXml;

impl SchemaValidator for WellFormedXml {
    fn validate_schema(
        &self,
        xml: &[u8],
        schema: &str,
        default_section: u32,
        default_part: Part,
    ) -> Vec<ResultItem> {
        match check_well_formed(xml) {
            Ok(()) => Vec::new(),
            Err(reason) => vec![ResultItem::error(
                format!("XML is not well-formed for schema {schema}: {reason}"),
                default_section,
                default_part,
            )],
        }
    }
}

fn check_well_formed(xml: &[u8]) -> Result<(), String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().expand_empty_elements = true;
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    roots += 1;
                    if roots > 1 {
                        return Err("more than one root element".into());
                    }
                }
                depth += 1;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(e)) if depth == 0 => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                if !text.trim().is_empty() {
                    return Err("text content outside the root element".into());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("at byte {}: {e}", reader.error_position())),
        }
        buf.clear();
    }

    if depth != 0 {
        return Err("unexpected end of document".into());
    }
    if roots == 0 {
        return Err("no root element".into());
    }
    Ok(())
}
