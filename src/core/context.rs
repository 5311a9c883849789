use super::xml_utils::XmlWriter;
use super::{ResultItem, Severity, ValidatorError};

/// Per-job sink for everything a validation run produces.
///
/// Result items are append-only and keep their emission order. One context
/// belongs to exactly one job; create a fresh one for every file.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    items: Vec<ResultItem>,
    signature: Option<String>,
    invalid: bool,
    custom_xml: String,
}

impl ValidationContext {
    /// Create an empty, valid context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one item.
    pub fn add_result_item(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    /// Append items, keeping their order.
    pub fn add_result_items(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    /// All items in emission order.
    pub fn result_items(&self) -> &[ResultItem] {
        &self.items
    }

    /// Items carrying the given section code, in emission order.
    pub fn items_in_section(&self, section: u32) -> Vec<&ResultItem> {
        self.items.iter().filter(|i| i.section() == section).collect()
    }

    pub fn has_fatal(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Fatal)
    }

    /// Record the detected producer. Only the first assignment is kept.
    pub fn set_signature(&mut self, signature: impl Into<String>) {
        if self.signature.is_none() {
            self.signature = Some(signature.into());
        }
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Mark the job as failed. There is no way back to valid.
    pub fn set_invalid(&mut self) {
        self.invalid = true;
    }

    pub fn is_valid(&self) -> bool {
        !self.invalid
    }

    /// Append a pre-rendered XML fragment to the report buffer.
    pub fn add_custom_xml(&mut self, xml: &str) {
        self.custom_xml.push_str(xml);
    }

    pub fn custom_xml(&self) -> &str {
        &self.custom_xml
    }

    /// Render the whole context as a `<validation>` document fragment.
    pub fn to_xml(&self) -> Result<String, ValidatorError> {
        let mut w = XmlWriter::fragment();
        w.start_element("validation")?;
        w.start_element("messages")?;
        for item in &self.items {
            let section = item.section().to_string();
            w.text_element_with_attrs(
                item.severity().as_str(),
                item.message(),
                &[("type", section.as_str()), ("part", item.part().as_str())],
            )?;
        }
        w.end_element("messages")?;
        w.raw(&self.custom_xml)?;
        let status = if self.is_valid() { "valid" } else { "invalid" };
        w.empty_element_with_attrs("summary", &[("status", status)])?;
        w.end_element("validation")?;
        w.into_string()
    }

    /// Serialize items, signature and verdict as JSON.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, ValidatorError> {
        let value = serde_json::json!({
            "valid": self.is_valid(),
            "signature": self.signature,
            "items": self.items,
        });
        serde_json::to_string_pretty(&value)
            .map_err(|e| ValidatorError::Xml(format!("JSON serialization failed: {e}")))
    }
}
