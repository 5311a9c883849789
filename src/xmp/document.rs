use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;

use crate::core::ValidatorError;

/// Namespace URI of the PDF/A identification schema (`pdfaid`).
pub const PDFAID_NS: &str = "http://www.aiim.org/pdfa/ns/id/";

/// A parsed XMP packet, flattened into its elements in document order.
///
/// Only what the metadata checks need is kept: each element's namespace,
/// local name, text content, and attributes.
#[derive(Debug, Clone, Default)]
pub struct XmpDocument {
    nodes: Vec<XmpNode>,
}

#[derive(Debug, Clone)]
struct XmpNode {
    namespace: Option<String>,
    local_name: String,
    /// Concatenation of all descendant text, untrimmed.
    text: String,
    attributes: Vec<XmpAttribute>,
}

#[derive(Debug, Clone)]
struct XmpAttribute {
    namespace: Option<String>,
    local_name: String,
    value: String,
}

fn parse_err(e: impl std::fmt::Display) -> ValidatorError {
    ValidatorError::Xml(format!("XMP parse error: {e}"))
}

fn namespace_of(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ValidatorError> {
    std::str::from_utf8(bytes).map_err(parse_err)
}

impl XmpDocument {
    /// Parse XMP text. The whole document must be well-formed; any error
    /// rejects it as a unit.
    pub fn parse(xmp: &str) -> Result<Self, ValidatorError> {
        let xmp = xmp.strip_prefix('\u{FEFF}').unwrap_or(xmp);
        let mut reader = NsReader::from_str(xmp);
        reader.config_mut().expand_empty_elements = true;

        let mut nodes: Vec<XmpNode> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut root_seen = false;

        loop {
            let (resolved, event) = reader.read_resolved_event().map_err(parse_err)?;
            let namespace = namespace_of(resolved);
            match event {
                Event::Start(ref e) => {
                    if open.is_empty() && root_seen {
                        return Err(parse_err("more than one root element"));
                    }
                    root_seen = true;

                    let mut attributes = Vec::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(parse_err)?;
                        let key = attr.key;
                        if key.as_namespace_binding().is_some() {
                            continue;
                        }
                        let (attr_ns, local) = reader.resolve_attribute(key);
                        attributes.push(XmpAttribute {
                            namespace: namespace_of(attr_ns),
                            local_name: utf8(local.as_ref())?.to_string(),
                            value: attr.unescape_value().map_err(parse_err)?.into_owned(),
                        });
                    }

                    nodes.push(XmpNode {
                        namespace,
                        local_name: utf8(e.local_name().as_ref())?.to_string(),
                        text: String::new(),
                        attributes,
                    });
                    open.push(nodes.len() - 1);
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(ref e) => {
                    let text = e.unescape().map_err(parse_err)?;
                    if open.is_empty() {
                        if !text.trim().is_empty() {
                            return Err(parse_err("text content outside the root element"));
                        }
                        continue;
                    }
                    for &idx in &open {
                        nodes[idx].text.push_str(&text);
                    }
                }
                Event::CData(ref e) => {
                    if open.is_empty() {
                        return Err(parse_err("CDATA outside the root element"));
                    }
                    let text = utf8(e)?;
                    for &idx in &open {
                        nodes[idx].text.push_str(text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(parse_err("unexpected end of document"));
        }
        if !root_seen {
            return Err(parse_err("no root element"));
        }

        Ok(Self { nodes })
    }

    /// Values of `field` in either of its two legal encodings, in document order:
    /// the text of every element whose local name is `field`, and the value of
    /// every `field` attribute on an element whose local name is `Description`.
    pub fn field_values(&self, field: &str) -> Vec<&str> {
        let mut values = Vec::new();
        for node in &self.nodes {
            if node.local_name == field {
                values.push(node.text.as_str());
            }
            if node.local_name == "Description" {
                values.extend(
                    node.attributes
                        .iter()
                        .filter(|a| a.local_name == field)
                        .map(|a| a.value.as_str()),
                );
            }
        }
        values
    }

    /// First value of a namespaced property, as element text or attribute.
    pub fn property(&self, namespace: &str, local_name: &str) -> Option<&str> {
        for node in &self.nodes {
            if node.local_name == local_name && node.namespace.as_deref() == Some(namespace) {
                return Some(node.text.trim());
            }
            if let Some(attr) = node
                .attributes
                .iter()
                .find(|a| a.local_name == local_name && a.namespace.as_deref() == Some(namespace))
            {
                return Some(attr.value.trim());
            }
        }
        None
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELEMENT_FORM: &str = r#"<?xpacket begin="﻿" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
      <pdfaid:part>3</pdfaid:part>
      <pdfaid:conformance>B</pdfaid:conformance>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:fx="urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#">
      <fx:DocumentType>INVOICE</fx:DocumentType>
      <fx:ConformanceLevel>EN 16931</fx:ConformanceLevel>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    #[test]
    fn element_values() {
        let doc = XmpDocument::parse(ELEMENT_FORM).unwrap();
        assert_eq!(doc.field_values("ConformanceLevel"), vec!["EN 16931"]);
        assert_eq!(doc.field_values("DocumentType"), vec!["INVOICE"]);
        assert!(doc.field_values("Version").is_empty());
    }

    #[test]
    fn attribute_values_only_on_description() {
        let xmp = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
            <rdf:Description xmlns:zf="urn:ferd:pdfa:CrossIndustryDocument:invoice:1p0#" zf:Version="1.0"/>
            <rdf:li zf:Version="9.9" xmlns:zf="urn:ferd"/>
        </rdf:RDF></x:xmpmeta>"#;
        let doc = XmpDocument::parse(xmp).unwrap();
        assert_eq!(doc.field_values("Version"), vec!["1.0"]);
    }

    #[test]
    fn namespace_declarations_are_not_attributes() {
        let xmp = r#"<rdf:Description xmlns:Version="urn:x" xmlns:rdf="urn:rdf"/>"#;
        let doc = XmpDocument::parse(xmp).unwrap();
        assert!(doc.field_values("Version").is_empty());
    }

    #[test]
    fn text_content_is_untrimmed_and_nested() {
        let xmp = "<r><Version>\n  2.1\n</Version><DocumentType>IN<b>VOICE</b></DocumentType></r>";
        let doc = XmpDocument::parse(xmp).unwrap();
        assert_eq!(doc.field_values("Version"), vec!["\n  2.1\n"]);
        assert_eq!(doc.field_values("DocumentType"), vec!["INVOICE"]);
    }

    #[test]
    fn entities_are_unescaped() {
        let doc = XmpDocument::parse("<r><Name>a &amp; b</Name></r>").unwrap();
        assert_eq!(doc.field_values("Name"), vec!["a & b"]);
    }

    #[test]
    fn pdfaid_property_in_both_forms() {
        let doc = XmpDocument::parse(ELEMENT_FORM).unwrap();
        assert_eq!(doc.property(PDFAID_NS, "part"), Some("3"));
        assert_eq!(doc.property(PDFAID_NS, "conformance"), Some("B"));

        let attr_form = r#"<rdf:RDF xmlns:rdf="urn:rdf"><rdf:Description xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/" pdfaid:part="2" pdfaid:conformance="U"/></rdf:RDF>"#;
        let doc = XmpDocument::parse(attr_form).unwrap();
        assert_eq!(doc.property(PDFAID_NS, "part"), Some("2"));
        assert_eq!(doc.property(PDFAID_NS, "conformance"), Some("U"));
        assert_eq!(doc.property("urn:other", "part"), None);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(XmpDocument::parse("").is_err());
        assert!(XmpDocument::parse("just text").is_err());
        assert!(XmpDocument::parse("<a><b></a>").is_err());
        assert!(XmpDocument::parse("<a>").is_err());
        assert!(XmpDocument::parse("<a/><b/>").is_err());
    }

    #[test]
    fn leading_bom_is_ignored() {
        let doc = XmpDocument::parse("\u{FEFF}<r><Version>2p0</Version></r>").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.field_values("Version"), vec!["2p0"]);
    }
}
