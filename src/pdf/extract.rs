use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::collaborators::{Attachment, ExtractedMetadata, MetadataExtractor};
use crate::core::ValidatorError;

/// Name trees deeper than this are treated as malformed.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Filenames identifying the embedded invoice (compared case-insensitively).
const INVOICE_FILENAMES: [&str; 4] = [
    "factur-x.xml",
    "zugferd-invoice.xml",
    "xrechnung.xml",
    "order-x.xml",
];

/// Embedded files named with this prefix carry additional-data XML.
const ADDITIONAL_DATA_PREFIX: &str = "additional_data";

/// [`MetadataExtractor`] reading the XMP packet and embedded files with lopdf.
///
/// Only embedded files whose name starts with `additional_data` become
/// attachments; other non-invoice files (images, scans) are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl MetadataExtractor for LopdfExtractor {
    fn extract(&self, contents: &[u8]) -> Result<ExtractedMetadata, ValidatorError> {
        let doc = load(contents)?;

        let mut metadata = ExtractedMetadata {
            xmp: read_xmp(&doc).unwrap_or_default(),
            ..Default::default()
        };

        for (name, data) in embedded_files(&doc) {
            if metadata.invoice_xml.is_none() && is_invoice_filename(&name) {
                let text = String::from_utf8_lossy(&data);
                let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
                metadata.invoice_xml = Some(text.to_string());
            } else if name.starts_with(ADDITIONAL_DATA_PREFIX) {
                metadata.attachments.push(Attachment::new(name, data));
            } else {
                debug!(filename = %name, "ignoring embedded file");
            }
        }

        debug!(
            xmp_len = metadata.xmp.len(),
            has_invoice = metadata.invoice_xml.is_some(),
            attachments = metadata.attachments.len(),
            "extracted PDF metadata"
        );
        Ok(metadata)
    }
}

pub(crate) fn load(contents: &[u8]) -> Result<Document, ValidatorError> {
    Document::load_mem(contents).map_err(|e| ValidatorError::Pdf(format!("failed to load PDF: {e}")))
}

/// The catalog's `/Metadata` stream as text, if present.
pub(crate) fn read_xmp(doc: &Document) -> Option<String> {
    let catalog = doc.catalog().ok()?;
    let meta_obj = catalog.get(b"Metadata").ok()?;
    let stream = resolve_obj(doc, meta_obj).ok()?.as_stream().ok()?;
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_invoice_filename(name: &str) -> bool {
    INVOICE_FILENAMES
        .iter()
        .any(|candidate| name.eq_ignore_ascii_case(candidate))
}

/// All embedded files, from the `/EmbeddedFiles` name tree and the `/AF` array.
///
/// A file specification referenced from both places is returned once.
/// Distinct specifications are kept even when their names collide.
/// Unreadable entries are skipped with a warning.
fn embedded_files(doc: &Document) -> Vec<(String, Vec<u8>)> {
    let mut specs: Vec<FileSpec<'_>> = Vec::new();

    if let Ok(catalog) = doc.catalog() {
        if let Some(tree) = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| resolve_dict(doc, n).ok())
            .and_then(|names| names.get(b"EmbeddedFiles").ok())
            .and_then(|ef| resolve_dict(doc, ef).ok())
        {
            collect_name_tree(doc, tree, 0, &mut specs);
        }

        if let Ok(af) = catalog.get(b"AF").and_then(Object::as_array) {
            for obj in af {
                if let Ok(dict) = resolve_dict(doc, obj) {
                    specs.push(FileSpec {
                        id: obj.as_reference().ok(),
                        name: filespec_name(dict).unwrap_or_default(),
                        dict,
                    });
                }
            }
        }
    }

    let mut seen: BTreeSet<ObjectId> = BTreeSet::new();
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    for spec in specs {
        if let Some(id) = spec.id {
            if !seen.insert(id) {
                continue;
            }
        }
        match read_filespec(doc, spec.dict) {
            Ok(data) => files.push((spec.name, data)),
            Err(e) => warn!(filename = %spec.name, error = %e, "skipping unreadable embedded file"),
        }
    }
    files
}

/// A file specification found in the catalog, with its object id when indirect.
struct FileSpec<'a> {
    id: Option<ObjectId>,
    name: String,
    dict: &'a Dictionary,
}

// Name tree nodes carry either `/Names` [key value ...] or `/Kids` [node ...].
fn collect_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    depth: usize,
    specs: &mut Vec<FileSpec<'a>>,
) {
    if depth > MAX_NAME_TREE_DEPTH {
        warn!("embedded files name tree too deep");
        return;
    }

    if let Ok(names) = node.get(b"Names").and_then(Object::as_array) {
        for chunk in names.chunks(2) {
            if chunk.len() < 2 {
                continue;
            }
            if let Ok(dict) = resolve_dict(doc, &chunk[1]) {
                let name = filespec_name(dict)
                    .or_else(|| obj_to_string(&chunk[0]))
                    .unwrap_or_default();
                specs.push(FileSpec {
                    id: chunk[1].as_reference().ok(),
                    name,
                    dict,
                });
            }
        }
    }

    if let Ok(kids) = node.get(b"Kids").and_then(Object::as_array) {
        for kid in kids {
            if let Ok(kid_dict) = resolve_dict(doc, kid) {
                collect_name_tree(doc, kid_dict, depth + 1, specs);
            }
        }
    }
}

fn filespec_name(fs_dict: &Dictionary) -> Option<String> {
    fs_dict
        .get(b"UF")
        .or_else(|_| fs_dict.get(b"F"))
        .ok()
        .and_then(obj_to_string)
}

fn read_filespec(doc: &Document, fs_dict: &Dictionary) -> Result<Vec<u8>, String> {
    let ef_obj = fs_dict.get(b"EF").map_err(|e| e.to_string())?;
    let ef_dict = resolve_dict(doc, ef_obj)?;

    let f_obj = ef_dict
        .get(b"F")
        .or_else(|_| ef_dict.get(b"UF"))
        .map_err(|e| e.to_string())?;
    let stream = resolve_obj(doc, f_obj)?
        .as_stream()
        .map_err(|e| e.to_string())?;

    // decompressed_content() fails on unfiltered streams; use the raw bytes then.
    Ok(stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone()))
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Dictionary, String> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).map_err(|e| e.to_string()),
        Object::Dictionary(d) => Ok(d),
        _ => Err("expected dictionary or reference".to_string()),
    }
}

fn resolve_obj<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, String> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).map_err(|e| e.to_string()),
        other => Ok(other),
    }
}

// PDF text strings are either UTF-16BE with a BOM or PDFDocEncoding (treated as Latin-1).
fn obj_to_string(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => {
            if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
                let units: Vec<u16> = utf16
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).ok()
            } else {
                Some(bytes.iter().map(|&b| b as char).collect())
            }
        }
        _ => None,
    }
}
