//! XML extraction of domain values from de-framed NETCONF responses.
//!
//! All element matching is namespace-qualified. Matching by bare local name
//! would false-match unrelated structures in vendor payloads, so every lookup
//! carries the full monitoring (or base) namespace.

use log::debug;
use roxmltree::{Document, Node};

use crate::error::ProtocolError;
use crate::schema::SchemaDescriptor;

/// The ietf-netconf-monitoring YANG namespace.
pub const MONITORING_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring";

/// The NETCONF base 1.0 namespace (hello, rpc envelopes).
pub const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

fn parse(xml: &str) -> Result<Document<'_>, ProtocolError> {
    Document::parse(xml).map_err(|e| ProtocolError::malformed(format!("invalid XML: {e}")))
}

/// Check whether a device hello advertises the ietf-netconf-monitoring
/// capability.
///
/// Capability URIs may carry `?module=...&revision=...` suffixes, so this is
/// a substring match on each advertised capability, not an exact compare.
pub fn hello_has_monitoring(xml: &str) -> Result<bool, ProtocolError> {
    let doc = parse(xml)?;

    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name((BASE_NS, "capability")))
        .filter_map(|n| n.text())
        .any(|uri| uri.contains("ietf-netconf-monitoring")))
}

/// Extract the advertised schema list from a `netconf-state/schemas` reply.
///
/// Returns descriptors in document order. Entries whose `format` is not
/// exactly `yang` are skipped; an entry missing `identifier` or `version`
/// is an error, while a missing `format` merely excludes the entry.
pub fn schema_list(xml: &str) -> Result<Vec<SchemaDescriptor>, ProtocolError> {
    let doc = parse(xml)?;
    let mut schemas = Vec::new();

    for schema in doc
        .descendants()
        .filter(|n| n.has_tag_name((MONITORING_NS, "schema")))
    {
        let identifier = child_text(&schema, "identifier")
            .ok_or_else(|| ProtocolError::malformed("schema entry without identifier"))?;
        let version = child_text(&schema, "version")
            .ok_or_else(|| ProtocolError::malformed("schema entry without version"))?;

        // Missing format means "not yang", which excludes the entry.
        let format = child_text(&schema, "format").unwrap_or_default();
        if format != "yang" {
            debug!("skipping {identifier}@{version} (format {format:?})");
            continue;
        }

        schemas.push(SchemaDescriptor {
            identifier: identifier.to_string(),
            version: version.to_string(),
            format: format.to_string(),
        });
    }

    Ok(schemas)
}

/// Extract the YANG module body from a `get-schema` reply.
///
/// The module is the text of the single monitoring-namespace `data` element,
/// trimmed at the outer boundary only. Interior whitespace is never touched;
/// the bytes must round-trip to what the device serves.
pub fn schema_text(xml: &str) -> Result<String, ProtocolError> {
    let doc = parse(xml)?;

    let data = doc
        .descendants()
        .find(|n| n.has_tag_name((MONITORING_NS, "data")))
        .ok_or_else(|| ProtocolError::malformed("get-schema reply without data element"))?;

    // CDATA sections produce separate text nodes; concatenate them all.
    let text: String = data
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();

    Ok(text.trim().to_string())
}

fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name((MONITORING_NS, name)))
        .and_then(|c| c.text())
}
