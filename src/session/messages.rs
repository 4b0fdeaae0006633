//! Fixed NETCONF request bodies.
//!
//! These are the exact wire messages the session emits, byte-for-byte where
//! fixed. The only variable parts are the `get-schema` identifier and
//! version, which are XML-escaped before substitution so a hostile or merely
//! odd module name cannot break the envelope.

use std::borrow::Cow;

/// Client hello: NETCONF base 1.0 plus ietf-netconf-monitoring.
pub const CLIENT_HELLO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nc:hello xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0">
    <nc:capabilities>
        <nc:capability>urn:ietf:params:netconf:base:1.0</nc:capability>
        <nc:capability>urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring</nc:capability>
    </nc:capabilities>
</nc:hello>"#;

/// Subtree-filtered `get` of `netconf-state/schemas`.
pub const SCHEMA_LIST_RPC: &str = r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="0">
  <get>
    <filter type="subtree">
      <netconf-state xmlns="urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring">
        <schemas/>
      </netconf-state>
    </filter>
  </get>
</rpc>"#;

/// Build a `get-schema` request for one module.
pub fn get_schema_rpc(identifier: &str, version: &str) -> String {
    format!(
        r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="104">
  <get-schema xmlns="urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring">
    <identifier>{}</identifier>
    <version>{}</version>
    <format>yang</format>
  </get-schema>
</rpc>"#,
        escape_xml(identifier),
        escape_xml(version),
    )
}

/// Escape the five XML-reserved characters in element content.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
