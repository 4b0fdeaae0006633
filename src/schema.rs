//! Value types for advertised and fetched YANG schemas.

/// One schema advertised by a device in its `netconf-state/schemas` list.
///
/// Descriptors are returned in document order, exactly as the device listed
/// them. Only descriptors with `format == "yang"` survive list extraction;
/// other formats (vendor binaries, compiled trees) are outside this crate's
/// purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    /// Module identifier, e.g. `ietf-yang-types`.
    pub identifier: String,

    /// Module revision, e.g. `2013-07-15`.
    pub version: String,

    /// Schema format as advertised (always `yang` after filtering).
    pub format: String,
}

impl SchemaDescriptor {
    /// The conventional `identifier@version` display name.
    pub fn name(&self) -> String {
        format!("{}@{}", self.identifier, self.version)
    }
}

impl std::fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.identifier, self.version)
    }
}

/// The raw text of one fetched YANG module.
///
/// `text` is outer-whitespace-trimmed only; interior formatting is preserved
/// byte-for-byte so modules can later be hashed and compared across devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaContent {
    /// Module identifier the content was fetched for.
    pub identifier: String,

    /// Module revision the content was fetched for.
    pub version: String,

    /// The YANG module body.
    pub text: String,
}

impl SchemaContent {
    /// Output file name for this module: `{identifier}@{version}.yang`.
    pub fn file_name(&self) -> String {
        format!("{}@{}.yang", self.identifier, self.version)
    }

    /// Size of the module body in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the module body is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_name() {
        let d = SchemaDescriptor {
            identifier: "ietf-yang-types".into(),
            version: "2013-07-15".into(),
            format: "yang".into(),
        };
        assert_eq!(d.name(), "ietf-yang-types@2013-07-15");
        assert_eq!(d.to_string(), "ietf-yang-types@2013-07-15");
    }

    #[test]
    fn test_content_file_name() {
        let c = SchemaContent {
            identifier: "openconfig-bgp".into(),
            version: "9.8.0".into(),
            text: "module openconfig-bgp {}".into(),
        };
        assert_eq!(c.file_name(), "openconfig-bgp@9.8.0.yang");
        assert_eq!(c.len(), 24);
    }
}
