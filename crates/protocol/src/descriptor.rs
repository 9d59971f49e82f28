//! Self-description documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name the self-description capability is registered under.
///
/// Ordinary capabilities should never use it; the registry does not stop them.
pub const METADATA_API_NAME: &str = "$metadata$";

/// The one member the self-description capability exposes.
pub const METADATA_MEMBER: &str = "getApis";

/// What kind of artifact sits behind a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    Function,
    Module,
    Constant,
    /// Reserved for delegating to another registry. Nothing produces it yet.
    Remote,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CapabilityKind::Function => "Function",
            CapabilityKind::Module => "Module",
            CapabilityKind::Constant => "Constant",
            CapabilityKind::Remote => "Remote",
        };
        f.write_str(name)
    }
}

/// Serializable snapshot of one registered capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub kind: CapabilityKind,
    pub name: String,
    pub version: String,
    /// Only present for modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_names: Option<Vec<String>>,
}

impl Descriptor {
    pub fn is_module(&self) -> bool {
        self.kind == CapabilityKind::Module
    }
}

/// Capability name to descriptor, as returned by `getApis`.
pub type DescriptorSet = BTreeMap<String, Descriptor>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_module_descriptor() {
        let json = r#"{
            "kind": "Module",
            "name": "fs",
            "version": "1.2.0",
            "memberNames": ["readFile", "writeFile"]
        }"#;
        let descriptor: Descriptor = serde_json::from_str(json).unwrap();
        assert!(descriptor.is_module());
        assert_eq!(
            descriptor.member_names.as_deref(),
            Some(&["readFile".to_string(), "writeFile".to_string()][..])
        );
    }

    #[test]
    fn serialize_constant_descriptor_without_members() {
        let descriptor = Descriptor {
            kind: CapabilityKind::Constant,
            name: "answer".to_string(),
            version: "0.0.1".to_string(),
            member_names: None,
        };
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({ "kind": "Constant", "name": "answer", "version": "0.0.1" })
        );
    }
}
