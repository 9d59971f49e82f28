//! The built-in self-description capability.

use std::sync::Weak;

use parking_lot::RwLock;
use protocol::{METADATA_MEMBER, RemoteError, Reply, Value};
use tracing::debug;

use crate::module::{Module, Unsupported};
use crate::registry::{Entries, describe};

/// Reports what the owning registry exposes.
///
/// Holds a weak handle because the registry stores this module in the same
/// entries it reads.
pub(crate) struct MetadataModule {
    entries: Weak<RwLock<Entries>>,
}

impl MetadataModule {
    pub(crate) fn new(entries: Weak<RwLock<Entries>>) -> Self {
        Self { entries }
    }

    fn get_apis(&self, reply: Reply) {
        let Some(entries) = self.entries.upgrade() else {
            return reply.err(RemoteError::capability("registry is no longer available"));
        };

        let descriptors = describe(&entries.read());
        debug!("getApis() reporting {} apis", descriptors.len());

        match serde_json::to_value(&descriptors) {
            Ok(value) => reply.ok(value),
            Err(e) => reply.err(RemoteError::capability(format!(
                "failed to serialize descriptors: {e}"
            ))),
        }
    }
}

impl Module for MetadataModule {
    fn members(&self) -> Vec<String> {
        vec![METADATA_MEMBER.to_string()]
    }

    fn call(&self, member: &str, _args: Vec<Value>, reply: Reply) -> Result<(), Unsupported> {
        if member != METADATA_MEMBER {
            return Err(Unsupported(reply));
        }
        self.get_apis(reply);
        Ok(())
    }
}
