use serde::{Deserialize, Serialize};

use crate::schedule::loader::{LoadError, PreparedModule};
use crate::stream::CompiledModule;

/// Control -> render. Serialized as `{ "moduleBytes": [..] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlMessage {
    #[serde(rename_all = "camelCase")]
    LoadModule { module_bytes: Vec<u8> },
}

/// Render -> control. Serialized as `{ "ready": true }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ReadyFlag", try_from = "ReadyFlag")]
pub enum RenderMessage {
    /// Sent once per adopted module, on its first quantum.
    Ready,
}

#[derive(Serialize, Deserialize)]
struct ReadyFlag {
    ready: bool,
}

impl From<RenderMessage> for ReadyFlag {
    fn from(message: RenderMessage) -> Self {
        match message {
            RenderMessage::Ready => ReadyFlag { ready: true },
        }
    }
}

impl TryFrom<ReadyFlag> for RenderMessage {
    type Error = &'static str;

    fn try_from(flag: ReadyFlag) -> Result<Self, Self::Error> {
        if flag.ready { Ok(RenderMessage::Ready) } else { Err("`ready` must be true") }
    }
}

/// Render -> loader worker.
pub enum LoaderRequest {
    Instantiate { generation: u64, module_bytes: Vec<u8> },
    /// A superseded module, to be dropped outside the render context.
    Retire(Box<dyn CompiledModule>),
}

/// Loader worker -> render.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(PreparedModule),
    Failed { generation: u64 },
}

impl LoadOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            LoadOutcome::Loaded(prepared) => prepared.generation,
            LoadOutcome::Failed { generation } => *generation,
        }
    }
}

/// Loader worker -> control. Failures never reach the render context
/// with their details.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadReport {
    Failed { generation: u64, error: LoadError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_wire_shape() {
        let json = serde_json::to_string(&RenderMessage::Ready).unwrap();
        assert_eq!(json, r#"{"ready":true}"#);

        let parsed: RenderMessage = serde_json::from_str(r#"{"ready":true}"#).unwrap();
        assert_eq!(parsed, RenderMessage::Ready);
        assert!(serde_json::from_str::<RenderMessage>(r#"{"ready":false}"#).is_err());
    }

    #[test]
    fn test_load_module_wire_shape() {
        let message = ControlMessage::LoadModule { module_bytes: vec![0, 97, 115, 109] };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"moduleBytes":[0,97,115,109]}"#);

        let parsed: ControlMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }
}
