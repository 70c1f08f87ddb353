//! Packets delivered by the socket bridge.

use crate::message::TuioMessage;
use serde::{Deserialize, Serialize};

/// One OSC packet, already unpacked to JSON by the bridge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TuioPacket {
    /// True for OSC bundles; plain messages are not decoded
    pub bundle: bool,
    /// Set by the bridge when it has already forwarded this bundle
    #[serde(default)]
    pub duplicate: bool,
    /// Transport-level source; informational only, `source` messages win
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub messages: Vec<TuioMessage>,
}

impl TuioPacket {
    /// A fresh (non-duplicate) bundle.
    pub fn bundle(messages: Vec<TuioMessage>) -> Self {
        Self {
            bundle: true,
            duplicate: false,
            source: None,
            messages,
        }
    }

    /// Mark the packet as a duplicate of one already delivered.
    pub fn as_duplicate(mut self) -> Self {
        self.duplicate = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageBody, Profile};

    #[test]
    fn parses_bridge_packet() {
        let json = r#"{
            "bundle": true, "duplicate": false, "source": "table",
            "messages": [
                {"profile": "/tuio/2Dobj", "type": "source", "address": "table@10.0.0.2"},
                {"profile": "/tuio/2Dobj", "type": "alive", "sessionIds": [1, 2]},
                {"profile": "/tuio/2Dobj", "type": "fseq", "frameID": 311}
            ]
        }"#;
        let packet: TuioPacket = serde_json::from_str(json).unwrap();
        assert!(packet.bundle);
        assert_eq!(packet.messages.len(), 3);
        assert!(matches!(
            &packet.messages[0].body,
            MessageBody::Source { address } if address == "table@10.0.0.2"
        ));
        assert!(packet.messages.iter().all(|m| m.profile == Profile::Object2D));
    }

    #[test]
    fn duplicate_defaults_to_false() {
        let packet: TuioPacket = serde_json::from_str(r#"{"bundle": false}"#).unwrap();
        assert!(!packet.duplicate);
        assert!(packet.messages.is_empty());
    }
}
