//! TUIO messages as JSON objects: a profile address plus a `type`-tagged body.
//!
//! # Wire shape
//! ```json
//! { "profile": "/tuio/2Dobj", "type": "set", "sessionId": 7, "classId": 3,
//!   "xPosition": 0.4, "yPosition": 0.6, "aAngle": 1.57, ... }
//! ```
//! The bridge spells the rotation acceleration key `rotationAccleration`;
//! that is the serialized name, the correct spelling is accepted as an alias.

use crate::{
    entity::{Cursor2D, Object2D},
    types::{ClassId, SessionId},
};
use serde::{Deserialize, Serialize};

/// TUIO profile address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profile {
    /// Interactive surface cursor (finger touch)
    #[serde(rename = "/tuio/2Dcur")]
    Cursor2D,
    /// Interactive surface object (tagged tangible)
    #[serde(rename = "/tuio/2Dobj")]
    Object2D,
    /// Any other profile (`/tuio/2Dblb`, 2.5D, 3D ...), not decoded
    #[serde(other)]
    Unsupported,
}

/// One message in a bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuioMessage {
    pub profile: Profile,
    #[serde(flatten)]
    pub body: MessageBody,
}

/// The `type`-dependent part of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    /// Names the sender; overrides the default source for the rest of the bundle.
    Source {
        #[serde(default)]
        address: String,
    },
    /// Authoritative list of live session ids. Missing means none alive.
    Alive {
        #[serde(rename = "sessionIds", default)]
        session_ids: Option<Vec<SessionId>>,
    },
    /// State of one live cursor or object.
    Set(SetMessage),
    /// Frame sequence number.
    Fseq {
        #[serde(rename = "frameID", default)]
        frame_id: Option<i64>,
    },
}

/// Payload of a `set` message. Fields absent on the wire default to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMessage {
    pub session_id: SessionId,
    /// Only present for `/tuio/2Dobj`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub x_position: f64,
    #[serde(default)]
    pub y_position: f64,
    /// Object angle in radians, [0, 2π)
    #[serde(default)]
    pub a_angle: f64,
    #[serde(default)]
    pub x_velocity: f64,
    #[serde(default)]
    pub y_velocity: f64,
    #[serde(default)]
    pub a_rotation_speed: f64,
    #[serde(default)]
    pub motion_acceleration: f64,
    #[serde(
        default,
        rename = "rotationAccleration",
        alias = "rotationAcceleration"
    )]
    pub rotation_acceleration: f64,
}

impl TuioMessage {
    pub fn source(profile: Profile, address: impl Into<String>) -> Self {
        Self {
            profile,
            body: MessageBody::Source {
                address: address.into(),
            },
        }
    }

    pub fn alive(profile: Profile, session_ids: Vec<SessionId>) -> Self {
        Self {
            profile,
            body: MessageBody::Alive {
                session_ids: Some(session_ids),
            },
        }
    }

    pub fn fseq(profile: Profile, frame_id: i64) -> Self {
        Self {
            profile,
            body: MessageBody::Fseq {
                frame_id: Some(frame_id),
            },
        }
    }

    /// `set` message for a 2D cursor.
    pub fn set_cursor(cursor: &Cursor2D) -> Self {
        Self {
            profile: Profile::Cursor2D,
            body: MessageBody::Set(SetMessage {
                session_id: cursor.session_id,
                class_id: None,
                x_position: cursor.x_position,
                y_position: cursor.y_position,
                x_velocity: cursor.x_velocity,
                y_velocity: cursor.y_velocity,
                motion_acceleration: cursor.motion_acceleration,
                ..Default::default()
            }),
        }
    }

    /// `set` message for a 2D object.
    pub fn set_object(object: &Object2D) -> Self {
        Self {
            profile: Profile::Object2D,
            body: MessageBody::Set(SetMessage {
                session_id: object.session_id,
                class_id: Some(object.class_id),
                x_position: object.x_position,
                y_position: object.y_position,
                a_angle: object.a_angle,
                x_velocity: object.x_velocity,
                y_velocity: object.y_velocity,
                a_rotation_speed: object.a_rotation_speed,
                motion_acceleration: object.motion_acceleration,
                rotation_acceleration: object.rotation_acceleration,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_set_with_bridge_spelling() {
        let json = r#"{
            "profile": "/tuio/2Dobj", "type": "set", "sessionId": 12, "classId": 4,
            "xPosition": 0.25, "yPosition": 0.75, "aAngle": 3.0,
            "rotationAccleration": 0.5
        }"#;
        let msg: TuioMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.profile, Profile::Object2D);
        match msg.body {
            MessageBody::Set(set) => {
                assert_eq!(set.session_id, SessionId(12));
                assert_eq!(set.class_id, Some(ClassId(4)));
                assert_eq!(set.x_position, 0.25);
                assert_eq!(set.a_angle, 3.0);
                assert_eq!(set.rotation_acceleration, 0.5);
                assert_eq!(set.x_velocity, 0.0, "absent fields default to zero");
            }
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn alive_without_ids_is_none() {
        let msg: TuioMessage =
            serde_json::from_str(r#"{"profile": "/tuio/2Dcur", "type": "alive"}"#).unwrap();
        assert_eq!(msg.body, MessageBody::Alive { session_ids: None });
    }

    #[test]
    fn unknown_profile_is_unsupported() {
        let msg: TuioMessage = serde_json::from_str(
            r#"{"profile": "/tuio/2Dblb", "type": "fseq", "frameID": 9}"#,
        )
        .unwrap();
        assert_eq!(msg.profile, Profile::Unsupported);
        assert_eq!(msg.body, MessageBody::Fseq { frame_id: Some(9) });
    }

    #[test]
    fn set_object_serializes_wire_names() {
        let obj = Object2D {
            session_id: SessionId(1),
            class_id: ClassId(2),
            x_position: 0.5,
            ..Default::default()
        };
        let value = serde_json::to_value(TuioMessage::set_object(&obj)).unwrap();
        assert_eq!(value["type"], "set");
        assert_eq!(value["profile"], "/tuio/2Dobj");
        assert_eq!(value["classId"], 2);
        assert!(value.get("rotationAccleration").is_some());
    }
}
