//! Live cursor / object records, one per session id within a source.

use crate::{
    message::SetMessage,
    types::{ClassId, SessionId},
};
use serde::{Deserialize, Serialize};

/// A touch point on the surface (`/tuio/2Dcur`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor2D {
    pub session_id: SessionId,
    /// Normalized [0, 1], left to right
    pub x_position: f64,
    /// Normalized [0, 1], top to bottom
    pub y_position: f64,
    pub x_velocity: f64,
    pub y_velocity: f64,
    pub motion_acceleration: f64,
}

/// A tagged tangible on the surface (`/tuio/2Dobj`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object2D {
    pub session_id: SessionId,
    pub class_id: ClassId,
    pub x_position: f64,
    pub y_position: f64,
    /// Radians, [0, 2π)
    pub a_angle: f64,
    pub x_velocity: f64,
    pub y_velocity: f64,
    pub a_rotation_speed: f64,
    pub motion_acceleration: f64,
    #[serde(rename = "rotationAccleration", alias = "rotationAcceleration")]
    pub rotation_acceleration: f64,
}

impl Cursor2D {
    pub fn from_set(set: &SetMessage) -> Self {
        Self {
            session_id: set.session_id,
            x_position: set.x_position,
            y_position: set.y_position,
            x_velocity: set.x_velocity,
            y_velocity: set.y_velocity,
            motion_acceleration: set.motion_acceleration,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x_position, self.y_position)
    }
}

impl Object2D {
    /// A `set` without a class id yields class 0.
    pub fn from_set(set: &SetMessage) -> Self {
        Self {
            session_id: set.session_id,
            class_id: set.class_id.unwrap_or_default(),
            x_position: set.x_position,
            y_position: set.y_position,
            a_angle: set.a_angle,
            x_velocity: set.x_velocity,
            y_velocity: set.y_velocity,
            a_rotation_speed: set.a_rotation_speed,
            motion_acceleration: set.motion_acceleration,
            rotation_acceleration: set.rotation_acceleration,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x_position, self.y_position)
    }
}
