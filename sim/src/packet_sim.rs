//! TUIO packet simulator.
//!
//! Generates one bundle per profile per frame, the way a table tracker
//! does: `source`, `alive`, one `set` per live entity, `fseq`. On top of the
//! ground-truth poses it adds:
//! - uniform position / angle jitter
//! - occasional duplicate packets (the bridge forwarding a bundle twice)

use crate::marker::ScriptedMarker;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tuio_models::{Profile, TuioMessage, TuioPacket};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PacketSimConfig {
    /// Address announced in `source` messages
    pub source: String,
    /// Profiles the tracker reports, one bundle each per frame
    pub profiles: Vec<Profile>,
    /// Half-width of the uniform position noise (normalized units)
    pub position_jitter: f64,
    /// Half-width of the uniform angle noise (radians)
    pub angle_jitter: f64,
    /// Probability that a bundle is delivered a second time
    pub duplicate_probability: f64,
}

impl Default for PacketSimConfig {
    fn default() -> Self {
        Self {
            source: "table@127.0.0.1".to_string(),
            profiles: vec![Profile::Object2D, Profile::Cursor2D],
            position_jitter: 0.001,
            angle_jitter: 0.01,
            duplicate_probability: 0.05,
        }
    }
}

/// Generates TUIO bundles from a set of markers.
pub struct PacketSimulator {
    pub config: PacketSimConfig,
    rng: ChaCha8Rng,
    frame_id: i64,
}

impl PacketSimulator {
    pub fn new(config: PacketSimConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            frame_id: 0,
        }
    }

    pub fn frame_id(&self) -> i64 {
        self.frame_id
    }

    /// All packets of the frame at sim time `t`, duplicates included.
    pub fn generate_frame(&mut self, markers: &[ScriptedMarker], t: f64) -> Vec<TuioPacket> {
        self.frame_id += 1;
        let live: Vec<&ScriptedMarker> = markers.iter().filter(|m| m.is_active(t)).collect();

        let mut packets = Vec::new();
        for profile in self.config.profiles.clone() {
            let entities: Vec<&ScriptedMarker> = live
                .iter()
                .copied()
                .filter(|m| match profile {
                    Profile::Cursor2D => m.is_finger(),
                    Profile::Object2D => !m.is_finger(),
                    Profile::Unsupported => false,
                })
                .collect();

            let mut messages = vec![
                TuioMessage::source(profile, self.config.source.clone()),
                TuioMessage::alive(profile, entities.iter().map(|m| m.session_id).collect()),
            ];
            for marker in entities {
                messages.push(self.observe(marker));
            }
            messages.push(TuioMessage::fseq(profile, self.frame_id));

            let packet = TuioPacket::bundle(messages);
            if self.rng.gen::<f64>() < self.config.duplicate_probability {
                packets.push(packet.clone());
                packets.push(packet.as_duplicate());
            } else {
                packets.push(packet);
            }
        }
        packets
    }

    /// Noisy `set` message for one live marker.
    fn observe(&mut self, marker: &ScriptedMarker) -> TuioMessage {
        let pj = self.config.position_jitter;
        let aj = self.config.angle_jitter;
        let x = (marker.x + self.rng.gen::<f64>() * pj * 2.0 - pj).clamp(0.0, 1.0);
        let y = (marker.y + self.rng.gen::<f64>() * pj * 2.0 - pj).clamp(0.0, 1.0);
        let angle = (marker.angle + self.rng.gen::<f64>() * aj * 2.0 - aj).rem_euclid(TAU);

        if let Some(mut cursor) = marker.to_cursor() {
            cursor.x_position = x;
            cursor.y_position = y;
            TuioMessage::set_cursor(&cursor)
        } else {
            let mut object = marker.to_object().unwrap_or_default();
            object.x_position = x;
            object.y_position = y;
            object.a_angle = angle;
            TuioMessage::set_object(&object)
        }
    }
}
