//! `tuio_models` — TUIO 1.1 wire model as delivered by the socket bridge.
//!
//! # Module layout
//! - [`types`]   — Session / class identifiers
//! - [`message`] — Profile-tagged messages (`source`, `alive`, `set`, `fseq`)
//! - [`packet`]  — Bundles of messages with duplicate flag and source
//! - [`entity`]  — Live 2D cursor and 2D object records built from `set`

pub mod entity;
pub mod message;
pub mod packet;
pub mod types;

pub use entity::{Cursor2D, Object2D};
pub use message::{MessageBody, Profile, SetMessage, TuioMessage};
pub use packet::TuioPacket;
pub use types::{ClassId, SessionId};
