//! TUIO 1.1 decoder: turns bridge packets into cursor / object lifecycle events.
//!
//! # Per-packet processing
//! 1. Drop non-bundle packets and packets flagged as duplicates (no side effects)
//! 2. Start with the default source (socket hostname)
//! 3. For each message, routed by profile (`/tuio/2Dcur`, `/tuio/2Dobj`):
//!    - `source`: switch the effective source for the remaining messages
//!    - `alive`:  remove every tracked entry missing from the id list
//!                (one `Up` / `Remove` event each, in tracking order)
//!    - `set`:    create (`Down` / `Add`) or replace in place (`Move` / `Update`)
//!    - `fseq`:   record the frame id (ordering is not enforced)
//!
//! Each source keeps its own live cursor and object lists, created lazily the
//! first time the source is seen.

use crate::{config::hostname_of, error::Result};
use std::collections::HashMap;
use tuio_models::{Cursor2D, MessageBody, Object2D, Profile, SetMessage, TuioPacket};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorEventKind {
    Down,
    Move,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectEventKind {
    Add,
    Update,
    Remove,
}

/// A lifecycle change of one tracked cursor or object.
#[derive(Clone, Debug, PartialEq)]
pub enum TuioEvent {
    Cursor {
        kind: CursorEventKind,
        source: String,
        cursor: Cursor2D,
    },
    Object {
        kind: ObjectEventKind,
        source: String,
        object: Object2D,
    },
}

impl TuioEvent {
    /// DOM event name raised for this change.
    pub fn name(&self) -> &'static str {
        match self {
            TuioEvent::Cursor { kind, .. } => match kind {
                CursorEventKind::Down => "pointerdown",
                CursorEventKind::Move => "pointermove",
                CursorEventKind::Up => "pointerup",
            },
            TuioEvent::Object { kind, .. } => match kind {
                ObjectEventKind::Add => "addobject",
                ObjectEventKind::Update => "updateobject",
                ObjectEventKind::Remove => "removeobject",
            },
        }
    }

    pub fn source(&self) -> &str {
        match self {
            TuioEvent::Cursor { source, .. } | TuioEvent::Object { source, .. } => source,
        }
    }

    /// Normalized surface position of the cursor or object.
    pub fn position(&self) -> (f64, f64) {
        match self {
            TuioEvent::Cursor { cursor, .. } => cursor.position(),
            TuioEvent::Object { object, .. } => object.position(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source namespaces
// ---------------------------------------------------------------------------

/// Live cursors and objects of one source, in creation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceNamespace {
    pub cursors: Vec<Cursor2D>,
    pub objects: Vec<Object2D>,
    /// Last `fseq` frame id seen for either profile
    pub last_frame: Option<i64>,
}

/// What became of a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketDisposition {
    Processed,
    NotBundle,
    Duplicate,
    /// TUIO input switched off in the configuration
    Disabled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodeOutcome {
    pub disposition: PacketDisposition,
    pub events: Vec<TuioEvent>,
}

impl DecodeOutcome {
    fn skipped(disposition: PacketDisposition) -> Self {
        Self {
            disposition,
            events: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct TuioDecoder {
    default_source: String,
    namespaces: HashMap<String, SourceNamespace>,
}

impl TuioDecoder {
    pub fn new(default_source: impl Into<String>) -> Self {
        Self {
            default_source: default_source.into(),
            namespaces: HashMap::new(),
        }
    }

    /// Decoder whose default source is the hostname of the tracking socket.
    pub fn from_socket_url(url: &str) -> Result<Self> {
        Ok(Self::new(hostname_of(url)?))
    }

    pub fn default_source(&self) -> &str {
        &self.default_source
    }

    pub fn namespace(&self, source: &str) -> Option<&SourceNamespace> {
        self.namespaces.get(source)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Forget every source, as after a transport disconnect. Raises nothing.
    pub fn reset(&mut self) {
        self.namespaces.clear();
    }

    fn namespace_mut(&mut self, source: &str) -> &mut SourceNamespace {
        self.namespaces.entry(source.to_string()).or_default()
    }

    pub fn process_packet(&mut self, packet: &TuioPacket) -> DecodeOutcome {
        if !packet.bundle {
            tracing::debug!("ignoring non-bundle packet");
            return DecodeOutcome::skipped(PacketDisposition::NotBundle);
        }
        if packet.duplicate {
            tracing::debug!("ignoring duplicate packet");
            return DecodeOutcome::skipped(PacketDisposition::Duplicate);
        }

        let mut source = self.default_source.clone();
        self.namespace_mut(&source);
        let mut events = Vec::new();

        for message in &packet.messages {
            match (&message.profile, &message.body) {
                (Profile::Unsupported, _) => {}
                (_, MessageBody::Source { address }) => {
                    source = address.clone();
                    self.namespace_mut(&source);
                }
                (_, MessageBody::Fseq { frame_id }) => {
                    if frame_id.is_some() {
                        self.namespace_mut(&source).last_frame = *frame_id;
                    }
                }
                (Profile::Cursor2D, MessageBody::Alive { session_ids }) => {
                    let alive = session_ids.as_deref().unwrap_or_default();
                    self.cursor_alive(&source, alive, &mut events);
                }
                (Profile::Object2D, MessageBody::Alive { session_ids }) => {
                    let alive = session_ids.as_deref().unwrap_or_default();
                    self.object_alive(&source, alive, &mut events);
                }
                (Profile::Cursor2D, MessageBody::Set(set)) => {
                    self.cursor_set(&source, set, &mut events);
                }
                (Profile::Object2D, MessageBody::Set(set)) => {
                    self.object_set(&source, set, &mut events);
                }
            }
        }

        tracing::debug!(
            messages = packet.messages.len(),
            events = events.len(),
            "packet decoded"
        );
        DecodeOutcome {
            disposition: PacketDisposition::Processed,
            events,
        }
    }

    fn cursor_alive(
        &mut self,
        source: &str,
        alive: &[tuio_models::SessionId],
        events: &mut Vec<TuioEvent>,
    ) {
        let ns = self.namespace_mut(source);
        let (live, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut ns.cursors)
            .into_iter()
            .partition(|c| alive.contains(&c.session_id));
        ns.cursors = live;
        events.extend(gone.into_iter().map(|cursor| TuioEvent::Cursor {
            kind: CursorEventKind::Up,
            source: source.to_string(),
            cursor,
        }));
    }

    fn object_alive(
        &mut self,
        source: &str,
        alive: &[tuio_models::SessionId],
        events: &mut Vec<TuioEvent>,
    ) {
        let ns = self.namespace_mut(source);
        let (live, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut ns.objects)
            .into_iter()
            .partition(|o| alive.contains(&o.session_id));
        ns.objects = live;
        events.extend(gone.into_iter().map(|object| TuioEvent::Object {
            kind: ObjectEventKind::Remove,
            source: source.to_string(),
            object,
        }));
    }

    fn cursor_set(&mut self, source: &str, set: &SetMessage, events: &mut Vec<TuioEvent>) {
        let cursor = Cursor2D::from_set(set);
        let ns = self.namespace_mut(source);
        let kind = match ns.cursors.iter_mut().find(|c| c.session_id == cursor.session_id) {
            Some(existing) => {
                *existing = cursor.clone();
                CursorEventKind::Move
            }
            None => {
                ns.cursors.push(cursor.clone());
                CursorEventKind::Down
            }
        };
        events.push(TuioEvent::Cursor {
            kind,
            source: source.to_string(),
            cursor,
        });
    }

    fn object_set(&mut self, source: &str, set: &SetMessage, events: &mut Vec<TuioEvent>) {
        let object = Object2D::from_set(set);
        let ns = self.namespace_mut(source);
        let kind = match ns.objects.iter_mut().find(|o| o.session_id == object.session_id) {
            Some(existing) => {
                *existing = object.clone();
                ObjectEventKind::Update
            }
            None => {
                ns.objects.push(object.clone());
                ObjectEventKind::Add
            }
        };
        events.push(TuioEvent::Object {
            kind,
            source: source.to_string(),
            object,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_models::{ClassId, SessionId, TuioMessage};

    fn obj(id: i64, class: i32) -> Object2D {
        Object2D {
            session_id: SessionId(id),
            class_id: ClassId(class),
            x_position: 0.5,
            y_position: 0.5,
            ..Default::default()
        }
    }

    fn cur(id: i64) -> Cursor2D {
        Cursor2D {
            session_id: SessionId(id),
            x_position: 0.1,
            y_position: 0.2,
            ..Default::default()
        }
    }

    fn ids(ids: &[i64]) -> Vec<SessionId> {
        ids.iter().map(|&i| SessionId(i)).collect()
    }

    fn kinds(outcome: &DecodeOutcome) -> Vec<&'static str> {
        outcome.events.iter().map(TuioEvent::name).collect()
    }

    #[test]
    fn set_creates_then_updates() {
        let mut dec = TuioDecoder::new("table");
        let packet = TuioPacket::bundle(vec![
            TuioMessage::alive(Profile::Object2D, ids(&[1])),
            TuioMessage::set_object(&obj(1, 10)),
        ]);
        assert_eq!(kinds(&dec.process_packet(&packet)), vec!["addobject"]);
        assert_eq!(kinds(&dec.process_packet(&packet)), vec!["updateobject"]);
        assert_eq!(dec.namespace("table").unwrap().objects.len(), 1);
    }

    #[test]
    fn alive_removes_only_missing_sessions() {
        let mut dec = TuioDecoder::new("table");
        dec.process_packet(&TuioPacket::bundle(vec![
            TuioMessage::alive(Profile::Object2D, ids(&[1, 2, 3])),
            TuioMessage::set_object(&obj(1, 10)),
            TuioMessage::set_object(&obj(2, 11)),
            TuioMessage::set_object(&obj(3, 12)),
        ]));

        let outcome = dec.process_packet(&TuioPacket::bundle(vec![TuioMessage::alive(
            Profile::Object2D,
            ids(&[2, 3]),
        )]));
        assert_eq!(outcome.events.len(), 1, "exactly one removal");
        match &outcome.events[0] {
            TuioEvent::Object { kind, object, .. } => {
                assert_eq!(*kind, ObjectEventKind::Remove);
                assert_eq!(object.session_id, SessionId(1));
            }
            other => panic!("unexpected {other:?}"),
        }
        let remaining: Vec<_> = dec
            .namespace("table")
            .unwrap()
            .objects
            .iter()
            .map(|o| o.session_id)
            .collect();
        assert_eq!(remaining, ids(&[2, 3]), "order preserved");
    }

    #[test]
    fn alive_without_ids_removes_everything() {
        let mut dec = TuioDecoder::new("table");
        dec.process_packet(&TuioPacket::bundle(vec![
            TuioMessage::set_cursor(&cur(4)),
            TuioMessage::set_cursor(&cur(5)),
        ]));
        let empty_alive = TuioMessage {
            profile: Profile::Cursor2D,
            body: MessageBody::Alive { session_ids: None },
        };
        let outcome = dec.process_packet(&TuioPacket::bundle(vec![empty_alive]));
        assert_eq!(kinds(&outcome), vec!["pointerup", "pointerup"]);
    }

    #[test]
    fn duplicate_and_plain_packets_have_no_effect() {
        let mut dec = TuioDecoder::new("table");
        let dup = TuioPacket::bundle(vec![TuioMessage::set_object(&obj(1, 10))]).as_duplicate();
        let outcome = dec.process_packet(&dup);
        assert_eq!(outcome.disposition, PacketDisposition::Duplicate);
        assert!(outcome.events.is_empty());
        assert_eq!(dec.sources().count(), 0, "no namespace created");

        let mut plain = TuioPacket::bundle(vec![TuioMessage::set_object(&obj(1, 10))]);
        plain.bundle = false;
        assert_eq!(dec.process_packet(&plain).disposition, PacketDisposition::NotBundle);
        assert_eq!(dec.sources().count(), 0);
    }

    #[test]
    fn source_message_scopes_following_messages() {
        let mut dec = TuioDecoder::new("localhost");
        let outcome = dec.process_packet(&TuioPacket::bundle(vec![
            TuioMessage::set_cursor(&cur(1)),
            TuioMessage::source(Profile::Cursor2D, "table-b"),
            TuioMessage::set_cursor(&cur(1)),
        ]));
        assert_eq!(kinds(&outcome), vec!["pointerdown", "pointerdown"]);
        assert_eq!(outcome.events[0].source(), "localhost");
        assert_eq!(outcome.events[1].source(), "table-b");

        // Next packet starts again from the default source.
        let outcome = dec.process_packet(&TuioPacket::bundle(vec![TuioMessage::set_cursor(&cur(1))]));
        assert_eq!(kinds(&outcome), vec!["pointermove"]);
        assert_eq!(outcome.events[0].source(), "localhost");
    }

    #[test]
    fn fseq_recorded_and_unsupported_profiles_ignored() {
        let mut dec = TuioDecoder::new("table");
        let blob = TuioMessage {
            profile: Profile::Unsupported,
            body: MessageBody::Set(SetMessage::default()),
        };
        let outcome = dec.process_packet(&TuioPacket::bundle(vec![
            blob,
            TuioMessage::fseq(Profile::Object2D, 42),
        ]));
        assert!(outcome.events.is_empty());
        assert_eq!(dec.namespace("table").unwrap().last_frame, Some(42));
    }

    #[test]
    fn default_source_from_socket_url_and_reset() {
        let mut dec = TuioDecoder::from_socket_url("http://bridge.local:5000").unwrap();
        assert_eq!(dec.default_source(), "bridge.local");
        dec.process_packet(&TuioPacket::bundle(vec![TuioMessage::set_cursor(&cur(1))]));
        dec.reset();
        assert!(dec.namespace("bridge.local").is_none());
        let outcome = dec.process_packet(&TuioPacket::bundle(vec![TuioMessage::set_cursor(&cur(1))]));
        assert_eq!(kinds(&outcome), vec!["pointerdown"], "state forgotten after reset");
    }
}
