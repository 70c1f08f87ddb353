//! Turns decoder events into DOM-level events at the hit-tested screen point.
//!
//! # Coordinates
//! A normalized position `(x, y)` maps to
//! - page point:   `client_size × (x, y)` (used for hit-testing)
//! - screen point: `screen_size × (x, y)`
//! - client point: `inner_window_size × (x, y)`
//!
//! The event target is the element under the page point, else the document.

use crate::{
    decoder::TuioEvent,
    error::{KioskError, Result},
    types::ElementId,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Surface (external collaborator)
// ---------------------------------------------------------------------------

/// Sizes of the display the events are raised on, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub client_width: f64,
    pub client_height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub screen_width: f64,
    pub screen_height: f64,
}

impl Viewport {
    /// Full-screen window: document, window and screen share one size.
    pub fn fullscreen(width: f64, height: f64) -> Self {
        Self {
            client_width: width,
            client_height: height,
            inner_width: width,
            inner_height: height,
            screen_width: width,
            screen_height: height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::fullscreen(1920.0, 1080.0)
    }
}

/// The UI the kiosk raises events on.
pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Topmost element at a page point.
    fn element_at(&self, page_x: f64, page_y: f64) -> Option<ElementId>;

    fn supports_pointer_events(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// DOM events
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTarget {
    Element(ElementId),
    Document,
}

impl EventTarget {
    pub fn element(&self) -> Option<&ElementId> {
        match self {
            EventTarget::Element(id) => Some(id),
            EventTarget::Document => None,
        }
    }
}

/// Pointer event initialization values for a cursor event.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInit {
    pub pointer_id: i64,
    pub pointer_type: &'static str,
    pub screen_x: f64,
    pub screen_y: f64,
    pub client_x: f64,
    pub client_y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomEvent {
    /// Decoder event carried as the event detail
    pub event: TuioEvent,
    pub target: EventTarget,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Present for pointer events only
    pub pointer: Option<PointerInit>,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        self.event.name()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct EventDispatcher<S: Surface> {
    surface: S,
    cursor_events: bool,
}

impl<S: Surface> EventDispatcher<S> {
    /// Fails once, up front, when cursor events are requested on a surface
    /// without pointer-event support.
    pub fn new(surface: S, cursor_events: bool) -> Result<Self> {
        if cursor_events && !surface.supports_pointer_events() {
            return Err(KioskError::PointerEventsUnsupported);
        }
        Ok(Self {
            surface,
            cursor_events,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn cursor_events(&self) -> bool {
        self.cursor_events
    }

    /// DOM event for one decoder event; `None` for suppressed cursor events.
    pub fn dispatch(&self, event: &TuioEvent) -> Option<DomEvent> {
        let vp = self.surface.viewport();
        let (x, y) = event.position();
        let target = self
            .surface
            .element_at(vp.client_width * x, vp.client_height * y)
            .map_or(EventTarget::Document, EventTarget::Element);

        let pointer = match event {
            TuioEvent::Cursor { cursor, .. } => {
                if !self.cursor_events {
                    return None;
                }
                Some(PointerInit {
                    pointer_id: cursor.session_id.0,
                    pointer_type: "touch",
                    screen_x: vp.screen_width * x,
                    screen_y: vp.screen_height * y,
                    client_x: vp.inner_width * x,
                    client_y: vp.inner_height * y,
                })
            }
            TuioEvent::Object { .. } => None,
        };

        tracing::trace!(event = event.name(), ?target, "dispatching");
        Some(DomEvent {
            event: event.clone(),
            target,
            bubbles: true,
            cancelable: true,
            pointer,
        })
    }

    pub fn dispatch_all(&self, events: &[TuioEvent]) -> Vec<DomEvent> {
        events.iter().filter_map(|e| self.dispatch(e)).collect()
    }
}

// ---------------------------------------------------------------------------
// Rectangle-list surface
// ---------------------------------------------------------------------------

/// Axis-aligned element rectangle in page coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// A surface made of named rectangles; later regions are on top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSurface {
    pub viewport: Viewport,
    pub regions: Vec<Region>,
    #[serde(default = "default_pointer_events")]
    pub pointer_events: bool,
}

fn default_pointer_events() -> bool {
    true
}

impl RegionSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            regions: Vec::new(),
            pointer_events: true,
        }
    }

    pub fn with_region(mut self, id: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.regions.push(Region {
            id: ElementId::new(id),
            x,
            y,
            width,
            height,
        });
        self
    }

    pub fn without_pointer_events(mut self) -> Self {
        self.pointer_events = false;
        self
    }

    /// Touchscreen layout: `step1..stepN` stacked along the left edge
    /// (a tenth of the width), the rest is the `stage` (map or canvas).
    pub fn touchscreen(viewport: Viewport, step_count: u8) -> Self {
        let bar = viewport.client_width / 10.0;
        let h = viewport.client_height / f64::from(step_count.max(1));
        let mut surface = Self::new(viewport).with_region(
            "stage",
            bar,
            0.0,
            viewport.client_width - bar,
            viewport.client_height,
        );
        for n in 1..=step_count {
            surface = surface.with_region(&format!("step{n}"), 0.0, h * f64::from(n - 1), bar, h);
        }
        surface
    }

    /// Normalized center of a region, for placing markers on it.
    pub fn normalized_center(&self, id: &str) -> Option<(f64, f64)> {
        let r = self.regions.iter().find(|r| r.id.as_str() == id)?;
        Some((
            (r.x + r.width / 2.0) / self.viewport.client_width,
            (r.y + r.height / 2.0) / self.viewport.client_height,
        ))
    }
}

impl Surface for RegionSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn element_at(&self, page_x: f64, page_y: f64) -> Option<ElementId> {
        self.regions
            .iter()
            .rev()
            .find(|r| r.contains(page_x, page_y))
            .map(|r| r.id.clone())
    }

    fn supports_pointer_events(&self) -> bool {
        self.pointer_events
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{CursorEventKind, ObjectEventKind};
    use tuio_models::{ClassId, Cursor2D, Object2D, SessionId};

    fn cursor_event(x: f64, y: f64) -> TuioEvent {
        TuioEvent::Cursor {
            kind: CursorEventKind::Down,
            source: "table".into(),
            cursor: Cursor2D {
                session_id: SessionId(9),
                x_position: x,
                y_position: y,
                ..Default::default()
            },
        }
    }

    fn object_event(x: f64, y: f64) -> TuioEvent {
        TuioEvent::Object {
            kind: ObjectEventKind::Update,
            source: "table".into(),
            object: Object2D {
                session_id: SessionId(3),
                class_id: ClassId(1),
                x_position: x,
                y_position: y,
                ..Default::default()
            },
        }
    }

    #[test]
    fn pointer_event_scaled_per_coordinate_space() {
        let vp = Viewport {
            client_width: 1000.0,
            client_height: 500.0,
            inner_width: 1200.0,
            inner_height: 600.0,
            screen_width: 2000.0,
            screen_height: 1000.0,
        };
        let dispatcher = EventDispatcher::new(RegionSurface::new(vp), true).unwrap();
        let dom = dispatcher.dispatch(&cursor_event(0.5, 0.25)).unwrap();
        assert_eq!(dom.name(), "pointerdown");
        assert_eq!(dom.target, EventTarget::Document, "no region, falls back to document");
        assert!(dom.bubbles && dom.cancelable);
        let p = dom.pointer.unwrap();
        assert_eq!(p.pointer_id, 9);
        assert_eq!(p.pointer_type, "touch");
        assert_eq!((p.screen_x, p.screen_y), (1000.0, 250.0));
        assert_eq!((p.client_x, p.client_y), (600.0, 150.0));
    }

    #[test]
    fn object_event_targets_step_region() {
        let surface = RegionSurface::touchscreen(Viewport::fullscreen(1000.0, 500.0), 5);
        let (x, y) = surface.normalized_center("step3").unwrap();
        let dispatcher = EventDispatcher::new(surface, true).unwrap();
        let dom = dispatcher.dispatch(&object_event(x, y)).unwrap();
        assert_eq!(dom.name(), "updateobject");
        assert_eq!(dom.target.element().unwrap().step_number(), Some(3));
        assert!(dom.pointer.is_none());

        let stage = dispatcher.dispatch(&object_event(0.6, 0.5)).unwrap();
        assert_eq!(stage.target, EventTarget::Element(ElementId::new("stage")));
    }

    #[test]
    fn missing_pointer_support_fails_at_construction() {
        let surface = RegionSurface::new(Viewport::default()).without_pointer_events();
        assert!(matches!(
            EventDispatcher::new(surface.clone(), true),
            Err(KioskError::PointerEventsUnsupported)
        ));
        let dispatcher = EventDispatcher::new(surface, false).unwrap();
        assert!(dispatcher.dispatch(&cursor_event(0.5, 0.5)).is_none(), "cursor events suppressed");
        assert!(dispatcher.dispatch(&object_event(0.5, 0.5)).is_some(), "objects still flow");
    }
}
