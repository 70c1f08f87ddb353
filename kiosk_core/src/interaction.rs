//! Marker interaction state machine of the touchscreen.
//!
//! # Steps
//! The progress marker placed on a `step<N>` element switches the
//! application step. Parameter markers only act in the criteria step,
//! the selection marker only in the selection step; the final step
//! announces the best match once per criteria configuration.
//!
//! # Lock gesture
//! Touching a new site with the selection marker starts a gesture that
//! captures the marker angle and whether the site is locked. While the
//! marker stays within `lock_buffer` map units of the site's extent:
//! ```text
//! relative = (angle − initial_angle + π/2) mod 2π
//! turned   = relative ≥ π                      (a quarter turn either way)
//! unlock   if  locked ∧ initial_locked = turned
//! lock     if ¬locked ∧ initial_locked ≠ turned
//! ```
//! so each quarter turn changes the lock state at most once.

use crate::{
    classifier::{classify, MarkerKind},
    config::KioskConfig,
    dispatch::{DomEvent, EventTarget},
    decoder::{ObjectEventKind, TuioEvent},
    error::Result,
    feature::Feature,
    map::MapView,
    ranking::RankingEngine,
    sync::{SyncEndpoint, SyncMessage},
    types::{ClassId, Coordinate, SessionId},
};
use std::{
    collections::HashMap,
    f64::consts::{FRAC_PI_2, PI, TAU},
    sync::Arc,
};
use tuio_models::Object2D;

/// Criterion weight set by a parameter marker's angle.
pub fn parameter_weight(angle: f64) -> f64 {
    (angle / PI - 0.5).clamp(0.0, 1.0)
}

/// Whether the marker has turned a quarter turn away from its reference angle.
pub fn quarter_turned(initial_angle: f64, angle: f64) -> bool {
    (angle - initial_angle + FRAC_PI_2).rem_euclid(TAU) >= PI
}

/// Lock gesture of one selection marker session.
#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
    pub initial_angle: f64,
    pub initial_locked: bool,
    pub feature: Arc<Feature>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockChange {
    Locked,
    Unlocked,
}

pub struct InteractionController<M: MapView> {
    config: Arc<KioskConfig>,
    engine: RankingEngine,
    map: M,
    sync: SyncEndpoint,
    current_step: Option<u8>,
    has_map: bool,
    has_canvas: bool,
    /// Best match announced since the last criteria change
    announced: bool,
    best_match: Option<Arc<Feature>>,
    gestures: HashMap<SessionId, Gesture>,
    active_markers: Vec<ClassId>,
}

impl<M: MapView> InteractionController<M> {
    pub fn new(config: Arc<KioskConfig>, engine: RankingEngine, map: M, sync: SyncEndpoint) -> Self {
        Self {
            config,
            engine,
            map,
            sync,
            current_step: None,
            has_map: false,
            has_canvas: false,
            announced: false,
            best_match: None,
            gestures: HashMap::new(),
            active_markers: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn current_step(&self) -> Option<u8> {
        self.current_step
    }

    pub fn has_map(&self) -> bool {
        self.has_map
    }

    pub fn has_canvas(&self) -> bool {
        self.has_canvas
    }

    pub fn announced(&self) -> bool {
        self.announced
    }

    pub fn best_match(&self) -> Option<&Arc<Feature>> {
        self.best_match.as_ref()
    }

    pub fn active_markers(&self) -> &[ClassId] {
        &self.active_markers
    }

    pub fn gesture(&self, session: SessionId) -> Option<&Gesture> {
        self.gestures.get(&session)
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RankingEngine {
        &mut self.engine
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    // -----------------------------------------------------------------------
    // Event entry point
    // -----------------------------------------------------------------------

    /// Handle one DOM event. Cursor events are left to the UI widgets.
    pub fn handle_event(&mut self, event: &DomEvent) -> Result<()> {
        match &event.event {
            TuioEvent::Object {
                kind: ObjectEventKind::Remove,
                object,
                ..
            } => {
                self.on_remove_object(object);
                Ok(())
            }
            TuioEvent::Object { kind, object, .. } => {
                self.on_update_object(*kind, object, &event.target)
            }
            TuioEvent::Cursor { .. } => Ok(()),
        }
    }

    fn on_update_object(
        &mut self,
        kind: ObjectEventKind,
        object: &Object2D,
        target: &EventTarget,
    ) -> Result<()> {
        if kind == ObjectEventKind::Add {
            self.active_markers.push(object.class_id);
        }

        let config = Arc::clone(&self.config);
        match classify(&config, object.class_id) {
            MarkerKind::Progress => match target.element().and_then(|e| e.step_number()) {
                Some(step) => self.set_step(step),
                None => Ok(()),
            },
            MarkerKind::Parameter(criterion) => {
                if self.current_step != Some(config.interaction.criteria_step) {
                    return Ok(());
                }
                self.set_criterion(&criterion.key, parameter_weight(object.a_angle))
            }
            MarkerKind::Selection => {
                if self.current_step != Some(config.interaction.selection_step) {
                    return Ok(());
                }
                self.on_selection(object)
            }
            MarkerKind::Unknown => Ok(()),
        }
    }

    fn on_remove_object(&mut self, object: &Object2D) {
        self.active_markers.retain(|c| *c != object.class_id);
        if self.gestures.remove(&object.session_id).is_some() {
            tracing::debug!(session = %object.session_id, "gesture dropped with marker");
        }
    }

    /// Forget every marker on the table: gestures and active-marker entries.
    /// Step, target and locked sites are kept.
    pub fn reset_markers(&mut self) {
        tracing::debug!(
            gestures = self.gestures.len(),
            markers = self.active_markers.len(),
            "markers reset"
        );
        self.gestures.clear();
        self.active_markers.clear();
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Switch to `step`; steps outside `1..=step_count` are ignored.
    pub fn set_step(&mut self, step: u8) -> Result<()> {
        let config = Arc::clone(&self.config);
        let ic = &config.interaction;
        if step == 0 || step > ic.step_count {
            tracing::debug!(step, "ignoring step out of range");
            return Ok(());
        }

        if self.current_step != Some(step) {
            self.current_step = Some(step);
            self.has_map = ic.map_steps.contains(&step);
            self.has_canvas = ic.canvas_steps.contains(&step);
            tracing::info!(step, map = self.has_map, canvas = self.has_canvas, "step changed");
            self.sync.publish(&SyncMessage::SetProgress { step })?;
        }

        if step == ic.final_step && !self.announced {
            self.announce_best_match()?;
        }
        Ok(())
    }

    fn announce_best_match(&mut self) -> Result<()> {
        let Some(winner) = self.engine.best_match()? else {
            tracing::warn!("no best match to announce");
            return Ok(());
        };
        let chart_data = self.engine.chart_data_for(&winner)?;
        let ic = &self.config.interaction;
        self.map
            .fly_to(winner.center, ic.fly_to_zoom_out, ic.fly_to_zoom_in);
        self.sync.publish(&SyncMessage::ComputerSagt {
            feature: winner.summary(),
            chart_data,
        })?;
        tracing::info!(feature = %winner.id, "best match announced");
        self.announced = true;
        self.best_match = Some(winner);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Criteria
    // -----------------------------------------------------------------------

    /// Set one target weight. Every update replaces the axis, invalidates the
    /// announced best match and rebroadcasts the target, changed or not.
    pub fn set_criterion(&mut self, key: &str, weight: f64) -> Result<()> {
        let target = self.engine.update_target_criteria(key, weight)?;
        self.announced = false;
        tracing::debug!(key, weight, "target criterion updated");
        self.sync.publish(&SyncMessage::SetCriteria {
            chart_data: (*target).clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Selection & lock gesture
    // -----------------------------------------------------------------------

    fn on_selection(&mut self, object: &Object2D) -> Result<()> {
        let Some(coordinate) = self
            .map
            .coordinate_from_xy(object.x_position, object.y_position)
        else {
            return Ok(());
        };

        if let Some(feature) = self.map.features_at(&coordinate).into_iter().next() {
            let same = self
                .gestures
                .get(&object.session_id)
                .is_some_and(|g| g.feature.id == feature.id);
            if !same {
                self.start_gesture(object, feature, coordinate)?;
            }
        }

        if self.evaluate_gesture(object, &coordinate)?.is_some() {
            self.publish_top_features()?;
        }
        Ok(())
    }

    fn start_gesture(
        &mut self,
        object: &Object2D,
        feature: Arc<Feature>,
        coordinate: Coordinate,
    ) -> Result<()> {
        self.map.select_feature(&feature, coordinate);
        let chart_data = self.engine.chart_data_for(&feature)?;
        self.sync.publish(&SyncMessage::SelectFeature {
            feature: feature.summary(),
            chart_data,
        })?;
        let gesture = Gesture {
            initial_angle: object.a_angle,
            initial_locked: self.engine.is_locked(&feature.id),
            feature,
        };
        tracing::debug!(
            session = %object.session_id,
            feature = %gesture.feature.id,
            locked = gesture.initial_locked,
            "gesture started"
        );
        self.gestures.insert(object.session_id, gesture);
        Ok(())
    }

    /// `None` when there is no gesture or the marker is away from its site;
    /// otherwise the lock change of this update, if any.
    fn evaluate_gesture(
        &mut self,
        object: &Object2D,
        coordinate: &Coordinate,
    ) -> Result<Option<Option<LockChange>>> {
        let Some(gesture) = self.gestures.get(&object.session_id) else {
            return Ok(None);
        };
        let near = gesture
            .feature
            .extent
            .buffer(self.config.interaction.lock_buffer)
            .contains(coordinate);
        if !near {
            return Ok(None);
        }

        let id = gesture.feature.id.clone();
        let turned = quarter_turned(gesture.initial_angle, object.a_angle);
        let initial_locked = gesture.initial_locked;
        let locked = self.engine.is_locked(&id);

        let change = if locked && initial_locked == turned {
            self.engine.unlock_feature(&id);
            self.map.set_locked(&id, false);
            Some(LockChange::Unlocked)
        } else if !locked && initial_locked != turned {
            self.engine.lock_feature(&id)?;
            self.map.set_locked(&id, true);
            Some(LockChange::Locked)
        } else {
            None
        };
        if let Some(change) = change {
            tracing::debug!(session = %object.session_id, feature = %id, ?change, "lock gesture fired");
        }
        Ok(Some(change))
    }

    fn publish_top_features(&mut self) -> Result<()> {
        let top = self.engine.top_features();
        let chart_datas = top
            .iter()
            .map(|f| self.engine.chart_data_for(f))
            .collect::<Result<Vec<_>>>()?;
        let top_features = top.iter().map(|f| f.summary()).collect();
        self.sync.publish(&SyncMessage::SetTopFeatures {
            top_features,
            chart_datas,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
