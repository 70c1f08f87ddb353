//! Scripted markers and fingers on the touch table.
//!
//! Each marker has a normalized window position `(x, y)` in [0, 1], an angle
//! in [0, 2π) and a `MarkerMotion` describing how it moves. The simulator
//! steps every marker forward in time and reads its pose each frame.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tuio_models::{ClassId, Cursor2D, Object2D, SessionId};

/// Describes how a marker moves on the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MarkerMotion {
    /// Resting on the table.
    Static,
    /// Constant velocity, in window widths / heights per second.
    Linear { vx: f64, vy: f64 },
    /// Turning in place. `omega` in rad/s, positive is clockwise on screen.
    Rotate { omega: f64 },
    /// Moved by hand along a path; position is interpolated from the
    /// `(t, x, y)` waypoints and held after the last one.
    Waypoints { waypoints: Vec<[f64; 3]> },
    /// Switch motion at given sim times.
    /// `segments` is sorted by time ascending: [(t_start, MarkerMotion), ...].
    /// The active motion is the last one whose t_start <= current_t.
    Segmented {
        segments: Vec<(f64, Box<MarkerMotion>)>,
    },
}

/// What kind of TUIO entity the tracker reports for a marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerBody {
    /// A finger touch (`/tuio/2Dcur`).
    Finger,
    /// A tagged tangible (`/tuio/2Dobj`).
    Tangible(ClassId),
}

/// A simulated marker with ground-truth pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedMarker {
    pub session_id: SessionId,
    pub body: MarkerBody,
    pub x: f64,
    pub y: f64,
    /// Radians, kept in [0, 2π)
    pub angle: f64,
    pub motion: MarkerMotion,
    /// Placed on the table at this time (absent before)
    pub appear_at: Option<f64>,
    /// Lifted off the table at this time
    pub disappear_at: Option<f64>,
}

impl ScriptedMarker {
    pub fn tangible(session: i64, class: ClassId, (x, y): (f64, f64), angle: f64, motion: MarkerMotion) -> Self {
        Self {
            session_id: SessionId(session),
            body: MarkerBody::Tangible(class),
            x,
            y,
            angle: angle.rem_euclid(TAU),
            motion,
            appear_at: None,
            disappear_at: None,
        }
    }

    pub fn finger(session: i64, (x, y): (f64, f64)) -> Self {
        Self {
            session_id: SessionId(session),
            body: MarkerBody::Finger,
            x,
            y,
            angle: 0.0,
            motion: MarkerMotion::Static,
            appear_at: None,
            disappear_at: None,
        }
    }

    /// On the table during `[from, until)`.
    pub fn between(mut self, from: f64, until: f64) -> Self {
        self.appear_at = Some(from);
        self.disappear_at = Some(until);
        self
    }

    pub fn appearing_at(mut self, t: f64) -> Self {
        self.appear_at = Some(t);
        self
    }

    pub fn is_active(&self, t: f64) -> bool {
        self.appear_at.map_or(true, |a| t >= a) && self.disappear_at.map_or(true, |d| t < d)
    }

    pub fn is_finger(&self) -> bool {
        self.body == MarkerBody::Finger
    }

    /// Propagate the pose by `dt` seconds; `t` is the time after the step.
    pub fn step(&mut self, t: f64, dt: f64) {
        let motion = self.motion.clone();
        self.apply(&motion, t, dt);
    }

    fn apply(&mut self, motion: &MarkerMotion, t: f64, dt: f64) {
        match motion {
            MarkerMotion::Static => {}
            MarkerMotion::Linear { vx, vy } => {
                self.x = (self.x + vx * dt).clamp(0.0, 1.0);
                self.y = (self.y + vy * dt).clamp(0.0, 1.0);
            }
            MarkerMotion::Rotate { omega } => {
                self.angle = (self.angle + omega * dt).rem_euclid(TAU);
            }
            MarkerMotion::Waypoints { waypoints } => {
                if let Some((x, y)) = interpolate(waypoints, t) {
                    self.x = x;
                    self.y = y;
                }
            }
            MarkerMotion::Segmented { segments } => {
                if let Some((_, active)) = segments.iter().rev().find(|(start, _)| *start <= t) {
                    self.apply(active, t, dt);
                }
            }
        }
    }

    /// Tracker report for a tangible; `None` for fingers.
    pub fn to_object(&self) -> Option<Object2D> {
        let MarkerBody::Tangible(class_id) = self.body else {
            return None;
        };
        Some(Object2D {
            session_id: self.session_id,
            class_id,
            x_position: self.x,
            y_position: self.y,
            a_angle: self.angle,
            ..Default::default()
        })
    }

    /// Tracker report for a finger; `None` for tangibles.
    pub fn to_cursor(&self) -> Option<Cursor2D> {
        self.is_finger().then(|| Cursor2D {
            session_id: self.session_id,
            x_position: self.x,
            y_position: self.y,
            ..Default::default()
        })
    }
}

fn interpolate(waypoints: &[[f64; 3]], t: f64) -> Option<(f64, f64)> {
    let first = waypoints.first()?;
    if t <= first[0] {
        return Some((first[1], first[2]));
    }
    for pair in waypoints.windows(2) {
        let ([t0, x0, y0], [t1, x1, y1]) = (pair[0], pair[1]);
        if t <= t1 {
            let span = t1 - t0;
            let f = if span > 0.0 { (t - t0) / span } else { 1.0 };
            return Some((x0 + (x1 - x0) * f, y0 + (y1 - y0) * f));
        }
    }
    waypoints.last().map(|w| (w[1], w[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn rotation_wraps_angle() {
        let mut m = ScriptedMarker::tangible(1, ClassId(4), (0.5, 0.5), 6.0, MarkerMotion::Rotate { omega: 1.0 });
        m.step(0.5, 0.5);
        assert!((m.angle - (6.5 - TAU)).abs() < 1e-12, "angle={}", m.angle);
    }

    #[test]
    fn waypoints_interpolate_and_hold() {
        let path = MarkerMotion::Waypoints {
            waypoints: vec![[1.0, 0.0, 0.0], [2.0, 1.0, 0.5]],
        };
        let mut m = ScriptedMarker::tangible(1, ClassId(1), (0.0, 0.0), 0.0, path);
        m.step(1.5, 0.1);
        assert!((m.x - 0.5).abs() < 1e-12 && (m.y - 0.25).abs() < 1e-12);
        m.step(9.0, 0.1);
        assert_eq!((m.x, m.y), (1.0, 0.5));
    }

    #[test]
    fn segmented_switches_motion() {
        let motion = MarkerMotion::Segmented {
            segments: vec![
                (0.0, Box::new(MarkerMotion::Static)),
                (1.0, Box::new(MarkerMotion::Rotate { omega: PI })),
            ],
        };
        let mut m = ScriptedMarker::tangible(1, ClassId(2), (0.5, 0.5), 0.0, motion);
        m.step(0.5, 0.5);
        assert_eq!(m.angle, 0.0, "static before 1 s");
        m.step(1.5, 0.5);
        assert!((m.angle - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn activity_window_and_reports() {
        let m = ScriptedMarker::finger(3, (0.2, 0.3)).between(1.0, 2.0);
        assert!(!m.is_active(0.9));
        assert!(m.is_active(1.0));
        assert!(!m.is_active(2.0));
        assert!(m.to_object().is_none());
        assert_eq!(m.to_cursor().map(|c| c.position()), Some((0.2, 0.3)));

        let t = ScriptedMarker::tangible(4, ClassId(7), (0.1, 0.9), 1.0, MarkerMotion::Static);
        let obj = t.to_object().unwrap();
        assert_eq!(obj.class_id, ClassId(7));
        assert_eq!(obj.a_angle, 1.0);
    }
}
