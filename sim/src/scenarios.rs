//! Scenario definitions.
//!
//! Each scenario is a scripted visit to the kiosk: a site grid, a
//! touchscreen layout and the markers a visitor puts on the table.
//! All scenarios are deterministic given the same seed.

use crate::{
    marker::{MarkerMotion, ScriptedMarker},
    packet_sim::{PacketSimConfig, PacketSimulator},
    setup::KioskSetup,
    sites::{generate_sites, SiteGrid},
};
use kiosk_core::{
    geometry::Extent, layers::LayerConfig, ClassId, KioskConfig, SearchCriterion, Viewport,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tuio_models::TuioPacket;

/// Class id of the marker that switches steps.
pub const PROGRESS_MARKER: ClassId = ClassId(1);
/// Class id of the marker that selects and locks sites.
pub const SELECTION_MARKER: ClassId = ClassId(2);

/// Which pre-defined scenario to load.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Parameter markers turned to set the target, then the final step
    CriteriaSweep,
    /// Selection marker locks, unlocks and re-locks one site
    LockGesture,
    /// Steps 1 to 5: criteria, one locked site, best match announced
    FullSession,
    /// Finger taps on every step button and one drag across the stage
    CursorTaps,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds
    pub frame_dt: f64, // tracker frame interval (s)
    pub grid: SiteGrid,
    pub setup: KioskSetup,
    pub markers: Vec<ScriptedMarker>,
    pub packet_sim: PacketSimConfig,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        let base = Self::base(kind, seed);
        match kind {
            ScenarioKind::CriteriaSweep => base.criteria_sweep(),
            ScenarioKind::LockGesture => base.lock_gesture(),
            ScenarioKind::FullSession => base.full_session(),
            ScenarioKind::CursorTaps => base.cursor_taps(),
        }
    }

    /// Three criteria over a 4 × 3 grid, shown right of the step bar.
    fn base(kind: ScenarioKind, seed: u64) -> Self {
        let criteria = vec![
            SearchCriterion::new("green", 10, "46, 204, 113"),
            SearchCriterion::new("quiet", 11, "52, 152, 219"),
            SearchCriterion::new("transit", 12, "231, 76, 60"),
        ];
        let mut config = KioskConfig::new(criteria, PROGRESS_MARKER, SELECTION_MARKER);
        config.topic_layers = vec![LayerConfig::vector("sites", "sites.json", "GeoJSON")];

        let grid = SiteGrid::default();
        let sites = generate_sites(&grid, &config.criteria_keys(), seed);
        let view = grid_view(&grid);

        Scenario {
            name: kind_name(kind).into(),
            seed,
            duration: 0.0,
            frame_dt: 0.05,
            grid,
            setup: KioskSetup {
                config,
                sites,
                view,
                viewport: Viewport::fullscreen(1920.0, 1080.0),
            },
            markers: Vec::new(),
            packet_sim: PacketSimConfig::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 1: Criteria sweep
    // -----------------------------------------------------------------------
    fn criteria_sweep(mut self) -> Self {
        let progress = self.progress_path(&[(0.0, 1), (1.0, 1), (1.5, 2), (5.0, 2), (6.0, 5)]);
        self.markers.push(progress);
        self.add_parameter_markers(&[0.8, 0.3, 0.55], 2.0);
        self.duration = 8.0;
        self
    }

    // -----------------------------------------------------------------------
    // Scenario 2: Lock gesture
    // -----------------------------------------------------------------------
    fn lock_gesture(mut self) -> Self {
        let progress = self.progress_path(&[(0.0, 3)]);
        let site = self.site_position(5);
        let selection = ScriptedMarker::tangible(
            2,
            SELECTION_MARKER,
            site,
            0.0,
            MarkerMotion::Segmented {
                segments: vec![
                    (0.0, Box::new(MarkerMotion::Static)),
                    (1.5, Box::new(MarkerMotion::Rotate { omega: 2.0 })),
                    (2.5, Box::new(MarkerMotion::Static)),
                    (3.0, Box::new(MarkerMotion::Rotate { omega: -2.0 })),
                    (4.0, Box::new(MarkerMotion::Static)),
                    (4.5, Box::new(MarkerMotion::Rotate { omega: 2.0 })),
                    (5.5, Box::new(MarkerMotion::Static)),
                ],
            },
        )
        .appearing_at(0.5);
        self.markers.extend([progress, selection]);
        self.duration = 6.0;
        self
    }

    // -----------------------------------------------------------------------
    // Scenario 3: Full session
    // -----------------------------------------------------------------------
    fn full_session(mut self) -> Self {
        let progress = self.progress_path(&[
            (0.0, 1),
            (1.0, 1),
            (1.5, 2),
            (5.0, 2),
            (5.5, 3),
            (9.0, 3),
            (10.0, 5),
        ]);
        self.markers.push(progress);
        self.add_parameter_markers(&[0.9, 0.2], 2.0);

        let site = self.site_position(0);
        let selection = ScriptedMarker::tangible(
            2,
            SELECTION_MARKER,
            site,
            0.0,
            MarkerMotion::Segmented {
                segments: vec![
                    (0.0, Box::new(MarkerMotion::Static)),
                    (6.5, Box::new(MarkerMotion::Rotate { omega: 2.0 })),
                    (7.5, Box::new(MarkerMotion::Static)),
                ],
            },
        )
        .between(6.0, 8.5);
        self.markers.push(selection);
        self.duration = 12.0;
        self
    }

    // -----------------------------------------------------------------------
    // Scenario 4: Cursor taps
    // -----------------------------------------------------------------------
    fn cursor_taps(mut self) -> Self {
        let surface = self.setup.surface();
        for n in 1..=self.setup.config.interaction.step_count {
            if let Some(center) = surface.normalized_center(&format!("step{n}")) {
                let t = 0.5 * f64::from(n);
                self.markers
                    .push(ScriptedMarker::finger(100 + i64::from(n), center).between(t, t + 0.2));
            }
        }
        let mut drag = ScriptedMarker::finger(200, (0.3, 0.5)).between(3.0, 3.8);
        drag.motion = MarkerMotion::Linear { vx: 0.5, vy: 0.0 };
        self.markers.push(drag);
        self.packet_sim.profiles = vec![tuio_models::Profile::Cursor2D];
        self.duration = 4.0;
        self
    }

    // -----------------------------------------------------------------------
    // Packet stream
    // -----------------------------------------------------------------------

    /// Frame times `0, dt, 2·dt, …` up to the duration.
    pub fn frame_times(&self) -> impl Iterator<Item = f64> + '_ {
        let frames = (self.duration / self.frame_dt).round() as u64;
        (0..=frames).map(move |k| k as f64 * self.frame_dt)
    }

    /// Step the markers through the scenario and collect the tracker output.
    pub fn generate_packets(&self) -> Vec<TuioPacket> {
        let mut markers = self.markers.clone();
        let mut sim = PacketSimulator::new(self.packet_sim.clone(), self.seed);
        let mut packets = Vec::new();
        for (k, t) in self.frame_times().enumerate() {
            if k > 0 {
                for marker in &mut markers {
                    marker.step(t, self.frame_dt);
                }
            }
            packets.extend(sim.generate_frame(&markers, t));
        }
        tracing::debug!(
            scenario = %self.name,
            frames = sim.frame_id(),
            packets = packets.len(),
            "packet stream generated"
        );
        packets
    }

    // -----------------------------------------------------------------------
    // Placement helpers
    // -----------------------------------------------------------------------

    /// Window position of the center of grid site `index`.
    pub fn site_position(&self, index: usize) -> (f64, f64) {
        let [x, y] = self.grid.center(index);
        self.setup.window_position(x, y)
    }

    /// Window position of the center of button `step{n}`.
    pub fn step_position(&self, n: u8) -> (f64, f64) {
        self.setup
            .surface()
            .normalized_center(&format!("step{n}"))
            .unwrap_or((0.05, 0.5))
    }

    /// Progress marker moved by hand between step buttons; `(t, step)` stops.
    fn progress_path(&self, stops: &[(f64, u8)]) -> ScriptedMarker {
        let waypoints: Vec<[f64; 3]> = stops
            .iter()
            .map(|&(t, n)| {
                let (x, y) = self.step_position(n);
                [t, x, y]
            })
            .collect();
        let start = waypoints.first().map_or((0.05, 0.1), |w| (w[1], w[2]));
        ScriptedMarker::tangible(1, PROGRESS_MARKER, start, 0.0, MarkerMotion::Waypoints { waypoints })
    }

    /// One parameter marker per weight, in criterion order. Each is placed at
    /// `from`, turned from weight 0 to its weight in 1.5 s, then lifted.
    fn add_parameter_markers(&mut self, weights: &[f64], from: f64) {
        let criteria = self.setup.config.search_criteria.clone();
        for (i, (criterion, &weight)) in criteria.iter().zip(weights).enumerate() {
            let appear = from + 0.3 * i as f64;
            let turn_at = appear + 0.5;
            let omega = weight * PI / 1.5;
            let marker = ScriptedMarker::tangible(
                10 + i as i64,
                criterion.marker_id,
                (0.4 + 0.15 * i as f64, 0.5),
                PI / 2.0,
                MarkerMotion::Segmented {
                    segments: vec![
                        (0.0, Box::new(MarkerMotion::Static)),
                        (turn_at, Box::new(MarkerMotion::Rotate { omega })),
                        (turn_at + 1.5, Box::new(MarkerMotion::Static)),
                    ],
                },
            )
            .between(appear, turn_at + 2.0);
            self.markers.push(marker);
        }
    }
}

fn kind_name(kind: ScenarioKind) -> &'static str {
    match kind {
        ScenarioKind::CriteriaSweep => "criteria_sweep",
        ScenarioKind::LockGesture => "lock_gesture",
        ScenarioKind::FullSession => "full_session",
        ScenarioKind::CursorTaps => "cursor_taps",
    }
}

/// Map view around the grid with room on the left for the step bar.
fn grid_view(grid: &SiteGrid) -> Extent {
    let e = grid.extent();
    let margin_x = e.width() * 0.25;
    let margin_y = e.height() * 0.25;
    Extent::new(
        e.min.x - margin_x,
        e.min.y - margin_y,
        e.max.x + margin_x,
        e.max.y + margin_y,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
