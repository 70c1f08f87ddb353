//! `sim` — Scenario simulator: scripted markers, TUIO packet streams, replay.

pub mod marker;
pub mod packet_sim;
pub mod replay;
pub mod scenarios;
pub mod setup;
pub mod sites;

pub use marker::{MarkerBody, MarkerMotion, ScriptedMarker};
pub use packet_sim::{PacketSimConfig, PacketSimulator};
pub use replay::{load_replay, save_replay, ReplayLog};
pub use scenarios::{Scenario, ScenarioKind};
pub use setup::{KioskSetup, RunReport};
pub use sites::{generate_sites, SiteGrid};
