//! Replay: serialize/deserialize packet logs for offline analysis & re-runs.

use crate::{scenarios::Scenario, setup::KioskSetup};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tuio_models::TuioPacket;

/// A full recorded session: the kiosk it ran against and the packets it saw.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub frame_dt: f64,
    pub setup: KioskSetup,
    /// All packets in arrival order, duplicates included
    pub packets: Vec<TuioPacket>,
}

impl ReplayLog {
    pub fn record(scenario: &Scenario, packets: Vec<TuioPacket>) -> Self {
        Self {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            frame_dt: scenario.frame_dt,
            setup: scenario.setup.clone(),
            packets,
        }
    }
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioKind;

    #[test]
    fn replay_reproduces_the_run() {
        let scenario = Scenario::build(ScenarioKind::LockGesture, 5);
        let packets = scenario.generate_packets();
        let live = scenario.setup.run(&packets).unwrap();

        let path = std::env::temp_dir().join(format!("kiosk-replay-{}.json", std::process::id()));
        save_replay(&ReplayLog::record(&scenario, packets), &path).unwrap();
        let log = load_replay(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(log.scenario_name, "lock_gesture");
        assert_eq!(log.setup.config, scenario.setup.config);
        let replayed = log.setup.run(&log.packets).unwrap();
        assert_eq!(replayed.step, live.step);
        assert_eq!(replayed.locked, live.locked);
        assert_eq!(replayed.metrics.packets, live.metrics.packets);
        assert_eq!(replayed.sync_messages, live.sync_messages);
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_replay(Path::new("/nonexistent/replay.json")).is_err());
    }
}
