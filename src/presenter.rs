//! Presentation-side adapter
//!
//! Holds a read-only mirror of the latest snapshot and forwards player
//! intents to the engine. The mirror is replaced wholesale by every incoming
//! snapshot; it is never merged or diffed against the previous one, and it
//! owns no simulation truth.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use crate::protocol::{AdKind, Command, Event, Snapshot, UpgradeKey};

/// A player-facing log line kept by the adapter
#[derive(Debug, Clone)]
pub struct ViewLogLine {
    pub message: String,
    pub important: bool,
}

/// Read-only mirror of engine state, rebuilt from snapshots
#[derive(Debug, Default)]
pub struct View {
    pub snapshot: Option<Snapshot>,
    pub log: Vec<ViewLogLine>,
    /// Blob from the most recent save or autosave
    pub last_save: Option<String>,
}

/// Forwards intents to the engine and mirrors its event stream
pub struct PresentationAdapter {
    commands: Sender<Command>,
    events: Receiver<Event>,
    view: View,
}

impl PresentationAdapter {
    pub fn new(commands: Sender<Command>, events: Receiver<Event>) -> Self {
        Self {
            commands,
            events,
            view: View::default(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Drain pending events into the view. Returns false once the engine
    /// side has hung up.
    pub fn pump(&mut self) -> bool {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            // Full replacement, per the snapshot contract
            Event::State(snapshot) => self.view.snapshot = Some(snapshot),
            Event::Log { message, important } => {
                self.view.log.push(ViewLogLine { message, important });
            }
            Event::Autosave { blob } => self.view.last_save = Some(blob),
            Event::File { blob, .. } => self.view.last_save = Some(blob),
        }
    }

    // Intents; all fire-and-forget
    pub fn init(&self, width: f32, height: f32) {
        let _ = self.commands.send(Command::Init { width, height });
    }

    pub fn start(&self, width: f32, height: f32, time_scale: f64) {
        let _ = self.commands.send(Command::Start {
            width,
            height,
            time_scale,
        });
    }

    pub fn resize(&self, width: f32, height: f32) {
        let _ = self.commands.send(Command::Resize { width, height });
    }

    pub fn set_time_scale(&self, value: f64) {
        let _ = self.commands.send(Command::SetTimeScale { value });
    }

    pub fn click(&self) {
        let _ = self.commands.send(Command::Click);
    }

    pub fn buy(&self, key: UpgradeKey) {
        let _ = self.commands.send(Command::Buy { key });
    }

    pub fn watch_ad(&self, kind: AdKind) {
        let _ = self.commands.send(Command::Ad { kind });
    }

    pub fn save(&self) {
        let _ = self.commands.send(Command::Save);
    }

    pub fn load(&self, blob: String) {
        let _ = self.commands.send(Command::LoadData { blob });
    }

    pub fn wipe(&self) {
        let _ = self.commands.send(Command::Wipe);
    }

    pub fn prestige(&self) {
        let _ = self.commands.send(Command::Prestige);
    }

    /// Stats panel rendering of the current mirror
    pub fn stats_lines(&self) -> Vec<String> {
        let Some(s) = &self.view.snapshot else {
            return vec!["Awaiting first snapshot...".to_string()];
        };
        vec![
            format!("Particles: {}", s.particle_count.floor() as i64),
            format!("Total Mass: {}", s.total_mass.floor() as i64),
            format!("Objects: {}", s.celestials.len()),
            format!("Live Particles: {}", s.live_particles),
            format!("Planets Formed: {}/8", s.planets_formed()),
            format!("Clicks: {}", s.total_clicks),
            format!("P/click: {:.2}", s.particles_per_click),
            format!("Base P/s: {:.2}", s.base_pps),
            format!("Effective P/s: {:.2}", s.production_rate),
            format!(
                "Gravity Lv: {} | Strong Lv: {}",
                s.gravity_level, s.strong_gravity_level
            ),
            format!(
                "Star Formation: {} | Planetary Formation: {}",
                if s.star_formation_unlocked { "Yes" } else { "No" },
                if s.planetary_system_unlocked { "Yes" } else { "No" },
            ),
            format!("Dark Matter: {}", s.dark_matter.floor() as i64),
            format!("Age: {}s", s.universe_age.floor() as i64),
            format!("Prestiges: {}", s.prestige_count),
        ]
    }

    /// Planet progress panel rendering
    pub fn planet_lines(&self) -> Vec<String> {
        let Some(s) = &self.view.snapshot else {
            return Vec::new();
        };
        s.planets
            .iter()
            .map(|p| {
                if p.formed {
                    format!("{}: Formed", p.planet.name())
                } else {
                    format!("{}: {}/{}", p.planet.name(), p.in_orbit, p.required)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::particle::ParticleArena;
    use crate::sim::state::GameState;
    use std::sync::mpsc::channel;

    fn adapter() -> (PresentationAdapter, Receiver<Command>, Sender<Event>) {
        let (cmd_tx, cmd_rx) = channel();
        let (evt_tx, evt_rx) = channel();
        (PresentationAdapter::new(cmd_tx, evt_rx), cmd_rx, evt_tx)
    }

    fn snapshot_with_clicks(clicks: u64) -> Snapshot {
        let mut state = GameState::new(1);
        state.total_clicks = clicks;
        let arena = ParticleArena::new(8);
        Snapshot::capture(&state, &arena, &SimConfig::default(), 0.0)
    }

    #[test]
    fn test_snapshot_replaces_mirror_wholesale() {
        let (mut adapter, _cmds, events) = adapter();
        events.send(Event::State(snapshot_with_clicks(1))).unwrap();
        events.send(Event::State(snapshot_with_clicks(2))).unwrap();
        assert!(adapter.pump());
        // Only the latest snapshot survives; nothing is merged
        assert_eq!(adapter.view().snapshot.as_ref().unwrap().total_clicks, 2);
    }

    #[test]
    fn test_intents_forward_as_commands() {
        let (adapter, cmds, _events) = adapter();
        adapter.click();
        adapter.buy(UpgradeKey::StrongGravity);
        adapter.prestige();
        assert_eq!(cmds.try_recv().unwrap(), Command::Click);
        assert_eq!(
            cmds.try_recv().unwrap(),
            Command::Buy {
                key: UpgradeKey::StrongGravity
            }
        );
        assert_eq!(cmds.try_recv().unwrap(), Command::Prestige);
    }

    #[test]
    fn test_log_and_save_events_accumulate() {
        let (mut adapter, _cmds, events) = adapter();
        events
            .send(Event::Log {
                message: "Formed Mercury".into(),
                important: true,
            })
            .unwrap();
        events
            .send(Event::Autosave { blob: "{}".into() })
            .unwrap();
        adapter.pump();
        assert_eq!(adapter.view().log.len(), 1);
        assert!(adapter.view().log[0].important);
        assert_eq!(adapter.view().last_save.as_deref(), Some("{}"));
    }

    #[test]
    fn test_pump_reports_disconnect() {
        let (mut adapter, _cmds, events) = adapter();
        drop(events);
        assert!(!adapter.pump());
    }

    #[test]
    fn test_stats_lines_before_first_snapshot() {
        let (adapter, _cmds, _events) = adapter();
        assert_eq!(adapter.stats_lines().len(), 1);
    }
}
