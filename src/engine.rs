//! Simulation engine and its loop thread
//!
//! The engine owns all mutable game state. It consumes commands from a FIFO
//! channel, ticks the simulation at a fixed wall-clock interval, and emits
//! periodic snapshots, log lines, and autosaves on the event channel. Nothing
//! here blocks on the presentation side: a send to a hung-up presenter is
//! simply dropped.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{Bounds, SimConfig};
use crate::consts::INIT_SPAWN;
use crate::persistence::{self, SAVE_KEY};
use crate::platform::{Clock, Storage};
use crate::protocol::{Command, Event, Snapshot};
use crate::sim::particle::ParticleArena;
use crate::sim::state::{GameState, LogEntry};
use crate::sim::{commands, step};

/// Command channel and thread handle returned by [`SimulationEngine::spawn`]
pub struct EngineHandle {
    pub commands: Sender<Command>,
    thread: JoinHandle<()>,
}

impl EngineHandle {
    /// Ask the engine to stop and wait for the thread to finish
    pub fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        let _ = self.thread.join();
    }
}

/// Owns the game state and runs the fixed-interval tick loop.
///
/// Engines are plain values: tests construct several in isolation and drive
/// them synchronously through [`handle_command`](Self::handle_command) and
/// [`tick`](Self::tick) without any thread.
pub struct SimulationEngine {
    cfg: SimConfig,
    state: GameState,
    arena: ParticleArena,
    rng: Pcg32,
    bounds: Bounds,
    clock: Box<dyn Clock>,
    storage: Box<dyn Storage>,
    events: Sender<Event>,
    time_scale: f64,
    running: bool,
    last_tick_ms: f64,
    last_snapshot_ms: f64,
    last_autosave_ms: f64,
}

impl SimulationEngine {
    pub fn new(
        cfg: SimConfig,
        storage: Box<dyn Storage>,
        clock: Box<dyn Clock>,
        events: Sender<Event>,
        seed: u64,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            arena: ParticleArena::new(cfg.max_particles),
            state: GameState::new(seed),
            rng: Pcg32::seed_from_u64(seed),
            bounds: Bounds::default(),
            clock,
            storage,
            events,
            time_scale: 1.0,
            running: false,
            last_tick_ms: now,
            last_snapshot_ms: now,
            last_autosave_ms: now,
            cfg,
        }
    }

    /// Start the engine on its own thread; the receiver carries its events
    pub fn spawn(
        cfg: SimConfig,
        storage: Box<dyn Storage>,
        clock: Box<dyn Clock>,
        seed: u64,
    ) -> (EngineHandle, Receiver<Event>) {
        let (cmd_tx, cmd_rx) = channel();
        let (evt_tx, evt_rx) = channel();
        let tick_ms = cfg.tick_interval_ms;
        let engine = SimulationEngine::new(cfg, storage, clock, evt_tx, seed);
        let thread = std::thread::Builder::new()
            .name("simulation".into())
            .spawn(move || engine.run(cmd_rx, tick_ms))
            .expect("spawn simulation thread");
        (
            EngineHandle {
                commands: cmd_tx,
                thread,
            },
            evt_rx,
        )
    }

    fn run(mut self, rx: Receiver<Command>, tick_ms: u64) {
        log::info!("simulation loop started");
        loop {
            loop {
                match rx.try_recv() {
                    Ok(cmd) => {
                        if !self.handle_command(cmd) {
                            log::info!("simulation loop stopped");
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    // Presenter went away; nothing left to simulate for
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            self.tick();
            std::thread::sleep(Duration::from_millis(tick_ms));
        }
    }

    /// Apply one command. Returns false when the engine should stop.
    pub fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Init { width, height } => self.init(width, height),
            Command::Start {
                width,
                height,
                time_scale,
            } => {
                self.bounds = Bounds::new(width, height);
                self.time_scale = time_scale;
                self.running = true;
                self.last_tick_ms = self.clock.now_ms();
            }
            Command::Resize { width, height } => {
                // Existing particle positions are left untouched
                self.bounds = Bounds::new(width, height);
            }
            Command::SetTimeScale { value } => self.time_scale = value,
            Command::Click => {
                let now = self.clock.now_ms();
                commands::click(
                    &mut self.state,
                    &mut self.arena,
                    &mut self.rng,
                    self.bounds,
                    now,
                );
            }
            Command::Buy { key } => commands::buy(&mut self.state, key, self.bounds),
            Command::Ad { kind } => {
                let now = self.clock.now_ms();
                commands::watch_ad(
                    &mut self.state,
                    &mut self.arena,
                    &mut self.rng,
                    kind,
                    self.bounds,
                    now,
                );
            }
            Command::Prestige => {
                commands::prestige(&mut self.state, &mut self.arena);
                self.autosave();
            }
            Command::Save => self.save(),
            Command::LoadData { blob } => self.load_blob(&blob),
            Command::Wipe => self.wipe(),
            Command::Shutdown => return false,
        }
        self.drain_log();
        true
    }

    /// One pass of the loop body: integrate if running, then emit
    /// snapshot/autosave on their wall-clock cadences.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        if self.running {
            let raw_dt = ((now - self.last_tick_ms) / 1000.0).clamp(0.0, self.cfg.max_dt);
            let dt = raw_dt * self.time_scale;
            step(
                &mut self.state,
                &mut self.arena,
                &mut self.rng,
                &self.cfg,
                self.bounds,
                now,
                dt,
            );
            self.drain_log();
        }
        self.last_tick_ms = now;

        if now - self.last_snapshot_ms >= self.cfg.snapshot_interval_ms {
            self.last_snapshot_ms = now;
            let snapshot = Snapshot::capture(&self.state, &self.arena, &self.cfg, now);
            let _ = self.events.send(Event::State(snapshot));
        }
        if self.running && now - self.last_autosave_ms >= self.cfg.autosave_interval_ms {
            self.last_autosave_ms = now;
            self.autosave();
        }
    }

    fn init(&mut self, width: f32, height: f32) {
        self.bounds = Bounds::new(width, height);
        if let Some(saved) = self
            .storage
            .get(SAVE_KEY)
            .and_then(|blob| persistence::decode(&blob))
        {
            self.rng = Pcg32::seed_from_u64(saved.seed);
            self.state = saved;
            self.state.log.push(LogEntry::important("Save loaded."));
        } else {
            self.state.log.push(LogEntry::new(
                "Welcome to Cosmic Crunch. Mash the Singularity to form planets!",
            ));
            self.state.log.push(LogEntry::new(
                "Particles will orbit and combine to form planets when enough share an orbit.",
            ));
        }
        commands::spawn_center_particles(
            &mut self.arena,
            &mut self.rng,
            INIT_SPAWN,
            self.bounds.center(),
            self.state.current_orbit,
        );
    }

    fn save(&mut self) {
        if let Some(blob) = persistence::encode(&self.state) {
            self.storage.set(SAVE_KEY, &blob);
            let _ = self.events.send(Event::File {
                name: format!("{SAVE_KEY}.json"),
                blob,
            });
            self.state.log.push(LogEntry::new("Game saved."));
        }
    }

    fn autosave(&mut self) {
        if let Some(blob) = persistence::encode(&self.state) {
            self.storage.set(SAVE_KEY, &blob);
            let _ = self.events.send(Event::Autosave { blob });
        }
    }

    fn load_blob(&mut self, blob: &str) {
        match persistence::decode(blob) {
            Some(saved) => {
                self.rng = Pcg32::seed_from_u64(saved.seed);
                self.state = saved;
                self.state.log.push(LogEntry::important("Save loaded."));
            }
            None => self.state.log.push(LogEntry::new("No save found.")),
        }
    }

    fn wipe(&mut self) {
        self.storage.remove(SAVE_KEY);
        let seed = self.state.seed;
        self.state = GameState::new(seed);
        self.rng = Pcg32::seed_from_u64(seed);
        self.arena.clear();
        self.state.log.push(LogEntry::new("Save wiped."));
    }

    fn drain_log(&mut self) {
        for entry in self.state.log.drain(..) {
            let _ = self.events.send(Event::Log {
                message: entry.message,
                important: entry.important,
            });
        }
    }

    /// Read-only state access for synchronous tests
    #[cfg(test)]
    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn arena(&self) -> &ParticleArena {
        &self.arena
    }
}
