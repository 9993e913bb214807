//! Test fixtures: feed builders and in-memory collaborators
//!
//! Everything here runs without a network, a screen or real time. Feeds are
//! built as JSON text in the shapes the live APIs return; the collaborators
//! record what the board did with them.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::{TryReserveError, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::{Value, json};

use crate::display::{Display, Screen};
use crate::input::{Button, Buttons, Clock};
use crate::source::{ByteSource, Transport};
use crate::sources::MemoryTransport;
use crate::types::DriverNumber;
use crate::{BoardError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Lap feed for one driver, oldest lap first. `None` entries are laps without
/// a recorded duration (out laps, the lap in progress).
pub fn lap_feed(driver: DriverNumber, durations: &[Option<f64>]) -> String {
    let laps: Vec<Value> = durations
        .iter()
        .enumerate()
        .map(|(index, duration)| {
            json!({
                "meeting_key": 1256,
                "session_key": 9998,
                "driver_number": driver,
                "lap_number": index + 1,
                "lap_duration": duration,
                "is_pit_out_lap": index == 0,
                "segments_sector_1": [2049, 2049, 2051],
                "date_start": format!("2025-05-25T13:{:02}:00", index % 60),
            })
        })
        .collect();
    Value::Array(laps).to_string()
}

fn standings_document(array_key: &str, entries: Vec<Value>) -> String {
    let mut list = json!({"season": "2025", "round": "8"});
    list[array_key] = Value::Array(entries.clone());
    json!({
        "MRData": {
            "xmlns": "",
            "series": "f1",
            "limit": "30",
            "total": entries.len().to_string(),
            "StandingsTable": {
                "season": "2025",
                "round": "8",
                "StandingsLists": [list]
            }
        }
    })
    .to_string()
}

/// Driver standings in championship order, one entry per code.
pub fn driver_standings_document(codes: &[&str]) -> String {
    let entries = codes
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let position = index + 1;
            let wins = if index == 0 { "3" } else { "0" };
            json!({
                "position": position.to_string(),
                "positionText": position.to_string(),
                "points": ((codes.len() - index) * 12).to_string(),
                "wins": wins,
                "Driver": {
                    "driverId": code.to_lowercase(),
                    "code": code,
                    "familyName": format!("Driver {}", code),
                    "nationality": "Unknown",
                },
                "Constructors": [{"constructorId": "team", "name": "Team"}],
            })
        })
        .collect();
    standings_document("DriverStandings", entries)
}

/// Constructor standings in championship order.
pub fn constructor_standings_document(names: &[&str]) -> String {
    let entries = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let position = index + 1;
            json!({
                "position": position.to_string(),
                "positionText": position.to_string(),
                "points": ((names.len() - index) * 40).to_string(),
                "wins": "1",
                "Constructor": {"constructorId": name.to_lowercase(), "name": name, "nationality": "Unknown"},
            })
        })
        .collect();
    standings_document("ConstructorStandings", entries)
}

/// Driver standings with `count` generated entries listed in reverse
/// championship order, so every entry has to be ranked.
pub fn synthetic_driver_standings(count: usize) -> String {
    let codes: Vec<String> = (0..count).map(|i| format!("D{:03}", i)).collect();
    let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    let mut document: Value = serde_json::from_str(&driver_standings_document(&refs)).unwrap_or(Value::Null);
    if let Some(entries) = document
        .pointer_mut("/MRData/StandingsTable/StandingsLists/0/DriverStandings")
        .and_then(Value::as_array_mut)
    {
        entries.reverse();
    }
    document.to_string()
}

/// A `TryReserveError` obtained from a request no allocator can satisfy.
pub fn capacity_overflow() -> TryReserveError {
    match Vec::<u8>::new().try_reserve(usize::MAX) {
        Err(e) => e,
        Ok(()) => unreachable!("usize::MAX bytes cannot be reserved"),
    }
}

/// Transport whose first `failures` opens fail as if buffering ran out of
/// memory; later opens go to the wrapped [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct ExhaustingTransport {
    inner: MemoryTransport,
    failures: Arc<Mutex<usize>>,
}

impl ExhaustingTransport {
    pub fn new(inner: MemoryTransport, failures: usize) -> Self {
        Self { inner, failures: Arc::new(Mutex::new(failures)) }
    }

    pub fn remaining_failures(&self) -> usize {
        *lock(&self.failures)
    }
}

#[async_trait::async_trait]
impl Transport for ExhaustingTransport {
    async fn ensure_link(&mut self) -> Result<()> {
        self.inner.ensure_link().await
    }

    async fn open(&mut self, url: &str) -> Result<Box<dyn ByteSource>> {
        {
            let mut failures = lock(&self.failures);
            if *failures > 0 {
                *failures -= 1;
                return Err(BoardError::out_of_memory(format!("response from {}", url), capacity_overflow()));
            }
        }
        self.inner.open(url).await
    }
}

#[derive(Debug, Default)]
struct ClockState {
    elapsed: Duration,
    sleeps: usize,
}

/// Clock that only adds up requested delays.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    state: Arc<Mutex<ClockState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time slept.
    pub fn elapsed(&self) -> Duration {
        lock(&self.state).elapsed
    }

    pub fn sleep_count(&self) -> usize {
        lock(&self.state).sleeps
    }
}

#[async_trait::async_trait]
impl Clock for VirtualClock {
    async fn sleep(&self, duration: Duration) {
        let mut state = lock(&self.state);
        state.elapsed += duration;
        state.sleeps += 1;
    }
}

type Gate = Box<dyn Fn() -> bool + Send>;

#[derive(Default)]
struct ButtonScript {
    queued: VecDeque<(Button, Option<Gate>)>,
    held: Option<(Button, u8)>,
    /// A full probe round with nothing held has happened since the last release
    armed: bool,
}

impl ButtonScript {
    fn promote(&mut self) {
        if self.held.is_some() || !self.armed {
            return;
        }
        let ready = match self.queued.front() {
            Some((_, Some(gate))) => gate(),
            Some((_, None)) => true,
            None => false,
        };
        if ready {
            // Seen once by the press probe and once by the release wait
            self.held = self.queued.pop_front().map(|(button, _)| (button, 2));
        }
    }
}

/// Scripted presses, replayed one at a time.
///
/// A press is held for two reads of its button: the probe that detects it and
/// the first check of the release wait. The next press is not offered until a
/// full round of probes has seen every button up.
#[derive(Clone)]
pub struct ScriptedButtons {
    script: Arc<Mutex<ButtonScript>>,
}

impl Default for ScriptedButtons {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedButtons {
    pub fn new() -> Self {
        let script = ButtonScript { armed: true, ..Default::default() };
        Self { script: Arc::new(Mutex::new(script)) }
    }

    /// Queue a press available immediately.
    pub fn press(&self, button: Button) {
        lock(&self.script).queued.push_back((button, None));
    }

    /// Queue a press that only goes down once `gate` returns true.
    pub fn press_when(&self, button: Button, gate: impl Fn() -> bool + Send + 'static) {
        lock(&self.script).queued.push_back((button, Some(Box::new(gate))));
    }

    /// Queue a press that goes down once `transport` has seen `requests` requests.
    pub fn press_after_requests(&self, button: Button, transport: &MemoryTransport, requests: usize) {
        let transport = transport.clone();
        self.press_when(button, move || transport.request_count() >= requests);
    }

    /// Presses not yet delivered.
    pub fn pending(&self) -> usize {
        let script = lock(&self.script);
        script.queued.len() + usize::from(script.held.is_some())
    }
}

impl Buttons for ScriptedButtons {
    fn is_pressed(&self, button: Button) -> bool {
        let mut script = lock(&self.script);
        script.promote();
        match script.held {
            Some((held, reads)) if held == button => {
                if reads > 1 {
                    script.held = Some((held, reads - 1));
                } else {
                    script.held = None;
                    script.armed = false;
                }
                true
            }
            None => {
                // Last button of a probe round
                if button == Button::B {
                    script.armed = true;
                }
                false
            }
            Some(_) => false,
        }
    }
}

/// Display that keeps every frame it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    frames: Vec<Screen>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Screen] {
        &self.frames
    }

    pub fn render_count(&self) -> usize {
        self.frames.len()
    }

    pub fn home_render_count(&self) -> usize {
        self.frames.iter().filter(|frame| matches!(frame, Screen::Home { .. })).count()
    }

    pub fn last(&self) -> Option<&Screen> {
        self.frames.last()
    }
}

impl Display for RecordingDisplay {
    fn render(&mut self, screen: &Screen) {
        self.frames.push(screen.clone());
    }
}
