//! Board session context: polling, result cache, redraw gating and input
//!
//! [`Board`] owns every piece of mutable state the device has (tracked
//! drivers, cached results, UI flags, navigation state) together with its
//! collaborators. Everything runs on one cooperative task.
//!
//! ## Poll cycle
//!
//! ```text
//! ensure_link ──fail──► all "no result" ─────────────┐
//!      │                                              ▼
//!      └─► for each slot in order:              compare with last
//!            button held? ──yes──► stop,        rendered snapshot
//!            keep the press for handle_input     ──differs──► render
//!            fetch latest lap ──fail──► "no result"
//! ```
//!
//! A cycle interrupted by input keeps the results it already fetched; the
//! slots it never reached keep their previous values.

use tracing::{debug, info, trace, warn};

use crate::config::{BoardConfig, StandingsKind};
use crate::display::{Display, Screen, Tone};
use crate::feeds::{fetch_event_info, fetch_latest_lap, fetch_standings, fetch_top_drivers};
use crate::format::build_lap_rows;
use crate::input::{Button, Buttons, Clock, poll_press, wait_for_release};
use crate::nav::{NavAction, NavContext, NavigationState};
use crate::roster::{picker_label, selectable_drivers};
use crate::source::Transport;
use crate::types::{DriverNumber, EventInfoSnapshot, FormattedRow, LapResult, ResultSnapshot, TrackedKeySet};
use crate::{BoardError, Result};


/// What [`Board::handle_input`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// A press was serviced
    pub consumed: bool,
    /// The result cache changed as a consequence
    pub cache_updated: bool,
}

/// Home screen content currently on the display.
#[derive(Debug, Clone, PartialEq)]
struct RenderedHome {
    slots: TrackedKeySet,
    snapshot: ResultSnapshot,
    info: Option<EventInfoSnapshot>,
    tone: Tone,
}

/// The device session: state plus collaborators.
pub struct Board<T, D, B, C> {
    config: BoardConfig,
    transport: T,
    display: D,
    buttons: B,
    clock: C,
    tracked: TrackedKeySet,
    cache: ResultSnapshot,
    /// At least one poll cycle has completed
    live: bool,
    /// The last poll cycle found the link down
    link_down: bool,
    rendered: Option<RenderedHome>,
    event_info: EventInfoSnapshot,
    show_event_info: bool,
    nav: NavigationState,
    standings: Vec<FormattedRow>,
    universe: Vec<DriverNumber>,
    pending_press: Option<Button>,
    cycles: u64,
}

impl<T, D, B, C> Board<T, D, B, C>
where
    T: Transport,
    D: Display,
    B: Buttons,
    C: Clock,
{
    /// Build a board tracking the configured default drivers.
    pub fn new(config: BoardConfig, transport: T, display: D, buttons: B, clock: C) -> Result<Self> {
        config.validate()?;
        let tracked = TrackedKeySet::new(config.default_tracked.clone());
        let cache = ResultSnapshot::no_results(&tracked);
        let universe = selectable_drivers(&config.roster);
        let show_event_info = config.show_event_info;
        Ok(Self {
            config,
            transport,
            display,
            buttons,
            clock,
            tracked,
            cache,
            live: false,
            link_down: false,
            rendered: None,
            event_info: EventInfoSnapshot::default(),
            show_event_info,
            nav: NavigationState::Home,
            standings: Vec::new(),
            universe,
            pending_press: None,
            cycles: 0,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn tracked(&self) -> &TrackedKeySet {
        &self.tracked
    }

    /// Latest known result per tracked driver.
    pub fn cache(&self) -> &ResultSnapshot {
        &self.cache
    }

    pub fn navigation(&self) -> NavigationState {
        self.nav
    }

    pub fn event_info(&self) -> &EventInfoSnapshot {
        &self.event_info
    }

    pub fn show_event_info(&self) -> bool {
        self.show_event_info
    }

    /// Rows of the standings table last fetched.
    pub fn standings(&self) -> &[FormattedRow] {
        &self.standings
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Choose the tracked drivers from the latest session and load event info.
    pub async fn startup(&mut self) {
        self.show(&Screen::message(["Booting...", "Fetching session"], Tone::Waiting));

        let drivers = fetch_top_drivers(&mut self.transport, &self.config, self.config.tracked_count).await;
        if !self.tracked.reseed(&drivers) {
            warn!(?drivers, "Ranking did not fill every slot, keeping defaults");
        }
        self.cache = self.cache.restricted_to(&self.tracked);

        fetch_event_info(&mut self.transport, &self.config, &mut self.event_info).await;
        info!(tracked = ?self.tracked.as_slice(), event = %self.event_info.event_name, "Board started");
    }

    /// Run forever: poll on the home screen, service input everywhere.
    pub async fn run(&mut self) {
        self.startup().await;
        loop {
            self.step().await;
        }
    }

    /// One loop iteration: a poll cycle when on the home screen, then one poll
    /// interval of input probing. Each serviced press restarts the interval.
    pub async fn step(&mut self) {
        if self.nav.is_home() {
            self.run_poll_cycle().await;
        }

        let probes = self.config.idle_polls_per_interval();
        let mut remaining = probes;
        while remaining > 0 {
            if self.handle_input().await.consumed {
                remaining = probes;
                continue;
            }
            self.clock.sleep(self.config.button_poll()).await;
            remaining -= 1;
        }
    }

    /// Fetch every tracked driver's latest lap in slot order.
    ///
    /// A held button stops the cycle before the next fetch; the press is kept
    /// for [`handle_input`](Self::handle_input) and nothing is drawn.
    pub async fn run_poll_cycle(&mut self) -> ResultSnapshot {
        if let Err(e) = self.transport.ensure_link().await {
            warn!(error = %e, "Link down, cycle has no results");
            self.link_down = true;
            self.commit(ResultSnapshot::no_results(&self.tracked));
            self.redraw_home_if_changed();
            return self.cache.clone();
        }

        self.link_down = false;
        let mut snapshot = self.cache.restricted_to(&self.tracked);
        let slots: Vec<DriverNumber> = self.tracked.as_slice().to_vec();
        let mut fetched = 0usize;
        let mut interrupted = false;

        for (slot, &driver) in slots.iter().enumerate() {
            if let Some(button) = poll_press(&self.buttons) {
                info!(?button, slot, skipped = slots.len() - slot, "Input during poll cycle, stopping early");
                self.pending_press = Some(button);
                interrupted = true;
                break;
            }
            snapshot.set(driver, self.fetch_lap(driver).await);
            fetched += 1;
        }

        self.commit(snapshot);
        debug!(fetched, cycle = self.cycles, "Poll cycle complete");

        if !interrupted {
            self.cycles += 1;
            let every = u64::from(self.config.event_info_refresh_cycles);
            if every > 0 && self.cycles % every == 0 {
                fetch_event_info(&mut self.transport, &self.config, &mut self.event_info).await;
            }
            self.redraw_home_if_changed();
        }
        self.cache.clone()
    }

    /// Service one press: a press left by an interrupted cycle first, then
    /// the buttons. Blocks until release afterwards.
    pub async fn handle_input(&mut self) -> InputOutcome {
        let Some(button) = self.pending_press.take().or_else(|| poll_press(&self.buttons)) else {
            return InputOutcome::default();
        };

        let cache_updated = self.dispatch(button).await;
        wait_for_release(
            &self.buttons,
            &self.clock,
            self.config.button_release_poll(),
            self.config.button_release_debounce(),
        )
        .await;
        InputOutcome { consumed: true, cache_updated }
    }

    /// Track `driver` in `slot` and fetch its result right away.
    ///
    /// Returns false, changing nothing, when `slot` does not exist. Other
    /// slots and their cached results are untouched.
    pub async fn select_key(&mut self, driver: DriverNumber, slot: usize) -> bool {
        if !self.tracked.replace(slot, driver) {
            warn!(slot, driver, slots = self.tracked.len(), "No such slot");
            return false;
        }
        self.cache = self.cache.restricted_to(&self.tracked);
        self.refresh_slot(slot).await;
        true
    }

    async fn refresh_slot(&mut self, slot: usize) {
        let Some(driver) = self.tracked.get(slot) else {
            return;
        };
        let result = self.fetch_lap(driver).await;
        let mut snapshot = self.cache.clone();
        snapshot.set(driver, result);
        self.commit(snapshot);
        self.redraw_home_if_changed();
    }

    async fn dispatch(&mut self, button: Button) -> bool {
        let ctx = NavContext {
            universe: &self.universe,
            slots: self.tracked.len(),
            list_len: self.standings.len(),
            visible_rows: self.config.visible_rows,
        };
        let (next, action) = self.nav.on_press(button, &ctx);
        self.nav = next;

        match action {
            NavAction::None => false,
            NavAction::Redraw => {
                self.render_current();
                false
            }
            NavAction::ToggleInfo => {
                self.show_event_info = !self.show_event_info;
                info!(visible = self.show_event_info, "Event info toggled");
                self.render_home();
                false
            }
            NavAction::OpenList(kind) => {
                self.open_list(kind).await;
                false
            }
            NavAction::ReplaceSlot { slot, driver } => {
                let before = self.cache.clone();
                if !self.select_key(driver, slot).await {
                    self.render_home();
                }
                before != self.cache
            }
            NavAction::ReturnHome => {
                self.render_home();
                false
            }
        }
    }

    async fn open_list(&mut self, kind: StandingsKind) {
        self.show(&Screen::message(["Loading...", kind.title()], Tone::Waiting));

        let attempts = self.config.alloc_retries.max(1);
        let mut attempt = 0;
        self.standings = loop {
            attempt += 1;
            match fetch_standings(&mut self.transport, &self.config, kind).await {
                Ok(rows) => break rows,
                Err(e @ BoardError::ResourceExhausted { .. }) if attempt < attempts => {
                    warn!(?kind, attempt, error = %e, "Standings fetch ran out of memory, retrying");
                    self.reclaim();
                }
                Err(e) => {
                    warn!(?kind, error = %e, "Standings unavailable");
                    break Vec::new();
                }
            }
        };
        self.render_current();
    }

    /// Latest lap for one driver, or `None` on any failure.
    async fn fetch_lap(&mut self, driver: DriverNumber) -> Option<LapResult> {
        let attempts = self.config.alloc_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match fetch_latest_lap(&mut self.transport, &self.config, driver).await {
                Ok(result) => return Some(result),
                Err(e @ BoardError::ResourceExhausted { .. }) if attempt < attempts => {
                    warn!(driver, attempt, error = %e, "Lap fetch ran out of memory, retrying");
                    self.reclaim();
                }
                Err(e) => {
                    debug!(driver, error = %e, "No lap result");
                    return None;
                }
            }
        }
    }

    /// Drop spare capacity before retrying a fetch that ran out of memory.
    fn reclaim(&mut self) {
        if !matches!(self.nav, NavigationState::ShowList { .. }) {
            self.standings = Vec::new();
        }
        self.standings.shrink_to_fit();
        self.universe.shrink_to_fit();
        trace!("Reclaimed buffers");
    }

    fn commit(&mut self, snapshot: ResultSnapshot) {
        self.cache = snapshot;
        self.live = true;
    }

    fn home_tone(&self) -> Tone {
        if self.link_down {
            Tone::Alert
        } else if self.live {
            Tone::Live
        } else {
            Tone::Waiting
        }
    }

    fn home_state(&self) -> RenderedHome {
        RenderedHome {
            slots: self.tracked.clone(),
            snapshot: self.cache.clone(),
            info: self.show_event_info.then(|| self.event_info.clone()),
            tone: self.home_tone(),
        }
    }

    /// Draw the home screen only when it would differ from the last frame.
    fn redraw_home_if_changed(&mut self) -> bool {
        if !self.nav.is_home() {
            return false;
        }
        let current = self.home_state();
        if self.rendered.as_ref() == Some(&current) {
            trace!("Home unchanged, skipping redraw");
            return false;
        }
        self.render_home();
        true
    }

    fn render_home(&mut self) {
        let rows = build_lap_rows(&self.tracked, &self.cache, &self.config.roster);
        let info = if self.show_event_info {
            self.event_info.lines().into_iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };
        let tone = self.home_tone();
        self.display.render(&Screen::Home { rows, info, tone });

        if self.live {
            self.rendered = Some(self.home_state());
        }
    }

    fn render_current(&mut self) {
        let screen = match self.nav {
            NavigationState::Home => {
                self.render_home();
                return;
            }
            NavigationState::PickNewKey { cursor, window } => Screen::Picker {
                title: "Pick driver".to_string(),
                items: self.universe.iter().map(|&driver| picker_label(&self.config.roster, driver)).collect(),
                cursor,
                window,
            },
            NavigationState::PickReplacedSlot { cursor, window, .. } => Screen::Picker {
                title: "Replace who?".to_string(),
                items: self.tracked.iter().map(|driver| picker_label(&self.config.roster, driver)).collect(),
                cursor,
                window,
            },
            NavigationState::ShowList { kind, window } => {
                Screen::List { title: kind.title().to_string(), rows: self.standings.clone(), window }
            }
        };
        self.show(&screen);
    }

    /// Draw a screen that covers the home frame.
    fn show(&mut self, screen: &Screen) {
        self.rendered = None;
        self.display.render(screen);
    }
}
