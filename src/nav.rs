//! Button-driven screen navigation
//!
//! Transitions are pure: [`NavigationState::on_press`] takes the current
//! state, a button and the lengths of whatever the screens are showing, and
//! returns the next state plus the side effect the board must carry out.
//!
//! ```text
//!            A                  B (driver)
//!   Home ────────► PickNewKey ────────────► PickReplacedSlot
//!    ▲ │ X/Y           │ A                     │ A / B (slot)
//!    │ ▼               ▼                       ▼
//!  ShowList ──A──►   Home                    Home
//! ```

use serde::Serialize;
use tracing::debug;

use crate::config::StandingsKind;
use crate::input::Button;
use crate::types::DriverNumber;

/// Current screen with its cursor and scroll origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationState {
    Home,
    /// Choosing a driver from the full roster
    PickNewKey { cursor: usize, window: usize },
    /// Choosing which tracked slot `chosen` replaces
    PickReplacedSlot { chosen: DriverNumber, cursor: usize, window: usize },
    /// Paging through a standings table; `window` is the first visible row
    ShowList { kind: StandingsKind, window: usize },
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavAction {
    /// Nothing changed
    None,
    /// Same screen, new cursor or window
    Redraw,
    /// Flip the home screen's event info visibility
    ToggleInfo,
    /// Fetch and show a standings table
    OpenList(StandingsKind),
    /// Put `driver` in `slot` and refresh it
    ReplaceSlot { slot: usize, driver: DriverNumber },
    /// Back to the cached home screen
    ReturnHome,
}

/// Lengths the transitions need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavContext<'a> {
    /// Every selectable driver, in picker order
    pub universe: &'a [DriverNumber],
    /// Tracked slot count
    pub slots: usize,
    /// Rows in the list being shown
    pub list_len: usize,
    /// Items visible below a title
    pub visible_rows: usize,
}

impl NavigationState {
    pub fn is_home(&self) -> bool {
        matches!(self, NavigationState::Home)
    }

    /// Apply one press.
    pub fn on_press(self, button: Button, ctx: &NavContext<'_>) -> (NavigationState, NavAction) {
        let (next, action) = match (self, button) {
            (NavigationState::Home, Button::A) => {
                (NavigationState::PickNewKey { cursor: 0, window: 0 }, NavAction::Redraw)
            }
            (NavigationState::Home, Button::B) => (NavigationState::Home, NavAction::ToggleInfo),
            (NavigationState::Home, Button::X) => open_list(StandingsKind::Drivers),
            (NavigationState::Home, Button::Y) => open_list(StandingsKind::Constructors),

            (NavigationState::PickNewKey { .. }, Button::A) => (NavigationState::Home, NavAction::ReturnHome),
            (NavigationState::PickNewKey { cursor, window }, Button::X | Button::Y) => {
                let (cursor, window) = step_cursor(cursor, window, button, ctx.universe.len(), ctx.visible_rows);
                (NavigationState::PickNewKey { cursor, window }, NavAction::Redraw)
            }
            (NavigationState::PickNewKey { cursor, window }, Button::B) => match ctx.universe.get(cursor) {
                Some(&chosen) => {
                    (NavigationState::PickReplacedSlot { chosen, cursor: 0, window: 0 }, NavAction::Redraw)
                }
                None => (NavigationState::PickNewKey { cursor, window }, NavAction::None),
            },

            (NavigationState::PickReplacedSlot { .. }, Button::A) => {
                (NavigationState::Home, NavAction::ReturnHome)
            }
            (NavigationState::PickReplacedSlot { chosen, cursor, window }, Button::X | Button::Y) => {
                let (cursor, window) = step_cursor(cursor, window, button, ctx.slots, ctx.visible_rows);
                (NavigationState::PickReplacedSlot { chosen, cursor, window }, NavAction::Redraw)
            }
            (NavigationState::PickReplacedSlot { chosen, cursor, window }, Button::B) => {
                if cursor < ctx.slots {
                    (NavigationState::Home, NavAction::ReplaceSlot { slot: cursor, driver: chosen })
                } else {
                    (NavigationState::PickReplacedSlot { chosen, cursor, window }, NavAction::None)
                }
            }

            (NavigationState::ShowList { .. }, Button::A) => (NavigationState::Home, NavAction::ReturnHome),
            (NavigationState::ShowList { kind, window }, Button::X | Button::Y) => {
                let window = page(window, button, ctx.list_len, ctx.visible_rows);
                (NavigationState::ShowList { kind, window }, NavAction::Redraw)
            }
            (state @ NavigationState::ShowList { .. }, Button::B) => (state, NavAction::None),
        };
        debug!(?button, from = ?self, to = ?next, ?action, "Navigation");
        (next, action)
    }
}

fn open_list(kind: StandingsKind) -> (NavigationState, NavAction) {
    (NavigationState::ShowList { kind, window: 0 }, NavAction::OpenList(kind))
}

/// Move a picker cursor one step (X up, Y down) with wraparound, keeping it
/// inside the visible window.
fn step_cursor(cursor: usize, window: usize, button: Button, len: usize, visible: usize) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }
    let cursor = match button {
        Button::X => (cursor + len - 1) % len,
        _ => (cursor + 1) % len,
    };
    let visible = visible.max(1);
    let window = if cursor < window {
        cursor
    } else if cursor >= window + visible {
        cursor + 1 - visible
    } else {
        window
    };
    (cursor, window)
}

/// Move a list window one full page (X back, Y forward), wrapping at either end.
fn page(window: usize, button: Button, len: usize, visible: usize) -> usize {
    let stride = visible.max(1);
    if len == 0 {
        return 0;
    }
    let last_page = (len - 1) / stride * stride;
    match button {
        Button::X if window == 0 => last_page,
        Button::X => window.saturating_sub(stride),
        _ if window + stride > last_page => 0,
        _ => window + stride,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIVERSE: &[DriverNumber] = &[1, 3, 5, 6, 10, 11, 12, 14, 16, 18];

    fn ctx(list_len: usize) -> NavContext<'static> {
        NavContext { universe: UNIVERSE, slots: 3, list_len, visible_rows: 7 }
    }

    #[test]
    fn home_transitions() {
        let home = NavigationState::Home;
        assert_eq!(
            home.on_press(Button::A, &ctx(0)),
            (NavigationState::PickNewKey { cursor: 0, window: 0 }, NavAction::Redraw)
        );
        assert_eq!(home.on_press(Button::B, &ctx(0)), (NavigationState::Home, NavAction::ToggleInfo));
        assert_eq!(
            home.on_press(Button::X, &ctx(0)),
            (
                NavigationState::ShowList { kind: StandingsKind::Drivers, window: 0 },
                NavAction::OpenList(StandingsKind::Drivers)
            )
        );
        assert_eq!(home.on_press(Button::Y, &ctx(0)).1, NavAction::OpenList(StandingsKind::Constructors));
    }

    #[test]
    fn picker_wraps_and_keeps_cursor_visible() {
        let state = NavigationState::PickNewKey { cursor: 0, window: 0 };
        let (state, _) = state.on_press(Button::X, &ctx(0));
        assert_eq!(state, NavigationState::PickNewKey { cursor: 9, window: 3 });

        let (state, _) = state.on_press(Button::Y, &ctx(0));
        assert_eq!(state, NavigationState::PickNewKey { cursor: 0, window: 0 });

        let mut state = state;
        for _ in 0..7 {
            state = state.on_press(Button::Y, &ctx(0)).0;
        }
        assert_eq!(state, NavigationState::PickNewKey { cursor: 7, window: 1 });
    }

    #[test]
    fn full_selection_flow() {
        let state = NavigationState::PickNewKey { cursor: 2, window: 0 };
        let (state, action) = state.on_press(Button::B, &ctx(0));
        assert_eq!(state, NavigationState::PickReplacedSlot { chosen: 5, cursor: 0, window: 0 });
        assert_eq!(action, NavAction::Redraw);

        let (state, _) = state.on_press(Button::Y, &ctx(0));
        let (state, action) = state.on_press(Button::B, &ctx(0));
        assert_eq!(state, NavigationState::Home);
        assert_eq!(action, NavAction::ReplaceSlot { slot: 1, driver: 5 });
    }

    #[test]
    fn cancel_returns_home_without_change() {
        let picking = NavigationState::PickReplacedSlot { chosen: 5, cursor: 2, window: 0 };
        assert_eq!(picking.on_press(Button::A, &ctx(0)), (NavigationState::Home, NavAction::ReturnHome));
        let choosing = NavigationState::PickNewKey { cursor: 4, window: 0 };
        assert_eq!(choosing.on_press(Button::A, &ctx(0)), (NavigationState::Home, NavAction::ReturnHome));
    }

    #[test]
    fn slot_cursor_wraps_over_tracked_slots() {
        let state = NavigationState::PickReplacedSlot { chosen: 5, cursor: 0, window: 0 };
        let (state, _) = state.on_press(Button::X, &ctx(0));
        assert_eq!(state, NavigationState::PickReplacedSlot { chosen: 5, cursor: 2, window: 0 });
    }

    #[test]
    fn list_pages_by_full_stride_and_wraps() {
        let list = |window| NavigationState::ShowList { kind: StandingsKind::Drivers, window };
        let c = ctx(10);

        assert_eq!(list(0).on_press(Button::Y, &c).0, list(7));
        assert_eq!(list(7).on_press(Button::Y, &c).0, list(0));
        assert_eq!(list(0).on_press(Button::X, &c).0, list(7));
        assert_eq!(list(7).on_press(Button::X, &c).0, list(0));
        assert_eq!(list(7).on_press(Button::A, &c), (NavigationState::Home, NavAction::ReturnHome));
        assert_eq!(list(7).on_press(Button::B, &c), (list(7), NavAction::None));
    }

    #[test]
    fn short_or_empty_lists_stay_on_first_page() {
        let list = |window| NavigationState::ShowList { kind: StandingsKind::Constructors, window };
        assert_eq!(list(0).on_press(Button::Y, &ctx(5)).0, list(0));
        assert_eq!(list(0).on_press(Button::X, &ctx(5)).0, list(0));
        assert_eq!(list(0).on_press(Button::Y, &ctx(0)).0, list(0));
    }
}
