//! Button probes, clocks and edge-triggered press detection
//!
//! Buttons are level probes ("is this held right now"). A press is acted on
//! once, after which [`wait_for_release`] blocks until every button is up and
//! a debounce has elapsed, so one physical press never reads as several.
//! Sleeping goes through [`Clock`] so tests can run on virtual time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// The four front-panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    X,
    Y,
}

impl Button {
    /// Probe order; the first held button wins when several are down.
    pub const PRIORITY: [Button; 4] = [Button::A, Button::X, Button::Y, Button::B];
}

/// Level probes for the four buttons.
pub trait Buttons: Send {
    fn is_pressed(&self, button: Button) -> bool;

    fn any_pressed(&self) -> bool {
        Button::PRIORITY.iter().any(|&button| self.is_pressed(button))
    }
}

/// Source of delays.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock delays on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait::async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The highest-priority held button, if any.
pub fn poll_press(buttons: &dyn Buttons) -> Option<Button> {
    Button::PRIORITY.into_iter().find(|&button| buttons.is_pressed(button))
}

/// Block until all buttons are released, then wait out `debounce`.
pub async fn wait_for_release(buttons: &dyn Buttons, clock: &dyn Clock, poll: Duration, debounce: Duration) {
    let mut probes = 0u32;
    while buttons.any_pressed() {
        probes += 1;
        clock.sleep(poll).await;
    }
    if !debounce.is_zero() {
        clock.sleep(debounce).await;
    }
    trace!(probes, "Buttons released");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedButtons, VirtualClock};

    struct Held(Vec<Button>);

    impl Buttons for Held {
        fn is_pressed(&self, button: Button) -> bool {
            self.0.contains(&button)
        }
    }

    #[test]
    fn priority_order() {
        assert_eq!(poll_press(&Held(vec![Button::B, Button::Y])), Some(Button::Y));
        assert_eq!(poll_press(&Held(vec![Button::B, Button::A])), Some(Button::A));
        assert_eq!(poll_press(&Held(vec![])), None);
    }

    #[tokio::test]
    async fn release_waits_then_debounces() {
        let buttons = ScriptedButtons::new();
        buttons.press(Button::X);
        let clock = VirtualClock::new();

        assert_eq!(poll_press(&buttons), Some(Button::X));
        wait_for_release(&buttons, &clock, Duration::from_millis(10), Duration::from_millis(30)).await;

        assert_eq!(clock.elapsed(), Duration::from_millis(40));
        assert!(!buttons.any_pressed());
    }

    #[tokio::test]
    async fn released_buttons_only_debounce() {
        let clock = VirtualClock::new();
        wait_for_release(&Held(vec![]), &clock, Duration::from_millis(10), Duration::from_millis(30)).await;
        assert_eq!(clock.elapsed(), Duration::from_millis(30));
        assert_eq!(clock.sleep_count(), 1);
    }
}
