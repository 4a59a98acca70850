//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop
//!
//! Multiplexes every input source the console reacts to into one ordered
//! stream of [`LoopEvent`]s:
//! - terminal input from crossterm's async [`EventStream`]
//! - completion actions queued by background tasks
//! - a periodic animation tick
//! - the shutdown notification
//!
//! The loop owns no application state. `main` drains it and feeds each event
//! through the keymap and the action dispatcher.

use crate::controller::actions::Action;
use crossterm::event::{Event as TermEvent, EventStream};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace, warn};

/// Interval between animation ticks.
///
/// Drives spinner frames while a lookup or transfer is in flight. Kept well
/// under the typeahead timeout so in-flight feedback never looks frozen.
const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// One occurrence the main loop must react to.
#[derive(Debug)]
pub enum LoopEvent {
    /// Raw terminal input (keys, resize).
    Input(TermEvent),

    /// Action queued by a background task or the dispatcher itself.
    Action(Action),

    /// Periodic animation tick.
    Tick,

    /// Shutdown requested via signal or quit action.
    Shutdown,
}

/// Single source of events for the application.
pub struct EventLoop {
    events: EventStream,
    action_rx: UnboundedReceiver<Action>,
    shutdown: Arc<Notify>,
    tick: Interval,
}

impl EventLoop {
    pub fn new(action_rx: UnboundedReceiver<Action>, shutdown: Arc<Notify>) -> Self {
        debug!("Initializing event loop");
        let mut tick = interval(TICK_INTERVAL);
        // Animation frames may be dropped under load; never replayed.
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            events: EventStream::new(),
            action_rx,
            shutdown,
            tick,
        }
    }

    /// Wait for the next event from any source.
    ///
    /// A closed terminal stream is treated as a shutdown request so the
    /// application never spins on a dead input source.
    pub async fn next_event(&mut self) -> LoopEvent {
        tokio::select! {
            () = self.shutdown.notified() => {
                info!("Shutdown notification received");
                LoopEvent::Shutdown
            }

            maybe_event = self.events.next() => match maybe_event {
                Some(Ok(event)) => {
                    trace!("Terminal event received: {:?}", event);
                    LoopEvent::Input(event)
                }
                Some(Err(err)) => {
                    warn!("Terminal event stream error: {}", err);
                    LoopEvent::Tick
                }
                None => {
                    info!("Terminal event stream closed");
                    LoopEvent::Shutdown
                }
            },

            Some(action) = self.action_rx.recv() => {
                debug!("Queued action received: {:?}", action);
                LoopEvent::Action(action)
            }

            _ = self.tick.tick() => LoopEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    /// Drains events until `pred` matches, bounded so a regression fails fast
    /// instead of hanging the test runner.
    async fn wait_for(event_loop: &mut EventLoop, pred: impl Fn(&LoopEvent) -> bool) -> bool {
        for _ in 0..50 {
            if pred(&event_loop.next_event().await) {
                return true;
            }
        }
        false
    }

    #[tokio::test]
    async fn test_queued_actions_are_delivered() {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let mut event_loop = EventLoop::new(action_rx, Arc::new(Notify::new()));

        action_tx
            .send(Action::Quit)
            .expect("receiver held by event loop");

        let found = wait_for(&mut event_loop, |event| {
            matches!(event, LoopEvent::Action(Action::Quit))
        })
        .await;
        assert!(found, "queued action never surfaced");
    }

    #[tokio::test]
    async fn test_shutdown_notification_surfaces() {
        let (_action_tx, action_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(Notify::new());
        let mut event_loop = EventLoop::new(action_rx, Arc::clone(&shutdown));

        // notify_one stores a permit, so notifying before the first poll is safe.
        shutdown.notify_one();

        let found = wait_for(&mut event_loop, |event| {
            matches!(event, LoopEvent::Shutdown)
        })
        .await;
        assert!(found, "shutdown never surfaced");
    }
}
