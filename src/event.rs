use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::monitor::{RunOutcome, RunSummary};

/// Frame rate the terminal is redrawn at.
pub const TICK_FPS: f64 = 30.0;

#[derive(Clone, Debug)]
pub enum Event {
    /// Redraw heartbeat, roughly [`TICK_FPS`] times per second.
    Tick,
    /// Raw terminal input.
    Crossterm(crossterm::event::Event),
    /// Application-level events, including everything the sampling task
    /// reports back to the foreground.
    App(AppEvent),
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Quit,
    Reload,
    StartRun,
    CancelRun,
    ClearHistory,
    /// One successful sample was appended to the active run's buffers.
    SampleTick { elapsed: u32, duration_secs: u32 },
    /// A run reached a terminal state and produced its summary.
    RunFinished {
        id: Uuid,
        summary: RunSummary,
        outcome: RunOutcome,
    },
    /// The history list was appended to or cleared; carries the new length.
    HistoryChanged(usize),
}

/// Terminal events and app events multiplexed onto one channel, drained by
/// the foreground loop. Background tasks get a sender via
/// [`EventHandler::clone_sender`] and never touch the UI directly.
pub struct EventHandler {
    sender: UnboundedSender<Event>,
    receiver: UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = EventTask::new(sender.clone());
        tokio::spawn(async move { task.run().await });
        Self { sender, receiver }
    }

    /// Next event, in arrival order. Errors only when every sender is gone.
    pub async fn next(&mut self) -> Result<Event> {
        self.receiver.recv().await.ok_or_eyre("event channel closed")
    }

    /// Queue an app event from the foreground itself.
    pub fn send(&mut self, app_event: AppEvent) {
        let _ = self.sender.send(Event::App(app_event));
    }

    pub fn clone_sender(&self) -> UnboundedSender<Event> {
        self.sender.clone()
    }
}

struct EventTask {
    sender: UnboundedSender<Event>,
}

impl EventTask {
    fn new(sender: UnboundedSender<Event>) -> Self {
        Self { sender }
    }

    /// Pump crossterm input and the redraw tick until the receiver is gone.
    async fn run(self) {
        let tick_rate = Duration::from_secs_f64(1.0 / TICK_FPS);
        let mut reader = crossterm::event::EventStream::new();
        let mut tick = tokio::time::interval(tick_rate);
        loop {
            let tick_delay = tick.tick();
            let crossterm_event = reader.next().fuse();
            tokio::select! {
                _ = self.sender.closed() => {
                    break;
                }
                _ = tick_delay => {
                    self.send(Event::Tick);
                }
                Some(Ok(evt)) = crossterm_event => {
                    self.send(Event::Crossterm(evt));
                }
            }
        }
    }

    fn send(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
