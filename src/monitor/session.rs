use std::sync::{Arc, Mutex};

use color_eyre::eyre::{Result, eyre};
use log::*;
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use uuid::Uuid;

use crate::{
    config::Target,
    event::{AppEvent, Event},
    monitor::{
        sample::Sample,
        summary::summarize,
        target::{Probe, SampleError, resolve},
    },
};

/// Lifecycle of a single sampling run. Idle is the absence of a run; a run
/// is created `Running` and ends in exactly one terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Finished(RunOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every requested tick was collected.
    Completed,
    /// The user stopped the run early.
    Cancelled,
    /// The target disappeared or stopped being readable mid-run.
    Lost,
}

/// Owns the (at most one) active sampling run and the target table used to
/// resolve new ones. Lives on the foreground; all sampling happens on a
/// spawned task that reports back through the event channel.
#[derive(Debug)]
pub struct Monitor {
    targets: Vec<Target>,
    active: Option<ActiveRun>,
    sender: UnboundedSender<Event>,
}

#[derive(Debug)]
struct ActiveRun {
    id: Uuid,
    shared: Arc<RunShared>,
    closer: Option<oneshot::Receiver<()>>,
}

/// Buffers shared between the sampling task (sole writer) and the UI
/// (readers via [`RunShared::snapshot`]).
#[derive(Debug)]
pub struct RunShared {
    label: String,
    duration_secs: u32,
    inner: Mutex<RunInner>,
}

#[derive(Debug)]
struct RunInner {
    state: RunState,
    samples: Vec<Sample>,
}

impl RunShared {
    fn new(label: String, duration_secs: u32) -> Self {
        Self {
            label,
            duration_secs,
            inner: Mutex::new(RunInner {
                state: RunState::Running,
                samples: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> RunState {
        self.inner.lock().unwrap().state
    }

    fn push(&self, sample: Sample) {
        self.inner.lock().unwrap().samples.push(sample);
    }

    fn finish(&self, outcome: RunOutcome) {
        self.inner.lock().unwrap().state = RunState::Finished(outcome);
    }

    /// Copy-on-read view for display and finalization. Cloning keeps readers
    /// from ever observing a partially appended buffer.
    pub fn snapshot(&self) -> RunSnapshot {
        let inner = self.inner.lock().unwrap();
        RunSnapshot {
            label: self.label.clone(),
            duration_secs: self.duration_secs,
            state: inner.state,
            samples: inner.samples.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub label: String,
    pub duration_secs: u32,
    pub state: RunState,
    pub samples: Vec<Sample>,
}

impl RunSnapshot {
    pub fn elapsed(&self) -> u32 {
        self.samples.len() as u32
    }

    pub fn progress(&self) -> f64 {
        (self.elapsed() as f64 / self.duration_secs.max(1) as f64).clamp(0.0, 1.0)
    }
}

impl Monitor {
    pub fn new(sender: UnboundedSender<Event>) -> Self {
        Self {
            targets: Vec::new(),
            active: None,
            sender,
        }
    }

    pub fn set_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets;
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| run.shared.state() == RunState::Running)
    }

    pub fn snapshot(&self) -> Option<RunSnapshot> {
        self.active.as_ref().map(|run| run.shared.snapshot())
    }

    /// Resolve the label and kick off a sampling run on a background task.
    /// Rejected outright while another run is in flight; the active run's
    /// buffers are never touched by a failed start.
    pub fn start(&mut self, label: &str, duration_secs: u32) -> Result<Uuid> {
        if self.is_running() {
            return Err(eyre!("a sampling run is already in progress"));
        }
        if duration_secs == 0 {
            return Err(eyre!("duration must be a positive number of seconds"));
        }
        let handle = resolve(&self.targets, label)?;
        let id = Uuid::new_v4();
        let shared = Arc::new(RunShared::new(label.to_string(), duration_secs));
        let (closed, closer) = oneshot::channel();
        tokio::spawn(run_session(
            id,
            handle,
            shared.clone(),
            closed,
            self.sender.clone(),
        ));
        self.active = Some(ActiveRun {
            id,
            shared,
            closer: Some(closer),
        });
        info!(target: "Monitor", "Run {} started: {} for {}s", id, label, duration_secs);
        Ok(id)
    }

    /// Ask the active run to stop. Takes effect within one sample interval;
    /// a no-op when nothing is running.
    pub fn cancel(&mut self) {
        if let Some(run) = self.active.as_mut() {
            if run.shared.state() == RunState::Running && run.closer.is_some() {
                info!(target: "Monitor", "Cancelling run {}", run.id);
                drop(run.closer.take());
            }
        }
    }
}

/// The sampling loop. Single writer of `shared`; stops on loop exhaustion,
/// cancellation (the foreground dropping its end of `cancelled`), or target
/// loss, then finalizes exactly once.
async fn run_session<P>(
    id: Uuid,
    mut probe: P,
    shared: Arc<RunShared>,
    mut cancelled: oneshot::Sender<()>,
    sender: UnboundedSender<Event>,
) where
    P: Probe + Send,
{
    let duration_secs = shared.duration_secs;
    let mut outcome = RunOutcome::Completed;
    for tick in 0..duration_secs {
        tokio::select! {
            _ = cancelled.closed() => {
                outcome = RunOutcome::Cancelled;
                break;
            }
            reading = probe.sample() => match reading {
                Ok(usage) => {
                    let sample = Sample::new(tick, usage);
                    debug!(
                        target: "Monitor",
                        "Run {} tick {}: {:.1}% cpu, {:.1} MB", id, sample.tick, sample.cpu_percent, sample.memory_mb
                    );
                    shared.push(sample);
                    let _ = sender.send(Event::App(AppEvent::SampleTick {
                        elapsed: tick + 1,
                        duration_secs,
                    }));
                }
                Err(SampleError::TargetGone) => {
                    warn!(target: "Monitor", "Run {} lost its target after {} samples", id, tick);
                    outcome = RunOutcome::Lost;
                    break;
                }
            }
        }
    }
    shared.finish(outcome);
    let snapshot = shared.snapshot();
    let summary = summarize(&snapshot.label, snapshot.duration_secs, &snapshot.samples);
    info!(target: "Monitor", "Run {} finished ({:?}): {}", id, outcome, summary);
    let _ = sender.send(Event::App(AppEvent::RunFinished {
        id,
        summary,
        outcome,
    }));
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use tokio::sync::mpsc;

    use super::*;
    use crate::monitor::{sample::Usage, summary::RunSummary};

    struct ScriptedProbe {
        script: VecDeque<Result<Usage, SampleError>>,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Result<Usage, SampleError>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl Probe for ScriptedProbe {
        async fn sample(&mut self) -> Result<Usage, SampleError> {
            match self.script.pop_front() {
                Some(reading) => reading,
                // An exhausted script hangs, like a probe mid-measurement.
                None => std::future::pending().await,
            }
        }
    }

    fn ok(cpu: f32, mem: f32) -> Result<Usage, SampleError> {
        Ok(Usage {
            cpu_percent: cpu,
            memory_mb: mem,
        })
    }

    async fn drain_until_finished(
        receiver: &mut mpsc::UnboundedReceiver<Event>,
    ) -> (RunSummary, RunOutcome, u32) {
        let mut ticks = 0;
        loop {
            match receiver.recv().await.expect("event channel closed early") {
                Event::App(AppEvent::SampleTick { .. }) => ticks += 1,
                Event::App(AppEvent::RunFinished {
                    summary, outcome, ..
                }) => return (summary, outcome, ticks),
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn completed_run_has_exactly_duration_samples() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(RunShared::new("Editor".to_string(), 5));
        let (closed, _closer) = oneshot::channel();
        let probe = ScriptedProbe::new((0..5).map(|i| ok(10.0 * i as f32, 100.0)).collect());

        run_session(Uuid::new_v4(), probe, shared.clone(), closed, sender).await;

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.samples.len(), 5);
        assert_eq!(snapshot.elapsed(), 5);
        assert_eq!(snapshot.state, RunState::Finished(RunOutcome::Completed));
        let (summary, outcome, ticks) = drain_until_finished(&mut receiver).await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(ticks, 5);
        assert_eq!(summary.duration_secs, 5);
        assert!((summary.mean_cpu_percent - 20.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn run_is_lost_when_the_target_disappears() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(RunShared::new("Editor".to_string(), 10));
        let (closed, _closer) = oneshot::channel();
        let probe = ScriptedProbe::new(vec![
            ok(10.0, 100.0),
            ok(20.0, 200.0),
            ok(30.0, 300.0),
            Err(SampleError::TargetGone),
        ]);

        run_session(Uuid::new_v4(), probe, shared.clone(), closed, sender).await;

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.samples.len(), 3);
        assert_eq!(snapshot.state, RunState::Finished(RunOutcome::Lost));
        let (summary, outcome, _) = drain_until_finished(&mut receiver).await;
        assert_eq!(outcome, RunOutcome::Lost);
        assert!((summary.mean_cpu_percent - 20.0).abs() < 1e-4);
        assert!((summary.mean_memory_mb - 200.0).abs() < 1e-4);
        assert_eq!(summary.duration_secs, 10);
    }

    #[tokio::test]
    async fn cancel_stops_the_run_with_a_partial_summary() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(RunShared::new("Editor".to_string(), 10));
        let (closed, closer) = oneshot::channel();
        let probe = ScriptedProbe::new(vec![ok(40.0, 400.0), ok(60.0, 600.0)]);
        let task = tokio::spawn(run_session(
            Uuid::new_v4(),
            probe,
            shared.clone(),
            closed,
            sender,
        ));

        let mut seen = 0;
        while seen < 2 {
            if let Event::App(AppEvent::SampleTick { .. }) =
                receiver.recv().await.expect("event channel closed early")
            {
                seen += 1;
            }
        }
        drop(closer);

        let (summary, outcome, _) = drain_until_finished(&mut receiver).await;
        assert_eq!(outcome, RunOutcome::Cancelled);
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.state, RunState::Finished(RunOutcome::Cancelled));
        assert_eq!(snapshot.samples.len(), 2);
        assert!((summary.mean_cpu_percent - 50.0).abs() < 1e-4);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_running() {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let mut monitor = Monitor::new(sender);
        monitor.set_targets(vec![Target {
            label: "System".to_string(),
            image: None,
        }]);

        monitor.start("System", 3).unwrap();
        assert!(monitor.is_running());
        let before = monitor.snapshot().unwrap();

        let err = monitor.start("System", 3).unwrap_err();
        assert!(err.to_string().contains("already in progress"));
        assert!(monitor.is_running());
        assert_eq!(
            monitor.snapshot().unwrap().samples.len(),
            before.samples.len()
        );
        monitor.cancel();
    }

    #[tokio::test]
    async fn start_rejects_unknown_targets_and_zero_durations() {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let mut monitor = Monitor::new(sender);
        monitor.set_targets(vec![Target {
            label: "System".to_string(),
            image: None,
        }]);

        assert!(monitor.start("Nonexistent", 5).is_err());
        assert!(monitor.start("System", 0).is_err());
        assert!(!monitor.is_running());
        assert!(monitor.snapshot().is_none());
    }
}
