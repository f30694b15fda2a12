use std::{fmt, future::Future, time::Duration};

use log::*;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::time::sleep;

use crate::{config::Target, monitor::sample::Usage};

/// How long a probe blocks per reading; CPU usage is measured over this
/// window, so it is also the tick length of the sampling loop.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Capability shared by everything that can be sampled.
pub trait Probe {
    /// Take one combined CPU/memory reading, blocking the caller for
    /// [`SAMPLE_INTERVAL`] while CPU usage is measured over that window.
    fn sample(&mut self) -> impl Future<Output = Result<Usage, SampleError>> + Send;
}

#[derive(Debug)]
pub enum SampleError {
    /// The target exited or can no longer be read.
    TargetGone,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::TargetGone => write!(f, "target process exited or became inaccessible"),
        }
    }
}

impl std::error::Error for SampleError {}

#[derive(Debug)]
pub enum ResolveError {
    /// The label is not in the configured target table.
    UnknownSelector(String),
    /// No live process matched the configured image name.
    NotFound { label: String, image: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownSelector(label) => write!(f, "unknown target {label:?}"),
            ResolveError::NotFound { label, image } => {
                write!(f, "no running process {image:?} for target {label:?}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// A resolved, live sampling target. Owned by exactly one run at a time;
/// each handle carries its own [`System`] so the background task never
/// shares OS state with the foreground.
pub enum TargetHandle {
    /// A single OS process, identified at resolve time. Gone is gone: the
    /// pid is never re-resolved mid-run.
    PerProcess { pid: Pid, sys: System },
    /// The whole machine. Never fails.
    SystemWide { sys: System },
}

impl Probe for TargetHandle {
    async fn sample(&mut self) -> Result<Usage, SampleError> {
        debug_assert!(SAMPLE_INTERVAL >= sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        match self {
            TargetHandle::PerProcess { pid, sys } => sample_process(sys, *pid).await,
            TargetHandle::SystemWide { sys } => sample_system(sys).await,
        }
    }
}

fn refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing().with_cpu().with_memory()
}

async fn sample_process(sys: &mut System, pid: Pid) -> Result<Usage, SampleError> {
    let targets = [pid];
    if sys.refresh_processes_specifics(ProcessesToUpdate::Some(&targets), true, refresh_kind()) == 0
    {
        return Err(SampleError::TargetGone);
    }
    sleep(SAMPLE_INTERVAL).await;
    if sys.refresh_processes_specifics(ProcessesToUpdate::Some(&targets), true, refresh_kind()) == 0
    {
        return Err(SampleError::TargetGone);
    }
    let info = sys.process(pid).ok_or(SampleError::TargetGone)?;
    Ok(Usage {
        cpu_percent: info.cpu_usage(),
        memory_mb: info.memory() as f32 / 1_000_000.0,
    })
}

async fn sample_system(sys: &mut System) -> Result<Usage, SampleError> {
    sys.refresh_cpu_usage();
    sleep(SAMPLE_INTERVAL).await;
    sys.refresh_cpu_usage();
    sys.refresh_memory();
    Ok(Usage {
        cpu_percent: sys.global_cpu_usage(),
        memory_mb: sys.used_memory() as f32 / 1_000_000.0,
    })
}

/// Map a target label to a live handle. The system sentinel never scans the
/// process table; named targets scan once and take the first process whose
/// image name matches ignoring ASCII case.
pub fn resolve(targets: &[Target], label: &str) -> Result<TargetHandle, ResolveError> {
    let target = targets
        .iter()
        .find(|t| t.label == label)
        .ok_or_else(|| ResolveError::UnknownSelector(label.to_string()))?;
    let Some(image) = target.image.as_deref() else {
        return Ok(TargetHandle::SystemWide { sys: System::new() });
    };

    let mut sys = System::new();
    let seen = sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind());
    debug!(target: "Monitor", "Scanned {} processes looking for {:?}", seen, image);
    // TODO: offer a choice when several live processes share the image name
    let pid = sys
        .processes()
        .iter()
        .find(|(_, info)| info.name().eq_ignore_ascii_case(image))
        .map(|(pid, _)| *pid);
    match pid {
        Some(pid) => Ok(TargetHandle::PerProcess { pid, sys }),
        None => Err(ResolveError::NotFound {
            label: target.label.clone(),
            image: image.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Target> {
        vec![
            Target {
                label: "System".to_string(),
                image: None,
            },
            Target {
                label: "Ghost".to_string(),
                image: Some("no-such-image-promon-test.exe".to_string()),
            },
        ]
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(matches!(
            resolve(&table(), "Spreadsheet"),
            Err(ResolveError::UnknownSelector(_))
        ));
    }

    #[test]
    fn empty_label_is_rejected() {
        assert!(matches!(
            resolve(&table(), ""),
            Err(ResolveError::UnknownSelector(_))
        ));
    }

    #[test]
    fn system_sentinel_resolves_without_a_scan() {
        assert!(matches!(
            resolve(&table(), "System"),
            Ok(TargetHandle::SystemWide { .. })
        ));
    }

    #[test]
    fn missing_image_reports_not_found() {
        match resolve(&table(), "Ghost") {
            Err(ResolveError::NotFound { label, image }) => {
                assert_eq!(label, "Ghost");
                assert_eq!(image, "no-such-image-promon-test.exe");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("resolved an image that should not exist"),
        }
    }
}
