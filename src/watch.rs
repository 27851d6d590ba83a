use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use anyhow::Context as _;
use tokio::time::MissedTickBehavior;

use crate::build::{self, BuildOptions};
use crate::cli::WatchArgs;

const MIN_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum GateState {
    #[default]
    Idle,
    Running,
    RunningWithPending,
}

/// Admits one rebuild at a time and remembers at most one more.
#[derive(Debug, Default)]
pub struct RebuildGate {
    state: Mutex<GateState>,
}

impl RebuildGate {
    /// Returns `true` when the caller should start a rebuild now. Otherwise a
    /// rebuild is already running and one follow-up is queued.
    pub fn request(&self) -> bool {
        let mut state = self.lock();
        match *state {
            GateState::Idle => {
                *state = GateState::Running;
                true
            }
            GateState::Running | GateState::RunningWithPending => {
                *state = GateState::RunningWithPending;
                false
            }
        }
    }

    /// Marks the running rebuild finished. Returns `true` when the queued
    /// rebuild should run next.
    pub fn finish(&self) -> bool {
        let mut state = self.lock();
        match *state {
            GateState::RunningWithPending => {
                *state = GateState::Running;
                true
            }
            GateState::Idle | GateState::Running => {
                *state = GateState::Idle;
                false
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        *self.lock() == GateState::Idle
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs rebuilds on the blocking pool, coalescing triggers that arrive while
/// one is in flight.
#[derive(Clone)]
pub struct RebuildQueue {
    gate: Arc<RebuildGate>,
    rebuild: Arc<dyn Fn() + Send + Sync>,
}

impl RebuildQueue {
    pub fn new(rebuild: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            gate: Arc::new(RebuildGate::default()),
            rebuild: Arc::new(rebuild),
        }
    }

    pub fn trigger(&self) {
        if !self.gate.request() {
            tracing::debug!("rebuild in flight; queued one more");
            return;
        }

        let gate = Arc::clone(&self.gate);
        let rebuild = Arc::clone(&self.rebuild);
        tokio::spawn(async move {
            loop {
                let rebuild = Arc::clone(&rebuild);
                if let Err(err) = tokio::task::spawn_blocking(move || rebuild()).await {
                    tracing::error!(?err, "rebuild task failed");
                }
                if !gate.finish() {
                    break;
                }
            }
        });
    }

    pub fn is_idle(&self) -> bool {
        self.gate.is_idle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub file: String,
    pub kind: ChangeKind,
}

/// Modification times of the watched files in the content directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSnapshot {
    files: BTreeMap<String, SystemTime>,
}

impl ContentSnapshot {
    pub fn scan(content_dir: &Path) -> anyhow::Result<Self> {
        let mut files = BTreeMap::new();
        if !content_dir.is_dir() {
            return Ok(Self { files });
        }

        for entry in std::fs::read_dir(content_dir)
            .with_context(|| format!("read content dir: {}", content_dir.display()))?
        {
            let entry = entry.context("read content dir entry")?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !is_watched(&name) {
                continue;
            }
            let metadata = entry
                .metadata()
                .with_context(|| format!("stat content file: {}", entry.path().display()))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.insert(name, modified);
        }

        Ok(Self { files })
    }

    pub fn changes(&self, next: &ContentSnapshot) -> Vec<Change> {
        let mut changes = Vec::new();
        for (file, modified) in &next.files {
            let kind = match self.files.get(file) {
                None => ChangeKind::Added,
                Some(prev) if prev != modified => ChangeKind::Modified,
                Some(_) => continue,
            };
            changes.push(Change {
                file: file.clone(),
                kind,
            });
        }
        for file in self.files.keys() {
            if !next.files.contains_key(file) {
                changes.push(Change {
                    file: file.clone(),
                    kind: ChangeKind::Removed,
                });
            }
        }
        changes
    }
}

fn is_watched(name: &str) -> bool {
    !name.starts_with('.') && (name.ends_with(".md") || name.ends_with("-config.json"))
}

pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let config = Arc::new(args.site.load()?);
    let interval = Duration::from_millis(args.interval_ms.max(MIN_INTERVAL_MS));

    let queue = RebuildQueue::new({
        let config = Arc::clone(&config);
        move || match build::build_site(&config, &BuildOptions { from_backup: true }) {
            Ok(report) if report.all_succeeded() => {
                tracing::info!("website updated");
            }
            Ok(report) => {
                tracing::warn!(
                    updated = report.updated(),
                    total = report.total(),
                    "website partially updated"
                );
            }
            Err(err) => {
                tracing::error!("website update failed: {err:#}");
            }
        }
    });

    let mut snapshot = ContentSnapshot::scan(&config.content_dir)?;
    tracing::info!(
        dir = %config.content_dir.display(),
        files = snapshot.files.len(),
        "watching content directory"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("stopping watcher");
                break;
            }
            _ = ticker.tick() => {
                let next = match ContentSnapshot::scan(&config.content_dir) {
                    Ok(next) => next,
                    Err(err) => {
                        tracing::warn!("scan content dir: {err:#}");
                        continue;
                    }
                };
                let changes = snapshot.changes(&next);
                for change in &changes {
                    tracing::info!(file = %change.file, kind = ?change.kind, "detected change");
                }
                if !changes.is_empty() {
                    queue.trigger();
                }
                snapshot = next;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn gate_queues_one_pending_rebuild() {
        let gate = RebuildGate::default();
        assert!(gate.is_idle());

        assert!(gate.request());
        assert!(!gate.request());
        assert!(!gate.request());
        assert!(!gate.is_idle());

        assert!(gate.finish());
        assert!(!gate.is_idle());
        assert!(!gate.finish());
        assert!(gate.is_idle());
    }

    #[tokio::test]
    async fn queue_coalesces_triggers_during_rebuild() {
        let runs = Arc::new(AtomicUsize::new(0));
        let queue = RebuildQueue::new({
            let runs = Arc::clone(&runs);
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
            }
        });

        for _ in 0..5 {
            queue.trigger();
        }
        for _ in 0..200 {
            if queue.is_idle() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(queue.is_idle());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn snapshot_reports_added_modified_removed() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("events.md"), "# Events")?;
        std::fs::write(temp.path().join("notes.txt"), "ignored")?;
        let before = ContentSnapshot::scan(temp.path())?;
        assert_eq!(before.files.len(), 1);

        let mut after = before.clone();
        after
            .files
            .insert("events.md".to_owned(), SystemTime::UNIX_EPOCH);
        after
            .files
            .insert("officers-config.json".to_owned(), SystemTime::UNIX_EPOCH);
        let changes = before.changes(&after);
        assert_eq!(
            changes,
            vec![
                Change {
                    file: "events.md".to_owned(),
                    kind: ChangeKind::Modified
                },
                Change {
                    file: "officers-config.json".to_owned(),
                    kind: ChangeKind::Added
                },
            ]
        );

        let removed = after.changes(&ContentSnapshot::default());
        assert!(removed.iter().all(|c| c.kind == ChangeKind::Removed));
        assert_eq!(removed.len(), 2);
        Ok(())
    }

    #[test]
    fn scan_missing_dir_is_empty() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let snapshot = ContentSnapshot::scan(&temp.path().join("missing"))?;
        assert_eq!(snapshot, ContentSnapshot::default());
        Ok(())
    }

    #[test]
    fn watched_files() {
        assert!(is_watched("events.md"));
        assert!(is_watched("photos-config.json"));
        assert!(!is_watched("package.json"));
        assert!(!is_watched(".events.md.swp"));
        assert!(!is_watched(".hidden.md"));
    }
}
