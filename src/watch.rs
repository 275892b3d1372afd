//! File watcher: applies once on startup, then re-applies whenever the
//! document or its coverage records change.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::config::Config;
use crate::discovery;
use crate::error::Error;
use crate::overlay::{ApplyOutcome, Overlay};
use crate::render::Renderer;

/// Debounce delay between filesystem events and re-apply.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that signals on changes to any of `paths`.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    paths: Vec<PathBuf>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_watched(p, &paths))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Compare by file name. Only one directory is watched, non-recursively,
/// and notify reports absolute paths where the user may have passed a
/// relative one.
fn is_watched(event_path: &Path, paths: &[PathBuf]) -> bool {
    return paths.iter().any(|p| return p.file_name() == event_path.file_name());
}

/// Apply once and report a missing coverage file as a warning.
///
/// # Errors
///
/// Returns errors from reading the document or from the renderer.
fn apply_and_report<R: Renderer>(overlay: &mut Overlay<R>, document: &Path) -> Result<(), Error> {
    if let ApplyOutcome::Missing { coverage } = overlay.apply(document)? {
        eprintln!(
            "warning: no coverage records at {}, keeping previous overlay",
            coverage.display()
        );
    }
    return Ok(());
}

/// Re-apply once per burst of change signals until the sender hangs up.
/// Signals arriving within `debounce` of each other form one burst.
/// Returns the number of re-applies.
fn reapply_on_change<R: Renderer>(
    rx: &crossbeam_channel::Receiver<()>,
    overlay: &mut Overlay<R>,
    document: &Path,
    debounce: Duration,
) -> usize {
    let mut reapplied: usize = 0;
    while rx.recv().is_ok() {
        while rx.recv_timeout(debounce).is_ok() {}
        log::info!("change detected, re-applying {}", document.display());
        if let Err(e) = apply_and_report(overlay, document) {
            crate::diagnostics::print_error(&e);
        }
        reapplied = reapplied.saturating_add(1);
    }
    return reapplied;
}

/// Entry point for the watch command. Blocks until the watcher shuts down.
///
/// # Errors
///
/// Returns errors from the initial apply or from watcher setup.
pub fn run<R: Renderer>(document: &Path, config: Config, renderer: R) -> Result<(), Error> {
    let coverage = discovery::coverage_path(document, &config.suffix);
    let mut overlay = Overlay::new(renderer, config);

    apply_and_report(&mut overlay, document)?;

    let (tx, rx) = crossbeam_channel::unbounded();
    let watched = vec![document.to_path_buf(), coverage];
    let mut watcher = create_watcher(tx, watched)?;

    let dir = match document.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| return Error::WatchFailed { reason: format!("{}: {e}", dir.display()) })?;

    log::info!("watching {}, press Ctrl+C to stop", dir.display());

    reapply_on_change(&rx, &mut overlay, document, Duration::from_millis(DEBOUNCE_MS));
    return Ok(());
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::render::DecorationLayer;

    /// Send `bursts` groups of three signals, pausing well past the debounce
    /// between groups, then hang up.
    fn signal_bursts(tx: crossbeam_channel::Sender<()>, bursts: usize) -> thread::JoinHandle<()> {
        return thread::spawn(move || {
            for _ in 0..bursts {
                for _ in 0..3 {
                    tx.send(()).unwrap();
                }
                thread::sleep(Duration::from_millis(200));
            }
        });
    }

    #[test]
    fn reapplies_once_per_burst() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("f.lisp");
        std::fs::write(&doc, "(f x)").unwrap();
        std::fs::write(dir.path().join("f.lisp.cov"), "BRANCH:T,0,3\n").unwrap();

        let mut overlay = Overlay::new(DecorationLayer::default(), Config::default());
        let (tx, rx) = crossbeam_channel::unbounded();
        let sender = signal_bursts(tx, 2);

        let count = reapply_on_change(&rx, &mut overlay, &doc, Duration::from_millis(20));
        sender.join().unwrap();

        assert_eq!(count, 2);
        assert_eq!(overlay.renderer().decorations().len(), 1);
    }

    #[test]
    fn removed_coverage_keeps_decorations_across_reapply() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("f.lisp");
        let cov = dir.path().join("f.lisp.cov");
        std::fs::write(&doc, "(f x)").unwrap();
        std::fs::write(&cov, "BRANCH:T,0,3\nBRANCH:NIL,3,1\n").unwrap();

        let mut overlay = Overlay::new(DecorationLayer::default(), Config::default());
        overlay.apply(&doc).unwrap();
        std::fs::remove_file(&cov).unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        let sender = signal_bursts(tx, 1);

        let count = reapply_on_change(&rx, &mut overlay, &doc, Duration::from_millis(20));
        sender.join().unwrap();

        assert_eq!(count, 1);
        assert_eq!(overlay.renderer().decorations().len(), 2);
    }

    #[test]
    fn matches_relative_watch_paths_against_absolute_events() {
        let watched = vec![PathBuf::from("src/a.lisp"), PathBuf::from("src/a.lisp.cov")];
        assert!(is_watched(Path::new("/work/src/a.lisp.cov"), &watched));
        assert!(!is_watched(Path::new("/work/src/b.lisp"), &watched));
    }
}
