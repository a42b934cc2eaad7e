// tests/watcher_integration.rs
//
// Real notify watcher on a temporary directory, driving the supervisor with
// a fake process backend.

use std::error::Error;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use grape::config::WatchSpec;
use grape::engine::{CoreSupervisor, ShutdownSignal, Supervisor};
use grape::errors::GrapeError;
use grape::exec::ProcessController;
use grape::fs::RealFileSystem;
use grape::notice::Notice;
use grape::watch::{register_patterns, ChangeWatcher, PathResolver, WatchProfile};
use grape_test_utils::fake_backend::{FakeProcessBackend, RecordingNotices};
use grape_test_utils::{init_tracing, wait_until, with_timeout};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn txt_spec() -> WatchSpec {
    WatchSpec {
        include: vec!["*.txt".to_string(), "**/*.txt".to_string()],
        exclude: vec!["vendor".to_string()],
    }
}

#[tokio::test]
async fn registers_directories_but_skips_excluded_ones() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::create_dir_all(root.join("vendor"))?;
    fs::create_dir_all(root.join("docs"))?;
    fs::write(root.join("vendor/a.txt"), "x")?;
    fs::write(root.join("docs/guide.txt"), "x")?;

    let profile = WatchProfile::new(&txt_spec())?;
    let resolver = PathResolver::new(
        root.clone(),
        Arc::new(RealFileSystem),
        profile.exclude_rules().clone(),
    );
    let (watcher, _streams) = ChangeWatcher::new(&root)?;

    let added = register_patterns(&watcher, &resolver, &txt_spec().include).await?;
    let watched = watcher.watched();

    assert_eq!(added, watched.len());
    assert!(watched.contains(&root));
    assert!(watched.contains(&root.join("docs")));
    assert!(!watched.contains(&root.join("vendor")));

    // Registering again adds nothing new.
    assert_eq!(register_patterns(&watcher, &resolver, &txt_spec().include).await?, 0);
    Ok(())
}

#[tokio::test]
async fn malformed_pattern_fails_registration() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let resolver = PathResolver::new(dir.path(), Arc::new(RealFileSystem), Default::default());
    let (watcher, _streams) = ChangeWatcher::new(dir.path())?;

    let err = register_patterns(&watcher, &resolver, &["*.txt".to_string(), "[".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, GrapeError::InvalidPattern { .. }), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn excluded_write_is_ignored_and_new_file_restarts_once() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let root: PathBuf = dir.path().canonicalize()?;
    fs::create_dir_all(root.join("vendor"))?;
    fs::write(root.join("vendor/a.txt"), "old")?;

    let spec = WatchSpec {
        include: vec!["*.txt".to_string()],
        exclude: vec!["vendor".to_string()],
    };
    let profile = WatchProfile::new(&spec)?;
    let resolver = PathResolver::new(
        root.clone(),
        Arc::new(RealFileSystem),
        profile.exclude_rules().clone(),
    );
    let (watcher, streams) = ChangeWatcher::new(&root)?;
    register_patterns(&watcher, &resolver, &spec.include).await?;

    let backend = FakeProcessBackend::new();
    let notices = RecordingNotices::new();
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(
        Supervisor::new(
            CoreSupervisor::new(profile),
            ProcessController::new(backend.clone()),
            "server",
            streams,
            shutdown.clone(),
            Box::new(notices.clone()),
        )
        .run(),
    );

    let b = backend.clone();
    wait_until("initial start", || b.starts() == 1).await;

    fs::write(root.join("vendor/a.txt"), "new")?;
    // An empty create is a single Create notification.
    File::create(root.join("b.txt"))?;

    let b = backend.clone();
    wait_until("restart for b.txt", || b.starts() >= 2).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    shutdown.trigger();
    with_timeout(task).await??;

    let seen = notices.snapshot();
    assert!(seen.contains(&Notice::FileChanged("b.txt".into())), "{seen:?}");
    assert!(
        !seen.contains(&Notice::FileChanged("vendor/a.txt".into())),
        "{seen:?}"
    );
    assert_eq!(backend.starts(), 2, "{:?}", backend.ops());
    assert_eq!(backend.max_alive(), 1);
    assert_eq!(backend.alive(), 0);

    drop(watcher);
    Ok(())
}

#[tokio::test]
async fn file_renamed_onto_watched_path_restarts() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let root: PathBuf = dir.path().canonicalize()?;

    let spec = WatchSpec {
        include: vec!["*.txt".to_string()],
        exclude: Vec::new(),
    };
    let profile = WatchProfile::new(&spec)?;
    let resolver = PathResolver::new(
        root.clone(),
        Arc::new(RealFileSystem),
        profile.exclude_rules().clone(),
    );
    let (watcher, streams) = ChangeWatcher::new(&root)?;
    register_patterns(&watcher, &resolver, &spec.include).await?;

    let backend = FakeProcessBackend::new();
    let notices = RecordingNotices::new();
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(
        Supervisor::new(
            CoreSupervisor::new(profile),
            ProcessController::new(backend.clone()),
            "server",
            streams,
            shutdown.clone(),
            Box::new(notices.clone()),
        )
        .run(),
    );

    let b = backend.clone();
    wait_until("initial start", || b.starts() == 1).await;

    // Atomic save: write a temporary file, then move it over the target.
    fs::write(root.join(".b.tmp"), "new contents")?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let starts_before_rename = backend.starts();
    fs::rename(root.join(".b.tmp"), root.join("b.txt"))?;

    let b = backend.clone();
    wait_until("restart for renamed file", || b.starts() > starts_before_rename).await;

    shutdown.trigger();
    with_timeout(task).await??;

    let seen = notices.snapshot();
    assert!(seen.contains(&Notice::FileChanged("b.txt".into())), "{seen:?}");
    assert!(
        !seen.contains(&Notice::FileChanged(".b.tmp".into())),
        "{seen:?}"
    );
    assert_eq!(backend.max_alive(), 1);

    drop(watcher);
    Ok(())
}
