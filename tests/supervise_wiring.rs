// tests/supervise_wiring.rs
//
// `supervise_with` end to end: real watcher and filesystem layout, fake
// process backend.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use grape::config::DEFAULT_NAMESPACE;
use grape::engine::ShutdownSignal;
use grape::errors::GrapeError;
use grape::fs::{FileSystem, RealFileSystem};
use grape::notice::Notice;
use grape::supervise_with;
use grape_test_utils::builders::{ConfigBuilder, NamespaceBuilder};
use grape_test_utils::fake_backend::{FakeProcessBackend, RecordingNotices};
use grape_test_utils::{init_tracing, wait_until, with_timeout};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

/// A project directory that cannot be listed.
#[derive(Debug)]
struct UnlistableFs;

impl FileSystem for UnlistableFs {
    fn read_to_string(&self, path: &Path) -> anyhow::Result<String> {
        Err(anyhow!("cannot read {path:?}"))
    }
    fn write(&self, path: &Path, _contents: &[u8]) -> anyhow::Result<()> {
        Err(anyhow!("cannot write {path:?}"))
    }
    fn exists(&self, _path: &Path) -> bool {
        true
    }
    fn is_file(&self, _path: &Path) -> bool {
        false
    }
    fn is_dir(&self, _path: &Path) -> bool {
        true
    }
    fn read_dir(&self, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        Err(anyhow!("permission denied listing {path:?}"))
    }
}

fn txt_config() -> grape::config::Config {
    ConfigBuilder::new()
        .with_namespace(
            DEFAULT_NAMESPACE,
            NamespaceBuilder::new("server").include("*.txt").exclude("vendor").build(),
        )
        .build()
}

#[tokio::test]
async fn registration_failure_stops_the_loop_and_returns_the_error() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let backend = FakeProcessBackend::new();
    let notices = RecordingNotices::new();

    let result = with_timeout(supervise_with(
        &txt_config(),
        DEFAULT_NAMESPACE,
        dir.path(),
        Arc::new(UnlistableFs),
        backend.clone(),
        Box::new(notices.clone()),
        ShutdownSignal::new(),
    ))
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, GrapeError::Other(_)), "got {err:?}");
    assert!(err.to_string().contains("permission denied"), "{err}");

    // Whatever was started has been terminated again.
    assert_eq!(backend.alive(), 0);
    assert_eq!(backend.starts(), backend.terminates());
    assert_eq!(notices.count(&Notice::Stopped), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_namespace_fails_before_starting() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let backend = FakeProcessBackend::new();

    let err = supervise_with(
        &txt_config(),
        "api",
        dir.path(),
        Arc::new(RealFileSystem),
        backend.clone(),
        Box::new(RecordingNotices::new()),
        ShutdownSignal::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GrapeError::NamespaceNotFound(_)));
    assert!(backend.ops().is_empty());
    Ok(())
}

#[tokio::test]
async fn runs_until_shutdown_and_restarts_on_change() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::write(root.join("a.txt"), "a")?;

    let backend = FakeProcessBackend::new();
    let notices = RecordingNotices::new();
    let shutdown = ShutdownSignal::new();

    let task = {
        let (backend, notices, shutdown, root) =
            (backend.clone(), notices.clone(), shutdown.clone(), root.clone());
        tokio::spawn(async move {
            supervise_with(
                &txt_config(),
                DEFAULT_NAMESPACE,
                &root,
                Arc::new(RealFileSystem),
                backend,
                Box::new(notices),
                shutdown,
            )
            .await
        })
    };

    let b = backend.clone();
    wait_until("initial start", || b.starts() == 1).await;
    // Give registration a moment; the root is watched once it finishes.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    fs::File::create(root.join("b.txt"))?;
    let b = backend.clone();
    wait_until("restart for b.txt", || b.starts() >= 2).await;

    shutdown.trigger();
    with_timeout(task).await??;

    assert!(notices.snapshot().contains(&Notice::FileChanged("b.txt".into())));
    assert_eq!(backend.alive(), 0);
    assert_eq!(notices.count(&Notice::Stopped), 1);
    Ok(())
}
