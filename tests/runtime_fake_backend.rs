// tests/runtime_fake_backend.rs

use std::error::Error;
use std::time::Duration;

use grape::config::WatchSpec;
use grape::engine::{CoreSupervisor, ShutdownSignal, Supervisor};
use grape::exec::ProcessController;
use grape::notice::Notice;
use grape::watch::{ChangeEvent, ChangeSenders, ChangeStreams, WatchProfile};
use grape_test_utils::fake_backend::{FakeProcessBackend, ProcessOp, RecordingNotices};
use grape_test_utils::{init_tracing, wait_until, with_timeout};
use tokio::task::JoinHandle;

type TestResult = Result<(), Box<dyn Error>>;

struct Harness {
    backend: FakeProcessBackend,
    notices: RecordingNotices,
    senders: ChangeSenders,
    shutdown: ShutdownSignal,
    task: JoinHandle<grape::errors::Result<()>>,
}

fn spawn_supervisor(command: &str, backend: FakeProcessBackend) -> Harness {
    let profile = WatchProfile::new(&WatchSpec {
        include: vec!["*.txt".to_string()],
        exclude: vec!["vendor".to_string()],
    })
    .unwrap();

    let (senders, streams) = ChangeStreams::channel();
    let shutdown = ShutdownSignal::new();
    let notices = RecordingNotices::new();

    let supervisor = Supervisor::new(
        CoreSupervisor::new(profile),
        ProcessController::new(backend.clone()),
        command,
        streams,
        shutdown.clone(),
        Box::new(notices.clone()),
    );

    Harness {
        backend,
        notices,
        senders,
        shutdown,
        task: tokio::spawn(supervisor.run()),
    }
}

impl Harness {
    async fn stop(self) -> TestResult {
        self.shutdown.trigger();
        with_timeout(self.task).await??;
        Ok(())
    }
}

#[tokio::test]
async fn starts_initial_process_and_announces_it() -> TestResult {
    init_tracing();
    let h = spawn_supervisor("go run main.go", FakeProcessBackend::new());

    let backend = h.backend.clone();
    wait_until("initial start", || backend.starts() == 1).await;
    let notices = h.notices.clone();
    wait_until("started notice", || notices.count(&Notice::Started) == 1).await;

    assert_eq!(
        h.backend.ops(),
        vec![ProcessOp::Start {
            id: 1,
            command: "go run main.go".to_string()
        }]
    );

    h.stop().await
}

#[tokio::test]
async fn two_rapid_changes_give_two_sequential_restarts() -> TestResult {
    init_tracing();
    let backend = FakeProcessBackend::with_terminate_delay(Duration::from_millis(30));
    let h = spawn_supervisor("server", backend);

    h.senders.events.send(ChangeEvent::write("a.txt"))?;
    h.senders.events.send(ChangeEvent::write("a.txt"))?;

    let backend = h.backend.clone();
    wait_until("two restarts", || backend.starts() == 3).await;

    assert_eq!(h.backend.max_alive(), 1, "processes overlapped");
    assert_eq!(
        h.backend.ops(),
        vec![
            ProcessOp::Start { id: 1, command: "server".into() },
            ProcessOp::Terminate { id: 1 },
            ProcessOp::Start { id: 2, command: "server".into() },
            ProcessOp::Terminate { id: 2 },
            ProcessOp::Start { id: 3, command: "server".into() },
        ]
    );
    assert_eq!(h.notices.count(&Notice::FileChanged("a.txt".into())), 2);

    h.stop().await
}

#[tokio::test]
async fn shutdown_terminates_once_and_starts_nothing_more() -> TestResult {
    init_tracing();
    let h = spawn_supervisor("server", FakeProcessBackend::new());
    let backend = h.backend.clone();
    wait_until("initial start", || backend.starts() == 1).await;

    let notices = h.notices.clone();
    let senders = h.senders.clone();
    h.stop().await?;

    assert_eq!(backend.starts(), 1);
    assert_eq!(backend.terminates(), 1);
    assert_eq!(backend.alive(), 0);
    assert_eq!(notices.count(&Notice::Stopped), 1);
    assert_eq!(notices.snapshot().last(), Some(&Notice::Stopped));

    // The loop is gone; late changes go nowhere.
    assert!(senders.events.send(ChangeEvent::write("a.txt")).is_err());
    assert_eq!(backend.starts(), 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_requested_before_run_is_not_lost() -> TestResult {
    init_tracing();
    let profile = WatchProfile::new(&WatchSpec {
        include: vec!["*.txt".to_string()],
        exclude: Vec::new(),
    })?;
    let backend = FakeProcessBackend::new();
    let (_senders, streams) = ChangeStreams::channel();
    let shutdown = ShutdownSignal::new();
    shutdown.trigger();
    assert!(shutdown.is_triggered());

    let notices = RecordingNotices::new();
    let supervisor = Supervisor::new(
        CoreSupervisor::new(profile),
        ProcessController::new(backend.clone()),
        "server",
        streams,
        shutdown,
        Box::new(notices.clone()),
    );
    with_timeout(supervisor.run()).await?;

    // Nothing is started once shutdown has been requested.
    assert_eq!(backend.starts(), 0);
    assert_eq!(backend.terminates(), 0);
    assert_eq!(notices.snapshot(), vec![Notice::Stopped]);
    Ok(())
}

#[tokio::test]
async fn shutdown_during_restart_cancels_the_pending_start() -> TestResult {
    init_tracing();
    let backend = FakeProcessBackend::with_terminate_delay(Duration::from_millis(300));
    let h = spawn_supervisor("server", backend);

    let backend = h.backend.clone();
    wait_until("initial start", || backend.starts() == 1).await;

    h.senders.events.send(ChangeEvent::write("a.txt"))?;
    let notices = h.notices.clone();
    wait_until("restart to begin", || {
        notices.count(&Notice::FileChanged("a.txt".into())) == 1
    })
    .await;

    // The old process is still being terminated.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.terminates(), 0);
    let starts_at_signal = backend.starts();

    h.stop().await?;

    assert_eq!(backend.starts(), starts_at_signal);
    assert_eq!(backend.terminates(), 1);
    assert_eq!(backend.alive(), 0);
    assert_eq!(notices.count(&Notice::Stopped), 1);
    assert_eq!(
        backend.ops(),
        vec![
            ProcessOp::Start { id: 1, command: "server".into() },
            ProcessOp::Terminate { id: 1 },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn irrelevant_changes_do_not_restart() -> TestResult {
    init_tracing();
    let h = spawn_supervisor("server", FakeProcessBackend::new());

    h.senders.events.send(ChangeEvent::write("vendor/a.txt"))?;
    h.senders.events.send(ChangeEvent::create("main.go"))?;
    h.senders.events.send(ChangeEvent::create("b.txt"))?;

    let backend = h.backend.clone();
    wait_until("restart for b.txt", || backend.starts() == 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.backend.starts(), 2);
    assert_eq!(h.backend.terminates(), 1);
    assert_eq!(
        h.notices.snapshot(),
        vec![
            Notice::Started,
            Notice::FileChanged("b.txt".into()),
            Notice::Started,
        ]
    );

    h.stop().await
}

#[tokio::test]
async fn watcher_errors_do_not_stop_the_loop() -> TestResult {
    init_tracing();
    let h = spawn_supervisor("server", FakeProcessBackend::new());

    h.senders
        .errors
        .send(notify::Error::generic("inotify queue overflow"))?;
    h.senders.events.send(ChangeEvent::write("a.txt"))?;

    let backend = h.backend.clone();
    wait_until("restart after error", || backend.starts() == 2).await;
    assert!(!h.task.is_finished());

    h.stop().await
}

#[tokio::test]
async fn empty_command_never_starts_anything() -> TestResult {
    init_tracing();
    let h = spawn_supervisor("   ", FakeProcessBackend::new());

    h.senders.events.send(ChangeEvent::write("a.txt"))?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.backend.starts(), 0);
    assert_eq!(h.notices.count(&Notice::Started), 0);
    assert!(!h.task.is_finished());

    h.stop().await
}

#[tokio::test]
async fn failed_start_is_retried_on_next_change() -> TestResult {
    init_tracing();
    let backend = FakeProcessBackend::new();
    backend.fail_next_starts(1);
    let h = spawn_supervisor("server", backend);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.backend.starts(), 0);

    h.senders.events.send(ChangeEvent::write("a.txt"))?;
    let backend = h.backend.clone();
    wait_until("retry", || backend.starts() == 1).await;

    // Nothing was running, so nothing was terminated.
    assert_eq!(h.backend.terminates(), 0);
    assert_eq!(h.notices.count(&Notice::Started), 1);

    h.stop().await
}
