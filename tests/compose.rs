mod common;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetflow::errors::AssetflowError;
use assetflow::pipeline::{Task, parallel, run_logged, series};
use common::*;

#[tokio::test]
async fn series_runs_in_order() {
    init_tracing();
    let log = new_log();
    let pipeline = series(vec![
        RecordingTask::ok("a", &log).with_delay(20).arc(),
        RecordingTask::ok("b", &log).arc(),
        RecordingTask::ok("c", &log).arc(),
    ]);

    with_timeout(pipeline.run(mock_context())).await.unwrap();

    assert_eq!(
        events(&log),
        vec![
            TaskEvent::Started("a".into()),
            TaskEvent::Finished("a".into()),
            TaskEvent::Started("b".into()),
            TaskEvent::Finished("b".into()),
            TaskEvent::Started("c".into()),
            TaskEvent::Finished("c".into()),
        ]
    );
}

#[tokio::test]
async fn series_stops_at_first_failure() {
    init_tracing();
    let log = new_log();
    let pipeline = series(vec![
        RecordingTask::ok("a", &log).arc(),
        RecordingTask::failing("b", &log).arc(),
        RecordingTask::ok("c", &log).arc(),
    ]);

    let err = with_timeout(pipeline.run(mock_context())).await.unwrap_err();

    assert_eq!(err.to_string(), "b failed");
    assert_eq!(started(&log), vec!["a", "b"]);
}

#[tokio::test]
async fn parallel_members_overlap() {
    init_tracing();
    let log = new_log();
    let pipeline = parallel(vec![
        RecordingTask::ok("slow", &log).with_delay(50).arc(),
        RecordingTask::ok("fast", &log).with_delay(10).arc(),
    ]);

    with_timeout(pipeline.run(mock_context())).await.unwrap();

    let evs = events(&log);
    assert_eq!(evs.len(), 4);
    // Both start before either finishes; the fast one finishes first.
    assert!(matches!(evs[0], TaskEvent::Started(_)));
    assert!(matches!(evs[1], TaskEvent::Started(_)));
    assert_eq!(evs[2], TaskEvent::Finished("fast".into()));
    assert_eq!(evs[3], TaskEvent::Finished("slow".into()));
}

#[tokio::test]
async fn parallel_failure_does_not_cancel_siblings() {
    init_tracing();
    let log = new_log();
    let pipeline = parallel(vec![
        RecordingTask::failing("broken", &log).arc(),
        RecordingTask::ok("sibling", &log).with_delay(30).arc(),
    ]);

    let err = with_timeout(pipeline.run(mock_context())).await.unwrap_err();
    assert!(matches!(err, AssetflowError::Other(_)));
    assert_eq!(err.to_string(), "broken failed");

    // The sibling was detached, not aborted: it still completes.
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(events(&log).contains(&TaskEvent::Finished("sibling".into())));
}

#[tokio::test]
async fn nested_composition_propagates_error_unchanged() {
    init_tracing();
    let log = new_log();
    let pipeline = series(vec![
        RecordingTask::ok("clean", &log).arc(),
        parallel(vec![
            RecordingTask::ok("styles", &log).arc(),
            RecordingTask::failing("scripts", &log).arc(),
        ]),
        RecordingTask::ok("serve", &log).arc(),
    ]);

    let err = with_timeout(run_logged(pipeline, mock_context()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "scripts failed");
    assert!(!started(&log).contains(&"serve".to_string()));
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn task_logs_are_scoped_to_their_task() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let log = new_log();
    let pipeline = series(vec![
        RecordingTask::ok("styles", &log).arc(),
        RecordingTask::ok("scripts", &log).arc(),
    ]);
    with_timeout(run_logged(pipeline, mock_context())).await.unwrap();

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("task{name=styles}"), "{output}");
    assert!(output.contains("Finished 'scripts'"), "{output}");
    let line = output
        .lines()
        .find(|l| l.contains("Starting 'scripts'"))
        .unwrap();
    assert!(line.contains("task{name=scripts}"), "{line}");
    assert!(!line.contains("task{name=styles}"), "{line}");
}
