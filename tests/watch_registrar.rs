mod common;

use assetflow::config::WatchConfig;
use assetflow::pipeline::{Task, TaskRegistry};
use assetflow::resolve::SourceSet;
use assetflow::watch::{ChangeSubscription, WatchBinding, WatchRegistrar};
use common::*;

fn binding(label: &str, patterns: &[&str], task: RecordingTask) -> WatchBinding {
    WatchBinding::new(label, SourceSet::new(patterns).unwrap(), task.arc())
}

#[tokio::test]
async fn only_matching_changes_trigger_runs() {
    init_tracing();
    let log = new_log();
    let (sender, subscription) = ChangeSubscription::manual();
    let registrar = WatchRegistrar::spawn(
        mock_context(),
        vec![binding(
            "styles",
            &["src/scss/**/*.scss"],
            RecordingTask::ok("styles", &log),
        )],
        subscription,
    );

    assert!(sender.send(["src/js/app.js"]));
    assert!(sender.send(["src/scss/main.scss"]));
    assert!(sender.send(["README.md"]));
    drop(sender);
    with_timeout(registrar.join()).await;

    assert_eq!(started(&log), vec!["styles"]);
}

#[tokio::test]
async fn absolute_paths_are_made_relative_to_root() {
    init_tracing();
    let log = new_log();
    let (sender, subscription) = ChangeSubscription::manual();
    let registrar = WatchRegistrar::spawn(
        mock_context(),
        vec![binding("html", &["src/**/*.html"], RecordingTask::ok("html", &log))],
        subscription,
    );

    sender.send(["/project/src/index.html"]);
    drop(sender);
    with_timeout(registrar.join()).await;

    assert_eq!(started(&log), vec!["html"]);
}

#[tokio::test]
async fn runs_of_one_binding_are_sequential_and_fifo() {
    init_tracing();
    let log = new_log();
    let (sender, subscription) = ChangeSubscription::manual();
    let registrar = WatchRegistrar::spawn(
        mock_context(),
        vec![binding(
            "scripts",
            &["src/js/*.js"],
            RecordingTask::ok("scripts", &log).with_delay(30),
        )],
        subscription,
    );

    for _ in 0..3 {
        sender.send(["src/js/app.js"]);
    }
    drop(sender);
    with_timeout(registrar.join()).await;

    let expected: Vec<TaskEvent> = (0..3)
        .flat_map(|_| {
            [
                TaskEvent::Started("scripts".into()),
                TaskEvent::Finished("scripts".into()),
            ]
        })
        .collect();
    assert_eq!(events(&log), expected);
}

#[tokio::test]
async fn separate_bindings_run_independently() {
    init_tracing();
    let log = new_log();
    let (sender, subscription) = ChangeSubscription::manual();
    let registrar = WatchRegistrar::spawn(
        mock_context(),
        vec![
            binding("a", &["src/**"], RecordingTask::ok("a", &log).with_delay(50)),
            binding("b", &["src/**"], RecordingTask::ok("b", &log).with_delay(50)),
        ],
        subscription,
    );

    sender.send(["src/index.html"]);
    drop(sender);
    with_timeout(registrar.join()).await;

    let evs = events(&log);
    assert_eq!(evs.len(), 4);
    // Both started before either finished.
    assert!(matches!(evs[0], TaskEvent::Started(_)));
    assert!(matches!(evs[1], TaskEvent::Started(_)));
}

#[tokio::test]
async fn failing_pipeline_keeps_binding_armed() {
    init_tracing();
    let log = new_log();
    let (sender, subscription) = ChangeSubscription::manual();
    let registrar = WatchRegistrar::spawn(
        mock_context(),
        vec![binding(
            "styles",
            &["src/scss/*.scss"],
            RecordingTask::failing("styles", &log),
        )],
        subscription,
    );

    sender.send(["src/scss/a.scss"]);
    sender.send(["src/scss/b.scss"]);
    drop(sender);
    with_timeout(registrar.join()).await;

    assert_eq!(
        events(&log),
        vec![
            TaskEvent::Started("styles".into()),
            TaskEvent::Failed("styles".into()),
            TaskEvent::Started("styles".into()),
            TaskEvent::Failed("styles".into()),
        ]
    );
}

#[tokio::test]
async fn one_event_with_many_matches_runs_once() {
    init_tracing();
    let log = new_log();
    let (sender, subscription) = ChangeSubscription::manual();
    let registrar = WatchRegistrar::spawn(
        mock_context(),
        vec![binding("html", &["src/*.html"], RecordingTask::ok("html", &log))],
        subscription,
    );

    sender.send(["src/a.html", "src/b.html"]);
    drop(sender);
    with_timeout(registrar.join()).await;

    assert_eq!(started(&log), vec!["html"]);
}

#[tokio::test]
async fn config_binding_runs_named_tasks_in_series() {
    init_tracing();
    let log = new_log();
    let mut registry = TaskRegistry::new();
    registry
        .register("styles", RecordingTask::ok("styles", &log).arc())
        .unwrap();
    registry
        .register("lintStyles", RecordingTask::ok("lintStyles", &log).arc())
        .unwrap();

    let cfg = WatchConfig::new(vec!["src/scss/**/*.scss".into()], &["styles", "lintStyles"]);
    let binding = WatchBinding::from_config(&cfg, &registry).unwrap();
    assert_eq!(binding.label(), "styles, lintStyles");
    assert!(binding.matches("src/scss/a/b.scss"));
    assert!(!binding.matches("src/js/a.js"));

    with_timeout(binding.pipeline().run(mock_context())).await.unwrap();
    assert_eq!(started(&log), vec!["styles", "lintStyles"]);
}

#[tokio::test]
async fn config_binding_with_unknown_task_is_rejected() {
    let registry = TaskRegistry::new();
    let cfg = WatchConfig::new(vec!["src/**".into()], &["nope"]);
    assert!(WatchBinding::from_config(&cfg, &registry).is_err());
}
