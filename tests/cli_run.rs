mod common;

use assetflow::cli::CliArgs;
use assetflow::errors::AssetflowError;
use assetflow::run;
use clap::Parser;
use common::*;

fn args(project: &TempProject, extra: &[&str]) -> CliArgs {
    let config = project.path("Assetflow.toml");
    let mut argv = vec!["assetflow".to_string(), "--config".into(), config.display().to_string()];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn defaults_to_the_default_task() {
    let parsed = CliArgs::try_parse_from(["assetflow"]).unwrap();
    assert_eq!(parsed.task, "default");
    assert!(!parsed.dry_run && !parsed.list);
}

#[tokio::test]
async fn list_and_dry_run_do_not_touch_the_project() {
    init_tracing();
    let project = TempProject::new();
    project.write("Assetflow.toml", "[output]\nroot = \"public\"\n");
    project.write("src/index.html", "<p>x</p>");

    run(args(&project, &["--list"])).await.unwrap();
    run(args(&project, &["build", "--dry-run"])).await.unwrap();

    assert!(!project.exists("public"));
}

#[tokio::test]
async fn runs_the_named_task_relative_to_the_config_file() {
    init_tracing();
    let project = TempProject::new();
    project.write("Assetflow.toml", "[output]\nroot = \"public\"\n[paths.html]\nsrc = \"src/**/*.html\"\ndest = \"public\"\n");
    project.write("src/index.html", "<p>x</p>");

    run(args(&project, &["html"])).await.unwrap();

    assert!(project.exists("public/index.html"));
}

#[tokio::test]
async fn unknown_task_is_reported() {
    init_tracing();
    let project = TempProject::new();
    project.write("Assetflow.toml", "");

    let err = run(args(&project, &["nope"])).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AssetflowError>(),
        Some(AssetflowError::TaskNotFound(name)) if name == "nope"
    ));
}
