mod common;

use std::io::Write;

use assetflow::config::{load_and_validate, load_or_default};
use assetflow::errors::AssetflowError;
use assetflow::types::{CacheMode, Severity};
use common::*;
use tempfile::NamedTempFile;

fn load(toml: &str) -> assetflow::errors::Result<assetflow::config::ConfigFile> {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{toml}").unwrap();
    load_and_validate(file.path())
}

fn expect_config_error(toml: &str, needle: &str) {
    match load(toml) {
        Err(AssetflowError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}")
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_file_gives_defaults() {
    let cfg = load("").unwrap();
    assert_eq!(cfg.output.root, "dist");
    assert_eq!(cfg.paths.styles.src, vec!["src/scss/**/*.scss"]);
    assert_eq!(cfg.images.cache, CacheMode::File);
    assert_eq!(cfg.lint.fail_on, Severity::Error);
    assert_eq!(cfg.server.port, 3000);

    let runs: Vec<Vec<String>> = cfg.watch.iter().map(|w| w.run.clone()).collect();
    assert_eq!(
        runs,
        vec![
            vec!["styles".to_string(), "lintStyles".to_string()],
            vec!["scripts".to_string(), "lintScripts".to_string()],
            vec!["images".to_string()],
            vec!["html".to_string()],
            vec!["reload".to_string()],
        ]
    );
    assert_eq!(cfg.watch[4].patterns, vec!["dist/*.html"]);
}

#[test]
fn sections_parse_with_string_or_list_sources() {
    let cfg = load(
        r#"
[output]
root = "public"

[paths.scripts]
src = ["src/js/**/*.js", "!src/js/vendor/**"]
dest = "public/js"

[paths.fonts]
src = "assets/fonts/*"
dest = "public/fonts"

[images]
cache = "memory"
jpeg_quality = 70

[lint]
fail_on = "warn"
[lint.rules]
no-console = "off"

[[watch]]
patterns = "src/js/**/*.js"
run = "scripts"
"#,
    )
    .unwrap();

    assert_eq!(cfg.paths.scripts.src.len(), 2);
    assert_eq!(cfg.paths.fonts.src, vec!["assets/fonts/*"]);
    assert_eq!(cfg.images.cache, CacheMode::Memory);
    assert_eq!(cfg.images.jpeg_quality, 70);
    assert_eq!(cfg.lint.fail_on, Severity::Warn);
    assert_eq!(cfg.lint.rules.get("no-console"), Some(&Severity::Off));
    assert_eq!(cfg.watch.len(), 1);
    assert_eq!(cfg.watch[0].run, vec!["scripts"]);
}

#[test]
fn pipeline_cycle_returns_structured_error() {
    let result = load(
        r#"
[pipeline.a]
series = ["b"]

[pipeline.b]
parallel = ["a"]
"#,
    );

    match result {
        Err(AssetflowError::PipelineCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('a') || msg.contains('b'));
        }
        Err(e) => panic!("Expected PipelineCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn self_referencing_pipeline_is_a_cycle() {
    let result = load("[pipeline.loop]\nseries = [\"loop\"]\n");
    assert!(matches!(result, Err(AssetflowError::PipelineCycle(_))));
}

#[test]
fn unknown_pipeline_member_is_rejected() {
    expect_config_error(
        "[pipeline.release]\nseries = [\"build\", \"deploy\"]\n",
        "unknown task 'deploy'",
    );
}

#[test]
fn pipeline_needs_exactly_one_list() {
    expect_config_error(
        "[pipeline.x]\nseries = [\"clean\"]\nparallel = [\"html\"]\n",
        "both",
    );
    expect_config_error("[pipeline.x]\n", "must set");
    expect_config_error("[pipeline.x]\nseries = []\n", "no members");
}

#[test]
fn builtin_names_cannot_be_redefined() {
    expect_config_error("[command.styles]\ncmd = \"sass\"\n", "built-in");
    expect_config_error("[pipeline.default]\nseries = [\"clean\"]\n", "built-in");
}

#[test]
fn watch_binding_may_not_start_the_server() {
    expect_config_error(
        r#"
[pipeline.everything]
series = ["build", "serve"]

[[watch]]
patterns = ["src/**"]
run = ["everything"]
"#,
        "preview server",
    );
}

#[test]
fn invalid_values_are_rejected() {
    expect_config_error("[images]\njpeg_quality = 0\n", "jpeg_quality");
    expect_config_error("[scripts]\nbundle = \"js/main.js\"\n", "bundle");
    expect_config_error("[paths.styles]\nsrc = \"src/[scss\"\ndest = \"dist\"\n", "invalid glob");
    expect_config_error("[command.x]\ncmd = \"  \"\n", "empty");
}

#[test]
fn unknown_severity_is_a_toml_error() {
    let result = load("[lint]\nfail_on = \"fatal\"\n");
    assert!(matches!(result, Err(AssetflowError::TomlError(_))));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let result = load_or_default(Some(std::path::Path::new("/definitely/not/here.toml")));
    assert!(matches!(result, Err(AssetflowError::IoError(_))));
}

#[test]
fn builder_matches_file_semantics() {
    let err = ConfigFileBuilder::new()
        .watch(&["src/**"], &["nope"])
        .try_build()
        .unwrap_err();
    assert!(matches!(err, AssetflowError::ConfigError(_)));
}

#[test]
fn output_root_must_be_a_project_subdirectory() {
    for root in [".", "./", "out/.."] {
        expect_config_error(
            &format!("[output]\nroot = \"{root}\"\n"),
            "must not be the project root",
        );
    }
    expect_config_error("[output]\nroot = \"..\"\n", "must stay inside the project");
    expect_config_error("[output]\nroot = \"/var/www\"\n", "must be relative");
}

#[test]
fn output_root_cannot_contain_sources() {
    expect_config_error("[output]\nroot = \"src\"\n", "[paths.styles].src");
    expect_config_error(
        "[output]\nroot = \"assets\"\n[paths.fonts]\nsrc = \"assets/fonts/*\"\ndest = \"assets/fonts\"\n",
        "[paths.fonts].src",
    );
}

#[test]
fn output_root_beside_sources_is_accepted() {
    let cfg = load("[output]\nroot = \"public\"\n").unwrap();
    assert_eq!(cfg.output.root, "public");

    // Same prefix, different directory.
    load("[output]\nroot = \"src-out\"\n").unwrap();
}

#[test]
fn accessibility_pages_follow_output_root() {
    let cfg = load("[output]\nroot = \"public\"\n").unwrap();
    assert_eq!(cfg.accessibility_paths().src, vec!["public/*.html"]);

    let cfg = load("").unwrap();
    assert_eq!(cfg.accessibility_paths().src, vec!["dist/*.html"]);

    let cfg = load("[paths.accessibility]\nsrc = \"dist/pages/*.html\"\n").unwrap();
    assert_eq!(cfg.accessibility_paths().src, vec!["dist/pages/*.html"]);
}
