use std::path::{Path, PathBuf};

use assetflow::errors::AssetflowError;
use assetflow::fs::mock::MockFileSystem;
use assetflow::resolve::SourceSet;

fn project() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("./src/scss/main.scss", "a");
    fs.add_file("./src/scss/components/button.scss", "b");
    fs.add_file("./src/scss/_vars.scss", "c");
    fs.add_file("./src/js/app.js", "d");
    fs.add_file("./src/js/vendor/jquery.js", "e");
    fs.add_file("./src/index.html", "f");
    fs
}

fn relatives(set: &SourceSet, fs: &MockFileSystem) -> Vec<PathBuf> {
    set.resolve(fs, Path::new("."))
        .unwrap()
        .into_iter()
        .map(|f| f.relative)
        .collect()
}

#[test]
fn outputs_are_relative_to_glob_base() {
    let fs = project();
    let set = SourceSet::new(&["src/scss/**/*.scss"]).unwrap();
    let mut rels = relatives(&set, &fs);
    rels.sort();
    assert_eq!(
        rels,
        vec![
            PathBuf::from("_vars.scss"),
            PathBuf::from("components/button.scss"),
            PathBuf::from("main.scss"),
        ]
    );
}

#[test]
fn single_star_does_not_cross_directories() {
    let fs = project();
    let set = SourceSet::new(&["src/js/*.js"]).unwrap();
    assert_eq!(relatives(&set, &fs), vec![PathBuf::from("app.js")]);
}

#[test]
fn negated_patterns_exclude() {
    let fs = project();
    let set = SourceSet::new(&["src/js/**/*.js", "!src/js/vendor/**"]).unwrap();
    assert_eq!(relatives(&set, &fs), vec![PathBuf::from("app.js")]);
    assert!(set.matches("src/js/app.js"));
    assert!(!set.matches("src/js/vendor/jquery.js"));
}

#[test]
fn missing_glob_base_resolves_to_nothing() {
    let fs = project();
    let set = SourceSet::new(&["src/fonts/**/*"]).unwrap();
    assert!(relatives(&set, &fs).is_empty());
}

#[test]
fn missing_singular_path_is_an_error() {
    let fs = project();
    let set = SourceSet::new(&["src/about.html"]).unwrap();
    let err = set.resolve(&fs, Path::new(".")).unwrap_err();
    assert!(matches!(err, AssetflowError::Other(_)));
    assert!(err.to_string().contains("src/about.html"));
}

#[test]
fn singular_path_resolves_to_its_file_name() {
    let fs = project();
    let set = SourceSet::new(&["src/index.html"]).unwrap();
    let files = set.resolve(&fs, Path::new(".")).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative, PathBuf::from("index.html"));
    assert_eq!(files[0].path, PathBuf::from("./src/index.html"));
}

#[test]
fn overlapping_patterns_yield_each_file_once() {
    let fs = project();
    let set = SourceSet::new(&["src/js/**/*.js", "src/js/*.js"]).unwrap();
    let files = set.resolve(&fs, Path::new(".")).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn invalid_pattern_is_rejected() {
    assert!(SourceSet::new(&["src/[oops"]).is_err());
}
