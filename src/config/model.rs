// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::types::{CacheMode, CssOutputStyle, Severity};

/// Top-level configuration as read from `Assetflow.toml`.
///
/// ```toml
/// [output]
/// root = "dist"
///
/// [paths.styles]
/// src = "src/scss/**/*.scss"
/// dest = "dist/css"
///
/// [[watch]]
/// patterns = ["src/scss/**/*.scss"]
/// run = ["styles", "lintStyles"]
///
/// [pipeline.release]
/// series = ["build", "accessibilityCheck"]
/// ```
///
/// All sections are optional and have defaults matching the conventional
/// `src/` → `dist/` layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub scripts: ScriptsSection,

    #[serde(default)]
    pub images: ImagesSection,

    #[serde(default)]
    pub lint: LintSection,

    #[serde(default)]
    pub accessibility: AccessibilitySection,

    #[serde(default)]
    pub server: ServerSection,

    /// `[[watch]]` bindings. `None` means "derive the default bindings from
    /// `[paths]`"; an explicit empty list disables watching.
    #[serde(default)]
    pub watch: Option<Vec<WatchConfig>>,

    /// User pipelines from `[pipeline.<name>]`.
    #[serde(default)]
    pub pipeline: BTreeMap<String, PipelineConfig>,

    /// Shell command tasks from `[command.<name>]`.
    #[serde(default)]
    pub command: BTreeMap<String, CommandConfig>,
}

/// Validated configuration.
///
/// Only constructed through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`), which also materialises the default watch bindings.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub output: OutputSection,
    pub paths: PathsSection,
    pub styles: StylesSection,
    pub scripts: ScriptsSection,
    pub images: ImagesSection,
    pub lint: LintSection,
    pub accessibility: AccessibilitySection,
    pub server: ServerSection,
    pub watch: Vec<WatchConfig>,
    pub pipeline: BTreeMap<String, PipelineConfig>,
    pub command: BTreeMap<String, CommandConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, watch: Vec<WatchConfig>) -> Self {
        Self {
            output: raw.output,
            paths: raw.paths,
            styles: raw.styles,
            scripts: raw.scripts,
            images: raw.images,
            lint: raw.lint,
            accessibility: raw.accessibility,
            server: raw.server,
            watch,
            pipeline: raw.pipeline,
            command: raw.command,
        }
    }

    /// Pages audited by `accessibilityCheck`.
    pub fn accessibility_paths(&self) -> PathMapping {
        self.paths.accessibility_for(&self.output)
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        // The defaults are always valid.
        let raw = RawConfigFile::default();
        let watch = default_watch_bindings(&raw);
        ConfigFile::new_unchecked(raw, watch)
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Output root wiped by `clean` and served by `serve`.
    #[serde(default = "default_output_root")]
    pub root: String,
}

fn default_output_root() -> String {
    "dist".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            root: default_output_root(),
        }
    }
}

/// Source pattern(s) plus destination directory for one asset type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathMapping {
    /// Glob(s) relative to the project root. `!pattern` excludes.
    #[serde(deserialize_with = "one_or_many")]
    pub src: Vec<String>,

    /// Destination directory relative to the project root.
    #[serde(default)]
    pub dest: String,
}

impl PathMapping {
    pub fn new(src: &str, dest: &str) -> Self {
        Self {
            src: vec![src.to_string()],
            dest: dest.to_string(),
        }
    }
}

/// `[paths.*]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_styles_paths")]
    pub styles: PathMapping,
    #[serde(default = "default_scripts_paths")]
    pub scripts: PathMapping,
    #[serde(default = "default_images_paths")]
    pub images: PathMapping,
    #[serde(default = "default_html_paths")]
    pub html: PathMapping,
    #[serde(default = "default_fonts_paths")]
    pub fonts: PathMapping,
    #[serde(default = "default_svg_paths")]
    pub svg: PathMapping,
    /// Built markup to audit. `dest` is unused. Defaults to the top-level
    /// pages under `[output].root`.
    #[serde(default)]
    pub accessibility: Option<PathMapping>,
}

impl PathsSection {
    /// `[paths.accessibility]`, or the pages under `output` when unset.
    pub fn accessibility_for(&self, output: &OutputSection) -> PathMapping {
        self.accessibility
            .clone()
            .unwrap_or_else(|| default_accessibility_paths(output))
    }
}

fn default_styles_paths() -> PathMapping {
    PathMapping::new("src/scss/**/*.scss", "dist/css")
}

fn default_scripts_paths() -> PathMapping {
    PathMapping::new("src/js/**/*.js", "dist/js")
}

fn default_images_paths() -> PathMapping {
    PathMapping::new("src/images/*", "dist/images")
}

fn default_html_paths() -> PathMapping {
    PathMapping::new("src/**/*.html", "dist")
}

fn default_fonts_paths() -> PathMapping {
    PathMapping::new("src/fonts/**/*", "dist/fonts")
}

fn default_svg_paths() -> PathMapping {
    PathMapping::new("src/images/**/*.svg", "dist/images")
}

fn default_accessibility_paths(output: &OutputSection) -> PathMapping {
    let root = output.root.trim_end_matches('/');
    PathMapping::new(&format!("{root}/*.html"), "")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            styles: default_styles_paths(),
            scripts: default_scripts_paths(),
            images: default_images_paths(),
            html: default_html_paths(),
            fonts: default_fonts_paths(),
            svg: default_svg_paths(),
            accessibility: None,
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesSection {
    #[serde(default)]
    pub output_style: CssOutputStyle,

    #[serde(default = "default_true")]
    pub source_maps: bool,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            output_style: CssOutputStyle::default(),
            source_maps: true,
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsSection {
    /// File name of the concatenated bundle.
    #[serde(default = "default_bundle")]
    pub bundle: String,

    #[serde(default = "default_true")]
    pub source_maps: bool,
}

fn default_bundle() -> String {
    "main.js".to_string()
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            bundle: default_bundle(),
            source_maps: true,
        }
    }
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesSection {
    #[serde(default)]
    pub cache: CacheMode,

    /// JPEG re-encode quality, 1..=100.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_jpeg_quality() -> u8 {
    85
}

impl Default for ImagesSection {
    fn default() -> Self {
        Self {
            cache: CacheMode::default(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// `[lint]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LintSection {
    /// Lint tasks fail when any finding is at or above this severity.
    #[serde(default)]
    pub fail_on: Severity,

    /// Per-rule severity overrides, e.g. `no-console = "off"`.
    #[serde(default)]
    pub rules: BTreeMap<String, Severity>,
}

/// `[accessibility]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessibilitySection {
    /// Optional path (relative to the project root) for a text report.
    #[serde(default)]
    pub report: Option<String>,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// `0` picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// One `[[watch]]` binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchConfig {
    /// Trigger glob(s), relative to the project root.
    #[serde(deserialize_with = "one_or_many")]
    pub patterns: Vec<String>,

    /// Task names run in series on every matching change.
    #[serde(deserialize_with = "one_or_many")]
    pub run: Vec<String>,
}

impl WatchConfig {
    pub fn new(patterns: Vec<String>, run: &[&str]) -> Self {
        Self {
            patterns,
            run: run.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[pipeline.<name>]` table. Exactly one of `series` / `parallel` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub series: Option<Vec<String>>,

    #[serde(default)]
    pub parallel: Option<Vec<String>>,
}

impl PipelineConfig {
    /// Member task names, whichever mode is set.
    pub fn members(&self) -> &[String] {
        match (&self.series, &self.parallel) {
            (Some(list), _) => list,
            (None, Some(list)) => list,
            (None, None) => &[],
        }
    }
}

/// `[command.<name>]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// Shell command line, run from the project root.
    pub cmd: String,
}

/// Watch bindings mirroring the conventional dev loop: styles and scripts
/// rebuild then lint, images and markup rebuild, built markup reloads
/// connected previews.
pub fn default_watch_bindings(raw: &RawConfigFile) -> Vec<WatchConfig> {
    let output_html = format!("{}/*.html", raw.output.root.trim_end_matches('/'));
    vec![
        WatchConfig::new(raw.paths.styles.src.clone(), &["styles", "lintStyles"]),
        WatchConfig::new(raw.paths.scripts.src.clone(), &["scripts", "lintScripts"]),
        WatchConfig::new(raw.paths.images.src.clone(), &["images"]),
        WatchConfig::new(raw.paths.html.src.clone(), &["html"]),
        WatchConfig::new(vec![output_html], &["reload"]),
    ]
}

fn default_true() -> bool {
    true
}

/// Accept either `key = "a"` or `key = ["a", "b"]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
