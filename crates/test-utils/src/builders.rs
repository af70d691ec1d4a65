#![allow(dead_code)]

use assetflow::config::{
    CommandConfig, ConfigFile, PathMapping, PipelineConfig, RawConfigFile, WatchConfig,
};
use assetflow::errors::Result;
use assetflow::types::{CacheMode, CssOutputStyle, Severity};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn output_root(mut self, root: &str) -> Self {
        self.config.output.root = root.to_string();
        self
    }

    /// Replace one `[paths.<asset>]` table.
    pub fn paths(mut self, asset: &str, src: &[&str], dest: &str) -> Self {
        let mapping = PathMapping {
            src: src.iter().map(|s| s.to_string()).collect(),
            dest: dest.to_string(),
        };
        let paths = &mut self.config.paths;
        if asset == "accessibility" {
            paths.accessibility = Some(mapping);
            return self;
        }
        let slot = match asset {
            "styles" => &mut paths.styles,
            "scripts" => &mut paths.scripts,
            "images" => &mut paths.images,
            "html" => &mut paths.html,
            "fonts" => &mut paths.fonts,
            "svg" => &mut paths.svg,
            other => panic!("unknown asset type {other}"),
        };
        *slot = mapping;
        self
    }

    pub fn source_maps(mut self, on: bool) -> Self {
        self.config.styles.source_maps = on;
        self.config.scripts.source_maps = on;
        self
    }

    pub fn css_style(mut self, style: CssOutputStyle) -> Self {
        self.config.styles.output_style = style;
        self
    }

    pub fn image_cache(mut self, mode: CacheMode) -> Self {
        self.config.images.cache = mode;
        self
    }

    pub fn lint_rule(mut self, rule: &str, severity: Severity) -> Self {
        self.config.lint.rules.insert(rule.to_string(), severity);
        self
    }

    pub fn lint_fail_on(mut self, severity: Severity) -> Self {
        self.config.lint.fail_on = severity;
        self
    }

    pub fn accessibility_report(mut self, path: &str) -> Self {
        self.config.accessibility.report = Some(path.to_string());
        self
    }

    pub fn watch(mut self, patterns: &[&str], run: &[&str]) -> Self {
        let patterns = patterns.iter().map(|s| s.to_string()).collect();
        self.config
            .watch
            .get_or_insert_with(Vec::new)
            .push(WatchConfig::new(patterns, run));
        self
    }

    /// Disable the default watch bindings.
    pub fn no_watch(mut self) -> Self {
        self.config.watch = Some(Vec::new());
        self
    }

    pub fn series(mut self, name: &str, members: &[&str]) -> Self {
        self.config.pipeline.insert(
            name.to_string(),
            PipelineConfig {
                series: Some(members.iter().map(|s| s.to_string()).collect()),
                parallel: None,
            },
        );
        self
    }

    pub fn parallel(mut self, name: &str, members: &[&str]) -> Self {
        self.config.pipeline.insert(
            name.to_string(),
            PipelineConfig {
                series: None,
                parallel: Some(members.iter().map(|s| s.to_string()).collect()),
            },
        );
        self
    }

    pub fn command(mut self, name: &str, cmd: &str) -> Self {
        self.config.command.insert(
            name.to_string(),
            CommandConfig {
                cmd: cmd.to_string(),
            },
        );
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
