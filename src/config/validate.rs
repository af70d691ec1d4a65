// src/config/validate.rs

use std::collections::BTreeMap;
use std::path::Path;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{
    default_watch_bindings, ConfigFile, PathMapping, PipelineConfig, RawConfigFile,
};
use crate::errors::{AssetflowError, Result};
use crate::resolve::{SourceGlob, normalize_relative, to_slash};
use crate::tasks::BUILTIN_TASKS;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let watch = match &raw.watch {
            Some(list) => list.clone(),
            None => default_watch_bindings(&raw),
        };
        validate_watch(&raw, &watch)?;
        Ok(ConfigFile::new_unchecked(raw, watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_sections(cfg)?;
    validate_paths(cfg)?;
    validate_output_root(cfg)?;
    validate_names(cfg)?;
    validate_pipeline_members(cfg)?;
    pipeline_build_order(&cfg.pipeline)?;
    Ok(())
}

fn validate_sections(cfg: &RawConfigFile) -> Result<()> {
    if cfg.output.root.trim().is_empty() {
        return Err(AssetflowError::ConfigError(
            "[output].root must not be empty".to_string(),
        ));
    }

    if !(1..=100).contains(&cfg.images.jpeg_quality) {
        return Err(AssetflowError::ConfigError(format!(
            "[images].jpeg_quality must be within 1..=100 (got {})",
            cfg.images.jpeg_quality
        )));
    }

    let bundle = cfg.scripts.bundle.trim();
    if bundle.is_empty() || bundle.contains('/') || bundle.contains('\\') {
        return Err(AssetflowError::ConfigError(format!(
            "[scripts].bundle must be a plain file name (got {:?})",
            cfg.scripts.bundle
        )));
    }

    for (name, command) in cfg.command.iter() {
        if command.cmd.trim().is_empty() {
            return Err(AssetflowError::ConfigError(format!(
                "command '{}' has an empty `cmd`",
                name
            )));
        }
    }

    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let accessibility = cfg.paths.accessibility_for(&cfg.output);
    let mappings: [(&str, &PathMapping); 7] = [
        ("styles", &cfg.paths.styles),
        ("scripts", &cfg.paths.scripts),
        ("images", &cfg.paths.images),
        ("html", &cfg.paths.html),
        ("fonts", &cfg.paths.fonts),
        ("svg", &cfg.paths.svg),
        ("accessibility", &accessibility),
    ];

    for (asset, mapping) in mappings {
        if mapping.src.is_empty() {
            return Err(AssetflowError::ConfigError(format!(
                "[paths.{asset}].src must list at least one pattern"
            )));
        }
        validate_patterns(&format!("[paths.{asset}].src"), &mapping.src)?;
    }

    Ok(())
}

/// `clean` removes `[output].root`, so it must be a real subdirectory of
/// the project that holds no sources.
fn validate_output_root(cfg: &RawConfigFile) -> Result<()> {
    let configured = cfg.output.root.trim();
    if Path::new(configured).is_absolute() {
        return Err(AssetflowError::ConfigError(format!(
            "[output].root must be relative to the project root (got {configured:?})"
        )));
    }
    let root = normalize_relative(Path::new(configured)).ok_or_else(|| {
        AssetflowError::ConfigError(format!(
            "[output].root must stay inside the project (got {configured:?})"
        ))
    })?;
    if root.as_os_str().is_empty() {
        return Err(AssetflowError::ConfigError(format!(
            "[output].root must not be the project root (got {configured:?})"
        )));
    }

    let sources: [(&str, &PathMapping); 6] = [
        ("styles", &cfg.paths.styles),
        ("scripts", &cfg.paths.scripts),
        ("images", &cfg.paths.images),
        ("html", &cfg.paths.html),
        ("fonts", &cfg.paths.fonts),
        ("svg", &cfg.paths.svg),
    ];
    for (asset, mapping) in sources {
        for pattern in &mapping.src {
            let glob = SourceGlob::new(pattern)?;
            if glob.is_negated() {
                continue;
            }
            let inside = normalize_relative(glob.base()).is_some_and(|base| base.starts_with(&root));
            if inside {
                return Err(AssetflowError::ConfigError(format!(
                    "[paths.{asset}].src {pattern:?} reads from inside [output].root {:?}, which `clean` deletes",
                    to_slash(&root)
                )));
            }
        }
    }
    Ok(())
}

fn validate_patterns(owner: &str, patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        SourceGlob::new(pattern).map_err(|e| {
            AssetflowError::ConfigError(format!("{owner}: invalid glob {pattern:?}: {e}"))
        })?;
    }
    Ok(())
}

fn validate_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.pipeline.keys().chain(cfg.command.keys()) {
        if BUILTIN_TASKS.contains(&name.as_str()) {
            return Err(AssetflowError::ConfigError(format!(
                "'{}' is a built-in task and cannot be redefined",
                name
            )));
        }
    }

    for name in cfg.command.keys() {
        if cfg.pipeline.contains_key(name) {
            return Err(AssetflowError::ConfigError(format!(
                "'{}' is defined both as a pipeline and as a command",
                name
            )));
        }
    }

    Ok(())
}

fn is_known_task(cfg: &RawConfigFile, name: &str) -> bool {
    BUILTIN_TASKS.contains(&name)
        || cfg.pipeline.contains_key(name)
        || cfg.command.contains_key(name)
}

fn validate_pipeline_members(cfg: &RawConfigFile) -> Result<()> {
    for (name, pipeline) in cfg.pipeline.iter() {
        match (&pipeline.series, &pipeline.parallel) {
            (Some(_), Some(_)) => {
                return Err(AssetflowError::ConfigError(format!(
                    "pipeline '{}' sets both `series` and `parallel`",
                    name
                )));
            }
            (None, None) => {
                return Err(AssetflowError::ConfigError(format!(
                    "pipeline '{}' must set `series` or `parallel`",
                    name
                )));
            }
            _ => {}
        }

        if pipeline.members().is_empty() {
            return Err(AssetflowError::ConfigError(format!(
                "pipeline '{}' has no members",
                name
            )));
        }

        for member in pipeline.members() {
            if !is_known_task(cfg, member) {
                return Err(AssetflowError::ConfigError(format!(
                    "pipeline '{}' references unknown task '{}'",
                    name, member
                )));
            }
        }
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile, watch: &[crate::config::WatchConfig]) -> Result<()> {
    for (idx, binding) in watch.iter().enumerate() {
        let owner = format!("watch binding #{}", idx + 1);

        if binding.patterns.is_empty() || binding.run.is_empty() {
            return Err(AssetflowError::ConfigError(format!(
                "{owner} needs at least one pattern and one task in `run`"
            )));
        }
        validate_patterns(&owner, &binding.patterns)?;

        for name in binding.run.iter() {
            if !is_known_task(cfg, name) {
                return Err(AssetflowError::ConfigError(format!(
                    "{owner} references unknown task '{name}'"
                )));
            }
            if reaches_serve(name, &cfg.pipeline) {
                return Err(AssetflowError::ConfigError(format!(
                    "{owner} runs '{name}', which starts the preview server"
                )));
            }
        }
    }
    Ok(())
}

/// Whether running `name` would (transitively) start `serve`.
///
/// Only called after the pipeline graph is known to be acyclic.
fn reaches_serve(name: &str, pipelines: &BTreeMap<String, PipelineConfig>) -> bool {
    if name == "serve" || name == "default" {
        return true;
    }
    match pipelines.get(name) {
        Some(p) => p.members().iter().any(|m| reaches_serve(m, pipelines)),
        None => false,
    }
}

/// Order in which user pipelines must be constructed so that every
/// pipeline's members exist before it does.
///
/// Edge direction: member -> pipeline. For
///
/// ```toml
/// [pipeline.release]
/// series = ["ci", "build"]
/// ```
///
/// we add edge `ci -> release` (only pipeline members become edges;
/// built-ins and commands always exist already).
pub fn pipeline_build_order(pipelines: &BTreeMap<String, PipelineConfig>) -> Result<Vec<String>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in pipelines.keys() {
        graph.add_node(name.as_str());
    }

    for (name, pipeline) in pipelines.iter() {
        for member in pipeline.members() {
            if member == name {
                return Err(AssetflowError::PipelineCycle(format!(
                    "pipeline '{}' contains itself",
                    name
                )));
            }
            if pipelines.contains_key(member) {
                graph.add_edge(member.as_str(), name.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(AssetflowError::PipelineCycle(format!(
                "cycle detected in pipelines involving '{}'",
                node
            )))
        }
    }
}
