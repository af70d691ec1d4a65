// src/tasks/mod.rs

//! Built-in tasks and registry assembly.

pub mod accessibility;
pub mod asset;
pub mod clean;
pub mod command;
pub mod reload;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::config::{ConfigFile, PathMapping, pipeline_build_order};
use crate::errors::Result;
use crate::filters::{
    CachedOptimize, CompileScss, Concat, ImageOptimizer, LintStage, LintTarget, Linter, MinifyHtml,
    MinifyJs, MinifySvg,
};
use crate::pipeline::{Task, TaskRegistry, parallel, series};
use crate::resolve::SourceSet;
use crate::stream::{SourceMapBegin, SourceMapWrite, StageChain, StreamPolicy};
use crate::types::NotifyMode;

pub use accessibility::AccessibilityTask;
pub use asset::{AssetTask, ChainFactory};
pub use clean::CleanTask;
pub use command::CommandTask;
pub use reload::ReloadTask;
pub use serve::ServeTask;

/// Names reserved by built-in tasks and pipelines.
pub const BUILTIN_TASKS: &[&str] = &[
    "clean",
    "styles",
    "scripts",
    "images",
    "html",
    "fonts",
    "svg",
    "lintScripts",
    "lintStyles",
    "accessibilityCheck",
    "reload",
    "build",
    "serve",
    "default",
];

/// The asset tasks `build` runs concurrently after `clean`.
pub const BUILD_TASKS: &[&str] = &["styles", "scripts", "images", "html", "fonts"];

fn sources(mapping: &PathMapping) -> Result<SourceSet> {
    Ok(SourceSet::new(&mapping.src)?)
}

fn dest(mapping: &PathMapping) -> Option<PathBuf> {
    Some(PathBuf::from(&mapping.dest))
}

pub fn styles_task(cfg: &ConfigFile) -> Result<AssetTask> {
    let style = cfg.styles.output_style;
    let maps = cfg.styles.source_maps;
    let chain: ChainFactory = Box::new(move |ctx| {
        let mut chain = StageChain::new(StreamPolicy::FailOpen);
        if maps {
            chain = chain.stage(SourceMapBegin);
        }
        chain = chain.stage(CompileScss::new(style).with_root(ctx.root()));
        if maps {
            chain = chain.stage(SourceMapWrite::new());
        }
        Ok(chain)
    });
    Ok(AssetTask::new(
        "styles",
        sources(&cfg.paths.styles)?,
        dest(&cfg.paths.styles),
        NotifyMode::Stream,
        chain,
    ))
}

pub fn scripts_task(cfg: &ConfigFile) -> Result<AssetTask> {
    let bundle = cfg.scripts.bundle.clone();
    let maps = cfg.scripts.source_maps;
    let chain: ChainFactory = Box::new(move |_| {
        let mut chain = StageChain::new(StreamPolicy::FailFast);
        if maps {
            chain = chain.stage(SourceMapBegin);
        }
        chain = chain.stage(Concat::new(&bundle)).stage(MinifyJs);
        if maps {
            chain = chain.stage(SourceMapWrite::new());
        }
        Ok(chain)
    });
    Ok(AssetTask::new(
        "scripts",
        sources(&cfg.paths.scripts)?,
        dest(&cfg.paths.scripts),
        NotifyMode::Stream,
        chain,
    ))
}

pub fn images_task(cfg: &ConfigFile) -> Result<AssetTask> {
    let optimizer = ImageOptimizer::new(cfg.images.jpeg_quality);
    let chain: ChainFactory = Box::new(move |ctx| {
        Ok(StageChain::new(StreamPolicy::FailOpen)
            .stage(CachedOptimize::new(optimizer, ctx.image_cache())))
    });
    Ok(AssetTask::new(
        "images",
        sources(&cfg.paths.images)?,
        dest(&cfg.paths.images),
        NotifyMode::None,
        chain,
    ))
}

pub fn html_task(cfg: &ConfigFile) -> Result<AssetTask> {
    let chain: ChainFactory =
        Box::new(|_| Ok(StageChain::new(StreamPolicy::FailOpen).stage(MinifyHtml::default())));
    Ok(AssetTask::new(
        "html",
        sources(&cfg.paths.html)?,
        dest(&cfg.paths.html),
        NotifyMode::Reload,
        chain,
    ))
}

pub fn fonts_task(cfg: &ConfigFile) -> Result<AssetTask> {
    let chain: ChainFactory = Box::new(|_| Ok(StageChain::new(StreamPolicy::FailFast)));
    Ok(AssetTask::new(
        "fonts",
        sources(&cfg.paths.fonts)?,
        dest(&cfg.paths.fonts),
        NotifyMode::None,
        chain,
    ))
}

pub fn svg_task(cfg: &ConfigFile) -> Result<AssetTask> {
    let chain: ChainFactory =
        Box::new(|_| Ok(StageChain::new(StreamPolicy::FailOpen).stage(MinifySvg)));
    Ok(AssetTask::new(
        "svg",
        sources(&cfg.paths.svg)?,
        dest(&cfg.paths.svg),
        NotifyMode::None,
        chain,
    ))
}

pub fn lint_task(name: &'static str, target: LintTarget, mapping: &PathMapping) -> Result<AssetTask> {
    let chain: ChainFactory = Box::new(move |ctx| {
        let lint = &ctx.config().lint;
        let linter = Linter::new(target, lint)?.with_root(ctx.root());
        let stage = LintStage::new(name, linter, lint.fail_on).with_reports(ctx.reports().clone());
        Ok(StageChain::new(StreamPolicy::FailFast).stage(stage))
    });
    Ok(AssetTask::new(name, sources(mapping)?, None, NotifyMode::None, chain))
}

/// Build the registry for `cfg`: built-in tasks, `[command.*]` tasks,
/// `build`, `default` and user pipelines (dependencies first).
pub fn build_registry(cfg: &ConfigFile) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    registry.register("clean", Arc::new(CleanTask))?;
    registry.register("styles", Arc::new(styles_task(cfg)?))?;
    registry.register("scripts", Arc::new(scripts_task(cfg)?))?;
    registry.register("images", Arc::new(images_task(cfg)?))?;
    registry.register("html", Arc::new(html_task(cfg)?))?;
    registry.register("fonts", Arc::new(fonts_task(cfg)?))?;
    registry.register("svg", Arc::new(svg_task(cfg)?))?;
    registry.register(
        "lintScripts",
        Arc::new(lint_task("lintScripts", LintTarget::Scripts, &cfg.paths.scripts)?),
    )?;
    registry.register(
        "lintStyles",
        Arc::new(lint_task("lintStyles", LintTarget::Styles, &cfg.paths.styles)?),
    )?;
    registry.register(
        "accessibilityCheck",
        Arc::new(AccessibilityTask::new(sources(&cfg.accessibility_paths())?)),
    )?;
    registry.register("reload", Arc::new(ReloadTask))?;
    registry.register("serve", Arc::new(ServeTask))?;

    for (name, command) in &cfg.command {
        registry.register(name.as_str(), Arc::new(CommandTask::new(name, &command.cmd)))?;
    }

    let build = series(vec![
        registry.get("clean")?,
        parallel(registry.get_all(BUILD_TASKS)?),
    ]);
    registry.register("build", build)?;

    let default = series(vec![registry.get("build")?, registry.get("serve")?]);
    registry.register("default", default)?;

    for name in pipeline_build_order(&cfg.pipeline)? {
        let Some(pipeline) = cfg.pipeline.get(&name) else {
            continue;
        };
        let members = registry.get_all(pipeline.members())?;
        let composed: Arc<dyn Task> = if pipeline.series.is_some() {
            series(members)
        } else {
            parallel(members)
        };
        debug!(pipeline = %name, "registered user pipeline");
        registry.register(name, composed)?;
    }

    Ok(registry)
}
