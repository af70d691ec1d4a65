// src/filters/mod.rs

//! Stream stages used by the asset tasks.

pub mod a11y;
pub mod html;
pub mod images;
pub mod lint;
pub mod scripts;
pub mod styles;
pub mod svg;

pub use a11y::AccessibilityAudit;
pub use html::MinifyHtml;
pub use images::{CachedOptimize, ImageOptimizer};
pub use lint::{LintStage, LintTarget, Linter};
pub use scripts::{Concat, MinifyJs};
pub use styles::CompileScss;
pub use svg::MinifySvg;
