//! pm_report — pure, offline rendering of a finished match into a
//! JSON and/or HTML summary (spec §9). No filesystem access, no
//! network calls: every renderer here is a plain function from an
//! already-computed [`model::ReportModel`] to bytes, exactly how the
//! teacher's own `vm_report` stays a pure renderer fed already-computed
//! artifacts.

pub mod model;

#[cfg(feature = "render_json")]
pub mod render_json;

#[cfg(feature = "render_html")]
pub mod render_html;

pub use model::{build_model, CoverBlock, PaperRow, ReportModel, SummaryBlock};

#[cfg(feature = "render_json")]
pub use render_json::render_json;

#[cfg(feature = "render_html")]
pub use render_html::render_html;
