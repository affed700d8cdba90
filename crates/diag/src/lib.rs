mod catalog;
mod report;
mod snippet;
mod source;
mod style;

pub use catalog::{Code, DiagInfo, Griffure};
pub use report::{EmitError, Report, ReportBuilder};
pub use snippet::Excerpt;
pub use source::Source;
