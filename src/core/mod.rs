pub mod classifier;
pub mod comments;
pub mod deadline;
pub mod reaper;

#[cfg(test)]
pub(crate) mod mock;

pub use crate::domain::model::{Indicator, IndicatorKind, PullRequestSnapshot, Severity, Verdict};
pub use crate::domain::ports::{ConfigProvider, PullRequestPlatform};
pub use crate::utils::error::Result;
