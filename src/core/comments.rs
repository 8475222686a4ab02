use crate::config::grace::GraceHours;
use crate::core::deadline;
use crate::domain::model::{Indicator, Verdict};
use chrono::{DateTime, Utc};

fn indicator_list(indicators: &[Indicator]) -> String {
    indicators
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Justification request. The deadline marker is always the last line.
pub fn justification(verdict: &Verdict, deadline: DateTime<Utc>, grace: GraceHours) -> String {
    let headline = if verdict.is_low_effort {
        "This pull request looks like a low-effort contribution."
    } else {
        "This pull request is missing context reviewers need."
    };

    format!(
        "## ⚠️ Justification needed\n\n\
         {headline}\n\n\
         ### What we noticed\n\n\
         {indicators}\n\n\
         ### What to do\n\n\
         1. Link the issue this change addresses (for example `Fixes #123`).\n\
         2. Explain in your own words what the change does and why it is needed.\n\
         3. Fill in the pull request template, including the checklist.\n\n\
         If this is not addressed within **{grace} hours** (by {when} UTC), \
         the pull request will be closed automatically. Pushing new commits also resets the clock.\n\n\
         {marker}",
        headline = headline,
        indicators = indicator_list(&verdict.indicators),
        grace = grace,
        when = deadline.format("%Y-%m-%d %H:%M"),
        marker = deadline::embed(deadline),
    )
}

pub fn suggestions(verdict: &Verdict) -> String {
    format!(
        "## 💡 Suggestions\n\n\
         Thanks for the contribution! A few things would make this easier to review:\n\n\
         {}\n\n\
         No action is required, these are suggestions only.",
        indicator_list(&verdict.indicators)
    )
}

pub fn closure(grace: GraceHours) -> String {
    format!(
        "## 🔒 Closed\n\n\
         This pull request was flagged as needing justification and saw no update \
         within the {} hour grace period, so it has been closed.\n\n\
         If this was a mistake, address the points in the earlier comment and open a new pull request.",
        grace
    )
}
