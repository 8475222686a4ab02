//! Heuristic classification of incoming pull requests.
//!
//! Every heuristic is a pure rule over [`Evidence`]; all rules run on every PR and the
//! verdict is folded from the full indicator list. Side effects live in [`Classifier`].

use crate::config::grace::GraceHours;
use crate::core::comments;
use crate::domain::model::{
    Indicator, IndicatorKind, PullRequest, PullRequestSnapshot, Severity, Verdict,
};
use crate::domain::ports::PullRequestPlatform;
use crate::utils::error::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

pub const NEEDS_JUSTIFICATION_LABEL: &str = "needs-justification";
pub const SPAM_SUSPECT_LABEL: &str = "hacktoberfest-spam-suspect";

pub const BURST_THRESHOLD: u64 = 3;
const MIN_EXPLANATION_CHARS: usize = 20;
const MAX_TEMPLATE_LINES: usize = 8;
const TRIVIAL_DOCS_CHANGES: u64 = 10;
const WHITESPACE_MIN_TOTAL: u64 = 100;
const WHITESPACE_MAX_NET: u64 = 10;
const WHITESPACE_MIN_EACH: u64 = 50;

const LOCKFILES: &[&str] = &[
    "package-lock.json",
    "npm-shrinkwrap.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.lock",
    "Gemfile.lock",
    "poetry.lock",
    "Pipfile.lock",
    "composer.lock",
    "go.sum",
    "mix.lock",
    "pubspec.lock",
    "Podfile.lock",
    "packages.lock.json",
    "flake.lock",
];

const DOC_EXTENSIONS: &[&str] = &[".md", ".txt", ".rst"];

static ISSUE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\d+").expect("issue reference pattern is valid"));

static CLOSING_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(closes|fixes|resolves)").expect("closing keyword pattern is valid")
});

static UNCHECKED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*[-*]\s+\[ \]").expect("unchecked item pattern is valid")
});

static CHECKED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*[-*]\s+\[[xX]\]").expect("checked item pattern is valid")
});

static EXPLAIN_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)explain\b.*?\bin your own words").expect("explain header pattern is valid")
});

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("html comment pattern is valid"));

static GENERIC_EXPLANATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:updated?|improved|fixed|enhanced|optimized)\s*(?:the)?\s*(?:code|readme|documentation|docs)|minor (?:fix|fixes|change|changes|update)|small (?:fix|change|changes)|(?:fix(?:ed)? )?(?:a )?typos?|formatting|(?:code )?clean ?up|see (?:the )?(?:title|description)|as per (?:the )?title|self[- ]explanatory|improvements?|bug ?fix)\.?$",
    )
    .expect("generic explanation pattern is valid")
});

static GENERIC_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:updated? (?:the )?readme(?:\.md)?|fix(?:ed)? (?:a )?typos?|formatting|updated?|updates|changes|minor (?:fix|fixes|change|changes|update)|small (?:fix|change)|improve (?:docs?|documentation)|add(?:ed)? (?:my )?name|updated? (?:the )?(?:docs|documentation)|update \S+\.(?:md|txt|rst)|patch[- ]?\d*)\.?$",
    )
    .expect("generic title pattern is valid")
});

/// Inputs to the rule table. `recent_pr_count` is `None` when the lookup failed or
/// was not attempted; rules treat that as "no signal".
#[derive(Debug, Clone)]
pub struct Evidence<'a> {
    pub snapshot: &'a PullRequestSnapshot,
    pub explanation: Option<String>,
    pub recent_pr_count: Option<u64>,
}

impl<'a> Evidence<'a> {
    pub fn new(snapshot: &'a PullRequestSnapshot, recent_pr_count: Option<u64>) -> Self {
        Self {
            snapshot,
            explanation: extract_explanation(&snapshot.pull_request.body),
            recent_pr_count,
        }
    }

    fn body(&self) -> &str {
        &self.snapshot.pull_request.body
    }
}

type Rule = fn(&Evidence) -> Option<Indicator>;

/// Evaluation order is display order.
const RULES: &[Rule] = &[
    missing_issue_link,
    unfilled_template,
    missing_explanation,
    generic_explanation,
    lockfile_only,
    trivial_docs_change,
    whitespace_only,
    single_word_change,
    generic_title,
    burst_authoring,
];

pub fn evaluate(evidence: &Evidence) -> Verdict {
    let indicators: Vec<Indicator> = RULES.iter().filter_map(|rule| rule(evidence)).collect();

    let is_low_effort = indicators.iter().any(|i| i.kind.is_low_effort_trigger());
    let critical = indicators
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .count();
    let no_linked_issue = indicators
        .iter()
        .any(|i| i.kind == IndicatorKind::MissingIssueLink);

    let needs_justification =
        is_low_effort || critical >= 2 || (indicators.len() >= 3 && no_linked_issue);

    Verdict {
        indicators,
        is_low_effort,
        needs_justification,
    }
}

/// Free text under the "explain ... in your own words" heading, up to the next
/// heading or list item. `None` when the body has no such section.
pub fn extract_explanation(body: &str) -> Option<String> {
    let body = HTML_COMMENT.replace_all(body, "");
    let mut lines = body.lines();

    let header = lines.by_ref().find(|line| EXPLAIN_HEADER.is_match(line))?;
    let header_end = EXPLAIN_HEADER.find(header)?.end();
    let inline = header[header_end..]
        .trim_start_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());

    let mut captured = vec![inline];
    captured.extend(lines.take_while(|line| !is_section_break(line)));

    Some(captured.join("\n").trim().to_string())
}

fn is_section_break(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#')
        || line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("+ ")
}

/// Late September through October.
pub fn in_seasonal_window(date: NaiveDate) -> bool {
    match date.month() {
        9 => date.day() >= 25,
        10 => true,
        _ => false,
    }
}

fn missing_issue_link(evidence: &Evidence) -> Option<Indicator> {
    let body = evidence.body();
    if ISSUE_REFERENCE.is_match(body) || CLOSING_KEYWORD.is_match(body) {
        return None;
    }
    Some(Indicator::new(
        IndicatorKind::MissingIssueLink,
        Severity::Critical,
        "No linked issue: reference one with `#<number>` or `Fixes #<number>`",
    ))
}

fn unfilled_template(evidence: &Evidence) -> Option<Indicator> {
    let body = evidence.body();
    let non_blank = body.lines().filter(|l| !l.trim().is_empty()).count();

    let unfilled = UNCHECKED_ITEM.is_match(body)
        && !CHECKED_ITEM.is_match(body)
        && non_blank < MAX_TEMPLATE_LINES;

    unfilled.then(|| {
        Indicator::new(
            IndicatorKind::UnfilledTemplate,
            Severity::Critical,
            "The pull request template was left unfilled (no checklist item is ticked)",
        )
    })
}

fn missing_explanation(evidence: &Evidence) -> Option<Indicator> {
    let too_short = evidence
        .explanation
        .as_deref()
        .map_or(true, |text| text.chars().count() < MIN_EXPLANATION_CHARS);

    too_short.then(|| {
        Indicator::new(
            IndicatorKind::MissingExplanation,
            Severity::Critical,
            "Missing or minimal explanation of the change in your own words",
        )
    })
}

fn generic_explanation(evidence: &Evidence) -> Option<Indicator> {
    let text = evidence.explanation.as_deref()?.trim();
    GENERIC_EXPLANATION.is_match(text).then(|| {
        Indicator::new(
            IndicatorKind::GenericExplanation,
            Severity::Warning,
            format!("The explanation is generic (\"{}\")", text),
        )
    })
}

fn lockfile_only(evidence: &Evidence) -> Option<Indicator> {
    let files = &evidence.snapshot.files;
    let only_lockfiles = !files.is_empty()
        && files
            .iter()
            .all(|f| LOCKFILES.iter().any(|lock| f.filename.ends_with(lock)));

    only_lockfiles.then(|| {
        Indicator::new(
            IndicatorKind::LockfileOnly,
            Severity::Critical,
            "Only dependency lock files were changed",
        )
    })
}

fn trivial_docs_change(evidence: &Evidence) -> Option<Indicator> {
    let snapshot = evidence.snapshot;
    let docs_only = !snapshot.files.is_empty()
        && snapshot.files.iter().all(|f| {
            let name = f.filename.to_ascii_lowercase();
            DOC_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        });
    let total = snapshot.total_changes();

    (docs_only && total < TRIVIAL_DOCS_CHANGES).then(|| {
        Indicator::new(
            IndicatorKind::TrivialDocsChange,
            Severity::Critical,
            format!("Documentation-only change touching {} line(s)", total),
        )
    })
}

fn whitespace_only(evidence: &Evidence) -> Option<Indicator> {
    let snapshot = evidence.snapshot;
    let additions = snapshot.total_additions();
    let deletions = snapshot.total_deletions();

    let suspicious = snapshot.total_changes() > WHITESPACE_MIN_TOTAL
        && additions.abs_diff(deletions) < WHITESPACE_MAX_NET
        && additions > WHITESPACE_MIN_EACH
        && deletions > WHITESPACE_MIN_EACH;

    suspicious.then(|| {
        Indicator::new(
            IndicatorKind::WhitespaceOnly,
            Severity::Critical,
            format!(
                "Looks like a whitespace or formatting-only change (+{} / -{})",
                additions, deletions
            ),
        )
    })
}

fn single_word_change(evidence: &Evidence) -> Option<Indicator> {
    let snapshot = evidence.snapshot;
    let single = snapshot.total_changes() == 2
        && snapshot.total_additions() == 1
        && snapshot.total_deletions() == 1;

    single.then(|| {
        Indicator::new(
            IndicatorKind::SingleWordChange,
            Severity::Critical,
            "Single-line change, likely a one-word or typo edit",
        )
    })
}

fn generic_title(evidence: &Evidence) -> Option<Indicator> {
    let title = evidence.snapshot.pull_request.title.trim();
    GENERIC_TITLE.is_match(title).then(|| {
        Indicator::new(
            IndicatorKind::GenericTitle,
            Severity::Warning,
            format!("Generic title (\"{}\")", title),
        )
    })
}

fn burst_authoring(evidence: &Evidence) -> Option<Indicator> {
    let count = evidence.recent_pr_count?;
    (count >= BURST_THRESHOLD).then(|| {
        Indicator::new(
            IndicatorKind::BurstAuthoring,
            Severity::Warning,
            format!(
                "@{} opened {} pull requests in this repository within the last day",
                evidence.snapshot.pull_request.author, count
            ),
        )
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Labelled and asked for justification by `deadline`.
    Justification {
        deadline: DateTime<Utc>,
        spam_suspect: bool,
    },
    Suggestions,
    NoAction,
}

#[derive(Debug, Clone)]
pub struct ClassifyOutcome {
    pub verdict: Verdict,
    pub action: Action,
}

pub struct Classifier<P: PullRequestPlatform> {
    platform: P,
    grace: GraceHours,
    dry_run: bool,
}

impl<P: PullRequestPlatform> Classifier<P> {
    pub fn new(platform: P, grace: GraceHours) -> Self {
        Self {
            platform,
            grace,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn classify_number(&self, number: u64, now: DateTime<Utc>) -> Result<ClassifyOutcome> {
        let pull_request = self.platform.get_pull_request(number).await?;
        self.classify(pull_request, now).await
    }

    /// Completes the snapshot for `pull_request`, evaluates it and applies the outcome.
    pub async fn classify(
        &self,
        pull_request: PullRequest,
        now: DateTime<Utc>,
    ) -> Result<ClassifyOutcome> {
        let number = pull_request.number;
        let files = self.platform.list_files(number).await?;
        let commits = self.platform.list_commits(number).await?;
        let recent_pr_count = self.recent_pr_count(&pull_request.author, now).await;

        let snapshot = PullRequestSnapshot {
            pull_request,
            files,
            commits,
        };
        tracing::debug!(
            "PR #{}: {} file(s), {} commit(s), +{} / -{}",
            number,
            snapshot.files.len(),
            snapshot.commits.len(),
            snapshot.total_additions(),
            snapshot.total_deletions()
        );

        let verdict = evaluate(&Evidence::new(&snapshot, recent_pr_count));
        tracing::info!(
            pr = number,
            indicators = verdict.indicators.len(),
            critical = verdict.critical_count(),
            low_effort = verdict.is_low_effort,
            needs_justification = verdict.needs_justification,
            "Classified pull request"
        );

        let action = self.act(number, &verdict, now).await?;
        Ok(ClassifyOutcome { verdict, action })
    }

    /// Lookup failures are swallowed: the signal is simply absent.
    async fn recent_pr_count(&self, author: &str, now: DateTime<Utc>) -> Option<u64> {
        let since = (now - Duration::hours(24)).date_naive();
        match self
            .platform
            .count_pull_requests_by_author_since(author, since)
            .await
        {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::debug!("Skipping burst-authoring signal for @{}: {}", author, e);
                None
            }
        }
    }

    async fn act(&self, number: u64, verdict: &Verdict, now: DateTime<Utc>) -> Result<Action> {
        if verdict.needs_justification {
            let deadline = now + self.grace.as_duration();
            let spam_suspect = verdict.is_low_effort && in_seasonal_window(now.date_naive());

            let mut labels = vec![NEEDS_JUSTIFICATION_LABEL];
            if spam_suspect {
                labels.push(SPAM_SUSPECT_LABEL);
            }
            let body = comments::justification(verdict, deadline, self.grace);

            if self.dry_run {
                tracing::info!("[dry-run] Would label PR #{} with {:?}", number, labels);
                tracing::info!("[dry-run] Would request justification by {}", deadline);
            } else {
                self.platform.add_labels(number, &labels).await?;
                self.platform.create_comment(number, &body).await?;
                tracing::info!("PR #{} needs justification by {}", number, deadline);
            }

            return Ok(Action::Justification {
                deadline,
                spam_suspect,
            });
        }

        if !verdict.indicators.is_empty() {
            if self.dry_run {
                tracing::info!("[dry-run] Would post suggestions on PR #{}", number);
            } else {
                self.platform
                    .create_comment(number, &comments::suggestions(verdict))
                    .await?;
                tracing::info!("Posted suggestions on PR #{}", number);
            }
            return Ok(Action::Suggestions);
        }

        tracing::info!("PR #{} looks fine, nothing to do", number);
        Ok(Action::NoAction)
    }
}
