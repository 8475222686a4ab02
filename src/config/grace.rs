use chrono::Duration;
use std::fmt;

pub const DEFAULT_GRACE_HOURS: f64 = 48.0;

/// A century. Keeps `now ± grace` well inside the range `DateTime<Utc>` can represent.
pub const MAX_GRACE_HOURS: f64 = 876_000.0;

/// Grace period granted to a contributor, in hours. Always positive, finite and at
/// most [`MAX_GRACE_HOURS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraceHours(f64);

impl GraceHours {
    /// Parses an externally supplied value, falling back to 48 hours on anything
    /// that is not a positive number up to [`MAX_GRACE_HOURS`]. Never fails.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            tracing::info!("Grace period not configured, using {}h", DEFAULT_GRACE_HOURS);
            return Self::default();
        };

        match raw.trim().parse::<f64>() {
            Ok(hours) if hours > 0.0 && hours <= MAX_GRACE_HOURS => {
                tracing::info!("Using grace period of {}h", hours);
                Self(hours)
            }
            Ok(hours) if hours > MAX_GRACE_HOURS => {
                tracing::warn!(
                    "Grace period '{}' exceeds {}h, using {}h",
                    raw,
                    MAX_GRACE_HOURS,
                    DEFAULT_GRACE_HOURS
                );
                Self::default()
            }
            Ok(_) => {
                tracing::warn!(
                    "Grace period '{}' must be a positive number, using {}h",
                    raw,
                    DEFAULT_GRACE_HOURS
                );
                Self::default()
            }
            Err(_) => {
                tracing::warn!(
                    "Grace period '{}' is not a number, using {}h",
                    raw,
                    DEFAULT_GRACE_HOURS
                );
                Self::default()
            }
        }
    }

    pub fn hours(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::milliseconds((self.0 * 3_600_000.0).round() as i64)
    }
}

impl Default for GraceHours {
    fn default() -> Self {
        Self(DEFAULT_GRACE_HOURS)
    }
}

impl fmt::Display for GraceHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
