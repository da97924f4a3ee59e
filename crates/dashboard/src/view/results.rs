//! Results panel: verdict banner, summary and collapsible record lists.

use std::fmt;

use mfw_core::workflow::{ResultsPayload, Verdict};
use mfw_core::WorkflowId;
use mfw_poller::PollState;

use super::{Badge, RetryNotice, NEUTRAL_COLOR};

/// The engine answers 409 on the results feed until the workflow is done.
const NOT_READY_STATUS: u16 = 409;

/// Banner color for a verdict.
pub fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "#22c55e",
        Verdict::Warning => "#eab308",
        Verdict::Fail => "#ef4444",
        Verdict::Unknown => NEUTRAL_COLOR,
    }
}

/// A titled, collapsible list of opaque records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub label: &'static str,
    pub items: usize,
    /// Records pretty-printed as JSON.
    pub body: String,
}

impl Disclosure {
    /// `None` for an empty list: empty disclosures are not shown.
    pub fn of(label: &'static str, records: &[serde_json::Value]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let body = serde_json::to_string_pretty(records).unwrap_or_default();
        Some(Self {
            label,
            items: records.len(),
            body,
        })
    }
}

impl fmt::Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "> {} ({})", self.label, self.items)?;
        for line in self.body.lines() {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    /// No workflow selected.
    Inactive,
    /// Polling, but the engine has not published a result yet.
    Awaiting {
        workflow_id: WorkflowId,
        retry: Option<RetryNotice>,
    },
    Ready {
        workflow_id: WorkflowId,
        banner: Badge,
        summary: String,
        outliers: Option<Disclosure>,
        trends: Option<Disclosure>,
        unstable_sensors: Vec<String>,
        retry: Option<RetryNotice>,
    },
}

impl ResultsView {
    pub fn project(key: Option<&WorkflowId>, state: &PollState<ResultsPayload>) -> Self {
        let Some(workflow_id) = key.cloned() else {
            return Self::Inactive;
        };
        let retry = RetryNotice::from_state(state, &[NOT_READY_STATUS]);

        let Some(result) = state.data.as_ref().and_then(|p| p.result.as_ref()) else {
            return Self::Awaiting { workflow_id, retry };
        };

        let banner = match result.verdict {
            Some(v) => Badge::new(v.as_str(), verdict_color(v)),
            None => Badge::new("NO VERDICT", NEUTRAL_COLOR),
        };

        Self::Ready {
            workflow_id,
            banner,
            summary: result.summary.clone(),
            outliers: Disclosure::of("Outliers", &result.outliers),
            trends: Disclosure::of("Trends", &result.trends),
            unstable_sensors: result.unstable_sensors.clone(),
            retry,
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => Ok(()),
            Self::Awaiting { retry, .. } => {
                // Hidden until a result exists; only surface real trouble.
                if let Some(retry) = retry {
                    writeln!(f, "== Results ==")?;
                    writeln!(f, "  {retry}")?;
                }
                Ok(())
            }
            Self::Ready {
                banner,
                summary,
                outliers,
                trends,
                unstable_sensors,
                retry,
                ..
            } => {
                writeln!(f, "== Results ==")?;
                writeln!(f, "Verdict: {banner}")?;
                writeln!(f, "{summary}")?;
                if !unstable_sensors.is_empty() {
                    writeln!(f, "Unstable sensors: {}", unstable_sensors.join(", "))?;
                }
                if let Some(outliers) = outliers {
                    write!(f, "{outliers}")?;
                }
                if let Some(trends) = trends {
                    write!(f, "{trends}")?;
                }
                if let Some(retry) = retry {
                    writeln!(f, "  {retry}")?;
                }
                Ok(())
            }
        }
    }
}
