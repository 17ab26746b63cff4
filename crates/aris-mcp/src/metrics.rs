use std::collections::HashMap;
use std::fmt::Write as _;

use aris_engine::{AssessmentOutcome, SeverityTier, UnavailableReason};

pub(crate) const KNOWN_TOOLS: [&str; 3] = ["aris_assess", "aris_status", "aris_tiers"];
const UNKNOWN_TOOL_LABEL: &str = "unknown";

/// Label for a client-supplied tool name. Only served tools get their own
/// series.
fn tool_label(name: &str) -> &'static str {
    KNOWN_TOOLS
        .iter()
        .copied()
        .find(|known| *known == name)
        .unwrap_or(UNKNOWN_TOOL_LABEL)
}

#[derive(Debug, Default, Clone)]
struct ToolMetric {
    ok: u64,
    err: u64,
    total_latency_ms: f64,
    max_latency_ms: f64,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct MetricsRegistry {
    tool: HashMap<&'static str, ToolMetric>,
    tiers: HashMap<SeverityTier, u64>,
    model_unavailable: u64,
    prediction_failures: u64,
    rejected_readings: u64,
}

impl MetricsRegistry {
    pub(crate) fn record_tool(&mut self, tool: &str, latency_ms: f64, is_error: bool) {
        let entry = self.tool.entry(tool_label(tool)).or_default();
        if is_error {
            entry.err = entry.err.saturating_add(1);
        } else {
            entry.ok = entry.ok.saturating_add(1);
        }
        entry.total_latency_ms += latency_ms;
        entry.max_latency_ms = entry.max_latency_ms.max(latency_ms);
    }

    pub(crate) fn record_outcome(&mut self, outcome: &AssessmentOutcome) {
        match outcome {
            AssessmentOutcome::Assessed(assessment) => {
                let count = self.tiers.entry(assessment.tier).or_default();
                *count = count.saturating_add(1);
            }
            AssessmentOutcome::Unavailable(UnavailableReason::ModelUnavailable { .. }) => {
                self.model_unavailable = self.model_unavailable.saturating_add(1);
            }
            AssessmentOutcome::Unavailable(UnavailableReason::PredictionFailure { .. }) => {
                self.prediction_failures = self.prediction_failures.saturating_add(1);
            }
        }
    }

    pub(crate) fn record_rejected_reading(&mut self) {
        self.rejected_readings = self.rejected_readings.saturating_add(1);
    }

    pub(crate) fn assessed_total(&self) -> u64 {
        self.tiers.values().sum()
    }

    /// Prometheus text exposition.
    pub(crate) fn render_text(&self, engine_available: bool) -> String {
        let mut out = String::new();

        out.push_str("# HELP aris_engine_available Whether the failure classifier is loaded.\n");
        out.push_str("# TYPE aris_engine_available gauge\n");
        let _ = writeln!(out, "aris_engine_available {}", u8::from(engine_available));

        out.push_str("# HELP aris_assessments_total Completed assessments by tier.\n");
        out.push_str("# TYPE aris_assessments_total counter\n");
        for tier in SeverityTier::ALL {
            let count = self.tiers.get(&tier).copied().unwrap_or(0);
            let _ = writeln!(
                out,
                "aris_assessments_total{{tier=\"{}\"}} {count}",
                tier.as_str()
            );
        }

        out.push_str(
            "# HELP aris_assessments_unavailable_total Calls answered without an assessment.\n",
        );
        out.push_str("# TYPE aris_assessments_unavailable_total counter\n");
        let _ = writeln!(
            out,
            "aris_assessments_unavailable_total{{reason=\"model_unavailable\"}} {}",
            self.model_unavailable
        );
        let _ = writeln!(
            out,
            "aris_assessments_unavailable_total{{reason=\"prediction_failure\"}} {}",
            self.prediction_failures
        );

        out.push_str(
            "# HELP aris_rejected_readings_total Readings refused for out-of-range fields.\n",
        );
        out.push_str("# TYPE aris_rejected_readings_total counter\n");
        let _ = writeln!(out, "aris_rejected_readings_total {}", self.rejected_readings);

        let mut tools: Vec<_> = self.tool.iter().collect();
        tools.sort_by_key(|(name, _)| **name);

        out.push_str("# HELP aris_tool_calls_total Tool calls by status.\n");
        out.push_str("# TYPE aris_tool_calls_total counter\n");
        for (name, metric) in &tools {
            let _ = writeln!(
                out,
                "aris_tool_calls_total{{tool=\"{name}\",status=\"ok\"}} {}",
                metric.ok
            );
            let _ = writeln!(
                out,
                "aris_tool_calls_total{{tool=\"{name}\",status=\"error\"}} {}",
                metric.err
            );
        }

        out.push_str("# HELP aris_tool_latency_ms_max Slowest tool call observed.\n");
        out.push_str("# TYPE aris_tool_latency_ms_max gauge\n");
        for (name, metric) in &tools {
            let _ = writeln!(
                out,
                "aris_tool_latency_ms_max{{tool=\"{name}\"}} {:.3}",
                metric.max_latency_ms
            );
        }

        out.push_str("# HELP aris_tool_latency_ms_sum Total tool latency.\n");
        out.push_str("# TYPE aris_tool_latency_ms_sum counter\n");
        for (name, metric) in &tools {
            let _ = writeln!(
                out,
                "aris_tool_latency_ms_sum{{tool=\"{name}\"}} {:.3}",
                metric.total_latency_ms
            );
        }

        out
    }
}
