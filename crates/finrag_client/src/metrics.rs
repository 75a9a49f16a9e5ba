//! Display formatting for metrics snapshots. Absent or non-finite fields read
//! as zero so nothing ever prints as `null` or `NaN`.

use serde::Serialize;

use crate::messages::MetricsSnapshot;

/// Days used for the monthly cost projection.
const DAYS_PER_MONTH: f64 = 30.0;

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn format_count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_string()
}

pub fn format_seconds(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.2}s", v),
        None => "0s".to_string(),
    }
}

pub fn format_dollars(value: Option<f64>) -> String {
    format!("${:.4}", finite(value).unwrap_or(0.0))
}

pub fn format_percent(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.1}%", v),
        None => "0%".to_string(),
    }
}

/// Integer with `,` thousands separators.
pub fn format_tokens(value: Option<u64>) -> String {
    let digits = value.unwrap_or(0).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Client-side projection: cost per query × total queries × 30.
pub fn estimated_monthly_cost(snapshot: &MetricsSnapshot) -> f64 {
    let per_query = finite(snapshot.cost_per_query).unwrap_or(0.0);
    let queries = snapshot.total_queries.unwrap_or(0) as f64;
    per_query * queries * DAYS_PER_MONTH
}

/// Every dashboard value, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsDisplay {
    pub total_queries: String,
    pub avg_response_time: String,
    pub total_cost: String,
    pub success_rate: String,
    pub research_queries: String,
    pub financial_queries: String,
    pub summary_queries: String,
    pub agent_percentages: Vec<(String, String)>,
    pub fastest_query: String,
    pub slowest_query: String,
    pub total_documents: String,
    pub total_chunks: String,
    pub cost_per_query: String,
    pub estimated_monthly_cost: String,
    pub input_tokens: String,
    pub output_tokens: String,
}

impl From<&MetricsSnapshot> for MetricsDisplay {
    fn from(s: &MetricsSnapshot) -> Self {
        let usage = s.agent_usage.clone().unwrap_or_default();
        let agent_percentages = s
            .agent_percentages
            .iter()
            .flatten()
            .map(|(agent, pct)| (agent.clone(), format_percent(Some(*pct))))
            .collect();
        Self {
            total_queries: format_count(s.total_queries),
            avg_response_time: format_seconds(s.avg_response_time),
            total_cost: format_dollars(s.total_cost),
            success_rate: format_percent(s.success_rate),
            research_queries: format_count(usage.research),
            financial_queries: format_count(usage.financial),
            summary_queries: format_count(usage.summary),
            agent_percentages,
            fastest_query: format_seconds(s.fastest_query),
            slowest_query: format_seconds(s.slowest_query),
            total_documents: format_count(s.total_documents),
            total_chunks: format_count(s.total_chunks),
            cost_per_query: format_dollars(s.cost_per_query),
            estimated_monthly_cost: format!("${:.2}", estimated_monthly_cost(s)),
            input_tokens: format_tokens(s.total_input_tokens),
            output_tokens: format_tokens(s.total_output_tokens),
        }
    }
}
