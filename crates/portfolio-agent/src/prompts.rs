//! Prompt templates for the LLM-backed modes

use crate::error::Result;
use minijinja::Environment;
use minijinja::value::Value;
use portfolio_core::{StepRecord, Ticker};
use serde_json::json;

const SYNTHESIS_TEMPLATE: &str = "\
You are a Senior Financial Analyst. Date: {{ date }}.

Based on the data below, provide an Executive Summary with:
1. Top Pick
2. Key Risks
3. Outlook

DATA:
{% for s in steps %}{{ s.step }}: {{ s.result }}
{% endfor %}";

const AUTONOMOUS_TEMPLATE: &str = "\
You are a Senior Portfolio Manager. Today is {{ date }}.

Your Goal: {{ query }}

STRICT INSTRUCTIONS:
1. Use 'fetch_portfolio_data' first.
2. Then use 'calculate_risk_metrics'.
3. Then forecast each stock.
4. Finally, write an Executive Summary.";

fn render(template: &str, vars: &serde_json::Value) -> Result<String> {
    let env = Environment::new();
    Ok(env.render_str(template, Value::from_serialize(vars))?)
}

/// Today's date the way the prompts show it, e.g. "March 04, 2025"
pub fn prompt_date() -> String {
    chrono::Local::now().format("%B %d, %Y").to_string()
}

/// Executive summary request embedding every `{step}: {result}` line in order
pub fn synthesis_prompt(date: &str, steps: &[StepRecord]) -> Result<String> {
    render(SYNTHESIS_TEMPLATE, &json!({ "date": date, "steps": steps }))
}

/// System instruction for the autonomous loop
pub fn autonomous_system_prompt(date: &str, query: &str) -> Result<String> {
    render(AUTONOMOUS_TEMPLATE, &json!({ "date": date, "query": query }))
}

/// The goal handed to the autonomous loop for a ticker list
pub fn autonomous_query(tickers: &[Ticker], days: u32) -> String {
    let list = tickers
        .iter()
        .map(Ticker::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Analyze {list}. Fetch data, calculate risk, forecast for {days} days, and compare.")
}
