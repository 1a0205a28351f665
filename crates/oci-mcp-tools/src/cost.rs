//! Cost and usage reports and budgets.

use crate::error::ToolError;
use crate::projection::{Field, lookup, lookup_str, path, project_all};
use crate::{compartment_or_tenancy, fetch_all, fetch_one};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use oci_mcp_client::{ClientTable, Query};
use serde_json::{Value, json};
use std::collections::HashMap;

const USAGE: &[Field] = &[
    path("time_usage_started", "timeUsageStarted"),
    path("time_usage_ended", "timeUsageEnded"),
    path("computed_amount", "computedAmount"),
    path("computed_quantity", "computedQuantity"),
    path("currency", "currency"),
    path("service", "service"),
    path("resource_name", "resourceName"),
    path("compartment_name", "compartmentName"),
    path("compartment_id", "compartmentId"),
    path("unit", "unit"),
];

const BUDGET: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("target_compartment_id", "targetCompartmentId"),
    path("amount", "amount"),
    path("reset_period", "resetPeriod"),
    path("lifecycle_state", "lifecycleState"),
    path("alert_rule_count", "alertRuleCount"),
    path("time_created", "timeCreated"),
    path("actual_spend", "actualSpend"),
    path("forecasted_spend", "forecastedSpend"),
    path("time_spend_computed", "timeSpendComputed"),
];

const BUDGET_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("description", "description"),
    path("compartment_id", "compartmentId"),
    path("target_compartment_id", "targetCompartmentId"),
    path("target_type", "targetType"),
    path("targets", "targets"),
    path("amount", "amount"),
    path("reset_period", "resetPeriod"),
    path(
        "budget_processing_period_start_offset",
        "budgetProcessingPeriodStartOffset",
    ),
    path("processing_period_type", "processingPeriodType"),
    path("lifecycle_state", "lifecycleState"),
    path("alert_rule_count", "alertRuleCount"),
    path("version", "version"),
    path("actual_spend", "actualSpend"),
    path("forecasted_spend", "forecastedSpend"),
    path("time_spend_computed", "timeSpendComputed"),
    path("time_created", "timeCreated"),
    path("time_updated", "timeUpdated"),
];

/// Report window. Dates may be given as `YYYY-MM-DD` or as full RFC 3339
/// timestamps; the usage API wants midnight-aligned UTC timestamps.
#[derive(Debug, Clone, Copy)]
pub struct UsageWindow<'a> {
    pub tenant_id: Option<&'a str>,
    pub started: &'a str,
    pub ended: &'a str,
}

fn usage_date(name: &str, value: &str) -> Result<String, ToolError> {
    let date = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc).date_naive())
            .map_err(|_| {
                ToolError::InvalidArgument(format!(
                    "{name} '{value}' is neither YYYY-MM-DD nor an RFC 3339 timestamp"
                ))
            })?,
    };
    Ok(date
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}

async fn summarized_usages(
    clients: &ClientTable,
    window: &UsageWindow<'_>,
    granularity: &str,
    group_by: Option<&str>,
) -> Result<Vec<Value>, ToolError> {
    let mut details = json!({
        "tenantId": compartment_or_tenancy(clients, window.tenant_id),
        "timeUsageStarted": usage_date("time_usage_started", window.started)?,
        "timeUsageEnded": usage_date("time_usage_ended", window.ended)?,
        "granularity": granularity,
    });
    match group_by {
        Some(key) => details["groupBy"] = json!([key]),
        None => details["isAggregateByTime"] = json!(true),
    }

    Ok(clients
        .usage_api
        .post_all("/usage", Query::new(), details)
        .await?)
}

fn amount(item: &Value) -> f64 {
    match lookup(item, "computedAmount") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Sum `computedAmount` per group key, keeping first-seen order.
fn totals_by(items: &[Value], key: &str, first: impl Fn(&Value) -> Value) -> Vec<Value> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Value> = Vec::new();

    for item in items {
        let group = lookup_str(item, key).unwrap_or_default().to_string();
        let slot = *index.entry(group).or_insert_with(|| {
            groups.push(first(item));
            groups.len() - 1
        });
        let total = groups[slot]["total_cost"].as_f64().unwrap_or(0.0) + amount(item);
        groups[slot]["total_cost"] = json!(total);
    }
    groups
}

/// Usage line items, aggregated over time.
pub async fn get_cost_usage_summary(
    clients: &ClientTable,
    window: &UsageWindow<'_>,
    granularity: &str,
) -> Result<Value, ToolError> {
    let items = summarized_usages(clients, window, granularity, None).await?;
    tracing::info!(count = items.len(), "Retrieved usage summaries");
    Ok(project_all(&items, USAGE))
}

pub async fn get_cost_by_service(
    clients: &ClientTable,
    window: &UsageWindow<'_>,
) -> Result<Value, ToolError> {
    let items = summarized_usages(clients, window, "DAILY", Some("service")).await?;
    let totals = totals_by(&items, "service", |item| {
        json!({
            "service": lookup_str(item, "service"),
            "total_cost": 0.0,
            "currency": lookup_str(item, "currency"),
            "unit": lookup_str(item, "unit"),
        })
    });
    tracing::info!(services = totals.len(), "Aggregated cost by service");
    Ok(Value::Array(totals))
}

pub async fn get_cost_by_compartment(
    clients: &ClientTable,
    window: &UsageWindow<'_>,
) -> Result<Value, ToolError> {
    let items = summarized_usages(clients, window, "DAILY", Some("compartmentName")).await?;
    let totals = totals_by(&items, "compartmentName", |item| {
        json!({
            "compartment_name": lookup_str(item, "compartmentName"),
            "compartment_id": lookup_str(item, "compartmentId"),
            "total_cost": 0.0,
            "currency": lookup_str(item, "currency"),
        })
    });
    tracing::info!(compartments = totals.len(), "Aggregated cost by compartment");
    Ok(Value::Array(totals))
}

pub async fn list_budgets(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.budget,
        "/budgets",
        Query::new().with("compartmentId", compartment_id),
        BUDGET,
    )
    .await
}

pub async fn get_budget(clients: &ClientTable, budget_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.budget, &format!("/budgets/{budget_id}"), BUDGET_DETAIL).await
}
