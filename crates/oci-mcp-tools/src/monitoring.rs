//! Alarms, metrics and logs.

use crate::error::ToolError;
use crate::projection::{Field, path, project_all, verbatim};
use crate::{fetch_all, fetch_one};
use chrono::{DateTime, SecondsFormat, Utc};
use oci_mcp_client::{ClientTable, Query};
use serde_json::{Map, Value, json};

/// Namespace sent with metric queries when the caller names none. The MQL
/// query itself usually pins the metric.
pub const DEFAULT_METRIC_NAMESPACE: &str = "oci_computeagent";

const ALARM: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("metric_compartment_id", "metricCompartmentId"),
    path("namespace", "namespace"),
    path("query", "query"),
    path("severity", "severity"),
    path("lifecycle_state", "lifecycleState"),
    path("is_enabled", "isEnabled"),
    path("destinations", "destinations"),
    path("time_created", "timeCreated"),
    path("time_updated", "timeUpdated"),
];

const ALARM_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("metric_compartment_id", "metricCompartmentId"),
    path("metric_compartment_id_in_subtree", "metricCompartmentIdInSubtree"),
    path("namespace", "namespace"),
    path("resource_group", "resourceGroup"),
    path("query", "query"),
    path("resolution", "resolution"),
    path("pending_duration", "pendingDuration"),
    path("severity", "severity"),
    path("body", "body"),
    path("is_enabled", "isEnabled"),
    path("lifecycle_state", "lifecycleState"),
    path("suppression", "suppression"),
    path("destinations", "destinations"),
    path("repeat_notification_duration", "repeatNotificationDuration"),
    path("time_created", "timeCreated"),
    path("time_updated", "timeUpdated"),
];

const ALARM_HISTORY_ENTRY: &[Field] = &[
    path("summary", "summary"),
    path("timestamp", "timestamp"),
    path("timestamp_triggered", "timestampTriggered"),
];

const METRIC: &[Field] = &[
    path("name", "name"),
    path("namespace", "namespace"),
    path("resource_group", "resourceGroup"),
    path("compartment_id", "compartmentId"),
    verbatim("dimensions", "dimensions"),
];

const METRIC_SERIES: &[Field] = &[
    path("namespace", "namespace"),
    path("resource_group", "resourceGroup"),
    path("compartment_id", "compartmentId"),
    path("name", "name"),
    verbatim("dimensions", "dimensions"),
    path("aggregated_datapoints", "aggregatedDatapoints"),
    path("resolution", "resolution"),
];

const LOG_ENTRY: &[Field] = &[path("time", "time"), verbatim("log_content", "data")];

const LOG_GROUP: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("description", "description"),
    path("compartment_id", "compartmentId"),
    path("time_created", "timeCreated"),
    path("time_last_modified", "timeLastModified"),
    path("lifecycle_state", "lifecycleState"),
];

const LOG: &[Field] = &[
    path("id", "id"),
    path("log_group_id", "logGroupId"),
    path("display_name", "displayName"),
    path("log_type", "logType"),
    path("lifecycle_state", "lifecycleState"),
    path("is_enabled", "isEnabled"),
    path("retention_duration", "retentionDuration"),
    path("compartment_id", "compartmentId"),
    path("time_created", "timeCreated"),
    path("time_last_modified", "timeLastModified"),
];

/// Parse an RFC 3339 timestamp (`2025-01-01T00:00:00Z`) and normalise it to UTC.
fn timestamp(name: &str, value: &str) -> Result<String, ToolError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
        .map_err(|e| ToolError::InvalidArgument(format!("{name} '{value}' is not an RFC 3339 timestamp: {e}")))
}

pub async fn list_alarms(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.monitoring,
        "/alarms",
        Query::new().with("compartmentId", compartment_id),
        ALARM,
    )
    .await
}

pub async fn get_alarm(clients: &ClientTable, alarm_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.monitoring, &format!("/alarms/{alarm_id}"), ALARM_DETAIL).await
}

/// `history_type` is one of `STATE_TRANSITION_HISTORY`, `STATE_HISTORY`,
/// `RULE_HISTORY`.
pub async fn get_alarm_history(
    clients: &ClientTable,
    alarm_id: &str,
    history_type: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.monitoring,
        &format!("/alarms/{alarm_id}/history"),
        Query::new().with("alarmHistorytype", history_type),
        ALARM_HISTORY_ENTRY,
    )
    .await
}

pub async fn list_metrics(
    clients: &ClientTable,
    compartment_id: &str,
    namespace: Option<&str>,
) -> Result<Value, ToolError> {
    let mut details = Map::new();
    details.insert("compartmentId".to_string(), json!(compartment_id));
    if let Some(ns) = namespace {
        details.insert("namespace".to_string(), json!(ns));
    }

    let metrics = clients
        .monitoring
        .post_all(
            "/metrics/actions/listMetrics",
            Query::new().with("compartmentId", compartment_id),
            Value::Object(details),
        )
        .await?;
    tracing::info!(compartment_id, count = metrics.len(), "Found metrics");
    Ok(project_all(&metrics, METRIC))
}

/// Run an MQL query over a time window.
pub async fn query_metric_data(
    clients: &ClientTable,
    compartment_id: &str,
    query: &str,
    start_time: &str,
    end_time: &str,
    resolution: &str,
    namespace: Option<&str>,
) -> Result<Value, ToolError> {
    let details = json!({
        "namespace": namespace.unwrap_or(DEFAULT_METRIC_NAMESPACE),
        "query": query,
        "startTime": timestamp("start_time", start_time)?,
        "endTime": timestamp("end_time", end_time)?,
        "resolution": resolution,
    });

    let series = clients
        .monitoring
        .post_all(
            "/metrics/actions/summarizeMetricsData",
            Query::new().with("compartmentId", compartment_id),
            details,
        )
        .await?;
    tracing::info!(series = series.len(), "Retrieved metric data");
    Ok(project_all(&series, METRIC_SERIES))
}

/// Log search parameters.
#[derive(Debug, Clone)]
pub struct LogSearch<'a> {
    pub search_query: &'a str,
    pub time_start: &'a str,
    pub time_end: &'a str,
    pub is_return_field_info: bool,
    pub limit: Option<u64>,
}

pub async fn search_logs(clients: &ClientTable, search: &LogSearch<'_>) -> Result<Value, ToolError> {
    let details = json!({
        "timeStart": timestamp("time_start", search.time_start)?,
        "timeEnd": timestamp("time_end", search.time_end)?,
        "searchQuery": search.search_query,
        "isReturnFieldInfo": search.is_return_field_info,
    });

    let results = clients
        .log_search
        .post_all(
            "/search",
            Query::new().with_opt("limit", search.limit.map(|l| l.to_string())),
            details,
        )
        .await?;
    tracing::info!(count = results.len(), "Found log entries");
    Ok(project_all(&results, LOG_ENTRY))
}

pub async fn list_log_groups(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.logging,
        "/logGroups",
        Query::new().with("compartmentId", compartment_id),
        LOG_GROUP,
    )
    .await
}

pub async fn list_logs(clients: &ClientTable, log_group_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.logging,
        &format!("/logGroups/{log_group_id}/logs"),
        Query::new(),
        LOG,
    )
    .await
}
