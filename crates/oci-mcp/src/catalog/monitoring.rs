use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::monitoring::{self, LogSearch};
use serde_json::json;

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_alarms", "List monitoring alarms in a compartment")
            .param(compartment_id())
            .start("Listing alarms in compartment {compartment_id}...")
            .error("Error listing alarms")
            .run(|env, args| {
                Box::pin(async move { monitoring::list_alarms(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_alarm", "Get an alarm with its query and destinations")
            .param(Param::ocid("alarm_id", "OCID of the alarm"))
            .start("Getting alarm {alarm_id}...")
            .success("Retrieved alarm successfully")
            .error("Error getting alarm")
            .run(|env, args| {
                Box::pin(async move { monitoring::get_alarm(env.clients()?, args.str("alarm_id")?).await })
            }),
        ToolSpec::list("get_alarm_history", "Get the state or rule history of an alarm")
            .param(Param::ocid("alarm_id", "OCID of the alarm"))
            .param(
                Param::string("alarm_historytype", "STATE_HISTORY, STATE_TRANSITION_HISTORY or RULE_HISTORY")
                    .default(json!("STATE_HISTORY")),
            )
            .start("Getting history for alarm {alarm_id}...")
            .error("Error getting alarm history")
            .run(|env, args| {
                Box::pin(async move {
                    monitoring::get_alarm_history(env.clients()?, args.str("alarm_id")?, args.str("alarm_historytype")?)
                        .await
                })
            }),
        ToolSpec::list("list_metrics", "List metric definitions in a compartment")
            .param(compartment_id())
            .param(Param::string("namespace", "Metric namespace, e.g. oci_computeagent").optional())
            .start("Listing metrics in compartment {compartment_id}...")
            .error("Error listing metrics")
            .run(|env, args| {
                Box::pin(async move {
                    monitoring::list_metrics(env.clients()?, args.str("compartment_id")?, args.opt_str("namespace")?)
                        .await
                })
            }),
        ToolSpec::list("query_metric_data", "Run an MQL query over a time range")
            .param(compartment_id())
            .param(Param::string("query", "MQL expression, e.g. CpuUtilization[1m].mean()"))
            .param(Param::string("start_time", "RFC 3339 start of the range"))
            .param(Param::string("end_time", "RFC 3339 end of the range"))
            .param(Param::string("resolution", "Aggregation resolution").default(json!("1m")))
            .param(
                Param::string("namespace", "Metric namespace")
                    .default(json!(monitoring::DEFAULT_METRIC_NAMESPACE)),
            )
            .start("Querying metric data in compartment {compartment_id}...")
            .error("Error querying metric data")
            .run(|env, args| {
                Box::pin(async move {
                    monitoring::query_metric_data(
                        env.clients()?,
                        args.str("compartment_id")?,
                        args.str("query")?,
                        args.str("start_time")?,
                        args.str("end_time")?,
                        args.str("resolution")?,
                        args.opt_str("namespace")?,
                    )
                    .await
                })
            }),
        ToolSpec::list("search_logs", "Search logs with the logging query language")
            .param(Param::string("search_query", "Logging search query"))
            .param(Param::string("time_start", "RFC 3339 start of the search window"))
            .param(Param::string("time_end", "RFC 3339 end of the search window"))
            .param(
                Param::boolean("is_return_field_info", "Include field schema in the results")
                    .default(json!(false)),
            )
            .param(Param::integer("limit", "Maximum number of entries").optional())
            .start("Searching logs...")
            .success("Found {count} log entries")
            .error("Error searching logs")
            .run(|env, args| {
                Box::pin(async move {
                    let search = LogSearch {
                        search_query: args.str("search_query")?,
                        time_start: args.str("time_start")?,
                        time_end: args.str("time_end")?,
                        is_return_field_info: args.flag("is_return_field_info")?,
                        limit: args.opt_u64("limit")?,
                    };
                    monitoring::search_logs(env.clients()?, &search).await
                })
            }),
        ToolSpec::list("list_log_groups", "List log groups in a compartment")
            .param(compartment_id())
            .start("Listing log groups in compartment {compartment_id}...")
            .error("Error listing log groups")
            .run(|env, args| {
                Box::pin(async move {
                    monitoring::list_log_groups(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::list("list_logs", "List logs in a log group")
            .param(Param::ocid("log_group_id", "OCID of the log group"))
            .start("Listing logs in log group {log_group_id}...")
            .error("Error listing logs")
            .run(|env, args| {
                Box::pin(async move { monitoring::list_logs(env.clients()?, args.str("log_group_id")?).await })
            }),
    ]
}
