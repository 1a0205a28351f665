use super::compartment_id;
use crate::args::Args;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::ToolError;
use oci_mcp_tools::cost::{self, UsageWindow};
use serde_json::json;

fn window_params() -> [Param; 3] {
    [
        Param::string("time_usage_started", "Start date, YYYY-MM-DD or RFC 3339"),
        Param::string("time_usage_ended", "End date, YYYY-MM-DD or RFC 3339"),
        Param::ocid("tenant_id", "OCID of the tenancy (defaults to the active profile's)").optional(),
    ]
}

fn window(args: &Args) -> Result<UsageWindow<'_>, ToolError> {
    Ok(UsageWindow {
        tenant_id: args.opt_str("tenant_id")?,
        started: args.str("time_usage_started")?,
        ended: args.str("time_usage_ended")?,
    })
}

pub(super) fn tools() -> Vec<ToolSpec> {
    let [started, ended, tenant] = window_params();
    let summary = ToolSpec::list("get_cost_usage_summary", "Summarised cost and usage over a date range")
        .param(started.clone())
        .param(ended.clone())
        .param(tenant.clone())
        .param(Param::string("granularity", "DAILY or MONTHLY").default(json!("DAILY")))
        .start("Getting cost usage summary from {time_usage_started} to {time_usage_ended}...")
        .error("Error getting cost usage summary")
        .run(|env, args| {
            Box::pin(async move {
                cost::get_cost_usage_summary(env.clients()?, &window(args)?, args.str("granularity")?).await
            })
        });

    vec![
        summary,
        ToolSpec::list("get_cost_by_service", "Total cost per service over a date range")
            .param(started.clone())
            .param(ended.clone())
            .param(tenant.clone())
            .start("Getting cost by service from {time_usage_started} to {time_usage_ended}...")
            .success("Found costs for {count} services")
            .error("Error getting cost by service")
            .run(|env, args| {
                Box::pin(async move { cost::get_cost_by_service(env.clients()?, &window(args)?).await })
            }),
        ToolSpec::list("get_cost_by_compartment", "Total cost per compartment over a date range")
            .param(started)
            .param(ended)
            .param(tenant)
            .start("Getting cost by compartment from {time_usage_started} to {time_usage_ended}...")
            .success("Found costs for {count} compartments")
            .error("Error getting cost by compartment")
            .run(|env, args| {
                Box::pin(async move { cost::get_cost_by_compartment(env.clients()?, &window(args)?).await })
            }),
        ToolSpec::list("list_budgets", "List budgets in a compartment")
            .param(compartment_id())
            .start("Listing budgets in compartment {compartment_id}...")
            .error("Error listing budgets")
            .run(|env, args| {
                Box::pin(async move { cost::list_budgets(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_budget", "Get a budget with its spend and forecast")
            .param(Param::ocid("budget_id", "OCID of the budget"))
            .start("Getting budget {budget_id}...")
            .success("Retrieved budget successfully")
            .error("Error getting budget")
            .run(|env, args| {
                Box::pin(async move { cost::get_budget(env.clients()?, args.str("budget_id")?).await })
            }),
    ]
}
