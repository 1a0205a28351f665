use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::database::{self, NodeRestart, SystemPower};
use serde_json::json;

fn db_node_id() -> Param {
    Param::ocid("db_node_id", "OCID of the DB node")
}

fn soft() -> Param {
    Param::boolean("soft", "Graceful SOFTSTOP instead of a hard STOP").default(json!(true))
}

fn restart(
    name: &'static str,
    description: &'static str,
    start: &'static str,
    error: &'static str,
    kind: NodeRestart,
) -> ToolSpec {
    ToolSpec::scalar(name, description)
        .param(db_node_id())
        .start(start)
        .error(error)
        .destructive()
        .run(move |env, args| {
            Box::pin(async move {
                database::restart_db_node(env.clients()?, args.str("db_node_id")?, kind).await
            })
        })
}

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_db_systems", "List DB systems in a compartment")
            .param(compartment_id())
            .start("Listing DB Systems in compartment {compartment_id}...")
            .error("Error listing DB Systems")
            .run(|env, args| {
                Box::pin(async move {
                    database::list_db_systems(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar("get_db_system", "Get details of a DB system")
            .param(Param::ocid("db_system_id", "OCID of the DB system"))
            .start("Getting DB System {db_system_id}...")
            .success("Retrieved DB System successfully")
            .error("Error getting DB System")
            .run(|env, args| {
                Box::pin(async move { database::get_db_system(env.clients()?, args.str("db_system_id")?).await })
            }),
        ToolSpec::list(
            "list_db_nodes",
            "List DB nodes in a compartment, for one DB system or for all of them",
        )
        .param(compartment_id())
        .param(Param::ocid("db_system_id", "OCID of the DB system").optional())
        .start("Listing DB Nodes in compartment {compartment_id}...")
        .error("Error listing DB Nodes")
        .run(|env, args| {
            Box::pin(async move {
                database::list_db_nodes(env.clients()?, args.str("compartment_id")?, args.opt_str("db_system_id")?)
                    .await
            })
        }),
        ToolSpec::scalar("get_db_node", "Get details of a DB node")
            .param(db_node_id())
            .start("Getting DB Node {db_node_id}...")
            .success("Retrieved DB Node successfully")
            .error("Error getting DB Node")
            .run(|env, args| {
                Box::pin(async move { database::get_db_node(env.clients()?, args.str("db_node_id")?).await })
            }),
        ToolSpec::scalar("start_db_node", "Start a stopped DB node and wait until it is available")
            .param(db_node_id())
            .start("Starting DB Node {db_node_id}...")
            .error("Error starting DB Node")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    database::start_db_node(env.clients()?, args.str("db_node_id")?, &env.poll).await
                })
            }),
        ToolSpec::scalar("stop_db_node", "Stop an available DB node and wait until it is stopped")
            .param(db_node_id())
            .param(soft())
            .start("Stopping DB Node {db_node_id}...")
            .error("Error stopping DB Node")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    database::stop_db_node(env.clients()?, args.str("db_node_id")?, args.flag("soft")?, &env.poll)
                        .await
                })
            }),
        restart(
            "reboot_db_node",
            "Reboot an available DB node",
            "Rebooting DB Node {db_node_id}...",
            "Error rebooting DB Node",
            NodeRestart::Reboot,
        ),
        restart(
            "reset_db_node",
            "Hard reset an available DB node",
            "Resetting DB Node {db_node_id}...",
            "Error resetting DB Node",
            NodeRestart::Reset,
        ),
        restart(
            "softreset_db_node",
            "Soft reset (graceful reboot) an available DB node",
            "Soft resetting DB Node {db_node_id}...",
            "Error soft resetting DB Node",
            NodeRestart::SoftReset,
        ),
        ToolSpec::scalar("start_db_system", "Start every DB node of a DB system")
            .param(Param::ocid("db_system_id", "OCID of the DB system"))
            .param(compartment_id())
            .start("Starting all DB Nodes for DB System {db_system_id} in compartment {compartment_id}...")
            .error("Error starting DB System nodes")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    database::power_db_system(
                        env.clients()?,
                        args.str("db_system_id")?,
                        args.str("compartment_id")?,
                        SystemPower::Start,
                        &env.poll,
                    )
                    .await
                })
            }),
        ToolSpec::scalar("stop_db_system", "Stop every DB node of a DB system")
            .param(Param::ocid("db_system_id", "OCID of the DB system"))
            .param(compartment_id())
            .param(soft())
            .start("Stopping all DB Nodes for DB System {db_system_id} in compartment {compartment_id}...")
            .error("Error stopping DB System nodes")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    let power = SystemPower::Stop { soft: args.flag("soft")? };
                    database::power_db_system(
                        env.clients()?,
                        args.str("db_system_id")?,
                        args.str("compartment_id")?,
                        power,
                        &env.poll,
                    )
                    .await
                })
            }),
        ToolSpec::list("list_databases", "List databases in a compartment, optionally for one DB system")
            .param(compartment_id())
            .param(Param::ocid("db_system_id", "OCID of the DB system").optional())
            .start("Listing databases in compartment {compartment_id}...")
            .error("Error listing databases")
            .run(|env, args| {
                Box::pin(async move {
                    database::list_databases(env.clients()?, args.str("compartment_id")?, args.opt_str("db_system_id")?)
                        .await
                })
            }),
        ToolSpec::scalar("get_database", "Get details of a database")
            .param(Param::ocid("database_id", "OCID of the database"))
            .start("Getting database {database_id}...")
            .success("Retrieved database successfully")
            .error("Error getting database")
            .run(|env, args| {
                Box::pin(async move { database::get_database(env.clients()?, args.str("database_id")?).await })
            }),
        ToolSpec::list("list_autonomous_databases", "List autonomous databases in a compartment")
            .param(compartment_id())
            .start("Listing autonomous databases in compartment {compartment_id}...")
            .error("Error listing autonomous databases")
            .run(|env, args| {
                Box::pin(async move {
                    database::list_autonomous_databases(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar("get_autonomous_database", "Get details of an autonomous database")
            .param(Param::ocid("autonomous_database_id", "OCID of the autonomous database"))
            .start("Getting autonomous database {autonomous_database_id}...")
            .success("Retrieved autonomous database successfully")
            .error("Error getting autonomous database")
            .run(|env, args| {
                Box::pin(async move {
                    database::get_autonomous_database(env.clients()?, args.str("autonomous_database_id")?).await
                })
            }),
    ]
}
