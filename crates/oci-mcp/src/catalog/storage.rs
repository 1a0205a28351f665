use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::{resources, storage};

fn namespace_name() -> Param {
    Param::string(
        "namespace_name",
        "Object storage namespace (looked up when omitted)",
    )
    .optional()
}

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::scalar("get_namespace", "Get the tenancy's object storage namespace")
            .start("Getting object storage namespace...")
            .error("Error getting namespace")
            .run(|env, _args| Box::pin(async move { resources::get_namespace(env.clients()?).await })),
        ToolSpec::list("list_buckets", "List object storage buckets in a compartment")
            .param(compartment_id())
            .param(namespace_name())
            .start("Listing buckets in compartment {compartment_id}...")
            .error("Error listing buckets")
            .run(|env, args| {
                Box::pin(async move {
                    storage::list_buckets(env.clients()?, args.str("compartment_id")?, args.opt_str("namespace_name")?)
                        .await
                })
            }),
        ToolSpec::scalar("get_bucket", "Get details of an object storage bucket")
            .param(Param::string("bucket_name", "Name of the bucket"))
            .param(namespace_name())
            .start("Getting bucket {bucket_name}...")
            .success("Retrieved bucket details successfully")
            .error("Error getting bucket")
            .run(|env, args| {
                Box::pin(async move {
                    storage::get_bucket(env.clients()?, args.str("bucket_name")?, args.opt_str("namespace_name")?)
                        .await
                })
            }),
        ToolSpec::list("list_volumes", "List block volumes in a compartment")
            .param(compartment_id())
            .start("Listing block volumes in compartment {compartment_id}...")
            .error("Error listing block volumes")
            .run(|env, args| {
                Box::pin(async move { storage::list_volumes(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_volume", "Get details of a block volume")
            .param(Param::ocid("volume_id", "OCID of the volume"))
            .start("Getting block volume {volume_id}...")
            .success("Retrieved block volume details successfully")
            .error("Error getting block volume")
            .run(|env, args| {
                Box::pin(async move { storage::get_volume(env.clients()?, args.str("volume_id")?).await })
            }),
        ToolSpec::list("list_boot_volumes", "List boot volumes in an availability domain")
            .param(Param::string("availability_domain", "Name of the availability domain"))
            .param(compartment_id())
            .start("Listing boot volumes in {availability_domain}...")
            .error("Error listing boot volumes")
            .run(|env, args| {
                Box::pin(async move {
                    storage::list_boot_volumes(
                        env.clients()?,
                        args.str("availability_domain")?,
                        args.str("compartment_id")?,
                    )
                    .await
                })
            }),
        ToolSpec::scalar("get_boot_volume", "Get details of a boot volume")
            .param(Param::ocid("boot_volume_id", "OCID of the boot volume"))
            .start("Getting boot volume {boot_volume_id}...")
            .success("Retrieved boot volume details successfully")
            .error("Error getting boot volume")
            .run(|env, args| {
                Box::pin(async move { storage::get_boot_volume(env.clients()?, args.str("boot_volume_id")?).await })
            }),
        ToolSpec::list("list_file_systems", "List file systems in an availability domain")
            .param(compartment_id())
            .param(Param::string("availability_domain", "Name of the availability domain"))
            .start("Listing file systems in compartment {compartment_id}...")
            .error("Error listing file systems")
            .run(|env, args| {
                Box::pin(async move {
                    storage::list_file_systems(
                        env.clients()?,
                        args.str("compartment_id")?,
                        args.str("availability_domain")?,
                    )
                    .await
                })
            }),
        ToolSpec::scalar("get_file_system", "Get details of a file system")
            .param(Param::ocid("file_system_id", "OCID of the file system"))
            .start("Getting file system {file_system_id}...")
            .success("Retrieved file system details successfully")
            .error("Error getting file system")
            .run(|env, args| {
                Box::pin(async move { storage::get_file_system(env.clients()?, args.str("file_system_id")?).await })
            }),
    ]
}
