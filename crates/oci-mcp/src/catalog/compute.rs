use super::compartment_id;
use crate::args::Args;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::ToolError;
use oci_mcp_tools::compute::{self, LaunchSpec};
use serde_json::json;

fn launch_spec(args: &Args) -> Result<LaunchSpec, ToolError> {
    Ok(LaunchSpec {
        compartment_id: args.str("compartment_id")?.to_string(),
        availability_domain: args.str("availability_domain")?.to_string(),
        shape: args.str("shape")?.to_string(),
        image_id: args.str("image_id")?.to_string(),
        subnet_id: args.str("subnet_id")?.to_string(),
        display_name: args.opt_str("display_name")?.map(str::to_string),
        ssh_authorized_keys: args.opt_str("ssh_authorized_keys")?.map(str::to_string),
        ocpus: args.opt_f64("ocpus")?,
        memory_in_gbs: args.opt_f64("memory_in_gbs")?,
        boot_volume_size_in_gbs: args.opt_u64("boot_volume_size_in_gbs")?,
        assign_public_ip: args.flag("assign_public_ip")?,
        cloud_init_commands: args.str_list("cloud_init_commands")?,
        cloud_init_packages: args.str_list("cloud_init_packages")?,
    })
}

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_instances", "List all compute instances in a compartment")
            .param(compartment_id())
            .start("Listing instances in compartment {compartment_id}...")
            .error("Error listing instances")
            .run(|env, args| {
                Box::pin(async move {
                    compute::list_instances(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar(
            "get_instance",
            "Get details of a compute instance, including its VNIC attachments",
        )
        .param(Param::ocid("instance_id", "OCID of the instance"))
        .start("Getting details for instance {instance_id}...")
        .success("Retrieved instance details successfully")
        .error("Error getting instance details")
        .run(|env, args| {
            Box::pin(async move { compute::get_instance(env.clients()?, args.str("instance_id")?).await })
        }),
        ToolSpec::scalar("start_instance", "Start a stopped compute instance")
            .param(Param::ocid("instance_id", "OCID of the instance to start"))
            .start("Starting instance {instance_id}...")
            .error("Error starting instance")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    compute::start_instance(env.clients()?, args.str("instance_id")?).await
                })
            }),
        ToolSpec::scalar("stop_instance", "Stop a running compute instance")
            .param(Param::ocid("instance_id", "OCID of the instance to stop"))
            .param(
                Param::boolean("force", "Hard stop (STOP) instead of a graceful SOFTSTOP")
                    .default(json!(false)),
            )
            .start("Stopping instance {instance_id}...")
            .error("Error stopping instance")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    compute::stop_instance(env.clients()?, args.str("instance_id")?, args.flag("force")?)
                        .await
                })
            }),
        ToolSpec::scalar(
            "create_instance",
            "Launch a compute instance from an image into a subnet, optionally with cloud-init commands and packages",
        )
        .param(compartment_id())
        .param(Param::string("availability_domain", "Availability domain to launch in"))
        .param(Param::string("shape", "Shape name, e.g. VM.Standard.E4.Flex"))
        .param(Param::ocid("image_id", "OCID of the image to boot from"))
        .param(Param::ocid("subnet_id", "OCID of the subnet for the primary VNIC"))
        .param(Param::string("display_name", "Name of the instance").optional())
        .param(Param::string("ssh_authorized_keys", "Public SSH key(s) for the default user").optional())
        .param(Param::number("ocpus", "OCPU count (flex shapes)").optional())
        .param(Param::number("memory_in_gbs", "Memory in GB (flex shapes)").optional())
        .param(Param::integer("boot_volume_size_in_gbs", "Boot volume size in GB").optional())
        .param(Param::boolean("assign_public_ip", "Assign a public IP to the primary VNIC").default(json!(true)))
        .param(Param::string_list("cloud_init_commands", "Commands to run on first boot").optional())
        .param(Param::string_list("cloud_init_packages", "Packages to install on first boot").optional())
        .start("Creating instance in compartment {compartment_id}...")
        .error("Error creating instance")
        .destructive()
        .run(|env, args| {
            Box::pin(async move {
                let spec = launch_spec(args)?;
                compute::create_instance(env.clients()?, &spec).await
            })
        }),
        ToolSpec::scalar("terminate_instance", "Terminate (delete) a compute instance")
            .param(Param::ocid("instance_id", "OCID of the instance to terminate"))
            .param(
                Param::boolean("preserve_boot_volume", "Keep the boot volume after termination")
                    .default(json!(false)),
            )
            .start("Terminating instance {instance_id}...")
            .error("Error terminating instance")
            .destructive()
            .run(|env, args| {
                Box::pin(async move {
                    compute::terminate_instance(
                        env.clients()?,
                        args.str("instance_id")?,
                        args.flag("preserve_boot_volume")?,
                    )
                    .await
                })
            }),
    ]
}
