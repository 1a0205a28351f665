use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::{compartments, resources};

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list(
            "list_compartments",
            "List all compartments accessible to the user, starting with the root compartment",
        )
        .start("Listing compartments...")
        .success("Found {count} compartments")
        .error("Error listing compartments")
        .run(|env, _args| {
            Box::pin(async move { compartments::list_compartments(env.clients()?).await })
        }),
        ToolSpec::list("list_availability_domains", "List availability domains")
            .param(
                Param::ocid("compartment_id", "OCID of the compartment (defaults to the tenancy)")
                    .optional(),
            )
            .start("Listing availability domains...")
            .error("Error listing availability domains")
            .run(|env, args| {
                Box::pin(async move {
                    resources::list_availability_domains(env.clients()?, args.opt_str("compartment_id")?)
                        .await
                })
            }),
        ToolSpec::list("list_fault_domains", "List fault domains in an availability domain")
            .param(Param::string("availability_domain", "Name of the availability domain"))
            .param(
                Param::ocid("compartment_id", "OCID of the compartment (defaults to the tenancy)")
                    .optional(),
            )
            .start("Listing fault domains in {availability_domain}...")
            .error("Error listing fault domains")
            .run(|env, args| {
                Box::pin(async move {
                    resources::list_fault_domains(
                        env.clients()?,
                        args.opt_str("compartment_id")?,
                        args.str("availability_domain")?,
                    )
                    .await
                })
            }),
        ToolSpec::list("list_images", "List compute images available in a compartment")
            .param(compartment_id())
            .start("Listing images in compartment {compartment_id}...")
            .error("Error listing images")
            .run(|env, args| {
                Box::pin(async move {
                    resources::list_images(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar("get_image", "Get details of a compute image")
            .param(Param::ocid("image_id", "OCID of the image"))
            .start("Getting image {image_id}...")
            .success("Retrieved image details successfully")
            .error("Error getting image")
            .run(|env, args| {
                Box::pin(async move { resources::get_image(env.clients()?, args.str("image_id")?).await })
            }),
        ToolSpec::list("list_shapes", "List compute shapes available in a compartment")
            .param(compartment_id())
            .start("Listing shapes in compartment {compartment_id}...")
            .error("Error listing shapes")
            .run(|env, args| {
                Box::pin(async move {
                    resources::list_shapes(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::list("list_regions", "List all OCI regions")
            .start("Listing regions...")
            .error("Error listing regions")
            .run(|env, _args| Box::pin(async move { resources::list_regions(env.clients()?).await })),
        ToolSpec::scalar("get_tenancy_info", "Get tenancy details")
            .param(Param::ocid("tenancy_id", "OCID of the tenancy (defaults to the active profile's)").optional())
            .start("Getting tenancy information...")
            .error("Error getting tenancy information")
            .run(|env, args| {
                Box::pin(async move {
                    resources::get_tenancy_info(env.clients()?, args.opt_str("tenancy_id")?).await
                })
            }),
    ]
}
