use crate::tools::{Param, ToolSpec};

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::scalar(
            "list_oci_profiles",
            "List the profiles defined in the OCI config file and the one currently active",
        )
        .start("Reading OCI profiles...")
        .error("Error listing OCI profiles")
        .without_clients()
        .run(|env, _args| Box::pin(async move { env.profiles.list_profiles().await })),
        ToolSpec::scalar(
            "get_current_oci_profile",
            "Show the active OCI profile (user, tenancy, region, fingerprint)",
        )
        .error("Error getting current OCI profile")
        .without_clients()
        .run(|env, _args| Box::pin(async move { Ok(env.profiles.describe_current().await) })),
        ToolSpec::scalar(
            "set_oci_profile",
            "Switch to another OCI profile; every subsequent tool call uses its credentials and region",
        )
        .param(Param::string("profile_name", "Name of a profile in the OCI config file"))
        .start("Switching to OCI profile {profile_name}...")
        .error("Error switching OCI profile")
        .without_clients()
        .run(|env, args| {
            Box::pin(async move { env.profiles.switch(args.str("profile_name")?).await })
        }),
    ]
}
