//! Object storage buckets, block and boot volumes, file systems.

use crate::error::ToolError;
use crate::projection::{Field, path};
use crate::{fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::Value;

const BUCKET_SUMMARY: &[Field] = &[
    path("name", "name"),
    path("namespace", "namespace"),
    path("compartment_id", "compartmentId"),
    path("created_by", "createdBy"),
    path("time_created", "timeCreated"),
    path("etag", "etag"),
];

const BUCKET: &[Field] = &[
    path("name", "name"),
    path("namespace", "namespace"),
    path("compartment_id", "compartmentId"),
    path("created_by", "createdBy"),
    path("time_created", "timeCreated"),
    path("etag", "etag"),
    path("public_access_type", "publicAccessType"),
    path("storage_tier", "storageTier"),
    path("object_events_enabled", "objectEventsEnabled"),
    path("versioning", "versioning"),
    path("replication_enabled", "replicationEnabled"),
    path("is_read_only", "isReadOnly"),
    path("object_lifecycle_policy_etag", "objectLifecyclePolicyEtag"),
];

const VOLUME: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("size_in_mbs", "sizeInMBs"),
    path("size_in_gbs", "sizeInGBs"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("volume_group_id", "volumeGroupId"),
    path("is_hydrated", "isHydrated"),
    path("vpus_per_gb", "vpusPerGB"),
    path("is_auto_tune_enabled", "isAutoTuneEnabled"),
    path("auto_tuned_vpus_per_gb", "autoTunedVpusPerGB"),
];

const VOLUME_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("size_in_mbs", "sizeInMBs"),
    path("size_in_gbs", "sizeInGBs"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("volume_group_id", "volumeGroupId"),
    path("is_hydrated", "isHydrated"),
    path("vpus_per_gb", "vpusPerGB"),
    path("is_auto_tune_enabled", "isAutoTuneEnabled"),
    path("auto_tuned_vpus_per_gb", "autoTunedVpusPerGB"),
    path("kms_key_id", "kmsKeyId"),
    path("source_details", "sourceDetails"),
];

const BOOT_VOLUME: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("size_in_mbs", "sizeInMBs"),
    path("size_in_gbs", "sizeInGBs"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("is_hydrated", "isHydrated"),
    path("vpus_per_gb", "vpusPerGB"),
    path("is_auto_tune_enabled", "isAutoTuneEnabled"),
    path("auto_tuned_vpus_per_gb", "autoTunedVpusPerGB"),
];

const BOOT_VOLUME_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("size_in_mbs", "sizeInMBs"),
    path("size_in_gbs", "sizeInGBs"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("is_hydrated", "isHydrated"),
    path("vpus_per_gb", "vpusPerGB"),
    path("is_auto_tune_enabled", "isAutoTuneEnabled"),
    path("auto_tuned_vpus_per_gb", "autoTunedVpusPerGB"),
    path("kms_key_id", "kmsKeyId"),
    path("source_details", "sourceDetails"),
];

const FILE_SYSTEM: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("metered_bytes", "meteredBytes"),
    path("is_clone_parent", "isCloneParent"),
    path("is_hydrated", "isHydrated"),
    path("lifecycle_details", "lifecycleDetails"),
    path("kms_key_id", "kmsKeyId"),
];

const FILE_SYSTEM_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("metered_bytes", "meteredBytes"),
    path("is_clone_parent", "isCloneParent"),
    path("is_hydrated", "isHydrated"),
    path("lifecycle_details", "lifecycleDetails"),
    path("kms_key_id", "kmsKeyId"),
    path("source_details", "sourceDetails"),
];

/// The tenancy's object storage namespace.
pub async fn object_storage_namespace(clients: &ClientTable) -> Result<String, ToolError> {
    let body = clients.object_storage.get("/n/", Query::new()).await?;
    body.as_str()
        .map(str::to_string)
        .ok_or_else(|| ToolError::UnexpectedResponse("namespace is not a string".to_string()))
}

async fn namespace_or_lookup(
    clients: &ClientTable,
    namespace_name: Option<&str>,
) -> Result<String, ToolError> {
    match namespace_name {
        Some(ns) => Ok(ns.to_string()),
        None => object_storage_namespace(clients).await,
    }
}

pub async fn list_buckets(
    clients: &ClientTable,
    compartment_id: &str,
    namespace_name: Option<&str>,
) -> Result<Value, ToolError> {
    let namespace = namespace_or_lookup(clients, namespace_name).await?;
    fetch_all(
        &clients.object_storage,
        &format!("/n/{namespace}/b/"),
        Query::new().with("compartmentId", compartment_id),
        BUCKET_SUMMARY,
    )
    .await
}

pub async fn get_bucket(
    clients: &ClientTable,
    bucket_name: &str,
    namespace_name: Option<&str>,
) -> Result<Value, ToolError> {
    let namespace = namespace_or_lookup(clients, namespace_name).await?;
    fetch_one(
        &clients.object_storage,
        &format!("/n/{namespace}/b/{bucket_name}"),
        BUCKET,
    )
    .await
}

pub async fn list_volumes(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.block_storage,
        "/volumes",
        Query::new().with("compartmentId", compartment_id),
        VOLUME,
    )
    .await
}

pub async fn get_volume(clients: &ClientTable, volume_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.block_storage, &format!("/volumes/{volume_id}"), VOLUME_DETAIL).await
}

/// Boot volumes are listed per availability domain.
pub async fn list_boot_volumes(
    clients: &ClientTable,
    availability_domain: &str,
    compartment_id: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.block_storage,
        "/bootVolumes",
        Query::new()
            .with("availabilityDomain", availability_domain)
            .with("compartmentId", compartment_id),
        BOOT_VOLUME,
    )
    .await
}

pub async fn get_boot_volume(clients: &ClientTable, boot_volume_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.block_storage,
        &format!("/bootVolumes/{boot_volume_id}"),
        BOOT_VOLUME_DETAIL,
    )
    .await
}

pub async fn list_file_systems(
    clients: &ClientTable,
    compartment_id: &str,
    availability_domain: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.file_storage,
        "/fileSystems",
        Query::new()
            .with("compartmentId", compartment_id)
            .with("availabilityDomain", availability_domain),
        FILE_SYSTEM,
    )
    .await
}

pub async fn get_file_system(clients: &ClientTable, file_system_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.file_storage,
        &format!("/fileSystems/{file_system_id}"),
        FILE_SYSTEM_DETAIL,
    )
    .await
}
