//! Platform catalogue: availability and fault domains, images, shapes,
//! regions and tenancy.

use crate::error::ToolError;
use crate::projection::{Field, path};
use crate::storage::object_storage_namespace;
use crate::{compartment_or_tenancy, fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::{Value, json};

const AVAILABILITY_DOMAIN: &[Field] = &[
    path("name", "name"),
    path("id", "id"),
    path("compartment_id", "compartmentId"),
];

const FAULT_DOMAIN: &[Field] = &[
    path("name", "name"),
    path("id", "id"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
];

const IMAGE: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("operating_system", "operatingSystem"),
    path("operating_system_version", "operatingSystemVersion"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("size_in_mbs", "sizeInMBs"),
    path("base_image_id", "baseImageId"),
    path("create_image_allowed", "createImageAllowed"),
    path("listing_type", "listingType"),
];

const IMAGE_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("operating_system", "operatingSystem"),
    path("operating_system_version", "operatingSystemVersion"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("size_in_mbs", "sizeInMBs"),
    path("base_image_id", "baseImageId"),
    path("create_image_allowed", "createImageAllowed"),
    path("listing_type", "listingType"),
    path("launch_mode", "launchMode"),
    path("launch_options", "launchOptions"),
];

const SHAPE: &[Field] = &[
    path("shape", "shape"),
    path("processor_description", "processorDescription"),
    path("ocpus", "ocpus"),
    path("memory_in_gbs", "memoryInGBs"),
    path("networking_bandwidth_in_gbps", "networkingBandwidthInGbps"),
    path("max_vnic_attachments", "maxVnicAttachments"),
    path("gpus", "gpus"),
    path("gpu_description", "gpuDescription"),
    path("local_disks", "localDisks"),
    path("local_disks_total_size_in_gbs", "localDisksTotalSizeInGBs"),
    path("local_disk_description", "localDiskDescription"),
    path("rdma_ports", "rdmaPorts"),
    path("rdma_bandwidth_in_gbps", "rdmaBandwidthInGbps"),
    path("is_live_migration_supported", "isLiveMigrationSupported"),
    path("ocpu_options", "ocpuOptions"),
    path("memory_options", "memoryOptions"),
    path("networking_bandwidth_options", "networkingBandwidthOptions"),
];

const REGION: &[Field] = &[path("key", "key"), path("name", "name")];

const TENANCY: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    path("home_region_key", "homeRegionKey"),
    path(
        "upi_idcs_compatibility_layer_endpoint",
        "upiIdcsCompatibilityLayerEndpoint",
    ),
];

pub async fn list_availability_domains(
    clients: &ClientTable,
    compartment_id: Option<&str>,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.identity,
        "/availabilityDomains",
        Query::new().with("compartmentId", compartment_or_tenancy(clients, compartment_id)),
        AVAILABILITY_DOMAIN,
    )
    .await
}

pub async fn list_fault_domains(
    clients: &ClientTable,
    compartment_id: Option<&str>,
    availability_domain: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.identity,
        "/faultDomains",
        Query::new()
            .with("compartmentId", compartment_or_tenancy(clients, compartment_id))
            .with("availabilityDomain", availability_domain),
        FAULT_DOMAIN,
    )
    .await
}

pub async fn list_images(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.compute,
        "/images",
        Query::new().with("compartmentId", compartment_id),
        IMAGE,
    )
    .await
}

pub async fn get_image(clients: &ClientTable, image_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.compute, &format!("/images/{image_id}"), IMAGE_DETAIL).await
}

pub async fn list_shapes(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.compute,
        "/shapes",
        Query::new().with("compartmentId", compartment_id),
        SHAPE,
    )
    .await
}

pub async fn get_namespace(clients: &ClientTable) -> Result<Value, ToolError> {
    let namespace = object_storage_namespace(clients).await?;
    Ok(json!({"namespace": namespace}))
}

pub async fn list_regions(clients: &ClientTable) -> Result<Value, ToolError> {
    fetch_all(&clients.identity, "/regions", Query::new(), REGION).await
}

/// Tenancy details; defaults to the active profile's tenancy.
pub async fn get_tenancy_info(
    clients: &ClientTable,
    tenancy_id: Option<&str>,
) -> Result<Value, ToolError> {
    let tenancy_id = tenancy_id.unwrap_or_else(|| clients.tenancy());
    fetch_one(&clients.identity, &format!("/tenancies/{tenancy_id}"), TENANCY).await
}
