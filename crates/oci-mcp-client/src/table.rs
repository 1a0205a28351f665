//! The set of service clients built for one profile.

use crate::api::{ApiFactory, CloudApi};
use crate::client::ServiceClient;
use crate::error::ClientError;
use crate::service::Service;
use oci_mcp_core::Profile;
use std::sync::Arc;

/// Service clients for one profile.
///
/// A table is immutable once built. Switching profiles builds a new table
/// and replaces the old one as a whole.
#[derive(Debug, Clone)]
pub struct ClientTable {
    pub profile: Profile,
    pub compute: ServiceClient,
    pub network: ServiceClient,
    pub block_storage: ServiceClient,
    pub identity: ServiceClient,
    pub object_storage: ServiceClient,
    pub file_storage: ServiceClient,
    pub database: ServiceClient,
    pub load_balancer: ServiceClient,
    pub network_load_balancer: ServiceClient,
    pub kms_vault: ServiceClient,
    pub monitoring: ServiceClient,
    pub logging: ServiceClient,
    pub log_search: ServiceClient,
    pub container_engine: ServiceClient,
    pub usage_api: ServiceClient,
    pub budget: ServiceClient,
}

impl ClientTable {
    /// Build every service client on top of one [`CloudApi`].
    pub fn new(profile: Profile, api: Arc<dyn CloudApi>) -> Self {
        let client = |service| ServiceClient::new(service, api.clone());
        Self {
            compute: client(Service::Compute),
            network: client(Service::VirtualNetwork),
            block_storage: client(Service::BlockStorage),
            identity: client(Service::Identity),
            object_storage: client(Service::ObjectStorage),
            file_storage: client(Service::FileStorage),
            database: client(Service::Database),
            load_balancer: client(Service::LoadBalancer),
            network_load_balancer: client(Service::NetworkLoadBalancer),
            kms_vault: client(Service::KmsVault),
            monitoring: client(Service::Monitoring),
            logging: client(Service::Logging),
            log_search: client(Service::LogSearch),
            container_engine: client(Service::ContainerEngine),
            usage_api: client(Service::UsageApi),
            budget: client(Service::Budget),
            profile,
        }
    }

    /// Build a table through a factory.
    pub fn connect(profile: Profile, factory: &dyn ApiFactory) -> Result<Self, ClientError> {
        let api = factory.connect(&profile)?;
        Ok(Self::new(profile, api))
    }

    /// Key management client for a vault's management endpoint.
    pub fn kms_management(&self, management_endpoint: &str) -> ServiceClient {
        self.kms_vault
            .at_endpoint(Service::KmsManagement, management_endpoint)
    }

    /// The tenancy OCID, which is also the root compartment.
    pub fn tenancy(&self) -> &str {
        &self.profile.tenancy
    }
}
