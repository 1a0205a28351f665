//! OCI subsystems and where they live.

use std::fmt;

/// One remote OCI subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Compute,
    VirtualNetwork,
    BlockStorage,
    Identity,
    ObjectStorage,
    FileStorage,
    Database,
    LoadBalancer,
    NetworkLoadBalancer,
    KmsVault,
    /// Key management lives on a per-vault endpoint.
    KmsManagement,
    Monitoring,
    Logging,
    LogSearch,
    ContainerEngine,
    UsageApi,
    Budget,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Compute => "compute",
            Service::VirtualNetwork => "virtual_network",
            Service::BlockStorage => "block_storage",
            Service::Identity => "identity",
            Service::ObjectStorage => "object_storage",
            Service::FileStorage => "file_storage",
            Service::Database => "database",
            Service::LoadBalancer => "load_balancer",
            Service::NetworkLoadBalancer => "network_load_balancer",
            Service::KmsVault => "kms_vault",
            Service::KmsManagement => "kms_management",
            Service::Monitoring => "monitoring",
            Service::Logging => "logging",
            Service::LogSearch => "log_search",
            Service::ContainerEngine => "container_engine",
            Service::UsageApi => "usage_api",
            Service::Budget => "budget",
        }
    }

    /// Regional host name.
    pub fn host(&self, region: &str) -> String {
        match self {
            Service::Compute
            | Service::VirtualNetwork
            | Service::BlockStorage
            | Service::LoadBalancer => format!("iaas.{region}.oraclecloud.com"),
            Service::Identity => format!("identity.{region}.oci.oraclecloud.com"),
            Service::ObjectStorage => format!("objectstorage.{region}.oraclecloud.com"),
            Service::FileStorage => format!("filestorage.{region}.oraclecloud.com"),
            Service::Database => format!("database.{region}.oraclecloud.com"),
            Service::NetworkLoadBalancer => {
                format!("network-load-balancer-api.{region}.oci.oraclecloud.com")
            }
            Service::KmsVault | Service::KmsManagement => format!("kms.{region}.oraclecloud.com"),
            Service::Monitoring => format!("telemetry.{region}.oraclecloud.com"),
            Service::Logging | Service::LogSearch => {
                format!("logging.{region}.oci.oraclecloud.com")
            }
            Service::ContainerEngine => format!("containerengine.{region}.oraclecloud.com"),
            Service::UsageApi => format!("usageapi.{region}.oci.oraclecloud.com"),
            Service::Budget => format!("usage.{region}.oci.oraclecloud.com"),
        }
    }

    /// API version prefix prepended to every request path.
    pub fn base_path(&self) -> &'static str {
        match self {
            Service::Compute
            | Service::VirtualNetwork
            | Service::BlockStorage
            | Service::Identity
            | Service::Database => "/20160918",
            Service::ObjectStorage => "",
            Service::FileStorage => "/20171215",
            Service::LoadBalancer => "/20170115",
            Service::NetworkLoadBalancer => "/20200501",
            Service::KmsVault | Service::KmsManagement => "/20180608",
            Service::Monitoring => "/20180401",
            Service::Logging => "/20200531",
            Service::LogSearch => "/20190909",
            Service::ContainerEngine => "/20180222",
            Service::UsageApi => "/20200107",
            Service::Budget => "/20190111",
        }
    }

    /// `https://` endpoint for a region.
    pub fn endpoint(&self, region: &str) -> String {
        format!("https://{}", self.host(region))
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts() {
        assert_eq!(
            Service::Compute.endpoint("us-ashburn-1"),
            "https://iaas.us-ashburn-1.oraclecloud.com"
        );
        assert_eq!(
            Service::Identity.host("eu-frankfurt-1"),
            "identity.eu-frankfurt-1.oci.oraclecloud.com"
        );
        assert_eq!(Service::ObjectStorage.base_path(), "");
        assert_eq!(Service::LogSearch.base_path(), "/20190909");
    }
}
