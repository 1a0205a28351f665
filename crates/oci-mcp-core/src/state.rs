//! Lifecycle state names reported by OCI resources.

/// Compute instance lifecycle states.
pub mod instance {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const RUNNING: &str = "RUNNING";
    pub const STARTING: &str = "STARTING";
    pub const STOPPING: &str = "STOPPING";
    pub const STOPPED: &str = "STOPPED";
    pub const CREATING_IMAGE: &str = "CREATING_IMAGE";
    pub const TERMINATING: &str = "TERMINATING";
    pub const TERMINATED: &str = "TERMINATED";
}

/// DB node lifecycle states.
pub mod db_node {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const AVAILABLE: &str = "AVAILABLE";
    pub const UPDATING: &str = "UPDATING";
    pub const STOPPING: &str = "STOPPING";
    pub const STOPPED: &str = "STOPPED";
    pub const STARTING: &str = "STARTING";
    pub const TERMINATING: &str = "TERMINATING";
    pub const TERMINATED: &str = "TERMINATED";
    pub const FAILED: &str = "FAILED";
}

/// Compartment lifecycle states.
pub mod compartment {
    pub const CREATING: &str = "CREATING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const INACTIVE: &str = "INACTIVE";
    pub const DELETING: &str = "DELETING";
    pub const DELETED: &str = "DELETED";
}
