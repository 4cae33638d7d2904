//! Azure cloud environments
//!
//! The sovereign clouds use different endpoint roots, so every
//! identifier or URL built for a resource is parameterized by the
//! active environment.

use serde::{Deserialize, Serialize};

/// An Azure cloud environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AzureEnvironment {
    /// The public Azure cloud
    #[default]
    Public,
    /// Azure China (operated by 21Vianet)
    China,
    /// Azure US Government
    UsGovernment,
    /// Azure Germany
    German,
}

impl AzureEnvironment {
    /// DNS suffix for storage service endpoints in this environment
    pub fn storage_endpoint_suffix(&self) -> &'static str {
        match self {
            AzureEnvironment::Public => "core.windows.net",
            AzureEnvironment::China => "core.chinacloudapi.cn",
            AzureEnvironment::UsGovernment => "core.usgovcloudapi.net",
            AzureEnvironment::German => "core.cloudapi.de",
        }
    }

    /// Base URL of the Resource Manager API in this environment
    pub fn resource_manager_endpoint(&self) -> &'static str {
        match self {
            AzureEnvironment::Public => "https://management.azure.com",
            AzureEnvironment::China => "https://management.chinacloudapi.cn",
            AzureEnvironment::UsGovernment => "https://management.usgovcloudapi.net",
            AzureEnvironment::German => "https://management.microsoftazure.de",
        }
    }
}

impl std::fmt::Display for AzureEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AzureEnvironment::Public => write!(f, "public"),
            AzureEnvironment::China => write!(f, "china"),
            AzureEnvironment::UsGovernment => write!(f, "usgovernment"),
            AzureEnvironment::German => write!(f, "german"),
        }
    }
}

impl std::str::FromStr for AzureEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(AzureEnvironment::Public),
            "china" => Ok(AzureEnvironment::China),
            "usgovernment" => Ok(AzureEnvironment::UsGovernment),
            "german" => Ok(AzureEnvironment::German),
            other => Err(format!("unknown Azure environment: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_per_environment() {
        assert_eq!(
            AzureEnvironment::Public.storage_endpoint_suffix(),
            "core.windows.net"
        );
        assert_eq!(
            AzureEnvironment::China.resource_manager_endpoint(),
            "https://management.chinacloudapi.cn"
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(
            "USGovernment".parse::<AzureEnvironment>().unwrap(),
            AzureEnvironment::UsGovernment
        );
        assert!("sovereign-moon".parse::<AzureEnvironment>().is_err());
    }
}
