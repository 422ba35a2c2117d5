//! Target address configuration
//!
//! Resolves the base URL that every probe worker shares for a run.

use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Port the simulated service listens on
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable whose presence marks a containerized self-call deployment
pub const CONTAINER_ENV_VAR: &str = "DOCKER_CONTAINER";

/// Errors that can occur while resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// How the process is deployed relative to the service it calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    /// Plain local process, reached through `localhost`
    Local,
    /// Inside a container, calling itself through the loopback interface
    Container,
}

impl Deployment {
    fn host(&self) -> &'static str {
        match self {
            Deployment::Local => "localhost",
            Deployment::Container => "127.0.0.1",
        }
    }
}

impl std::fmt::Display for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deployment::Local => write!(f, "local"),
            Deployment::Container => write!(f, "container"),
        }
    }
}

/// Resolved target for a traffic run
///
/// Built once per run and shared read-only by all workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    deployment: Deployment,
    base_url: Url,
}

impl TargetConfig {
    /// Resolve the base URL from an explicit deployment signal
    pub fn resolve(in_container: bool, port: u16) -> Result<Self, ConfigError> {
        let deployment = if in_container {
            Deployment::Container
        } else {
            Deployment::Local
        };
        let base_url = Url::parse(&format!("http://{}:{}", deployment.host(), port))?;

        Ok(Self {
            deployment,
            base_url,
        })
    }

    /// Resolve the base URL from the process environment
    ///
    /// Only the presence of [`CONTAINER_ENV_VAR`] matters, not its value.
    pub fn from_env(port: u16) -> Result<Self, ConfigError> {
        let in_container = std::env::var_os(CONTAINER_ENV_VAR).is_some();
        Self::resolve(in_container, port)
    }

    /// Which deployment the address was resolved for
    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    /// Base URL all probes are issued against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_resolution() {
        let target = TargetConfig::resolve(false, DEFAULT_PORT).unwrap();
        assert_eq!(target.deployment(), Deployment::Local);
        assert_eq!(target.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_container_resolution() {
        let target = TargetConfig::resolve(true, DEFAULT_PORT).unwrap();
        assert_eq!(target.deployment(), Deployment::Container);
        assert_eq!(target.base_url().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_custom_port() {
        let target = TargetConfig::resolve(false, 9090).unwrap();
        assert_eq!(target.base_url().port(), Some(9090));
    }

    #[test]
    fn test_deployment_display() {
        assert_eq!(Deployment::Local.to_string(), "local");
        assert_eq!(Deployment::Container.to_string(), "container");
    }
}
