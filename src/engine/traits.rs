use super::policy::{PolicyConfiguration, RoutingMethod};
use crate::error::RefreshError;

/// The "Hot Path": host → routing verdict.
pub trait HostClassifier: Send + Sync {
    /// Total over all strings; unknown or malformed hosts yield `Default`.
    fn classify(&self, host: &str) -> RoutingMethod;
}

/// The "Control Plane" for updates.
#[async_trait::async_trait]
pub trait PolicyManager: Send + Sync {
    /// Reads every configured source and builds a new policy.
    ///
    /// On error nothing has been published; the caller keeps its current policy.
    async fn refresh(&self) -> Result<PolicyConfiguration, RefreshError>;
}

impl HostClassifier for PolicyConfiguration {
    fn classify(&self, host: &str) -> RoutingMethod {
        super::classifier::classify(host, self)
    }
}
