mod classifier;
mod generator;
mod ip;
mod manager;
mod policy;
pub mod state;
mod traits;

pub use classifier::{classify, classify_request, registrable_suffix};
pub use generator::{normalize_pattern, PolicyBuilder};
pub use ip::{is_private_range, parse_ipv4_literal};
pub use manager::{StandardManager, ALWAYS_BLOCKED};
pub use policy::{
    DomainList, MethodTable, PolicyConfiguration, RoutingMethod, TopLevelDomainTable, Transport,
};
pub use state::{PolicyHandle, PolicySnapshot};
pub use traits::{HostClassifier, PolicyManager};
