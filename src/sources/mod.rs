//! Upstream collaborators: the OAuth2 token endpoint and the resource API.

pub mod oauth2;
pub mod resources;

pub use oauth2::TokenExchanger;
pub use resources::{Resource, ResourceAggregator, ResourceRequest, RESOURCES};
