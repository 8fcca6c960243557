pub mod outbound;

pub use outbound::{ArtifactSource, DeploymentRegistry};
