pub mod artifact_dir;
pub mod json_registry;
pub mod memory_registry;

pub use artifact_dir::ArtifactDirectory;
pub use json_registry::JsonFileRegistry;
pub use memory_registry::MemoryRegistry;
