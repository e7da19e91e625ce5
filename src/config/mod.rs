//! Configuration module

mod generator;
mod site;

pub use generator::GeneratorSiteConfig;
pub use site::CleanupPolicy;
pub use site::GeneratorConfig;
pub use site::GeneratorFlags;
pub use site::ServeConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILE;
