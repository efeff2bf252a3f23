// Statistics module.
// Aggregates language usage and assembles the status handed to the renderer.

pub mod languages;
pub mod status;

pub use languages::{LanguageAggregator, LanguageUsage, LanguageUsages, OTHER_LANGUAGES};
pub use status::{ActivityStatus, GitHubStatus, RepoLanguages, StatusAssembler, StatusReport};
