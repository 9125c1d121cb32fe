//! Priority signal classification and stack-ranking engine.
//!
//! Free-form signals about what work matters (operator chat commands,
//! issue-tracker comments, automated scan findings, dashboard overrides)
//! are classified into discrete priority levels, aggregated with time
//! decay per project, and combined with launch impact, effort, age, and
//! recent-focus factors into a stable stack rank of open stories.
//!
//! Data flows one way: raw signal → classifier → store → aggregator →
//! ranker → ordered list. The execution layer that picks up ranked work
//! lives outside this crate, as do all transport surfaces.

pub mod db;
mod migrations;
pub mod priority;
pub mod services;
pub mod types;

pub use db::StackDb;
pub use priority::classifier::SignalClassifier;
pub use priority::level::PriorityLevel;
pub use priority::provider::{ClassifyProvider, HttpClassifyProvider, ProviderError};
pub use priority::tables::ClassifierTables;
pub use types::{Classification, RankedStory, StoryPriority};
