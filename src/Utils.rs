//! utility modules used throughout the project
/// terminal and file logging set up from a level name
pub mod logger;
/// parse engine settings from a document like "engine\n  max_depth: 512\npriority\n  set: mod=2" into EngineConfig
pub mod engine_config;
