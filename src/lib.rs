//! Social Sentiment - Export Ingestion and Annotation
//!
//! A Rust library for turning raw social media exports into flat,
//! annotated tables ready for analysis.
//!
//! # Features
//!
//! - Extract posts and comments from Facebook and tweet thread exports
//! - Join posts to their comments per platform policy
//! - Annotate rows with sentiment and named entities under a time budget
//! - Summarize annotated tables into long-form entity and sentiment tables

/// Aggregation of annotated tables
pub mod aggregate;
/// Built-in sentiment and entity collaborators
pub mod analyzers;
/// Sentiment and entity annotation
pub mod annotate;
/// Configuration management
pub mod config;
/// Entity surface normalization
pub mod entity;
/// Error types
pub mod error;
/// Export extraction
pub mod extract;
/// Table reading and writing
pub mod file_writer;
/// Post/comment join
pub mod join;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// File-to-file pipeline stages
pub mod pipeline;
/// Free-text cleanup
pub mod text;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use annotate::{Annotator, EntityRecognizer, SentimentClassifier};
pub use error::{PipelineError, Result};
pub use models::{EntityColumn, JoinPolicy, Platform, SourceSpec};
pub use pipeline::Pipeline;
pub use text::TextNormalizer;
