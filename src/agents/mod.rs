//! Agent System
//!
//! Hosted agents turn a submitted document or URL into study material:
//!
//! - **Input Router**: Decides how the submission should be read
//! - **Content Extractor**: Pulls the text out of the file or page
//! - **Content Analyzer**: Structures the extracted material
//! - **Note / Question Generators**: Produce the study package
//! - **Error Displayer**: Explains why a submission could not be used
//!
//! ## Pipeline Overview
//!
//! ```text
//! Submission
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Router    │
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐     error     ┌─────────────┐
//! │  Extractor  │ ────────────► │   Error     │
//! └─────────────┘               │  Displayer  │
//!      │                        └─────────────┘
//!      ▼                               ▲
//! ┌─────────────┐     error            │
//! │  Analyzer   │ ─────────────────────┘
//! └─────────────┘
//!      │
//!      ▼
//!  Notes + Questions
//! ```

pub mod client;
pub mod classifier;
pub mod source;
pub mod pipeline;

pub use client::{AgentApi, AgentCallRequest, AgentCallResult, AgentClient, AssetReference};
pub use classifier::{classify, is_error_response, Classification};
pub use source::{ContentSource, PreparedInput, SubmittedUrl, UploadedFile};
pub use pipeline::{PipelineOutcome, StudyPipeline};
