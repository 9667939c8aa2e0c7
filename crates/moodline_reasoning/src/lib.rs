pub mod api_types;
pub mod classify;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod recommend;
pub mod response;

pub use classify::{classify_entry, Classification};
pub use error::{AnalysisError, ErrorCode, PipelineError, RecommendationError};
pub use llm::{CompletionParams, LlmClient};
pub use pipeline::{AnalysisOutcome, MoodPipeline, RetryResponse};
pub use recommend::{generate_recommendations, RecommendationSource, Recommendations};
