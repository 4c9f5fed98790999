pub mod orchestrator;
pub mod placeholder;
pub mod prompt;
pub mod result;

pub use orchestrator::{
    ChainOutcome, GenerationOrchestrator, GenerationSettings, DEFAULT_ATTEMPT_TIMEOUT_SECS,
};
pub use placeholder::placeholder_image;
pub use prompt::{build_prompt, PromptOptions};
pub use result::{GenerationPath, GenerationResult};
