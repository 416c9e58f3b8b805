pub mod prompt;
pub mod remote;
pub mod response;
pub mod traits;

pub use prompt::build_prompt;
pub use remote::{AiError, GeminiClient};
pub use response::{ExtractError, extract_json};
pub use traits::TextGenerator;
