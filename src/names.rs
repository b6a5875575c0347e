pub const HEALTH_URL: &str = "/health";
pub const GENERATE_QUESTIONS_URL: &str = "/generate-questions";
pub const GENERATE_READING_URL: &str = "/generate-reading";

// Field limits
pub const MAX_TITLE_LENGTH: usize = 255;

// Question generation
pub const MIN_NUM_QUESTIONS: usize = 1;
pub const MAX_NUM_QUESTIONS: usize = 10;
pub const DEFAULT_NUM_QUESTIONS: usize = 1;
pub const GENERATED_OPTION_COUNT: usize = 4;

// Completion parameters
pub const QUESTIONS_MAX_TOKENS: u32 = 1500;
pub const READING_MAX_TOKENS: u32 = 1200;
pub const TEMPERATURE: f32 = 0.7;

// Completion service defaults
pub const DEFAULT_AI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";
