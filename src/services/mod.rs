pub mod parser;
pub mod validator;

pub use parser::{parse_response, ParseMode, FALLBACK_MAX_QUESTIONS};
pub use validator::{validate_all, validate_question, ValidationContext};
