// Core pipeline exports
pub mod matchmaker;
pub mod prompt;

pub use matchmaker::{MatchError, Matchmaker};
pub use prompt::{build_prompt, format_problem, format_problems};
