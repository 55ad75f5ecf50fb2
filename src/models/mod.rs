pub mod question;
pub mod solution_type;

pub use question::{ParsedIBlock, ParsedQBlock, ParsedQuestion, QuestionOption, QuestionRecord};
pub use solution_type::SolutionType;
