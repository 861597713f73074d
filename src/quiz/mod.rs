pub mod engine;
pub mod question;

pub use engine::{compose, score};
pub use question::{Question, QuestionOrigin, Quiz, QuizItem, QuizResult};
