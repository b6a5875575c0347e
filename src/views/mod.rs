//! JSON shapes returned by the API.

pub mod course;
pub mod question;

pub use course::{AnswerView, CourseView, LessonView};
pub use question::QuestionView;
