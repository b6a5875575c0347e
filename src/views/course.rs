use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{Answer, Course, Lesson, LessonType};

use super::QuestionView;

#[derive(Debug, Clone, Serialize)]
pub struct CourseView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub lessons: Vec<LessonView>,
}

impl CourseView {
    pub fn new(course: Course, lessons: Vec<LessonView>) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            author: course.author,
            created_at: course.created_at,
            lessons,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonView {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
}

impl LessonView {
    pub fn new(lesson: Lesson, questions: Vec<QuestionView>) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            lesson_type: lesson.lesson_type,
            content: lesson.content,
            video_url: lesson.video_url,
            created_at: lesson.created_at,
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

impl From<Answer> for AnswerView {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: answer.is_correct,
        }
    }
}
