mod common;

use common::{create_test_db, create_test_db_with_url};
use courseforge::db::{
    AnswerInput, CourseInput, Db, LessonInput, LessonType, NewQuestion, QuestionBody,
    QuestionVariant,
};

fn course_input(title: &str) -> CourseInput {
    CourseInput {
        title: title.to_string(),
        description: "An introduction".to_string(),
        author: "Ada".to_string(),
    }
}

fn lesson_input(lesson_type: LessonType) -> LessonInput {
    LessonInput {
        title: "Lesson".to_string(),
        lesson_type,
        content: None,
        video_url: None,
    }
}

fn true_false(text: &str, correct_answer: bool) -> NewQuestion {
    NewQuestion {
        text: text.to_string(),
        body: QuestionBody::TrueFalse { correct_answer },
    }
}

fn multiple_choice(text: &str) -> NewQuestion {
    NewQuestion {
        text: text.to_string(),
        body: QuestionBody::MultipleChoice {
            options: vec!["2".to_string(), "3".to_string(), "4".to_string()],
            correct_answer: "4".to_string(),
        },
    }
}

async fn practice_lesson(db: &Db) -> (i64, i64) {
    let course = db.create_course(&course_input("Maths")).await.unwrap();
    let lesson = db
        .create_lesson(course.id, &lesson_input(LessonType::Practice))
        .await
        .unwrap();
    (course.id, lesson.id)
}

#[tokio::test]
async fn initial_migration_is_recorded() {
    let db = create_test_db().await;
    assert!(db.migration_applied("V1").await.unwrap());
    assert!(!db.migration_applied("V999").await.unwrap());
}

#[tokio::test]
async fn course_crud() {
    let db = create_test_db().await;

    let course = db.create_course(&course_input("Physics")).await.unwrap();
    assert_eq!(course.title, "Physics");

    let fetched = db.get_course(course.id).await.unwrap().unwrap();
    assert_eq!(fetched.author, "Ada");

    let updated = db
        .update_course(course.id, &course_input("Chemistry"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Chemistry");
    assert_eq!(updated.created_at, course.created_at);

    assert!(db.update_course(9999, &course_input("Nope")).await.unwrap().is_none());

    assert!(db.delete_course(course.id).await.unwrap());
    assert!(!db.delete_course(course.id).await.unwrap());
    assert!(db.get_course(course.id).await.unwrap().is_none());
}

#[tokio::test]
async fn lessons_filter_by_course() {
    let db = create_test_db().await;
    let first = db.create_course(&course_input("First")).await.unwrap();
    let second = db.create_course(&course_input("Second")).await.unwrap();

    db.create_lesson(first.id, &lesson_input(LessonType::Reading))
        .await
        .unwrap();
    db.create_lesson(second.id, &lesson_input(LessonType::Video))
        .await
        .unwrap();
    db.create_lesson(second.id, &lesson_input(LessonType::Practice))
        .await
        .unwrap();

    assert_eq!(db.lessons(None).await.unwrap().len(), 3);

    let lessons = db.lessons(Some(second.id)).await.unwrap();
    let types: Vec<_> = lessons.iter().map(|l| l.lesson_type).collect();
    assert_eq!(types, vec![LessonType::Video, LessonType::Practice]);
}

#[tokio::test]
async fn set_lesson_content_only_touches_content() {
    let db = create_test_db().await;
    let course = db.create_course(&course_input("Space")).await.unwrap();
    let lesson = db
        .create_lesson(course.id, &lesson_input(LessonType::Reading))
        .await
        .unwrap();

    let updated = db
        .set_lesson_content(lesson.id, "# Orbits")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.content.as_deref(), Some("# Orbits"));
    assert_eq!(updated.title, lesson.title);
    assert_eq!(updated.lesson_type, LessonType::Reading);

    assert!(db.set_lesson_content(9999, "x").await.unwrap().is_none());
}

#[tokio::test]
async fn questions_resolve_to_their_variant() {
    let db = create_test_db().await;
    let (_, lesson_id) = practice_lesson(&db).await;

    let tf = db
        .create_question(lesson_id, &true_false("The sky is blue", true))
        .await
        .unwrap();
    let mc = db
        .create_question(lesson_id, &multiple_choice("2 + 2 = ?"))
        .await
        .unwrap();

    let questions = db.lesson_questions(lesson_id).await.unwrap();
    assert_eq!(questions.len(), 2);

    assert_eq!(questions[0].id, tf.id);
    assert_eq!(
        questions[0].variant,
        QuestionVariant::Known(QuestionBody::TrueFalse { correct_answer: true })
    );

    assert_eq!(questions[1].id, mc.id);
    assert_eq!(
        questions[1].variant,
        QuestionVariant::Known(QuestionBody::MultipleChoice {
            options: vec!["2".to_string(), "3".to_string(), "4".to_string()],
            correct_answer: "4".to_string(),
        })
    );
}

#[tokio::test]
async fn question_update_can_switch_variant() {
    let db = create_test_db().await;
    let (_, lesson_id) = practice_lesson(&db).await;

    let question = db
        .create_question(lesson_id, &true_false("Water is wet", false))
        .await
        .unwrap();

    let updated = db
        .update_question(question.id, lesson_id, &multiple_choice("Pick one"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, question.id);
    assert_eq!(updated.text, "Pick one");
    assert!(matches!(
        updated.variant,
        QuestionVariant::Known(QuestionBody::MultipleChoice { .. })
    ));

    let missing = db
        .update_question(9999, lesson_id, &true_false("x", true))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn question_without_extension_row_is_unknown() {
    let (db, url) = create_test_db_with_url().await;
    let (_, lesson_id) = practice_lesson(&db).await;

    let question = db
        .create_question(lesson_id, &true_false("Orphaned", true))
        .await
        .unwrap();

    let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
    sqlx::query("DELETE FROM true_false_questions WHERE question_id = ?")
        .bind(question.id)
        .execute(&pool)
        .await
        .unwrap();

    let resolved = db.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(resolved.variant, QuestionVariant::Unknown);
    assert_eq!(resolved.text, "Orphaned");
}

#[tokio::test]
async fn answers_filter_by_question() {
    let db = create_test_db().await;
    let (_, lesson_id) = practice_lesson(&db).await;
    let first = db
        .create_question(lesson_id, &true_false("One", true))
        .await
        .unwrap();
    let second = db
        .create_question(lesson_id, &true_false("Two", false))
        .await
        .unwrap();

    let answer = db
        .create_answer(&AnswerInput {
            question_id: first.id,
            text: "yes".to_string(),
            is_correct: true,
        })
        .await
        .unwrap();
    db.create_answer(&AnswerInput {
        question_id: second.id,
        text: "no".to_string(),
        is_correct: false,
    })
    .await
    .unwrap();

    let answers = db.answers(Some(first.id)).await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].id, answer.id);
    assert!(answers[0].is_correct);
    assert_eq!(db.answers(None).await.unwrap().len(), 2);

    let updated = db
        .update_answer(
            answer.id,
            &AnswerInput {
                question_id: first.id,
                text: "maybe".to_string(),
                is_correct: false,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.text, "maybe");
    assert!(!updated.is_correct);
}

#[tokio::test]
async fn deleting_course_cascades_to_everything_below() {
    let db = create_test_db().await;
    let (course_id, lesson_id) = practice_lesson(&db).await;
    let tf = db
        .create_question(lesson_id, &true_false("Cascade?", true))
        .await
        .unwrap();
    let mc = db
        .create_question(lesson_id, &multiple_choice("Which?"))
        .await
        .unwrap();
    let answer = db
        .create_answer(&AnswerInput {
            question_id: tf.id,
            text: "yes".to_string(),
            is_correct: true,
        })
        .await
        .unwrap();

    assert!(db.delete_course(course_id).await.unwrap());

    assert!(db.get_lesson(lesson_id).await.unwrap().is_none());
    assert!(db.get_question(tf.id).await.unwrap().is_none());
    assert!(db.get_question(mc.id).await.unwrap().is_none());
    assert!(db.get_answer(answer.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_question_removes_its_answers() {
    let db = create_test_db().await;
    let (_, lesson_id) = practice_lesson(&db).await;
    let question = db
        .create_question(lesson_id, &multiple_choice("Gone soon"))
        .await
        .unwrap();
    let answer = db
        .create_answer(&AnswerInput {
            question_id: question.id,
            text: "4".to_string(),
            is_correct: true,
        })
        .await
        .unwrap();

    assert!(db.delete_question(question.id).await.unwrap());
    assert!(!db.delete_question(question.id).await.unwrap());
    assert!(db.get_answer(answer.id).await.unwrap().is_none());
}
