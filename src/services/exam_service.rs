//! ExamService: exams, their question lists, and TRI-scored submissions.

use super::{
    ServiceError, ServiceResult, optional_text, question_service::QUESTION_COLUMNS,
    required_text, row_or_not_found,
};
use crate::{
    models::{
        exam::{AnswerRecord, Exam, ExamDetail, ExamInput, Submission, SubmissionInput},
        question::Question,
    },
    tri::{self, Response},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, info};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const MAX_USER_ID_LEN: usize = 128;
const EXAM_COLUMNS: &str = "id, title, description, time_limit_minutes, created_at";
const SUBMISSION_COLUMNS: &str = "id, exam_id, user_id, answers, correct_count, total_questions, \
                                  theta, standard_error, score, iterations, submitted_at";

#[derive(Clone)]
pub struct ExamService {
    pub db: Arc<SqlitePool>,
}

impl ExamService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    fn normalize(input: &ExamInput) -> ServiceResult<ExamInput> {
        let title = required_text("title", &input.title, MAX_TITLE_LEN)?;
        if input.time_limit_minutes == Some(0) {
            return Err(ServiceError::validation(
                "time_limit_minutes must be greater than zero",
            ));
        }
        Ok(ExamInput {
            title,
            description: optional_text(input.description.as_deref()),
            time_limit_minutes: input.time_limit_minutes,
        })
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Exam> {
        sqlx::query_as::<_, Exam>(&format!("SELECT {} FROM exams WHERE id = ?", EXAM_COLUMNS))
            .bind(id)
            .fetch_one(&*self.db)
            .await
            .map_err(row_or_not_found("exam", id))
    }

    /// The exam together with its questions in exam order.
    pub async fn get_detail(&self, id: Uuid) -> ServiceResult<ExamDetail> {
        let exam = self.get(id).await?;
        let questions = self.questions(id).await?;
        Ok(ExamDetail { exam, questions })
    }

    pub async fn list(&self) -> ServiceResult<Vec<Exam>> {
        let exams = sqlx::query_as::<_, Exam>(&format!(
            "SELECT {} FROM exams ORDER BY created_at DESC, title ASC",
            EXAM_COLUMNS
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(exams)
    }

    pub async fn create(&self, input: ExamInput) -> ServiceResult<Exam> {
        let input = Self::normalize(&input)?;
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "INSERT INTO exams ({}) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            EXAM_COLUMNS, EXAM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.time_limit_minutes)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        info!(id = %exam.id, "created exam");
        Ok(exam)
    }

    pub async fn update(&self, id: Uuid, input: ExamInput) -> ServiceResult<Exam> {
        let input = Self::normalize(&input)?;
        sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET title = ?, description = ?, time_limit_minutes = ?
             WHERE id = ? RETURNING {}",
            EXAM_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.time_limit_minutes)
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("exam", id))
    }

    /// Delete an exam with its question list and submissions.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM exams WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("exam", id));
        }
        info!(id = %id, "deleted exam");
        Ok(())
    }

    async fn questions(&self, exam_id: Uuid) -> ServiceResult<Vec<Question>> {
        let columns = QUESTION_COLUMNS
            .split(',')
            .map(|c| format!("q.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions q
             JOIN exam_questions eq ON eq.question_id = q.id
             WHERE eq.exam_id = ?
             ORDER BY eq.position ASC",
            columns
        ))
        .bind(exam_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(questions)
    }

    /// Replace the exam's questions with `question_ids`, in that order.
    pub async fn set_questions(
        &self,
        exam_id: Uuid,
        question_ids: Vec<Uuid>,
    ) -> ServiceResult<ExamDetail> {
        self.get(exam_id).await?;

        let mut seen = HashSet::new();
        if let Some(dup) = question_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(ServiceError::validation(format!(
                "question `{}` listed twice",
                dup
            )));
        }

        if !question_ids.is_empty() {
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM questions WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in &question_ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
            let found: HashSet<Uuid> = builder
                .build_query_scalar::<Uuid>()
                .fetch_all(&*self.db)
                .await?
                .into_iter()
                .collect();
            if let Some(missing) = question_ids.iter().find(|id| !found.contains(*id)) {
                return Err(ServiceError::validation(format!(
                    "question `{}` does not exist",
                    missing
                )));
            }
        }

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM exam_questions WHERE exam_id = ?")
            .bind(exam_id)
            .execute(&mut *tx)
            .await?;
        for (position, question_id) in question_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO exam_questions (exam_id, question_id, position) VALUES (?, ?, ?)",
            )
            .bind(exam_id)
            .bind(*question_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(exam = %exam_id, count = question_ids.len(), "replaced exam questions");

        self.get_detail(exam_id).await
    }

    /// Grade a set of answers and estimate the candidate's ability.
    ///
    /// Every exam question is scored; questions the candidate skipped or
    /// left blank count as wrong.
    pub async fn submit(&self, exam_id: Uuid, input: SubmissionInput) -> ServiceResult<Submission> {
        let user_id = required_text("user_id", &input.user_id, MAX_USER_ID_LEN)?;
        let detail = self.get_detail(exam_id).await?;
        if detail.questions.is_empty() {
            return Err(ServiceError::Unprocessable(format!(
                "exam `{}` has no questions to score",
                exam_id
            )));
        }

        let by_id: HashMap<Uuid, &Question> =
            detail.questions.iter().map(|q| (q.id, q)).collect();
        let mut selected: HashMap<Uuid, Option<u32>> = HashMap::new();
        for answer in &input.answers {
            let question = by_id.get(&answer.question_id).ok_or_else(|| {
                ServiceError::validation(format!(
                    "question `{}` is not part of exam `{}`",
                    answer.question_id, exam_id
                ))
            })?;
            if let Some(index) = answer.selected_index {
                if index as usize >= question.alternatives.len() {
                    return Err(ServiceError::validation(format!(
                        "selected_index {} is out of range for question `{}`",
                        index, question.id
                    )));
                }
            }
            if selected
                .insert(answer.question_id, answer.selected_index)
                .is_some()
            {
                return Err(ServiceError::validation(format!(
                    "question `{}` answered twice",
                    answer.question_id
                )));
            }
        }

        let answers: Vec<AnswerRecord> = detail
            .questions
            .iter()
            .map(|q| {
                let selected_index = selected.get(&q.id).copied().flatten();
                AnswerRecord {
                    question_id: q.id,
                    selected_index,
                    correct: selected_index == Some(q.correct_index),
                }
            })
            .collect();
        let responses: Vec<Response> = detail
            .questions
            .iter()
            .zip(&answers)
            .map(|(q, a)| Response {
                item: q.item_params(),
                correct: a.correct,
            })
            .collect();

        let estimate =
            tri::estimate(&responses).map_err(|err| ServiceError::Unprocessable(err.to_string()))?;
        let correct_count = answers.iter().filter(|a| a.correct).count() as u32;
        let total_questions = answers.len() as u32;

        let submission = sqlx::query_as::<_, Submission>(&format!(
            "INSERT INTO submissions ({})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            SUBMISSION_COLUMNS, SUBMISSION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(exam_id)
        .bind(&user_id)
        .bind(sqlx::types::Json(&answers))
        .bind(correct_count)
        .bind(total_questions)
        .bind(estimate.theta)
        .bind(estimate.standard_error)
        .bind(estimate.score)
        .bind(estimate.iterations)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        info!(
            exam = %exam_id,
            user = %user_id,
            correct = correct_count,
            total = total_questions,
            theta = estimate.theta,
            score = estimate.score,
            converged = estimate.converged,
            "scored submission"
        );
        Ok(submission)
    }

    pub async fn get_submission(&self, id: Uuid) -> ServiceResult<Submission> {
        sqlx::query_as::<_, Submission>(&format!(
            "SELECT {} FROM submissions WHERE id = ?",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("submission", id))
    }

    /// Submissions for one exam, newest first.
    pub async fn list_submissions(&self, exam_id: Uuid) -> ServiceResult<Vec<Submission>> {
        self.get(exam_id).await?;
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {} FROM submissions WHERE exam_id = ? ORDER BY submitted_at DESC, id DESC",
            SUBMISSION_COLUMNS
        ))
        .bind(exam_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(submissions)
    }

    /// Every submission a user made, newest first.
    pub async fn user_submissions(&self, user_id: &str) -> ServiceResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {} FROM submissions WHERE user_id = ? ORDER BY submitted_at DESC, id DESC",
            SUBMISSION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(submissions)
    }
}
