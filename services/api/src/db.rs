//! Data Access Layer
//!
//! PostgreSQL implementation of the interview store, built on a `sqlx`
//! connection pool. Answer uniqueness per question is enforced by a unique
//! index, so a racing second submission fails instead of creating a row.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interviewer_core::{
    InterviewError, Result,
    capability::OverallAssessment,
    difficulty::Difficulty,
    scoring::Scores,
    session::{Answer, NewAnswer, NewQuestion, NewSession, Question, Session},
    store::InterviewStore,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A wrapper around the `PgPool` to provide a clear data access interface.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Creates a new `Db` instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs all pending `sqlx` migrations.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn storage(err: impl Into<anyhow::Error>) -> InterviewError {
    InterviewError::Storage(err.into())
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    difficulty: String,
    tech_stack: String,
}

impl TryFrom<SessionRow> for Session {
    type Error = InterviewError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Session {
            id: row.id,
            created_at: row.created_at,
            difficulty: parse_difficulty(&row.difficulty)?,
            tech_stack: row.tech_stack,
        })
    }
}

#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    session_id: Uuid,
    question_text: String,
    difficulty: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = InterviewError;

    fn try_from(row: QuestionRow) -> Result<Self> {
        Ok(Question {
            id: row.id,
            session_id: row.session_id,
            question_text: row.question_text,
            difficulty: parse_difficulty(&row.difficulty)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct AnswerRow {
    id: i64,
    question_id: i64,
    user_answer: String,
    score_correctness: Option<i16>,
    score_efficiency: Option<i16>,
    score_clarity: Option<i16>,
    overall_assessment: String,
    feedback: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AnswerRow> for Answer {
    type Error = InterviewError;

    fn try_from(row: AnswerRow) -> Result<Self> {
        let score = |value: Option<i16>| value.and_then(|v| u8::try_from(v).ok());
        Ok(Answer {
            id: row.id,
            question_id: row.question_id,
            user_answer: row.user_answer,
            scores: Scores {
                correctness: score(row.score_correctness),
                efficiency: score(row.score_efficiency),
                clarity: score(row.score_clarity),
            },
            overall_assessment: row
                .overall_assessment
                .parse::<OverallAssessment>()
                .map_err(storage)?,
            feedback: row.feedback,
            created_at: row.created_at,
        })
    }
}

fn parse_difficulty(raw: &str) -> Result<Difficulty> {
    raw.parse::<Difficulty>()
        .context("Corrupt difficulty column")
        .map_err(storage)
}

const ANSWER_COLUMNS: &str = "a.id, a.question_id, a.user_answer, a.score_correctness, \
     a.score_efficiency, a.score_clarity, a.overall_assessment, a.feedback, a.created_at";

#[async_trait]
impl InterviewStore for Db {
    async fn create_session(&self, new: NewSession) -> Result<Session> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO interview_sessions (id, difficulty, tech_stack)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, difficulty, tech_stack
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.difficulty.as_str())
        .bind(&new.tech_stack)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        row.try_into()
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, created_at, difficulty, tech_stack FROM interview_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Session::try_from).transpose()
    }

    async fn list_sessions(&self, offset: u32, limit: u32) -> Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, created_at, difficulty, tech_stack
            FROM interview_sessions
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(i64::from(offset))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.into_iter().map(Session::try_from).collect()
    }

    async fn create_question(&self, new: NewQuestion) -> Result<Question> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let updated = sqlx::query("UPDATE interview_sessions SET difficulty = $1 WHERE id = $2")
            .bind(new.requested_difficulty.as_str())
            .bind(new.session_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        if updated.rows_affected() == 0 {
            return Err(InterviewError::SessionNotFound(new.session_id));
        }

        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions (session_id, question_text, difficulty)
            VALUES ($1, $2, $3)
            RETURNING id, session_id, question_text, difficulty, created_at
            "#,
        )
        .bind(new.session_id)
        .bind(&new.question_text)
        .bind(new.difficulty.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        row.try_into()
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, session_id, question_text, difficulty, created_at FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Question::try_from).transpose()
    }

    async fn list_questions(&self, session_id: Uuid) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, session_id, question_text, difficulty, created_at
            FROM questions
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.into_iter().map(Question::try_from).collect()
    }

    async fn get_answer(&self, question_id: i64) -> Result<Option<Answer>> {
        let row = sqlx::query_as::<_, AnswerRow>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers a WHERE a.question_id = $1"
        ))
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Answer::try_from).transpose()
    }

    async fn latest_answer_for_session(&self, session_id: Uuid) -> Result<Option<Answer>> {
        let row = sqlx::query_as::<_, AnswerRow>(&format!(
            r#"
            SELECT {ANSWER_COLUMNS}
            FROM answers a
            JOIN questions q ON a.question_id = q.id
            WHERE q.session_id = $1
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT 1
            "#
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Answer::try_from).transpose()
    }

    async fn create_answer(&self, new: NewAnswer) -> Result<Answer> {
        let score = |value: Option<u8>| value.map(i16::from);
        let result = sqlx::query_as::<_, AnswerRow>(
            r#"
            INSERT INTO answers (question_id, user_answer, score_correctness,
                score_efficiency, score_clarity, overall_assessment, feedback)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, question_id, user_answer, score_correctness,
                score_efficiency, score_clarity, overall_assessment, feedback, created_at
            "#,
        )
        .bind(new.question_id)
        .bind(&new.user_answer)
        .bind(score(new.scores.correctness))
        .bind(score(new.scores.efficiency))
        .bind(score(new.scores.clarity))
        .bind(new.overall_assessment.as_str())
        .bind(&new.feedback)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.try_into(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(InterviewError::DuplicateAnswer {
                    question_id: new.question_id,
                })
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(InterviewError::QuestionNotFound(new.question_id))
            }
            Err(e) => Err(storage(anyhow!(e).context("Failed to insert answer"))),
        }
    }
}
