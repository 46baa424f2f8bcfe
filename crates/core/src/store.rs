//! Persistence boundary for sessions, questions and answers.
//!
//! Every operation is atomic per call and reads within one session observe
//! earlier writes to it.

use crate::error::{InterviewError, Result};
use crate::session::{Answer, NewAnswer, NewQuestion, NewSession, Question, Session};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn create_session(&self, new: NewSession) -> Result<Session>;

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>>;

    /// Newest first.
    async fn list_sessions(&self, offset: u32, limit: u32) -> Result<Vec<Session>>;

    /// Records the question and sets the owning session's difficulty to
    /// `requested_difficulty` in one write.
    ///
    /// Fails with `SessionNotFound` for an unknown session.
    async fn create_question(&self, new: NewQuestion) -> Result<Question>;

    async fn get_question(&self, id: i64) -> Result<Option<Question>>;

    /// Oldest first.
    async fn list_questions(&self, session_id: Uuid) -> Result<Vec<Question>>;

    async fn get_answer(&self, question_id: i64) -> Result<Option<Answer>>;

    /// The most recently created answer to any question of the session.
    async fn latest_answer_for_session(&self, session_id: Uuid) -> Result<Option<Answer>>;

    /// Fails with `DuplicateAnswer` if the question already has an answer,
    /// without writing a second row.
    async fn create_answer(&self, new: NewAnswer) -> Result<Answer>;
}

#[derive(Default)]
struct Tables {
    sessions: Vec<Session>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
}

/// A process-local store used by tests and the `mock` provider mode.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewStore for InMemoryStore {
    async fn create_session(&self, new: NewSession) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            difficulty: new.difficulty,
            tech_stack: new.tech_stack,
        };
        self.tables.write().await.sessions.push(session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sessions(&self, offset: u32, limit: u32) -> Result<Vec<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_question(&self, new: NewQuestion) -> Result<Question> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == new.session_id)
            .ok_or(InterviewError::SessionNotFound(new.session_id))?;
        session.difficulty = new.requested_difficulty;

        let question = Question {
            id: tables.questions.len() as i64 + 1,
            session_id: new.session_id,
            question_text: new.question_text,
            difficulty: new.difficulty,
            created_at: Utc::now(),
        };
        tables.questions.push(question.clone());
        Ok(question)
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn list_questions(&self, session_id: Uuid) -> Result<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn get_answer(&self, question_id: i64) -> Result<Option<Answer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .iter()
            .find(|a| a.question_id == question_id)
            .cloned())
    }

    async fn latest_answer_for_session(&self, session_id: Uuid) -> Result<Option<Answer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .iter()
            .rev()
            .find(|a| {
                tables
                    .questions
                    .iter()
                    .any(|q| q.id == a.question_id && q.session_id == session_id)
            })
            .cloned())
    }

    async fn create_answer(&self, new: NewAnswer) -> Result<Answer> {
        let mut tables = self.tables.write().await;
        if !tables.questions.iter().any(|q| q.id == new.question_id) {
            return Err(InterviewError::QuestionNotFound(new.question_id));
        }
        if tables.answers.iter().any(|a| a.question_id == new.question_id) {
            return Err(InterviewError::DuplicateAnswer {
                question_id: new.question_id,
            });
        }

        let answer = Answer {
            id: tables.answers.len() as i64 + 1,
            question_id: new.question_id,
            user_answer: new.user_answer,
            scores: new.scores,
            overall_assessment: new.overall_assessment,
            feedback: new.feedback,
            created_at: Utc::now(),
        };
        tables.answers.push(answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::OverallAssessment;
    use crate::difficulty::Difficulty;
    use crate::scoring::Scores;

    async fn seeded() -> (InMemoryStore, Session) {
        let store = InMemoryStore::new();
        let session = store
            .create_session(NewSession {
                difficulty: Difficulty::Medium,
                tech_stack: "Python".to_string(),
            })
            .await
            .unwrap();
        (store, session)
    }

    async fn ask(store: &InMemoryStore, session_id: Uuid, text: &str) -> Question {
        store
            .create_question(NewQuestion {
                session_id,
                question_text: text.to_string(),
                difficulty: Difficulty::Hard,
                requested_difficulty: Difficulty::Hard,
            })
            .await
            .unwrap()
    }

    fn answer_for(question_id: i64, score: i64) -> NewAnswer {
        NewAnswer {
            question_id,
            user_answer: "my answer".to_string(),
            scores: Scores::clamped(score, score, score),
            overall_assessment: OverallAssessment::Average,
            feedback: "ok".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_question_updates_session_difficulty() {
        let (store, session) = seeded().await;

        let question = ask(&store, session.id, "Explain decorators.").await;

        assert_eq!(question.session_id, session.id);
        let reloaded = store.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(reloaded.difficulty, Difficulty::Hard);
        assert_eq!(reloaded.tech_stack, "Python");
    }

    #[tokio::test]
    async fn test_create_question_for_unknown_session() {
        let store = InMemoryStore::new();
        let missing = Uuid::new_v4();

        let err = store
            .create_question(NewQuestion {
                session_id: missing,
                question_text: "Q".to_string(),
                difficulty: Difficulty::Easy,
                requested_difficulty: Difficulty::Easy,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, InterviewError::SessionNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_duplicate_answer_is_rejected_without_second_row() {
        let (store, session) = seeded().await;
        let question = ask(&store, session.id, "Q1").await;

        store.create_answer(answer_for(question.id, 4)).await.unwrap();
        let err = store
            .create_answer(answer_for(question.id, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, InterviewError::DuplicateAnswer { question_id } if question_id == question.id));
        let stored = store.get_answer(question.id).await.unwrap().unwrap();
        assert_eq!(stored.scores.correctness, Some(4));
        assert_eq!(store.tables.read().await.answers.len(), 1);
    }

    #[tokio::test]
    async fn test_latest_answer_is_scoped_to_session() {
        let (store, session) = seeded().await;
        let other = store
            .create_session(NewSession {
                difficulty: Difficulty::Easy,
                tech_stack: "Go".to_string(),
            })
            .await
            .unwrap();

        assert!(store.latest_answer_for_session(session.id).await.unwrap().is_none());

        let q1 = ask(&store, session.id, "Q1").await;
        let q2 = ask(&store, session.id, "Q2").await;
        let q_other = ask(&store, other.id, "Other").await;
        store.create_answer(answer_for(q1.id, 1)).await.unwrap();
        store.create_answer(answer_for(q2.id, 5)).await.unwrap();
        store.create_answer(answer_for(q_other.id, 0)).await.unwrap();

        let latest = store
            .latest_answer_for_session(session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.question_id, q2.id);
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first_with_paging() {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for stack in ["Rust", "Go", "Java"] {
            let session = store
                .create_session(NewSession {
                    difficulty: Difficulty::Medium,
                    tech_stack: stack.to_string(),
                })
                .await
                .unwrap();
            ids.push(session.id);
        }

        let page = store.list_sessions(0, 2).await.unwrap();
        assert_eq!(page.iter().map(|s| s.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);

        let rest = store.list_sessions(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].tech_stack, "Rust");
    }
}
