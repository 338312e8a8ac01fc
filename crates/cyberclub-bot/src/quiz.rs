//! Quiz session state.
//!
//! One session per dealt quiz message, keyed by a session id embedded in
//! each button's custom id. A session accepts exactly one scored answer:
//! the first selection locks it under the table mutex, so a second press —
//! racing or late — can never re-score.

use std::collections::HashMap;
use std::sync::Mutex;

use cyberclub_core::error::Result;
use cyberclub_core::types::QuizItem;

/// Ephemeral per-message quiz state. Lives as long as the rendered message
/// stays interactive; no TTL.
#[derive(Debug, Clone)]
pub struct QuizSession {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub locked: bool,
}

/// What a selection produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect { correct: String },
    /// The session already scored an answer; this press is a no-op.
    AlreadyAnswered,
    UnknownSession,
}

#[derive(Default)]
pub struct QuizSessionManager {
    sessions: Mutex<HashMap<String, QuizSession>>,
}

impl QuizSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a fetched quiz item. The item is validated first;
    /// a malformed stored record refuses to deal rather than panic later.
    pub fn deal(&self, quiz: &QuizItem) -> Result<String> {
        quiz.validate()?;
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        let session = QuizSession {
            question: quiz.question.clone(),
            options: quiz.options.clone(),
            correct_option: quiz.correct_option,
            locked: false,
        };
        self.lock().insert(session_id.clone(), session);
        Ok(session_id)
    }

    /// Score a selection. The check-and-lock happens under the table mutex,
    /// which is what guarantees at most one scored answer per session.
    pub fn answer(&self, session_id: &str, index: usize) -> AnswerOutcome {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(session_id) else {
            return AnswerOutcome::UnknownSession;
        };
        if session.locked {
            return AnswerOutcome::AlreadyAnswered;
        }
        session.locked = true;

        if index == session.correct_option {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect { correct: session.options[session.correct_option].clone() }
        }
    }

    /// Current session state, for re-rendering the entries.
    pub fn snapshot(&self, session_id: &str) -> Option<QuizSession> {
        self.lock().get(session_id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, QuizSession>> {
        self.sessions.lock().expect("quiz session lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> QuizItem {
        QuizItem {
            id: Some("q1".into()),
            question: "Q".into(),
            options: vec!["X".into(), "Y".into()],
            correct_option: 0,
        }
    }

    #[test]
    fn test_correct_answer() {
        let manager = QuizSessionManager::new();
        let session = manager.deal(&quiz()).expect("deal");
        assert_eq!(manager.answer(&session, 0), AnswerOutcome::Correct);
        assert!(manager.snapshot(&session).expect("session").locked);
    }

    #[test]
    fn test_incorrect_answer_names_correct_option() {
        let manager = QuizSessionManager::new();
        let session = manager.deal(&quiz()).expect("deal");
        assert_eq!(
            manager.answer(&session, 1),
            AnswerOutcome::Incorrect { correct: "X".into() }
        );
    }

    #[test]
    fn test_second_answer_is_noop() {
        let manager = QuizSessionManager::new();
        let session = manager.deal(&quiz()).expect("deal");
        assert_eq!(manager.answer(&session, 1), AnswerOutcome::Incorrect { correct: "X".into() });
        // Re-answering — even with the correct index — never re-scores.
        assert_eq!(manager.answer(&session, 0), AnswerOutcome::AlreadyAnswered);
        assert_eq!(manager.answer(&session, 1), AnswerOutcome::AlreadyAnswered);
    }

    #[test]
    fn test_unknown_session() {
        let manager = QuizSessionManager::new();
        assert_eq!(manager.answer("nope", 0), AnswerOutcome::UnknownSession);
        assert!(manager.snapshot("nope").is_none());
    }

    #[test]
    fn test_deal_rejects_malformed_item() {
        let manager = QuizSessionManager::new();
        let bad = QuizItem { correct_option: 5, ..quiz() };
        assert!(manager.deal(&bad).is_err());
    }

    #[test]
    fn test_sessions_are_independent() {
        let manager = QuizSessionManager::new();
        let first = manager.deal(&quiz()).expect("deal");
        let second = manager.deal(&quiz()).expect("deal");
        assert_eq!(manager.answer(&first, 1), AnswerOutcome::Incorrect { correct: "X".into() });
        // Locking one session leaves the other answerable.
        assert_eq!(manager.answer(&second, 0), AnswerOutcome::Correct);
    }
}
