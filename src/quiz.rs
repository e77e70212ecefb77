//! Picking the next quiz question.
//!
//! A quiz session is stateless on the server: the client sends the ids it has
//! already been shown and gets one question it has not seen yet.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::queries::{categories, questions};
use crate::db::Question;

/// Category filter value meaning "questions from every category".
pub const ALL_CATEGORIES: i64 = 0;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("category {0} does not exist")]
    UnknownCategory(i64),

    #[error("no unseen questions left")]
    NoUnseenQuestions,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Uniformly picks one id of `pool` that is not in `seen`.
pub fn choose_unseen<R: Rng + ?Sized>(pool: &[i64], seen: &HashSet<i64>, rng: &mut R) -> Option<i64> {
    let unseen: Vec<i64> = pool.iter().copied().filter(|id| !seen.contains(id)).collect();
    unseen.choose(rng).copied()
}

pub async fn next_question(
    pool: &SqlitePool,
    category_id: i64,
    previous_question_ids: &[i64],
) -> Result<Question, QuizError> {
    let filter = if category_id == ALL_CATEGORIES {
        None
    } else {
        if !categories::category_exists(pool, category_id).await? {
            return Err(QuizError::UnknownCategory(category_id));
        }
        Some(category_id)
    };

    let candidates = questions::get_question_ids(pool, filter).await?;
    let seen: HashSet<i64> = previous_question_ids.iter().copied().collect();

    let chosen = {
        let mut rng = rand::thread_rng();
        choose_unseen(&candidates, &seen, &mut rng)
    };
    let id = chosen.ok_or(QuizError::NoUnseenQuestions)?;

    tracing::debug!(
        category_id,
        candidates = candidates.len(),
        seen = seen.len(),
        id,
        "Picked quiz question"
    );
    load_chosen(pool, id).await
}

/// Loads the picked question. It may have been deleted since the ids were read,
/// which leaves nothing to serve rather than a store failure.
async fn load_chosen(pool: &SqlitePool, id: i64) -> Result<Question, QuizError> {
    match questions::get_question_by_id(pool, id).await {
        Ok(question) => Ok(question),
        Err(sqlx::Error::RowNotFound) => Err(QuizError::NoUnseenQuestions),
        Err(e) => Err(e.into()),
    }
}
