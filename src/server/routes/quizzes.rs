use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::Question,
    quiz::next_question,
    server::{
        app::AppState,
        deserializers::{deserialize_null_as_empty, QuizCategory},
        errors::ApiError,
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    previous_questions: Vec<i64>,
    quiz_category: QuizCategory,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Question,
}

async fn play(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let category_id = request.quiz_category.id;
    tracing::debug!(
        category_id,
        category = request.quiz_category.kind.as_deref().unwrap_or("all"),
        previous = request.previous_questions.len(),
        "Quiz question requested"
    );

    let question = next_question(&pool, category_id, &request.previous_questions).await?;
    QUIZ_QUESTIONS_SERVED
        .with_label_values(&[category_id.to_string().as_str()])
        .inc();

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play))
        .with_state(state)
}
