use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_map, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        errors::ApiError,
        pagination::{paginate, PageQuery},
    },
};

use super::{ApiResponse, DEFAULT_CURRENT_CATEGORY};

/// `POST /questions` either searches or creates, depending on `searchTerm`.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionsBody {
    Search {
        #[serde(rename = "searchTerm")]
        search_term: String,
    },
    Create(NewQuestion),
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    current_category: &'static str,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: &'static str,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
}

#[derive(Serialize)]
struct Removed {
    success: bool,
    removed_id: i64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum QuestionsPostResponse {
    Search(SearchResults),
    Created(Created),
}

async fn questions_page(
    State(pool): State<SqlitePool>,
    Query(query): Query<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = query.page();
    let all_questions = questions::get_all_questions(&pool).await?;
    let total_questions = all_questions.len();
    let shown = paginate(all_questions, page);
    if shown.is_empty() {
        return Err(ApiError::NotFound(format!(
            "page {page} of {total_questions} questions"
        )));
    }

    Ok(Json(QuestionsPage {
        success: true,
        questions: shown,
        total_questions,
        categories: get_category_map(&pool).await?,
        current_category: DEFAULT_CURRENT_CATEGORY,
    }))
}

async fn search_or_create(
    State(pool): State<SqlitePool>,
    Query(query): Query<PageQuery>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> ApiResponse<Json<QuestionsPostResponse>> {
    let Json(body) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;

    match body {
        QuestionsBody::Search { search_term } => {
            let found = questions::search_questions(&pool, &search_term).await?;
            tracing::debug!(%search_term, matches = found.len(), "Searched questions");
            Ok(Json(QuestionsPostResponse::Search(SearchResults {
                success: true,
                total_questions: found.len(),
                questions: paginate(found, query.page()),
                current_category: DEFAULT_CURRENT_CATEGORY,
            })))
        }
        QuestionsBody::Create(new_question) => {
            let id = questions::create_question(&pool, &new_question)
                .await
                .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
            tracing::info!(id, category = new_question.category, "Created question");
            Ok(Json(QuestionsPostResponse::Created(Created {
                success: true,
                created: id,
            })))
        }
    }
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Removed>> {
    let Path(id) = id.map_err(|e| ApiError::NotFound(e.body_text()))?;

    questions::delete_question(&pool, id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::Unprocessable(format!("question {id} not found")),
            other => ApiError::Database(other),
        })?;
    tracing::info!(id, "Deleted question");

    Ok(Json(Removed {
        success: true,
        removed_id: id,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(search_or_create))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
