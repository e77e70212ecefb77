use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions::get_questions_for_category},
        Question,
    },
    server::{app::AppState, errors::ApiError},
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = categories::get_category_map(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<CategoryQuestionsResponse>> {
    let Path(id) = id.map_err(|e| ApiError::NotFound(e.body_text()))?;

    let category = match categories::get_category(&pool, id).await {
        Ok(category) => category,
        Err(sqlx::Error::RowNotFound) => {
            return Err(ApiError::NotFound(format!("category {id}")));
        }
        Err(e) => return Err(e.into()),
    };

    let questions = get_questions_for_category(&pool, category.id).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound(format!(
            "category {} has no questions",
            category.id
        )));
    }

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: category.id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
