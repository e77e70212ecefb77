use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;
use trivia_api::db::queries::questions::{get_all_questions, get_question_by_id, import_questions};
use trivia_api::db::{run_migrations, Question};
use trivia_api::server::app::build_router;

const QUESTIONS_CSV: &str = include_str!("../data/questions.csv");

async fn setup() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();

    let questions: Vec<Question> = csv::Reader::from_reader(QUESTIONS_CSV.as_bytes())
        .deserialize::<Question>()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(questions.len(), 19);
    import_questions(&pool, questions).await.unwrap();

    (build_router(pool.clone()), pool)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn assert_error(status: StatusCode, body: &Value, expected: StatusCode, message: &str) {
    assert_eq!(status, expected);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], expected.as_u16());
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn lists_categories() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let categories = body["categories"].as_object().unwrap();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories["4"], "History");
}

#[tokio::test]
async fn wrong_method_is_405() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::POST, "/categories", None).await;
    assert_error(status, &body, StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/answers", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "resource not found");
}

#[tokio::test]
async fn first_page_of_questions() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/questions?page=1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);
    assert_eq!(body["total_questions"], 19);
    assert_eq!(body["categories"].as_object().unwrap().len(), 6);
    assert_eq!(body["current_category"], "History");

    let first = &body["questions"][0];
    assert_eq!(first["id"], 2);
    assert_eq!(first["answer"], "Apollo 13");
    assert_eq!(first["category"], 5);
    assert_eq!(first["difficulty"], 4);
}

#[tokio::test]
async fn last_page_and_bad_page_numbers() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, Method::GET, "/questions?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 9);
    assert_eq!(body["questions"][0]["id"], 15);

    for uri in ["/questions", "/questions?page=0", "/questions?page=abc"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["questions"][0]["id"], 2, "{uri}");
    }
}

#[tokio::test]
async fn page_past_the_end_is_404() {
    let (app, _) = setup().await;
    for uri in ["/questions?page=100", "/questions?page=99999999999999999999"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_error(status, &body, StatusCode::NOT_FOUND, "resource not found");
    }
}

#[tokio::test]
async fn questions_by_category() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/categories/1/questions", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);
    assert_eq!(body["total_questions"], 3);
    assert_eq!(body["current_category"], 1);
    for question in body["questions"].as_array().unwrap() {
        assert_eq!(question["category"], 1);
    }
}

#[tokio::test]
async fn questions_by_missing_or_empty_category() {
    let (app, pool) = setup().await;

    let (status, body) = send(&app, Method::GET, "/categories/7/questions", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "resource not found");

    let (status, body) = send(&app, Method::GET, "/categories/abc/questions", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "resource not found");

    sqlx::query("DELETE FROM questions WHERE category = 1")
        .execute(&pool)
        .await
        .unwrap();
    let (status, body) = send(&app, Method::GET, "/categories/1/questions", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "resource not found");
}

#[tokio::test]
async fn creates_a_question() {
    let (app, pool) = setup().await;
    let before = get_all_questions(&pool).await.unwrap().len();

    let new_question = json!({
        "question": "Which stubborn bird wrecks the balcony every spring?",
        "answer": "The pigeon",
        "category": 1,
        "difficulty": 2
    });
    let (status, body) = send(&app, Method::POST, "/questions", Some(new_question)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let created = get_question_by_id(&pool, body["created"].as_i64().unwrap())
        .await
        .unwrap();
    assert_eq!(created.answer, "The pigeon");
    assert_eq!(get_all_questions(&pool).await.unwrap().len(), before + 1);
}

#[tokio::test]
async fn creates_from_form_strings_and_unknown_category() {
    let (app, pool) = setup().await;
    let new_question = json!({
        "question": "What is the answer?",
        "answer": "42",
        "category": "99",
        "difficulty": "5"
    });
    let (status, body) = send(&app, Method::POST, "/questions", Some(new_question)).await;

    assert_eq!(status, StatusCode::OK);
    let created = get_question_by_id(&pool, body["created"].as_i64().unwrap())
        .await
        .unwrap();
    assert_eq!(created.category, 99);
    assert_eq!(created.difficulty, 5);
}

#[tokio::test]
async fn incomplete_question_is_422_and_not_stored() {
    let (app, pool) = setup().await;
    let before = get_all_questions(&pool).await.unwrap().len();

    let (status, body) = send(&app, Method::POST, "/questions", None).await;
    assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "unprocessable entity");

    let partial = json!({"question": "Half a question?", "answer": "Yes"});
    let (status, body) = send(&app, Method::POST, "/questions", Some(partial)).await;
    assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "unprocessable entity");

    assert_eq!(get_all_questions(&pool).await.unwrap().len(), before);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/questions",
        Some(json!({"searchTerm": "WORLD cup"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_questions"], 2);
    assert_eq!(body["current_category"], "History");
    let ids: Vec<i64> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![10, 11]);
}

#[tokio::test]
async fn search_matches_accented_letters_in_any_case() {
    let (app, _) = setup().await;
    let new_question = json!({
        "question": "Which novel did Émile Zola write in 1885?",
        "answer": "Germinal",
        "category": 2,
        "difficulty": 3
    });
    let (status, _) = send(&app, Method::POST, "/questions", Some(new_question)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/questions",
        Some(json!({"searchTerm": "émile"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 1);
    assert_eq!(body["questions"][0]["answer"], "Germinal");
}

#[tokio::test]
async fn search_without_matches_is_empty_not_an_error() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/questions",
        Some(json!({"searchTerm": "xylophone"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_questions"], 0);
    assert!(body["questions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_results_are_paginated() {
    let (app, _) = setup().await;
    let (_, body) = send(&app, Method::POST, "/questions", Some(json!({"searchTerm": "?"}))).await;
    assert_eq!(body["total_questions"], 19);
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);

    let (status, body) = send(
        &app,
        Method::POST,
        "/questions?page=2",
        Some(json!({"searchTerm": "?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn deletes_a_question() {
    let (app, pool) = setup().await;
    let (status, body) = send(&app, Method::DELETE, "/questions/20", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["removed_id"], 20);
    assert!(matches!(
        get_question_by_id(&pool, 20).await,
        Err(sqlx::Error::RowNotFound)
    ));
}

#[tokio::test]
async fn deleting_a_missing_question_is_422() {
    let (app, pool) = setup().await;
    let (status, body) = send(&app, Method::DELETE, "/questions/200", None).await;

    assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "unprocessable entity");
    assert_eq!(get_all_questions(&pool).await.unwrap().len(), 19);
}

#[tokio::test]
async fn quiz_question_from_category_sent_as_string() {
    let (app, _) = setup().await;
    let request = json!({
        "previous_questions": [5, 9],
        "quiz_category": {"type": "Art", "id": "2"}
    });
    let (status, body) = send(&app, Method::POST, "/quizzes", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["question"]["category"], 2);
}

#[tokio::test]
async fn quiz_over_all_categories() {
    let (app, _) = setup().await;
    let request = json!({
        "previous_questions": [],
        "quiz_category": {"type": "click", "id": 0}
    });
    let (status, body) = send(&app, Method::POST, "/quizzes", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["question"]["id"].is_i64());
}

#[tokio::test]
async fn quiz_category_label_is_optional() {
    let (app, _) = setup().await;
    for category in [json!({"id": 6}), json!({"type": null, "id": 6})] {
        let request = json!({"previous_questions": [], "quiz_category": category});
        let (status, body) = send(&app, Method::POST, "/quizzes", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["category"], 6);
    }
}

#[tokio::test]
async fn quiz_skips_previous_questions() {
    let (app, _) = setup().await;
    // art questions are 16 to 19
    let request = json!({
        "previous_questions": [16, 17, 19],
        "quiz_category": {"type": "Art", "id": 2}
    });
    for _ in 0..10 {
        let (status, body) = send(&app, Method::POST, "/quizzes", Some(request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["id"], 18);
    }
}

#[tokio::test]
async fn quiz_with_unknown_category_is_400() {
    let (app, _) = setup().await;
    let request = json!({
        "previous_questions": [],
        "quiz_category": {"type": "click", "id": 9}
    });
    let (status, body) = send(&app, Method::POST, "/quizzes", Some(request)).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "bad request");
}

#[tokio::test]
async fn exhausted_quiz_is_400() {
    let (app, _) = setup().await;
    let request = json!({
        "previous_questions": [16, 17, 18, 19],
        "quiz_category": {"type": "Art", "id": 2}
    });
    let (status, body) = send(&app, Method::POST, "/quizzes", Some(request)).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "bad request");
}

#[tokio::test]
async fn malformed_quiz_request_is_400() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/quizzes",
        Some(json!({"previous_questions": []})),
    )
    .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "bad request");

    let (status, body) = send(&app, Method::POST, "/quizzes", None).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "bad request");
}

#[tokio::test]
async fn metrics_count_served_quiz_questions() {
    let (app, _) = setup().await;
    let request = json!({
        "previous_questions": [],
        "quiz_category": {"type": "Sports", "id": 6}
    });
    let (status, _) = send(&app, Method::POST, "/quizzes", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("quiz_questions_served_total{category=\"6\"}"));
}
