//! Question bank, exams and TRI-scored submissions.

mod common;

use axum::{Router, http::StatusCode};
use common::{create_chain, delete, get, post, put, setup_app};
use serde_json::{Value, json};

async fn create_question(app: &Router, statement: &str, correct_index: u32) -> Value {
    let (status, body) = post(
        app,
        "/api/questions",
        json!({
            "statement": statement,
            "alternatives": ["A", "B", "C", "D", "E"],
            "correct_index": correct_index,
            "subject": "matemática"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

/// An exam with three default-calibrated questions whose answers are 0, 1, 2.
async fn seeded_exam(app: &Router) -> (String, Vec<String>) {
    let mut question_ids = Vec::new();
    for (i, statement) in ["Quanto é 1 + 1?", "Quanto é 2 + 2?", "Quanto é 3 + 3?"]
        .into_iter()
        .enumerate()
    {
        let q = create_question(app, statement, i as u32).await;
        question_ids.push(q["id"].as_str().unwrap().to_string());
    }

    let (status, exam) = post(app, "/api/exams", json!({ "title": "Simulado 1" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let exam_id = exam["id"].as_str().unwrap().to_string();

    let (status, detail) = put(
        app,
        &format!("/api/exams/{}/questions", exam_id),
        json!({ "question_ids": question_ids }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", detail);
    assert_eq!(detail["questions"].as_array().unwrap().len(), 3);

    (exam_id, question_ids)
}

fn answers(question_ids: &[String], selected: &[Option<u32>]) -> Value {
    Value::Array(
        question_ids
            .iter()
            .zip(selected)
            .map(|(id, sel)| json!({ "question_id": id, "selected_index": sel }))
            .collect(),
    )
}

#[tokio::test]
async fn test_question_defaults_and_validation() {
    let app = setup_app().await;
    let q = create_question(&app, "Qual é a capital do Brasil?", 3).await;
    assert_eq!(q["discrimination"], 1.0);
    assert_eq!(q["difficulty"], 0.0);
    assert_eq!(q["guessing"], 0.2);
    assert_eq!(q["alternatives"].as_array().unwrap().len(), 5);

    let bad = [
        json!({ "statement": "x?", "alternatives": ["só uma"], "correct_index": 0 }),
        json!({ "statement": "x?", "alternatives": ["a", "b"], "correct_index": 2 }),
        json!({ "statement": "x?", "alternatives": ["a", "b"], "correct_index": 0, "guessing": 1.0 }),
        json!({ "statement": "x?", "alternatives": ["a", "b"], "correct_index": 0, "discrimination": 0.0 }),
        json!({ "statement": "x?", "alternatives": ["a", "b"], "correct_index": 0, "discrimination": 1e200 }),
        json!({ "statement": " ", "alternatives": ["a", "b"], "correct_index": 0 }),
    ];
    for payload in bad {
        let (status, _) = post(&app, "/api/questions", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_duplicate_statement_conflicts() {
    let app = setup_app().await;
    create_question(&app, "Qual é a capital do Brasil?", 0).await;
    let (status, _) = post(
        &app,
        "/api/questions",
        json!({
            "statement": "qual é a   CAPITAL do brasil?",
            "alternatives": ["a", "b"],
            "correct_index": 0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_question_linked_to_lesson_only() {
    let app = setup_app().await;
    let ids = create_chain(&app).await;

    let payload = |lesson: &str| {
        json!({
            "statement": format!("Pergunta sobre {}", lesson),
            "alternatives": ["a", "b"],
            "correct_index": 1,
            "lesson_id": lesson
        })
    };
    let (status, body) = post(&app, "/api/questions", payload(ids[5].as_str())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["lesson_id"], ids[5].as_str());

    let (status, _) = post(&app, "/api/questions", payload(ids[2].as_str())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, &format!("/api/questions?lesson_id={}", ids[5])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_question_pagination() {
    let app = setup_app().await;
    for i in 0..5 {
        create_question(&app, &format!("Questão número {}", i), 0).await;
    }

    let mut seen = Vec::new();
    let mut uri = "/api/questions?limit=2".to_string();
    loop {
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        let page = body["questions"].as_array().unwrap();
        assert!(page.len() <= 2);
        seen.extend(page.iter().map(|q| q["id"].as_str().unwrap().to_string()));
        match body["next_continuation_token"].as_str() {
            Some(token) => uri = format!("/api/questions?limit=2&continuation_token={}", token),
            None => break,
        }
    }
    assert_eq!(seen.len(), 5);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);

    let (status, _) = get(&app, "/api/questions?continuation_token=%25%25").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_question() {
    let app = setup_app().await;
    let q = create_question(&app, "Quanto é 5 x 5?", 0).await;
    let id = q["id"].as_str().unwrap();

    let (status, body) = put(
        &app,
        &format!("/api/questions/{}", id),
        json!({
            "statement": "Quanto é 5 x 6?",
            "alternatives": ["25", "30"],
            "correct_index": 1,
            "difficulty": 1.5
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"], 1.5);
    assert_eq!(body["correct_index"], 1);

    let (status, _) = delete(&app, &format!("/api/questions/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/api/questions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_all_correct_scores_top_of_scale() {
    let app = setup_app().await;
    let (exam_id, qids) = seeded_exam(&app).await;

    let (status, sub) = post(
        &app,
        &format!("/api/exams/{}/submissions", exam_id),
        json!({ "user_id": "ana", "answers": answers(&qids, &[Some(0), Some(1), Some(2)]) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", sub);
    assert_eq!(sub["correct_count"], 3);
    assert_eq!(sub["total_questions"], 3);
    assert_eq!(sub["theta"], 4.0);
    assert_eq!(sub["score"], 900.0);
}

#[tokio::test]
async fn test_blank_and_missing_answers_count_as_wrong() {
    let app = setup_app().await;
    let (exam_id, qids) = seeded_exam(&app).await;

    // first question blank, third omitted entirely
    let (status, sub) = post(
        &app,
        &format!("/api/exams/{}/submissions", exam_id),
        json!({ "user_id": "bruno", "answers": answers(&qids[..2], &[None, Some(0)]) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["correct_count"], 0);
    assert_eq!(sub["score"], 100.0);
    let recorded = sub["answers"].as_array().unwrap();
    assert_eq!(recorded.len(), 3);
    assert!(recorded[2]["selected_index"].is_null());
    assert_eq!(recorded[2]["correct"], false);
}

#[tokio::test]
async fn test_partial_score_is_between_bounds() {
    let app = setup_app().await;
    let (exam_id, qids) = seeded_exam(&app).await;

    let (status, sub) = post(
        &app,
        &format!("/api/exams/{}/submissions", exam_id),
        json!({ "user_id": "carla", "answers": answers(&qids, &[Some(0), Some(1), Some(4)]) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["correct_count"], 2);
    let score = sub["score"].as_f64().unwrap();
    assert!(score > 500.0 && score < 900.0, "score {}", score);
    assert!(sub["standard_error"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_submission_validation() {
    let app = setup_app().await;
    let (exam_id, qids) = seeded_exam(&app).await;
    let uri = format!("/api/exams/{}/submissions", exam_id);

    let stranger = create_question(&app, "Fora da prova?", 0).await;
    let (status, _) = post(
        &app,
        &uri,
        json!({ "user_id": "ana", "answers": [{ "question_id": stranger["id"], "selected_index": 0 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        &uri,
        json!({ "user_id": "ana", "answers": answers(&[qids[0].clone(), qids[0].clone()], &[Some(0), Some(1)]) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        &uri,
        json!({ "user_id": "ana", "answers": answers(&qids[..1], &[Some(7)]) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, &uri, json!({ "user_id": "", "answers": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exam_without_questions_is_unprocessable() {
    let app = setup_app().await;
    let (_, exam) = post(&app, "/api/exams", json!({ "title": "Vazio" })).await;
    let (status, _) = post(
        &app,
        &format!("/api/exams/{}/submissions", exam["id"].as_str().unwrap()),
        json!({ "user_id": "ana", "answers": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_submission_listings() {
    let app = setup_app().await;
    let (exam_id, qids) = seeded_exam(&app).await;
    let uri = format!("/api/exams/{}/submissions", exam_id);

    let (_, first) = post(
        &app,
        &uri,
        json!({ "user_id": "ana", "answers": answers(&qids, &[Some(0), None, None]) }),
    )
    .await;
    post(
        &app,
        &uri,
        json!({ "user_id": "bruno", "answers": answers(&qids, &[Some(0), Some(1), None]) }),
    )
    .await;

    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = get(&app, "/api/users/ana/submissions").await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], first["id"]);

    let (status, body) = get(&app, &format!("/api/submissions/{}", first["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "ana");
}

#[tokio::test]
async fn test_exam_crud_and_question_list_rules() {
    let app = setup_app().await;
    let (exam_id, qids) = seeded_exam(&app).await;

    let (status, body) = get(&app, &format!("/api/exams/{}", exam_id)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Vec<&str> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap())
        .collect();
    assert_eq!(order, qids.iter().map(String::as_str).collect::<Vec<_>>());

    let (status, _) = put(
        &app,
        &format!("/api/exams/{}/questions", exam_id),
        json!({ "question_ids": [qids[0], qids[0]] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put(
        &app,
        &format!("/api/exams/{}/questions", exam_id),
        json!({ "question_ids": [qids[0], "00000000-0000-0000-0000-000000000000"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = put(
        &app,
        &format!("/api/exams/{}", exam_id),
        json!({ "title": "Simulado final", "time_limit_minutes": 90 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time_limit_minutes"], 90);

    let (status, body) = get(&app, "/api/exams").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = delete(&app, &format!("/api/exams/{}", exam_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/api/exams/{}/submissions", exam_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
