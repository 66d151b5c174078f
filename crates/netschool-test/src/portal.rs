//! Canned portal responses.

use serde_json::json;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockBuilder, ResponseTemplate,
};

/// Identifiers the fixtures resolve to.
pub const STUDENT_ID: i64 = 1001;
/// Academic year of the fixtures.
pub const YEAR_ID: i64 = 7;
/// School of the fixtures.
pub const SCHOOL_ID: i64 = 42;

/// The calls every successful login makes after obtaining a token: student identity, current
/// year, context and the assignment type dictionary.
pub fn init_mocks() -> Vec<Mock> {
    init_builders()
        .into_iter()
        .map(|(builder, response)| builder.respond_with(response))
        .collect()
}

/// Like [init_mocks], but the portal only answers requests carrying the access token `token`.
/// Init calls with any other token get a 401.
pub fn init_mocks_for_token(token: &str) -> Vec<Mock> {
    let mut mocks: Vec<Mock> = init_builders()
        .into_iter()
        .map(|(builder, response)| {
            builder
                .and(header("at", token))
                .respond_with(response)
                .with_priority(1)
        })
        .collect();
    mocks.push(
        Mock::given(method("GET"))
            .and(path("/webapi/student/diary/init"))
            .respond_with(ResponseTemplate::new(401))
            .with_priority(5),
    );
    mocks
}

fn init_builders() -> Vec<(MockBuilder, ResponseTemplate)> {
    vec![
        (
            Mock::given(method("GET")).and(path("/webapi/student/diary/init")),
            ResponseTemplate::new(200).set_body_json(json!({
                "students": [{"studentId": STUDENT_ID, "nickName": "Иванов Иван"}],
                "currentStudentId": 0,
                "weekStart": "2024-09-02T00:00:00",
            })),
        ),
        (
            Mock::given(method("GET")).and(path("/webapi/years/current")),
            ResponseTemplate::new(200).set_body_json(json!({
                "id": YEAR_ID,
                "name": "2024/2025",
            })),
        ),
        (
            Mock::given(method("GET")).and(path("/webapi/context")),
            ResponseTemplate::new(200).set_body_json(json!({ "schoolId": SCHOOL_ID })),
        ),
        (
            Mock::given(method("GET"))
                .and(path("/webapi/grade/assignment/types"))
                .and(query_param("all", "false")),
            ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Ответ на уроке", "abbr": "О"},
                {"id": 3, "name": "Домашнее задание", "abbr": "Д"},
            ])),
        ),
    ]
}
