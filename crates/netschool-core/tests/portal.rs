//! Data accessors against a mocked portal.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::NaiveDate;
use netschool_core::{
    auth::PasswordLoginRequest,
    client::SchoolIdentifier,
    models::MailFolder,
    portal::PortalError,
    Client,
};
use netschool_test::{
    portal::{init_mocks, init_mocks_for_token, SCHOOL_ID, STUDENT_ID, YEAR_ID},
    start_api_mock,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, body_partial_json, header, method, path, query_param},
    Mock, Request, Respond, ResponseTemplate,
};

async fn logged_in(mut mocks: Vec<Mock>) -> (wiremock::MockServer, Client) {
    mocks.extend(init_mocks_for_token("tok"));
    let (server, settings) = start_api_mock(mocks).await;
    let client = Client::new(settings).unwrap();
    client.auth().login_with_token("tok", None).await.unwrap();
    (server, client)
}

fn diary_body() -> serde_json::Value {
    json!({
        "weekStart": "2024-09-02T00:00:00",
        "weekEnd": "2024-09-07T00:00:00",
        "weekDays": [{
            "date": "2024-09-02T00:00:00",
            "lessons": [{
                "day": "2024-09-02T00:00:00",
                "startTime": "08:30",
                "endTime": "09:15",
                "room": "12",
                "number": 1,
                "subjectName": "Математика",
                "assignments": [{
                    "id": 9,
                    "typeId": 3,
                    "assignmentName": "№ 101",
                    "mark": {"mark": 5, "dutyMark": false},
                    "dueDate": "2024-09-02T00:00:00",
                }],
            }],
        }],
    })
}

#[tokio::test]
async fn test_diary_for_explicit_range() {
    let (_server, client) = logged_in(vec![Mock::given(method("GET"))
        .and(path("/webapi/student/diary"))
        .and(header("at", "tok"))
        .and(query_param("studentId", STUDENT_ID.to_string()))
        .and(query_param("yearId", YEAR_ID.to_string()))
        .and(query_param("weekStart", "2024-09-02"))
        .and(query_param("weekEnd", "2024-09-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(diary_body()))])
    .await;

    let diary = client
        .portal()
        .diary(
            NaiveDate::from_ymd_opt(2024, 9, 2),
            NaiveDate::from_ymd_opt(2024, 9, 7),
        )
        .await
        .unwrap();

    let lesson = &diary.schedule[0].lessons[0];
    assert_eq!(lesson.subject, "Математика");
    assert_eq!(lesson.assignments[0].mark, Some(5));
    assert_eq!(lesson.assignments[0].kind, "Домашнее задание");
}

#[tokio::test]
async fn test_accessor_without_login() {
    let client = Client::for_url("https://sgo.example.ru").unwrap();
    let err = client.portal().announcements(-1).await.unwrap_err();
    assert!(matches!(err, PortalError::NotAuthenticated(_)));
}

#[tokio::test]
async fn test_unauthorized_without_credentials_is_session_expired() {
    let (_server, client) = logged_in(vec![Mock::given(method("GET"))
        .and(path("/webapi/announcements"))
        .respond_with(ResponseTemplate::new(401))])
    .await;

    let err = client.portal().announcements(-1).await.unwrap_err();
    assert!(matches!(err, PortalError::SessionExpired(_)));
}

/// Rejects the first request with 401, then serves `body`.
struct ExpireOnce {
    calls: Arc<AtomicUsize>,
    body: serde_json::Value,
}

impl Respond for ExpireOnce {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            ResponseTemplate::new(401)
        } else {
            ResponseTemplate::new(200).set_body_json(self.body.clone())
        }
    }
}

#[tokio::test]
async fn test_unauthorized_with_credentials_logs_in_again() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut mocks = vec![
        Mock::given(method("GET"))
            .and(path("/webapi/logindata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({}))),
        Mock::given(method("POST"))
            .and(path("/webapi/auth/getdata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"salt": "1"}))),
        Mock::given(method("POST"))
            .and(path("/webapi/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"at": "tok"})))
            .expect(2),
        Mock::given(method("GET"))
            .and(path("/webapi/announcements"))
            .and(query_param("take", "5"))
            .respond_with(ExpireOnce {
                calls: calls.clone(),
                body: json!([{
                    "name": "Собрание",
                    "description": "<p>В пятницу</p>",
                    "postDate": "2024-09-05T10:00:00.123",
                    "author": {"id": 3, "fio": "Петрова А. А.", "nickName": "Петрова"},
                }]),
            }),
    ];
    mocks.extend(init_mocks());
    let (_server, settings) = start_api_mock(mocks).await;
    let client = Client::new(settings).unwrap();
    client
        .auth()
        .login_password(&PasswordLoginRequest {
            user_name: "ivanov".to_string(),
            password: "secret".to_string(),
            school: SchoolIdentifier::Id(SCHOOL_ID),
        })
        .await
        .unwrap();

    let announcements = client.portal().announcements(5).await.unwrap();

    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].author.full_name, "Петрова А. А.");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_attachments_of_assignment() {
    let (_server, client) = logged_in(vec![Mock::given(method("POST"))
        .and(path("/webapi/student/diary/get-attachments"))
        .and(query_param("studentId", STUDENT_ID.to_string()))
        .and(body_json(json!({"assignId": [9]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "assignmentId": 9,
            "attachments": [{"id": 77, "name": "task.pdf", "originalFileName": "Задание.pdf"}],
        }])))])
    .await;

    let attachments = client.portal().attachments(9).await.unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].name, "Задание.pdf");
}

#[tokio::test]
async fn test_profile_picture_follows_redirect() {
    let (server, client) = logged_in(vec![]).await;
    Mock::given(method("GET"))
        .and(path("/webapi/users/photo"))
        .and(query_param("userId", "5"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/storage/photos/5.jpg"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/storage/photos/5.jpg"))
        .and(header("at", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xd8, 0xff]))
        .mount(&server)
        .await;

    let bytes = client.portal().download_profile_picture(5).await.unwrap();
    assert_eq!(bytes, vec![0xff, 0xd8, 0xff]);
}

#[tokio::test]
async fn test_mail_list_request() {
    let (_server, client) = logged_in(vec![Mock::given(method("POST"))
        .and(path("/webapi/mail/registry"))
        .and(body_partial_json(json!({
            "page": 2,
            "pageSize": 10,
            "order": {"fieldId": "sent", "ascending": false},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [{"id": "15", "author": "Петрова А. А.", "subject": "Собрание", "sent": "2024-09-05T10:00:00"}],
            "page": 2,
            "totalItems": 11,
        })))])
    .await;

    let page = client
        .portal()
        .mail_list(MailFolder::Inbox, 2, 10)
        .await
        .unwrap();
    assert_eq!(page.total_items, 11);
    assert_eq!(page.entries[0].id, 15);
}

#[tokio::test]
async fn test_mail_send_body() {
    let (_server, client) = logged_in(vec![Mock::given(method("POST"))
        .and(path("/webapi/mail/messages/send"))
        .and(body_json(json!({
            "subject": "Вопрос",
            "text": "Добрый день",
            "to": [{"id": "abc=="}],
            "cc": [],
            "bcc": [],
            "notify": false,
            "fileAttachments": [],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)])
    .await;

    client
        .portal()
        .mail_send("Вопрос", "Добрый день", &["abc==".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_school_search_without_login() {
    let (_server, settings) = start_api_mock(vec![Mock::given(method("GET"))
        .and(path("/webapi/schools/search"))
        .and(query_param("name", "У"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": SCHOOL_ID, "name": "МБОУ СОШ №1", "shortName": "Школа №1", "addressString": "ул. Ленина, 1"},
        ])))])
    .await;
    let client = Client::new(settings).unwrap();

    let schools = client.portal().schools().await.unwrap();
    assert_eq!(schools[0].id, SCHOOL_ID);
    assert_eq!(schools[0].address, "ул. Ленина, 1");
}
