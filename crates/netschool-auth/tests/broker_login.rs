//! Federated logins against a mocked portal and a mocked identity broker.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use netschool_auth::{
    broker::{
        BrokerProtocolError, BrokerRejection, EventStreamError, EventSubscriber,
        OrganizationError,
    },
    prompt::FixedProof,
    BrokerAuthClientExt, BrokerLoginError, BrokerPasswordRequest, BrokerQrRequest,
    BrokerSettings,
};
use netschool_core::{auth::LoginError, client::LoginMethod, http::CookieStore, Client};
use netschool_test::{
    portal::{init_mocks_for_token, STUDENT_ID, YEAR_ID},
    start_api_mock,
};
use serde_json::{json, Value};
use url::Url;
use wiremock::{
    matchers::{body_json, body_string_contains, method, path, query_param},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

const LOGIN_STATE: &str = "1a2b-3c4d";

struct Setup {
    portal: MockServer,
    broker: MockServer,
    client: Client,
}

impl Setup {
    fn settings(&self) -> BrokerSettings {
        BrokerSettings {
            base_url: self.broker.uri(),
            qr_retry_backoff: 0,
            ..Default::default()
        }
    }

    fn callback(&self) -> String {
        format!("{}/webapi/sso/esia/callback?code=abc", self.portal.uri())
    }
}

fn linked_school() -> Value {
    json!([{"id": 555, "displayName": "Лицей №3", "roles": [{"id": 2}]}])
}

async fn setup(users: Value) -> Setup {
    let broker = MockServer::start().await;

    let mut mocks = init_mocks_for_token("portal-token");
    mocks.extend([
        Mock::given(method("GET"))
            .and(path("/webapi/logindata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "5.40"}))),
        Mock::given(method("GET"))
            .and(path("/webapi/sso/esia/crosslogin"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/aas/oauth2/ac?client_id=sgo", broker.uri())),
            ),
        Mock::given(method("GET"))
            .and(path("/webapi/sso/esia/callback"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("/app/school/esia?loginState={LOGIN_STATE}"))
                    .insert_header("set-cookie", "NSSESSIONID=portal-sess; Path=/; HttpOnly"),
            ),
        Mock::given(method("GET"))
            .and(path("/app/school/esia"))
            .respond_with(ResponseTemplate::new(200)),
        Mock::given(method("GET"))
            .and(path("/webapi/sso/esia/account-info"))
            .and(query_param("loginState", LOGIN_STATE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users }))),
        Mock::given(method("POST"))
            .and(path("/webapi/auth/login"))
            .and(body_string_contains("loginType=8"))
            .and(body_string_contains("lscope=555"))
            .and(body_string_contains("idp=esia"))
            .and(body_string_contains(format!("loginState={LOGIN_STATE}")))
            .and(body_string_contains("rolegroup=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"at": "portal-token"}))),
    ]);
    let (portal, settings) = start_api_mock(mocks).await;

    Mock::given(method("GET"))
        .and(path("/aas/oauth2/ac"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/login/")
                .insert_header("set-cookie", "ESIA_SESSION=esia-1; Path=/"),
        )
        .mount(&broker)
        .await;
    Mock::given(method("GET"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&broker)
        .await;

    Setup {
        portal,
        broker,
        client: Client::new(settings).unwrap(),
    }
}

fn password_request() -> BrokerPasswordRequest {
    BrokerPasswordRequest {
        login: "+79990000000".to_string(),
        password: "secret".to_string(),
        organization: None,
    }
}

#[tokio::test]
async fn test_password_login_with_sms_code() {
    let setup = setup(json!([
        {"id": 555, "displayName": "Лицей №3", "roles": [{"id": 2}]},
        {"id": 556, "displayName": "Гимназия №12", "roles": [{"id": 4}]},
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path("/aas/oauth2/api/login"))
        .and(body_json(json!({"login": "+79990000000", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "ENTER_MFA",
            "mfa_details": {"type": "SMS", "otp_details": {"phone": "+7 *** 00", "code_length": 6}},
        })))
        .expect(1)
        .mount(&setup.broker)
        .await;
    Mock::given(method("POST"))
        .and(path("/aas/oauth2/api/login/otp/verify"))
        .and(query_param("code", "123456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "DONE",
            "redirect_url": setup.callback(),
        })))
        .expect(1)
        .mount(&setup.broker)
        .await;

    setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .with_proof_provider(Arc::new(FixedProof("123456".to_string())))
        .login_password(&BrokerPasswordRequest {
            organization: Some("лицей".to_string()),
            ..password_request()
        })
        .await
        .unwrap();

    let session = setup.client.internal.session();
    assert_eq!(session.access_token.as_deref(), Some("portal-token"));
    assert_eq!(session.student_id, STUDENT_ID);
    assert_eq!(session.year_id, YEAR_ID);
    assert!(matches!(
        setup.client.internal.get_login_method().as_deref(),
        Some(LoginMethod::Broker)
    ));

    let jar = setup.client.internal.http().cookies();
    let portal_cookie = jar.get_cookie("NSSESSIONID").await.unwrap().unwrap();
    assert_eq!(portal_cookie.value, "portal-sess");
}

#[tokio::test]
async fn test_only_portal_cookies_are_transferred() {
    let setup = setup(linked_school()).await;
    Mock::given(method("POST"))
        .and(path("/aas/oauth2/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "esia_tracker=1; Domain=.esia.gosuslugi.ru; Path=/")
                .append_header("set-cookie", "portal_pref=dark; Domain=127.0.0.1; Path=/")
                .set_body_json(json!({"action": "DONE", "redirect_url": setup.callback()})),
        )
        .mount(&setup.broker)
        .await;

    setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .login_password(&password_request())
        .await
        .unwrap();

    let jar = setup.client.internal.http().cookies();
    assert!(jar.get_cookie("esia_tracker").await.unwrap().is_none());
    assert_eq!(jar.get_cookie("portal_pref").await.unwrap().unwrap().value, "dark");
    assert_eq!(jar.get_cookie("NSSESSIONID").await.unwrap().unwrap().value, "portal-sess");
    assert_eq!(jar.get_cookie("ESIA_SESSION").await.unwrap().unwrap().value, "esia-1");
}

#[tokio::test]
async fn test_missing_portal_token_keeps_previous_session() {
    let setup = setup(linked_school()).await;
    setup
        .client
        .auth()
        .login_with_token("portal-token", None)
        .await
        .unwrap();
    let http = setup.client.internal.http();
    http.set_cookie("NSSESSIONID", "established").await.unwrap();
    let mut cookies_before = http.cookies().list_cookies().await.unwrap();
    cookies_before.sort_by(|a, b| a.name.cmp(&b.name));

    Mock::given(method("POST"))
        .and(path("/webapi/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .with_priority(1)
        .mount(&setup.portal)
        .await;
    Mock::given(method("POST"))
        .and(path("/aas/oauth2/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"redirect_url": setup.callback()})))
        .mount(&setup.broker)
        .await;

    let result = setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .login_password(&password_request())
        .await;

    assert!(matches!(
        result,
        Err(BrokerLoginError::Portal(LoginError::MissingAccessToken))
    ));
    let session = setup.client.internal.session();
    assert_eq!(session.access_token.as_deref(), Some("portal-token"));
    assert_eq!(session.student_id, STUDENT_ID);
    assert!(matches!(
        setup.client.internal.get_login_method().as_deref(),
        Some(LoginMethod::Token)
    ));
    let mut cookies_after = http.cookies().list_cookies().await.unwrap();
    cookies_after.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(cookies_after, cookies_before);
}

#[tokio::test]
async fn test_broker_rejection_leaves_session_untouched() {
    let setup = setup(linked_school()).await;
    Mock::given(method("POST"))
        .and(path("/aas/oauth2/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"failed": "INVALID_PASSWORD"})))
        .mount(&setup.broker)
        .await;

    let result = setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .login_password(&password_request())
        .await;

    assert!(matches!(
        result,
        Err(BrokerLoginError::Rejected(BrokerRejection::InvalidPassword))
    ));
    assert!(!setup.client.internal.session().is_authenticated());
    assert!(setup
        .client
        .internal
        .http()
        .cookies()
        .list_cookies()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_empty_credentials_are_rejected_before_any_request() {
    let setup = setup(linked_school()).await;

    let result = setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .login_password(&BrokerPasswordRequest {
            password: String::new(),
            ..password_request()
        })
        .await;

    assert!(matches!(
        result,
        Err(BrokerLoginError::Rejected(BrokerRejection::EmptyCredentials))
    ));
    assert!(setup.portal.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_several_organizations_need_a_choice() {
    let setup = setup(json!([
        {"id": 555, "displayName": "Лицей №3"},
        {"id": 556, "displayName": "Гимназия №12"},
    ]))
    .await;
    Mock::given(method("POST"))
        .and(path("/aas/oauth2/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"redirect_url": setup.callback()})))
        .mount(&setup.broker)
        .await;

    let result = setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .login_password(&password_request())
        .await;

    match result {
        Err(BrokerLoginError::Organization(OrganizationError::SelectionRequired { available })) => {
            assert_eq!(available, ["Лицей №3", "Гимназия №12"])
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!setup.client.internal.session().is_authenticated());
}

#[tokio::test]
async fn test_crosslogin_must_reach_the_broker() {
    let (portal, settings) = start_api_mock(vec![
        Mock::given(method("GET"))
            .and(path("/webapi/logindata"))
            .respond_with(ResponseTemplate::new(200)),
        Mock::given(method("GET"))
            .and(path("/webapi/sso/esia/crosslogin"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/maintenance")),
        Mock::given(method("GET"))
            .and(path("/maintenance"))
            .respond_with(ResponseTemplate::new(200)),
    ])
    .await;
    let broker = MockServer::start().await;
    let client = Client::new(settings).unwrap();

    let result = client
        .broker_auth()
        .with_settings(BrokerSettings {
            base_url: broker.uri(),
            ..Default::default()
        })
        .login_password(&password_request())
        .await;

    match result {
        Err(BrokerLoginError::Protocol(BrokerProtocolError::BrokerUnreachable(url))) => {
            assert_eq!(url, format!("{}/maintenance", portal.uri()))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Hands out a new QR code on every call.
struct QrCodes(AtomicUsize);

impl Respond for QrCodes {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({
            "signed_token": format!("token-{n}"),
            "qr_id": format!("qr-{n}"),
        }))
    }
}

/// Answers subscriptions from a script and records what it was asked.
struct ScriptedSubscriber {
    script: Mutex<VecDeque<Result<Value, EventStreamError>>>,
    subscriptions: Mutex<Vec<(String, String)>>,
}

impl ScriptedSubscriber {
    fn new(script: impl IntoIterator<Item = Result<Value, EventStreamError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            subscriptions: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl EventSubscriber for ScriptedSubscriber {
    async fn subscribe(
        &self,
        url: &Url,
        cookies: &str,
        _timeout: Duration,
    ) -> Result<Value, EventStreamError> {
        self.subscriptions
            .lock()
            .unwrap()
            .push((url.path().to_owned(), cookies.to_owned()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(EventStreamError::Closed))
    }
}

fn expired() -> Result<Value, EventStreamError> {
    Err(EventStreamError::QrSessionExpired(
        "QR_AUTHORIZATION_SESSION_EXPIRED".to_string(),
    ))
}

async fn mount_qr_generation(broker: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/qr-delegate/qr/generate"))
        .and(body_json(json!({"esia_session": "esia-1"})))
        .respond_with(QrCodes(AtomicUsize::new(0)))
        .mount(broker)
        .await;
}

#[tokio::test]
async fn test_qr_login_survives_expired_sessions() {
    let setup = setup(linked_school()).await;
    mount_qr_generation(&setup.broker).await;

    let subscriber = ScriptedSubscriber::new([
        expired(),
        Err(EventStreamError::QrSessionExpired("ESIA-007110".to_string())),
        Ok(json!({"redirect_url": setup.callback()})),
    ]);
    let shown = Arc::new(Mutex::new(Vec::<String>::new()));
    let display = {
        let shown = shown.clone();
        move |link: &str| shown.lock().unwrap().push(link.to_owned())
    };

    let token = setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .with_event_subscriber(subscriber.clone())
        .with_qr_display(Arc::new(display))
        .login_qr(&BrokerQrRequest::default())
        .await
        .unwrap();

    assert_eq!(token, "token-3");
    assert_eq!(
        *shown.lock().unwrap(),
        [
            "gosuslugi://auth/signed_token=token-1",
            "gosuslugi://auth/signed_token=token-2",
            "gosuslugi://auth/signed_token=token-3",
        ]
    );

    let subscriptions = subscriber.subscriptions.lock().unwrap();
    assert_eq!(subscriptions.len(), 3);
    assert_eq!(subscriptions[2].0, "/qr-delegate/qr/subscribe/qr-3");
    assert!(subscriptions[2].1.contains("ESIA_SESSION=esia-1"));

    assert_eq!(
        setup.client.internal.session().access_token.as_deref(),
        Some("portal-token")
    );
}

#[tokio::test]
async fn test_qr_login_gives_up_after_max_attempts() {
    let setup = setup(linked_school()).await;
    mount_qr_generation(&setup.broker).await;

    let result = setup
        .client
        .broker_auth()
        .with_settings(BrokerSettings {
            max_qr_attempts: 2,
            ..setup.settings()
        })
        .with_event_subscriber(ScriptedSubscriber::new([expired(), expired(), expired()]))
        .with_qr_display(Arc::new(|_: &str| {}))
        .login_qr(&BrokerQrRequest::default())
        .await;

    assert!(matches!(
        result,
        Err(BrokerLoginError::QrRetriesExhausted {
            attempts: 2,
            source: EventStreamError::QrSessionExpired(_),
        })
    ));
    assert!(!setup.client.internal.session().is_authenticated());
}

#[tokio::test]
async fn test_qr_login_does_not_retry_other_errors() {
    let setup = setup(linked_school()).await;
    mount_qr_generation(&setup.broker).await;
    let shown = Arc::new(AtomicUsize::new(0));
    let display = {
        let shown = shown.clone();
        move |_: &str| {
            shown.fetch_add(1, Ordering::SeqCst);
        }
    };

    let result = setup
        .client
        .broker_auth()
        .with_settings(setup.settings())
        .with_event_subscriber(ScriptedSubscriber::new([Err(EventStreamError::Broker {
            code: "ESIA-000001".to_string(),
            message: "internal error".to_string(),
        })]))
        .with_qr_display(Arc::new(display))
        .login_qr(&BrokerQrRequest::default())
        .await;

    assert!(matches!(
        result,
        Err(BrokerLoginError::EventStream(EventStreamError::Broker { .. }))
    ));
    assert_eq!(shown.load(Ordering::SeqCst), 1);
}
