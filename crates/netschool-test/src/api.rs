use netschool_core::ClientSettings;

/// Helper for testing the portal API using wiremock.
///
/// Warning: when using `Mock::expected` ensure `server` is not dropped before the test completes,
pub async fn start_api_mock(mocks: Vec<wiremock::Mock>) -> (wiremock::MockServer, ClientSettings) {
    let server = wiremock::MockServer::start().await;

    for mock in mocks {
        server.register(mock).await;
    }

    let settings = ClientSettings {
        user_agent: "test-agent".to_string(),
        keepalive_interval: 0,
        ..ClientSettings::for_url(server.uri())
    };

    (server, settings)
}
