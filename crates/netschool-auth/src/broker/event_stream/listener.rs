use std::{sync::Arc, time::Duration};

use rustls::{pki_types::ServerName, ClientConfig};
use serde_json::Value;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tokio_rustls::TlsConnector;
use url::Url;

use super::{line_buffer::LineBuffer, parse_event_line, EventStreamError, EventSubscriber};
use crate::broker::{tls::broker_tls_config, BrokerSettings};

const READ_CHUNK: usize = 8192;

/// The request line and headers of an event stream subscription.
fn subscription_request(url: &Url, cookies: &str, user_agent: &str) -> String {
    let host = url.host_str().unwrap_or_default();
    let target = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    };

    let mut request = format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Accept: text/event-stream\r\n\
         Cache-Control: no-cache\r\n\
         User-Agent: {user_agent}\r\n"
    );
    if !cookies.is_empty() {
        request.push_str(&format!("Cookie: {cookies}\r\n"));
    }
    request.push_str("Connection: keep-alive\r\n\r\n");
    request
}

/// Sends `request` over `stream` and reads until the first event with a payload or an error.
pub async fn listen<S>(stream: &mut S, request: &[u8]) -> Result<Value, EventStreamError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut buffer = LineBuffer::default();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(EventStreamError::Closed);
        }
        buffer.push(&chunk[..read])?;

        while let Some(line) = buffer.next_line() {
            if let Some(event) = parse_event_line(&line) {
                return event;
            }
        }
    }
}

/// Subscribes over a TLS socket of its own.
#[derive(Clone)]
pub struct TlsEventSubscriber {
    connector: TlsConnector,
    user_agent: String,
}

impl TlsEventSubscriber {
    /// A subscriber using the broker's TLS settings.
    pub fn new(settings: &BrokerSettings) -> Result<Self, rustls::Error> {
        Ok(Self::with_config(
            broker_tls_config(settings.relaxed_tls)?,
            settings.user_agent.clone(),
        ))
    }

    /// A subscriber with a custom TLS configuration.
    pub fn with_config(config: ClientConfig, user_agent: String) -> Self {
        Self {
            connector: TlsConnector::from(Arc::new(config)),
            user_agent,
        }
    }
}

#[async_trait::async_trait]
impl EventSubscriber for TlsEventSubscriber {
    async fn subscribe(
        &self,
        url: &Url,
        cookies: &str,
        timeout: Duration,
    ) -> Result<Value, EventStreamError> {
        let host = url
            .host_str()
            .ok_or_else(|| EventStreamError::InvalidUrl(url.to_string()))?;
        let port = url.port_or_known_default().unwrap_or(443);
        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|_| EventStreamError::InvalidUrl(url.to_string()))?;
        let request = subscription_request(url, cookies, &self.user_agent);

        tracing::debug!(%host, "Opening event stream");
        let wait = async {
            let tcp = TcpStream::connect((host, port)).await?;
            let mut stream = self.connector.connect(server_name, tcp).await?;
            let result = listen(&mut stream, request.as_bytes()).await;
            // Dropping the stream closes the socket, this only makes the close graceful.
            let _ = stream.shutdown().await;
            result
        };

        tokio::time::timeout(timeout, wait)
            .await
            .unwrap_or(Err(EventStreamError::Timeout(timeout)))
    }
}
