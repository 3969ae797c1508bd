use crate::config::HttpConfig;
use crate::domain::ports::Transport;
use crate::domain::radar::{Radar, Response};
use crate::error::TransportError;
use std::time::Duration;

/// Blocking HTTP transport backed by a `ureq::Agent`.
///
/// Non-2xx answers are returned as responses; deciding whether a status is
/// acceptable is left to the plugins. Only failures to talk to the server
/// at all become errors.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_timeouts(
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, radar: &Radar) -> Result<Response, TransportError> {
        let mut request = self.agent.request(radar.method.as_str(), radar.url.as_str());
        for (name, value) in &radar.headers {
            request = request.set(name, value);
        }

        let response = match request.send_string(&radar.body) {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => return Err(TransportError::Connection(e.to_string())),
        };

        let status = response.status();
        let headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = response.header(&name)?.to_string();
                Some((name, value))
            })
            .collect();
        let body = response.into_string()?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
