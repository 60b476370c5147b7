//! Blocking `Transport` backed by ureq.

use std::time::Duration;

use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};
use tracing::debug;

/// Returns 4xx/5xx responses as data so the core client interprets status
/// codes itself. Only failures without a response become `ApiError::Network`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = req.method.as_str(), path = %req.path, "sending request");
        let result = match (req.method, req.body.as_deref()) {
            (HttpMethod::Get, _) => self.agent.get(&req.path).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&req.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(status, "received response");
        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::{Session, TodoClient};

    fn start_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    #[test]
    fn error_statuses_come_back_as_responses() {
        let base_url = start_server();
        let mut transport = UreqTransport::new(Duration::from_secs(5));
        let req = TodoClient::new(&base_url).build_delete_todo(&99i64.into());
        let resp = transport.execute(&req).unwrap();
        assert_eq!(resp.status, 404);
        assert!(resp.body.contains("Todo not found"));
    }

    #[test]
    fn drives_a_session() {
        let base_url = start_server();
        let transport = UreqTransport::new(Duration::from_secs(5));
        let mut session = Session::open(TodoClient::new(&base_url), transport);
        let state = session.create("Walk dog", None);
        assert_eq!(state.items().len(), 1);
        assert!(state.last_error().is_none());
    }
}
