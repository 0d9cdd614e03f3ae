//! Blocking REST client for the webapp configuration API.
//!
//! | operation            | request                                   |
//! |----------------------|-------------------------------------------|
//! | fetch configuration  | `GET    api/v1/configuration`             |
//! | push configuration   | `PUT    api/v1/configuration` (XML body)  |
//! | register project     | `POST   api/v1/projects` (name as body)   |
//! | deregister project   | `DELETE api/v1/projects/<name>`           |
//! | read config value    | `GET    api/v1/configuration/<key>`       |
//!
//! No timeouts are set here; a call waits as long as the OS lets it.

use std::io::Read;

use tracing::debug;
use url::Url;

use projadm_core::{ConfigService, ProjectName, RemoteError};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// [`ConfigService`] backed by the webapp at `base`.
#[derive(Debug, Clone)]
pub struct HttpConfigService {
    base: Url,
    agent: ureq::Agent,
}

impl HttpConfigService {
    /// `uri` is the webapp URI including its context path,
    /// e.g. `http://localhost:8080/source`.
    pub fn new(uri: &str) -> Result<Self, RemoteError> {
        let mut base = Url::parse(uri).map_err(|e| RemoteError::InvalidUri {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUri {
                uri: uri.to_string(),
                message: "not a hierarchical URL".to_string(),
            });
        }
        // Treat the context path as a directory so segments are appended to it.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            agent: ureq::AgentBuilder::new().build(),
        })
    }

    /// `<base>/api/v1/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(API_PREFIX);
            path.extend(segments);
        }
        url.into()
    }
}

fn call(
    operation: &'static str,
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, RemoteError> {
    match result {
        Ok(response) => {
            debug!("{operation}: {url} -> {}", response.status());
            Ok(response)
        }
        Err(ureq::Error::Status(status, _)) => Err(RemoteError::Status {
            operation,
            url: url.to_string(),
            status,
        }),
        Err(ureq::Error::Transport(transport)) => Err(RemoteError::Transport {
            operation,
            message: transport.to_string(),
        }),
    }
}

/// Read the whole body, with no size cap (`Response::into_string` stops at 10 MB).
fn body(operation: &'static str, response: ureq::Response) -> Result<String, RemoteError> {
    let mut text = String::new();
    response
        .into_reader()
        .read_to_string(&mut text)
        .map_err(|e| RemoteError::Transport {
            operation,
            message: e.to_string(),
        })?;
    Ok(text)
}

/// Configuration values come back JSON-encoded (`"\/src"`); anything that
/// does not parse as a JSON string is taken as plain text.
pub(crate) fn decode_value(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Null) => String::new(),
        _ => raw.trim().to_string(),
    }
}

impl ConfigService for HttpConfigService {
    fn fetch_configuration(&self) -> Result<String, RemoteError> {
        const OP: &str = "fetch configuration";
        let url = self.endpoint(&["configuration"]);
        let response = call(OP, &url, self.agent.get(&url).call())?;
        let text = body(OP, response)?;
        if text.is_empty() {
            return Err(RemoteError::Empty { operation: OP });
        }
        Ok(text)
    }

    fn push_configuration(&self, config: &[u8]) -> Result<(), RemoteError> {
        const OP: &str = "push configuration";
        let url = self.endpoint(&["configuration"]);
        let request = self.agent.put(&url).set("Content-Type", "application/xml");
        call(OP, &url, request.send_bytes(config))?;
        Ok(())
    }

    fn register_project(&self, project: &ProjectName) -> Result<(), RemoteError> {
        const OP: &str = "add project";
        let url = self.endpoint(&["projects"]);
        let request = self.agent.post(&url).set("Content-Type", "text/plain");
        call(OP, &url, request.send_string(project.as_str()))?;
        Ok(())
    }

    fn deregister_project(&self, project: &ProjectName) -> Result<(), RemoteError> {
        const OP: &str = "delete project";
        let url = self.endpoint(&["projects", project.as_str()]);
        call(OP, &url, self.agent.delete(&url).call())?;
        Ok(())
    }

    fn read_config_value(&self, key: &str) -> Result<String, RemoteError> {
        const OP: &str = "read configuration value";
        let url = self.endpoint(&["configuration", key]);
        let response = call(OP, &url, self.agent.get(&url).call())?;
        Ok(decode_value(&body(OP, response)?))
    }
}
