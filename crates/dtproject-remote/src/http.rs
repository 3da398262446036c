use crate::{RemoteConfig, RemoteError};

/// Fetches JSON metadata documents for images.
pub trait MetadataClient: Send + Sync {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, RemoteError>;

    /// Metadata of `organization/repository:tag` on `registry`.
    fn image_metadata(
        &self,
        registry: &str,
        organization: &str,
        repository: &str,
        tag: &str,
    ) -> Result<serde_json::Value, RemoteError>;
}

/// HTTP-based metadata client.
///
/// Issues a single `GET` against the configured URL template and expects a
/// JSON body. A `404` maps to [`RemoteError::NotFound`].
pub struct HttpMetadataClient {
    config: RemoteConfig,
    agent: ureq::Agent,
}

impl HttpMetadataClient {
    pub fn new(config: RemoteConfig) -> Self {
        let agent = ureq::Agent::new_with_defaults();
        Self { config, agent }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let mut request = self.agent.get(url).header("Accept", "application/json");
        if let Some(token) = &self.config.auth_token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        // ureq reports every 4xx/5xx status as Error::StatusCode
        match request.call() {
            Ok(mut response) => response
                .body_mut()
                .read_to_vec()
                .map_err(|e| RemoteError::Http(format!("reading {url}: {e}"))),
            Err(ureq::Error::StatusCode(404)) => Err(RemoteError::NotFound(url.to_owned())),
            Err(ureq::Error::StatusCode(code)) => {
                Err(RemoteError::Http(format!("{url} answered HTTP {code}")))
            }
            Err(e) => Err(RemoteError::Http(format!("{url}: {e}"))),
        }
    }
}

impl MetadataClient for HttpMetadataClient {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, RemoteError> {
        tracing::debug!("GET {url}");
        let body = self.fetch(url)?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::Serialization(e.to_string()))
    }

    fn image_metadata(
        &self,
        registry: &str,
        organization: &str,
        repository: &str,
        tag: &str,
    ) -> Result<serde_json::Value, RemoteError> {
        let url = self
            .config
            .image_metadata_url(registry, organization, repository, tag);
        self.get_json(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Answer a single request with `status` and `body`; the handle yields
    /// the request head (request line and headers) as received.
    fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = String::new();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            write!(
                stream,
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            head
        });
        (addr, handle)
    }

    fn client(addr: &str) -> HttpMetadataClient {
        let template = format!("{addr}/{{registry}}/{{organization}}/{{repository}}/{{tag}}");
        HttpMetadataClient::new(RemoteConfig::new(&template).unwrap())
    }

    #[test]
    fn fetches_image_metadata_from_template_url() {
        let (addr, server) = serve_once(200, r#"{"tag": "ente-amd64", "size": 42}"#);
        let meta = client(&addr)
            .image_metadata("docker.io", "org", "demo", "ente-amd64")
            .unwrap();
        assert_eq!(meta["tag"], "ente-amd64");
        assert_eq!(meta["size"], 42);
        let head = server.join().unwrap();
        assert!(head.starts_with("GET /docker.io/org/demo/ente-amd64 HTTP/1.1"), "{head}");
    }

    #[test]
    fn missing_metadata_is_not_found() {
        let (addr, _server) = serve_once(404, "");
        let err = client(&addr)
            .image_metadata("docker.io", "org", "demo", "nope-amd64")
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[test]
    fn server_error_is_http_error() {
        let (addr, _server) = serve_once(500, "{}");
        let err = client(&addr).image_metadata("r", "o", "n", "t").unwrap_err();
        assert!(matches!(err, RemoteError::Http(ref m) if m.contains("500")));
    }

    #[test]
    fn invalid_json_is_serialization_error() {
        let (addr, _server) = serve_once(200, "not json");
        let err = client(&addr).image_metadata("r", "o", "n", "t").unwrap_err();
        assert!(matches!(err, RemoteError::Serialization(_)));
    }

    #[test]
    fn unreachable_host_is_http_error() {
        let err = client("http://127.0.0.1:1")
            .get_json("http://127.0.0.1:1/x")
            .unwrap_err();
        assert!(matches!(err, RemoteError::Http(_)));
    }

    #[test]
    fn token_is_sent_as_bearer_header() {
        let (addr, server) = serve_once(200, "{}");
        let template = format!("{addr}/{{registry}}/{{organization}}/{{repository}}/{{tag}}");
        let client = HttpMetadataClient::new(
            RemoteConfig::new(&template)
                .unwrap()
                .with_token("secret-token-42"),
        );
        client.image_metadata("r", "o", "n", "t").unwrap();
        let head = server.join().unwrap().to_lowercase();
        assert!(head.contains("authorization: bearer secret-token-42"), "{head}");
    }
}
