use crate::domain_model::{HttpMethod, HttpResponse, RequestContext};
use crate::domain_port::{HttpTransport, TransportError};
use reqwest::{Client, Method, Url};
use std::time::Duration;

/// HTTP transport with a cookie store, so session cookies set by the backend
/// (login, refresh) ride along on every later request.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidRequest(format!("base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidRequest(format!(
                "base url {base_url} cannot carry paths"
            )));
        }
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidRequest(format!("bad base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, context: &RequestContext) -> Result<HttpResponse, TransportError> {
        let request = &context.request;
        let mut builder = self
            .client
            .request(method(request.method), self.url(&request.path)?)
            .header("x-request-id", context.request_id.to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_appended_to_base_path() {
        let transport =
            ReqwestTransport::new("http://localhost:8080/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            transport.url("/reviews/r1/like").unwrap().as_str(),
            "http://localhost:8080/api/v1/reviews/r1/like"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(ReqwestTransport::new("not a url", Duration::from_secs(5)).is_err());
        assert!(ReqwestTransport::new("mailto:someone@example.com", Duration::from_secs(5)).is_err());
    }
}
