use crate::wire::parse_response;
use agrolens_core::{EndpointError, InferenceEndpoint, InferenceRequest, InferenceResponse};
use reqwest::multipart::{Form, Part};
use tracing::debug;

const ANALYZE_PATH: &str = "/analyze-plant";

/// Longest error body kept in an `EndpointError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Talks to the inference service over HTTP
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_form(request: InferenceRequest) -> Result<Form, EndpointError> {
        let image = Part::bytes(request.image)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|e| {
                EndpointError::Transport(format!(
                    "invalid MIME type {:?}: {}",
                    request.mime_type, e
                ))
            })?;

        Ok(Form::new()
            .part("image", image)
            .text("model", request.params.model)
            .text(
                "save_for_training",
                request.params.save_for_training.to_string(),
            )
            .text("debug", request.params.debug.to_string()))
    }
}

impl InferenceEndpoint for HttpEndpoint {
    async fn analyze(&self, request: InferenceRequest) -> Result<InferenceResponse, EndpointError> {
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EndpointError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EndpointError::Transport(e.to_string()))?;
        debug!(url = %self.url, status = status.as_u16(), bytes = body.len(), "endpoint replied");

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(EndpointError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}
