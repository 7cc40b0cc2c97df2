use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::debug;

use super::ClientError;
use crate::handlers::FILE_FIELD;
use crate::models::Prediction;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/predict";
pub const UPLOAD_FILE_NAME: &str = "image.png";
pub const UPLOAD_MIME: &str = "image/png";

/// Posts PNG images to `/predict`. Failures are reported once, never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    url: String,
}

impl ApiClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn classify(&self, png: Vec<u8>) -> Result<Prediction, ClientError> {
        let form = Form::new().part(FILE_FIELD, image_part(png, UPLOAD_MIME)?);

        debug!(url = %self.url, "posting image");
        let response = self.http.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "response received");

        parse_response(status, &body)
    }
}

fn image_part(png: Vec<u8>, mime: &str) -> Result<Part, ClientError> {
    Part::bytes(png)
        .file_name(UPLOAD_FILE_NAME)
        .mime_str(mime)
        .map_err(|e| ClientError::Request(e.to_string()))
}

/// Non-2xx statuses become [`ClientError::Api`] carrying the body verbatim.
pub fn parse_response(status: StatusCode, body: &str) -> Result<Prediction, ClientError> {
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_is_parsed() {
        let body = r#"{"predicted_class":"horse","probabilities":{"chicken":0.1,"slon":0.2,"horse":0.7}}"#;
        let prediction = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(prediction.predicted_class, "horse");
        assert_eq!(prediction.probabilities.len(), 3);
    }

    #[test]
    fn error_status_is_reported_verbatim() {
        let body = r#"{"error":"cannot identify image file"}"#;
        let err = parse_response(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"API error: 500 - {"error":"cannot identify image file"}"#
        );
    }

    #[test]
    fn malformed_success_body_is_invalid_response() {
        let err = parse_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn bad_mime_is_a_request_error() {
        assert!(image_part(vec![1], UPLOAD_MIME).is_ok());
        let err = image_part(vec![1], "not a mime").unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
    }

    #[actix_rt::test]
    async fn unreachable_server_is_a_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(format!("http://127.0.0.1:{port}/predict"));
        assert!(client.url().ends_with("/predict"));
        let err = client.classify(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert!(err.to_string().starts_with("could not connect to the server"));
    }
}
