use futures::StreamExt;

/// Why a response body could not be read in full.
#[derive(Debug)]
pub(crate) enum BodyError {
    /// Declared or streamed size went over the limit
    TooLarge,
    Network(reqwest::Error),
}

/// Reads a response body, stopping as soon as it exceeds `limit` bytes.
pub(crate) async fn read_limited(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(BodyError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BodyError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // The server is returned so it outlives the body read
    async fn respond_with(body: &str) -> (MockServer, reqwest::Response) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        let response = reqwest::get(mock_server.uri()).await.unwrap();
        (mock_server, response)
    }

    #[tokio::test]
    async fn test_read_within_limit() {
        let (_server, response) = respond_with("hello").await;
        let bytes = read_limited(response, 5).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_read_over_limit() {
        let (_server, response) = respond_with("hello!").await;
        assert!(matches!(
            read_limited(response, 5).await,
            Err(BodyError::TooLarge)
        ));
    }
}
