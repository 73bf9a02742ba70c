//! 远程检测服务
//!
//! 以 `application/pdf` 提交原始字节，服务返回
//! `{"detections": [{"page", "rect": {"x","y","width","height"}, "category", "excerpt", "confidence"}]}`，
//! 矩形位于文档空间。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Deserialize;
use veil_core::{Detection, Detector, ProviderError};

use crate::error::DetectError;

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

pub struct HttpDetector {
    client: Client,
    endpoint: Url,
}

impl HttpDetector {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, DetectError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| DetectError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    async fn request(&self, bytes: &[u8]) -> Result<Vec<Detection>, DetectError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/pdf")
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DetectError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_response(&body)
    }
}

pub(crate) fn parse_response(body: &str) -> Result<Vec<Detection>, DetectError> {
    let response: DetectResponse = serde_json::from_str(body)?;
    Ok(response.detections)
}

#[async_trait(?Send)]
impl Detector for HttpDetector {
    async fn detect(&self, bytes: Arc<[u8]>) -> Result<Vec<Detection>, ProviderError> {
        log::info!("[HttpDetector] 提交 {} 字节到 {}", bytes.len(), self.endpoint);
        let detections = self.request(&bytes).await.map_err(|e| {
            log::warn!("[HttpDetector] 检测失败: {}", e);
            e
        })?;
        log::info!("[HttpDetector] 返回 {} 条结果", detections.len());
        Ok(detections)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::Category;

    #[test]
    fn test_parse_unknown_category_as_other() {
        let body = r#"{"detections":[
            {"page":1,"rect":{"x":10,"y":20,"width":30,"height":40},"category":"passport","excerpt":"X1234567","confidence":0.7}
        ]}"#;
        let detections = parse_response(body).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].category, Category::Other);
        assert_eq!(detections[0].rect.height, 40.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_response("<html>"),
            Err(DetectError::Response(_))
        ));
        assert!(parse_response("{}").unwrap().is_empty());
    }
}
