use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use veil_core::{Category, Detection, Detector, DocumentRect, ProviderError};

/// 返回固定结果的检测器，用于演示和离线运行
///
/// 坐标按 Letter 页面（792pt 高）换算到文档空间。
#[derive(Debug, Clone, Default)]
pub struct StubDetector {
    delay: Duration,
}

impl StubDetector {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn batch() -> Vec<Detection> {
        let entry = |page, x, y, width, height, category, excerpt: &str, confidence| Detection {
            page,
            rect: DocumentRect::new(x, y, width, height),
            category,
            excerpt: excerpt.to_string(),
            confidence,
        };
        vec![
            entry(1, 100.0, 572.0, 120.0, 20.0, Category::Email, "john@example.com", 0.95),
            entry(1, 150.0, 472.0, 100.0, 20.0, Category::Phone, "(555) 123-4567", 0.88),
            entry(1, 200.0, 372.0, 80.0, 20.0, Category::Name, "John Smith", 0.92),
            entry(2, 120.0, 522.0, 110.0, 20.0, Category::Ssn, "123-45-6789", 0.98),
        ]
    }
}

#[async_trait(?Send)]
impl Detector for StubDetector {
    async fn detect(&self, _bytes: Arc<[u8]>) -> Result<Vec<Detection>, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let batch = Self::batch();
        log::info!("[StubDetector] 返回 {} 条演示结果", batch.len());
        Ok(batch)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_honored() {
        let detector = StubDetector::new(Duration::from_secs(2));
        let started = tokio::time::Instant::now();
        let batch = detector.detect(Arc::from(Vec::new())).await.unwrap();
        assert_eq!(batch.len(), 4);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_batch_covers_two_pages() {
        let batch = StubDetector::batch();
        assert_eq!(batch.iter().filter(|d| d.page == 1).count(), 3);
        assert_eq!(batch[3].category, Category::Ssn);
        assert!(batch.iter().all(|d| d.rect.is_valid()));
    }
}
