//! 区域存储：已确认的脱敏区域与待审核的检测建议
//!
//! 两个集合都属于同一个文档会话，互不相交。所有修改都是同步的，
//! 对不存在的 id 的操作一律视为空操作。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::DocumentRect;
use crate::provider::Detection;

/// 区域 id，脱敏区域与建议共用一个分配器，不会重复
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 文档会话标识，每次开始载入文档时递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// 敏感信息类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Email,
    Phone,
    Name,
    Ssn,
    Address,
    Date,
    CreditCard,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Email => "email",
            Category::Phone => "phone",
            Category::Name => "name",
            Category::Ssn => "ssn",
            Category::Address => "address",
            Category::Date => "date",
            Category::CreditCard => "credit_card",
            Category::Other => "other",
        }
    }

    /// 按标签解析，不区分大小写
    pub fn parse(label: &str) -> Option<Category> {
        let label = label.trim().to_lowercase();
        [
            Category::Email,
            Category::Phone,
            Category::Name,
            Category::Ssn,
            Category::Address,
            Category::Date,
            Category::CreditCard,
            Category::Other,
        ]
        .into_iter()
        .find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 脱敏区域的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum RedactionOrigin {
    /// 用户手动框选
    Manual,
    /// 由检测建议接受而来
    Suggestion(Category),
}

impl RedactionOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            RedactionOrigin::Manual => "manual",
            RedactionOrigin::Suggestion(category) => category.label(),
        }
    }
}

/// 已确认的脱敏区域，创建后不可修改，只能删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redaction {
    pub id: RegionId,
    /// 页码，从 1 开始
    pub page: u32,
    /// 文档空间矩形
    pub rect: DocumentRect,
    pub origin: RedactionOrigin,
}

/// 检测器提出、等待用户接受或拒绝的候选区域
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: RegionId,
    pub page: u32,
    pub rect: DocumentRect,
    pub category: Category,
    /// 命中的原文片段
    pub excerpt: String,
    /// 置信度 `[0, 1]`
    pub confidence: f64,
}

/// 区域存储
#[derive(Debug)]
pub struct RegionStore {
    session: SessionId,
    next_id: u64,
    redactions: Vec<Redaction>,
    suggestions: Vec<Suggestion>,
}

impl RegionStore {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            next_id: 1,
            redactions: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// 切换到新的文档会话，清空两个集合
    pub fn reset(&mut self, session: SessionId) {
        self.session = session;
        self.redactions.clear();
        self.suggestions.clear();
    }

    fn allocate_id(&mut self) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 追加一个脱敏区域
    ///
    /// 矩形超出页面不会被拒绝（导出时裁剪），但宽高必须为正，否则返回 `None`。
    pub fn add_redaction(
        &mut self,
        rect: DocumentRect,
        page: u32,
        origin: RedactionOrigin,
    ) -> Option<RegionId> {
        if !rect.is_valid() || page == 0 {
            log::warn!("[RegionStore] 忽略无效区域: page={}, rect={:?}", page, rect);
            return None;
        }
        let id = self.allocate_id();
        self.redactions.push(Redaction {
            id,
            page,
            rect,
            origin,
        });
        log::debug!("[RegionStore] 新增脱敏区域 {} (页 {}, {})", id, page, origin.label());
        Some(id)
    }

    /// 不存在时为空操作
    pub fn remove_redaction(&mut self, id: RegionId) -> Option<Redaction> {
        let index = self.redactions.iter().position(|r| r.id == id)?;
        Some(self.redactions.remove(index))
    }

    pub fn clear_all(&mut self) -> usize {
        let removed = self.redactions.len();
        self.redactions.clear();
        removed
    }

    /// 按插入顺序撤销最后一个
    pub fn undo_last(&mut self) -> Option<Redaction> {
        self.redactions.pop()
    }

    /// 用一次检测的结果整体替换待审核集合
    ///
    /// `session` 不是当前会话时直接忽略，返回 `None`；
    /// 否则返回实际收录的建议数量。宽高非法或页码为 0 的条目被丢弃，
    /// 置信度夹到 `[0, 1]`，不设最低置信度门槛。
    pub fn set_suggestions(&mut self, session: SessionId, batch: Vec<Detection>) -> Option<usize> {
        if session != self.session {
            log::info!(
                "[RegionStore] 丢弃过期检测结果: 结果属于会话 {:?}，当前会话 {:?}",
                session,
                self.session
            );
            return None;
        }

        self.suggestions.clear();
        for detection in batch {
            if !detection.rect.is_valid() || detection.page == 0 || detection.confidence.is_nan() {
                log::warn!("[RegionStore] 丢弃无效检测结果: {:?}", detection);
                continue;
            }
            let id = self.allocate_id();
            self.suggestions.push(Suggestion {
                id,
                page: detection.page,
                rect: detection.rect,
                category: detection.category,
                excerpt: detection.excerpt,
                confidence: detection.confidence.clamp(0.0, 1.0),
            });
        }
        Some(self.suggestions.len())
    }

    /// 接受建议：在同一步中生成脱敏区域并移除建议
    ///
    /// 建议不存在（已经处理过）时为空操作，不会产生重复区域。
    pub fn accept_suggestion(&mut self, id: RegionId) -> Option<RegionId> {
        let index = self.suggestions.iter().position(|s| s.id == id)?;
        let suggestion = self.suggestions.remove(index);
        let redaction_id = self.allocate_id();
        self.redactions.push(Redaction {
            id: redaction_id,
            page: suggestion.page,
            rect: suggestion.rect,
            origin: RedactionOrigin::Suggestion(suggestion.category),
        });
        log::debug!(
            "[RegionStore] 接受建议 {} -> 脱敏区域 {} ({})",
            id,
            redaction_id,
            suggestion.category
        );
        Some(redaction_id)
    }

    pub fn reject_suggestion(&mut self, id: RegionId) -> Option<Suggestion> {
        let index = self.suggestions.iter().position(|s| s.id == id)?;
        Some(self.suggestions.remove(index))
    }

    /// 按插入顺序
    pub fn redactions(&self) -> &[Redaction] {
        &self.redactions
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn redactions_for_page(&self, page: u32) -> impl Iterator<Item = &Redaction> {
        self.redactions.iter().filter(move |r| r.page == page)
    }

    pub fn suggestions_for_page(&self, page: u32) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter().filter(move |s| s.page == page)
    }

    pub fn is_empty(&self) -> bool {
        self.redactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> DocumentRect {
        DocumentRect::new(10.0, 10.0, 50.0, 20.0)
    }

    fn detection(page: u32, category: Category) -> Detection {
        Detection {
            page,
            rect: rect(),
            category,
            excerpt: "john@example.com".to_string(),
            confidence: 0.95,
        }
    }

    #[test]
    fn test_add_and_remove_is_idempotent() {
        let mut store = RegionStore::new(SessionId(1));
        let id = store.add_redaction(rect(), 1, RedactionOrigin::Manual).unwrap();
        assert_eq!(store.redactions().len(), 1);
        assert!(store.remove_redaction(id).is_some());
        assert!(store.remove_redaction(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_degenerate_rect() {
        let mut store = RegionStore::new(SessionId(1));
        let flat = DocumentRect::new(0.0, 0.0, 10.0, 0.0);
        assert!(store.add_redaction(flat, 1, RedactionOrigin::Manual).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_undo_uses_insertion_order() {
        let mut store = RegionStore::new(SessionId(1));
        let first = store.add_redaction(rect(), 2, RedactionOrigin::Manual).unwrap();
        let second = store.add_redaction(rect(), 1, RedactionOrigin::Manual).unwrap();
        assert_eq!(store.undo_last().map(|r| r.id), Some(second));
        assert_eq!(store.undo_last().map(|r| r.id), Some(first));
        assert!(store.undo_last().is_none());
    }

    #[test]
    fn test_accept_suggestion_twice_creates_one_redaction() {
        let mut store = RegionStore::new(SessionId(1));
        store.set_suggestions(SessionId(1), vec![detection(1, Category::Email)]);
        let id = store.suggestions()[0].id;

        let created = store.accept_suggestion(id);
        assert!(created.is_some());
        assert!(store.suggestions().is_empty());
        assert_eq!(store.redactions().len(), 1);
        assert_eq!(
            store.redactions()[0].origin,
            RedactionOrigin::Suggestion(Category::Email)
        );

        assert!(store.accept_suggestion(id).is_none());
        assert_eq!(store.redactions().len(), 1);
    }

    #[test]
    fn test_ids_never_collide() {
        let mut store = RegionStore::new(SessionId(1));
        store.set_suggestions(
            SessionId(1),
            vec![detection(1, Category::Email), detection(2, Category::Ssn)],
        );
        let manual = store.add_redaction(rect(), 1, RedactionOrigin::Manual).unwrap();
        assert!(store.suggestions().iter().all(|s| s.id != manual));
        let accepted = store.accept_suggestion(store.suggestions()[0].id).unwrap();
        assert!(store.suggestions().iter().all(|s| s.id != accepted));
        assert_ne!(accepted, manual);
    }

    #[test]
    fn test_set_suggestions_for_other_session_is_ignored() {
        let mut store = RegionStore::new(SessionId(2));
        assert_eq!(
            store.set_suggestions(SessionId(1), vec![detection(1, Category::Phone)]),
            None
        );
        assert!(store.suggestions().is_empty());
    }

    #[test]
    fn test_set_suggestions_replaces_batch_and_filters_invalid() {
        let mut store = RegionStore::new(SessionId(1));
        store.set_suggestions(SessionId(1), vec![detection(1, Category::Name)]);

        let zero_page = detection(0, Category::Name);
        let mut loud = detection(2, Category::Ssn);
        loud.confidence = 1.7;
        let applied = store.set_suggestions(SessionId(1), vec![zero_page, loud]);

        assert_eq!(applied, Some(1));
        assert_eq!(store.suggestions()[0].category, Category::Ssn);
        assert_eq!(store.suggestions()[0].confidence, 1.0);
    }

    #[test]
    fn test_reject_and_page_listing() {
        let mut store = RegionStore::new(SessionId(1));
        store.set_suggestions(
            SessionId(1),
            vec![detection(1, Category::Email), detection(2, Category::Ssn)],
        );
        assert_eq!(store.suggestions_for_page(2).count(), 1);
        let id = store.suggestions_for_page(2).next().unwrap().id;
        assert!(store.reject_suggestion(id).is_some());
        assert!(store.reject_suggestion(id).is_none());
        assert_eq!(store.suggestions_for_page(2).count(), 0);
        assert_eq!(store.redactions().len(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = RegionStore::new(SessionId(1));
        store.add_redaction(rect(), 1, RedactionOrigin::Manual);
        store.set_suggestions(SessionId(1), vec![detection(1, Category::Email)]);
        store.reset(SessionId(2));
        assert!(store.is_empty());
        assert!(store.suggestions().is_empty());
        assert_eq!(store.session(), SessionId(2));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("SSN"), Some(Category::Ssn));
        assert_eq!(Category::parse(" credit_card "), Some(Category::CreditCard));
        assert_eq!(Category::parse("passport"), None);
    }
}
