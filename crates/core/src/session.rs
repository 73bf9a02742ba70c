//! 文档会话
//!
//! 会话拥有一个打开的文档以及它的视口、区域存储和交互控制器，
//! 所有修改都在同一个逻辑线程上同步完成。耗时操作（解析、检测、导出）
//! 是 `async` 的：等待期间 `is_processing()` 为真，拖拽无法开始，
//! 同类操作不能重入。
//!
//! 每次开始载入文档都会推进会话纪元，之前发起的检测在返回时
//! 如果发现纪元已变，结果直接丢弃。

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::{CoreError, RedactError, Result};
use crate::export::{self, ExportArtifact};
use crate::geometry::{DisplayPoint, DisplayRect, DocumentRect, PageSize, Transform};
use crate::interaction::{CaptureOutcome, InteractionController};
use crate::notify::{Notifier, SessionEvent, SubscriptionId};
use crate::overlay::OverlayPlan;
use crate::provider::{Detection, Detector, DocumentInfo, DocumentProvider, ExportProvider, Raster};
use crate::source::SourceDocument;
use crate::store::{Category, Redaction, RedactionOrigin, RegionId, RegionStore, SessionId, Suggestion};
use crate::viewport::{ViewportManager, ViewportState};

/// 载入成功后的文档概要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub session: SessionId,
    pub name: String,
    pub page_count: u32,
    pub pages: Vec<PageSize>,
}

/// 一次检测的结局
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// 收录的建议数量
    Applied(usize),
    /// 结果返回时文档已被替换，未做任何修改
    Stale,
    /// 检测失败，建议集已置空，手动流程不受影响
    Failed(RedactError),
}

/// 渲染好的当前页及其覆盖层
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: u32,
    pub scale: f64,
    pub raster: Raster,
    pub overlays: OverlayPlan,
}

/// 已确认区域列表中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionSummary {
    /// 从 1 开始的序号（插入顺序）
    pub index: usize,
    pub id: RegionId,
    pub page: u32,
    pub origin: String,
    /// 当前缩放下的显示尺寸
    pub display_width: f64,
    pub display_height: f64,
}

/// 建议审核列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEntry {
    pub id: RegionId,
    pub page: u32,
    pub category: Category,
    pub excerpt: String,
    pub confidence_percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Load,
    Detection,
    Export,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::Load => "document load",
            Operation::Detection => "detection",
            Operation::Export => "export",
        }
    }
}

#[derive(Debug, Default)]
struct InFlight {
    load: bool,
    detection: bool,
    export: bool,
}

impl InFlight {
    fn slot(&mut self, op: Operation) -> &mut bool {
        match op {
            Operation::Load => &mut self.load,
            Operation::Detection => &mut self.detection,
            Operation::Export => &mut self.export,
        }
    }

    fn any(&self) -> bool {
        self.load || self.detection || self.export
    }
}

struct OpenDocument {
    session: SessionId,
    source: SourceDocument,
    info: DocumentInfo,
    viewport: ViewportManager,
}

struct State {
    epoch: u64,
    document: Option<OpenDocument>,
    store: RegionStore,
    controller: InteractionController,
    show_suggestions: bool,
    in_flight: InFlight,
}

struct Inner {
    config: SessionConfig,
    documents: Rc<dyn DocumentProvider>,
    detector: Rc<dyn Detector>,
    exporter: Arc<dyn ExportProvider>,
    state: RefCell<State>,
    notifier: Notifier,
}

/// 会话句柄，克隆后指向同一个会话
#[derive(Clone)]
pub struct Session {
    inner: Rc<Inner>,
}

/// 离开作用域时清除进行中标记
struct InFlightGuard {
    inner: Rc<Inner>,
    op: Operation,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let idle = {
            let mut state = self.inner.state.borrow_mut();
            *state.in_flight.slot(self.op) = false;
            !state.in_flight.any()
        };
        if idle {
            self.inner
                .notifier
                .emit(SessionEvent::ProcessingChanged { processing: false });
        }
    }
}

impl Session {
    pub fn new(
        config: SessionConfig,
        documents: Rc<dyn DocumentProvider>,
        detector: Rc<dyn Detector>,
        exporter: Arc<dyn ExportProvider>,
    ) -> std::result::Result<Self, CoreError> {
        config.validate()?;
        let state = State {
            epoch: 0,
            document: None,
            store: RegionStore::new(SessionId(0)),
            controller: InteractionController::new(config.min_capture_size),
            show_suggestions: config.show_suggestions,
            in_flight: InFlight::default(),
        };
        Ok(Self {
            inner: Rc::new(Inner {
                config,
                documents,
                detector,
                exporter,
                state: RefCell::new(state),
                notifier: Notifier::default(),
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn subscribe(&self, listener: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        self.inner.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.notifier.unsubscribe(id)
    }

    fn emit_all(&self, events: Vec<SessionEvent>) {
        self.inner.notifier.emit_all(events);
    }

    fn begin(&self, op: Operation) -> Result<InFlightGuard> {
        let was_processing = {
            let mut state = self.inner.state.borrow_mut();
            if *state.in_flight.slot(op) {
                return Err(RedactError::Busy(op.label()));
            }
            let was = state.in_flight.any();
            *state.in_flight.slot(op) = true;
            was
        };
        if !was_processing {
            self.inner
                .notifier
                .emit(SessionEvent::ProcessingChanged { processing: true });
        }
        Ok(InFlightGuard {
            inner: self.inner.clone(),
            op,
        })
    }

    /// 有任何后台操作进行中
    pub fn is_processing(&self) -> bool {
        self.inner.state.borrow().in_flight.any()
    }

    pub fn has_document(&self) -> bool {
        self.inner.state.borrow().document.is_some()
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.inner
            .state
            .borrow()
            .document
            .as_ref()
            .map(|d| d.session)
    }

    pub fn document_name(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .document
            .as_ref()
            .map(|d| d.source.name().to_string())
    }

    pub fn page_count(&self) -> Option<u32> {
        self.inner
            .state
            .borrow()
            .document
            .as_ref()
            .map(|d| d.info.page_count())
    }

    // ------------------------------------------------------------------
    // 文档生命周期
    // ------------------------------------------------------------------

    /// 载入新文档
    ///
    /// 非 PDF 输入直接返回 `InvalidInputFormat`，不触碰任何状态。
    /// 解析失败时保留原来打开的文档；但无论成败，之前发起的检测都已作废。
    pub async fn load(&self, name: impl Into<String>, bytes: Vec<u8>) -> Result<DocumentSummary> {
        let source = SourceDocument::from_upload(name, bytes, self.inner.config.max_upload_bytes)?;
        let _guard = self.begin(Operation::Load)?;

        let session = {
            let mut state = self.inner.state.borrow_mut();
            state.epoch += 1;
            SessionId(state.epoch)
        };
        log::info!(
            "[Session] 开始载入 {} ({} 字节), 会话 {:?}",
            source.name(),
            source.len(),
            session
        );

        let info = self
            .inner
            .documents
            .load(source.bytes())
            .await
            .map_err(|e| {
                log::warn!("[Session] 载入 {} 失败: {}", source.name(), e);
                RedactError::LoadFailure(e.message)
            })?;
        validate_info(&info)?;

        let summary = DocumentSummary {
            session,
            name: source.name().to_string(),
            page_count: info.page_count(),
            pages: info.pages.clone(),
        };

        let events = {
            let mut state = self.inner.state.borrow_mut();
            let viewport = ViewportManager::new(info.pages.clone(), &self.inner.config);
            let viewport_state = viewport.state();
            state.document = Some(OpenDocument {
                session,
                source,
                info,
                viewport,
            });
            state.store.reset(session);
            state.controller.cancel();
            state.show_suggestions = self.inner.config.show_suggestions;
            vec![
                SessionEvent::DocumentLoaded {
                    session,
                    name: summary.name.clone(),
                    page_count: summary.page_count,
                },
                SessionEvent::ViewportChanged(viewport_state),
                SessionEvent::RedactionsChanged { count: 0 },
                SessionEvent::SuggestionsChanged { count: 0 },
            ]
        };
        log::info!(
            "[Session] 已载入 {}: {} 页",
            summary.name,
            summary.page_count
        );
        self.emit_all(events);
        Ok(summary)
    }

    /// 关闭当前文档并释放渲染资源，进行中的检测随之作废
    pub fn close(&self) {
        let closed = {
            let mut state = self.inner.state.borrow_mut();
            let closed = state.document.take().is_some();
            state.epoch += 1;
            let epoch = state.epoch;
            state.store.reset(SessionId(epoch));
            state.controller.cancel();
            closed
        };
        if closed {
            self.inner.documents.unload();
            self.emit_all(vec![SessionEvent::DocumentClosed]);
        }
    }

    // ------------------------------------------------------------------
    // 检测
    // ------------------------------------------------------------------

    /// 对当前文档运行检测器
    ///
    /// 检测失败不是致命错误：建议集置空，返回 `DetectionOutcome::Failed`。
    /// 结果返回前若已开始载入其他文档，结果被丢弃。
    pub async fn detect(&self) -> Result<DetectionOutcome> {
        let (session, epoch, bytes, page_count) = {
            let state = self.inner.state.borrow();
            let document = state.document.as_ref().ok_or(RedactError::NoDocument)?;
            (
                document.session,
                state.epoch,
                document.source.bytes(),
                document.info.page_count(),
            )
        };
        let _guard = self.begin(Operation::Detection)?;

        log::info!(
            "[Detection] 使用 {} 检测会话 {:?}",
            self.inner.detector.name(),
            session
        );
        let result = self.inner.detector.detect(bytes).await;

        let (outcome, events) = {
            let mut state = self.inner.state.borrow_mut();
            if state.epoch != epoch {
                log::info!("[Detection] 会话 {:?} 已被替换，丢弃检测结果", session);
                return Ok(DetectionOutcome::Stale);
            }

            match result {
                Ok(batch) => {
                    let batch = retain_known_pages(batch, page_count);
                    match state.store.set_suggestions(session, batch) {
                        Some(count) => {
                            state.show_suggestions = self.inner.config.show_suggestions;
                            log::info!("[Detection] 收录 {} 条建议", count);
                            (
                                DetectionOutcome::Applied(count),
                                vec![SessionEvent::SuggestionsChanged { count }],
                            )
                        }
                        None => (DetectionOutcome::Stale, Vec::new()),
                    }
                }
                Err(e) => {
                    log::warn!("[Detection] 检测失败，降级为空建议集: {}", e);
                    state.store.set_suggestions(session, Vec::new());
                    (
                        DetectionOutcome::Failed(RedactError::DetectionFailure(e.message.clone())),
                        vec![
                            SessionEvent::DetectionFailed { reason: e.message },
                            SessionEvent::SuggestionsChanged { count: 0 },
                        ],
                    )
                }
            }
        };
        self.emit_all(events);
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // 导出
    // ------------------------------------------------------------------

    /// 生成脱敏后的文档
    ///
    /// 没有打开文档或没有任何区域时返回 `ExportPrecondition`，不做任何 I/O。
    /// 序列化在阻塞线程池中完成；失败时原始字节和区域存储都保持不变。
    pub async fn export(&self) -> Result<ExportArtifact> {
        let (source, redactions) = {
            let state = self.inner.state.borrow();
            let document = state
                .document
                .as_ref()
                .ok_or(RedactError::ExportPrecondition("no document is open"))?;
            if state.store.is_empty() {
                return Err(RedactError::ExportPrecondition("no redactions"));
            }
            (document.source.clone(), state.store.redactions().to_vec())
        };
        let _guard = self.begin(Operation::Export)?;

        log::info!(
            "[Export] 导出 {}: {} 个区域",
            source.name(),
            redactions.len()
        );
        let exporter = self.inner.exporter.clone();
        let bytes = source.bytes();
        let output = tokio::task::spawn_blocking(move || {
            export::apply_redactions(exporter.as_ref(), &bytes, &redactions)
        })
        .await
        .map_err(|e| RedactError::ExportFailure {
            page: None,
            reason: e.to_string(),
        })??;

        let file_name = export::export_file_name(&self.inner.config.export_prefix, source.name());
        log::info!("[Export] 完成 {} ({} 字节)", file_name, output.len());
        Ok(ExportArtifact {
            file_name,
            bytes: output,
        })
    }

    // ------------------------------------------------------------------
    // 渲染
    // ------------------------------------------------------------------

    /// 渲染当前页，并按渲染时的页码和缩放生成覆盖层
    pub async fn render_current(&self) -> Result<RenderedPage> {
        let (page, scale) = {
            let state = self.inner.state.borrow();
            let document = state.document.as_ref().ok_or(RedactError::NoDocument)?;
            (document.viewport.page(), document.viewport.scale())
        };

        let raster = self
            .inner
            .documents
            .render(page, scale)
            .await
            .map_err(|e| RedactError::RenderFailure {
                page,
                reason: e.message,
            })?;

        let overlays = {
            let state = self.inner.state.borrow();
            let document = state.document.as_ref().ok_or(RedactError::NoDocument)?;
            let size = document
                .viewport
                .page_size(page)
                .unwrap_or(PageSize::new(0.0, 0.0));
            let preview = if document.viewport.page() == page && document.viewport.scale() == scale
            {
                state.controller.preview()
            } else {
                None
            };
            OverlayPlan::build(
                &state.store,
                page,
                Transform::new(scale, size),
                state.show_suggestions,
                preview,
            )
        };

        Ok(RenderedPage {
            page,
            scale,
            raster,
            overlays,
        })
    }

    /// 当前页、当前缩放的覆盖层
    pub fn overlay_plan(&self) -> Option<OverlayPlan> {
        let state = self.inner.state.borrow();
        let document = state.document.as_ref()?;
        let viewport = &document.viewport;
        Some(OverlayPlan::build(
            &state.store,
            viewport.page(),
            viewport.transform(),
            state.show_suggestions,
            state.controller.preview(),
        ))
    }

    // ------------------------------------------------------------------
    // 视口
    // ------------------------------------------------------------------

    pub fn viewport(&self) -> Option<ViewportState> {
        self.inner
            .state
            .borrow()
            .document
            .as_ref()
            .map(|d| d.viewport.state())
    }

    pub fn transform(&self) -> Option<Transform> {
        self.inner
            .state
            .borrow()
            .document
            .as_ref()
            .map(|d| d.viewport.transform())
    }

    fn update_viewport(&self, change: impl FnOnce(&mut ViewportManager) -> bool) -> bool {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let State {
                document,
                controller,
                ..
            } = &mut *state;
            let Some(document) = document.as_mut() else {
                return false;
            };
            if !change(&mut document.viewport) {
                return false;
            }
            // 页码或缩放变化后，旧的拖拽锚点已经没有意义
            controller.cancel();
            document.viewport.state()
        };
        log::debug!(
            "[Viewport] 页 {} 缩放 {:.2}",
            changed.page,
            changed.scale
        );
        self.emit_all(vec![SessionEvent::ViewportChanged(changed)]);
        true
    }

    /// 跳转到指定页；越界时状态不变，返回 `PageIndexOutOfRange`
    pub fn go_to_page(&self, page: u32) -> Result<bool> {
        let total = self.page_count().ok_or(RedactError::NoDocument)?;
        if page == 0 || page > total {
            return Err(RedactError::PageIndexOutOfRange { page, total });
        }
        Ok(self.update_viewport(|vp| vp.go_to_page(page)))
    }

    pub fn next_page(&self) -> bool {
        self.update_viewport(ViewportManager::next_page)
    }

    pub fn previous_page(&self) -> bool {
        self.update_viewport(ViewportManager::previous_page)
    }

    pub fn zoom_in(&self) -> bool {
        self.update_viewport(ViewportManager::zoom_in)
    }

    pub fn zoom_out(&self) -> bool {
        self.update_viewport(ViewportManager::zoom_out)
    }

    pub fn zoom_to(&self, scale: f64) -> bool {
        self.update_viewport(|vp| vp.zoom_to(scale))
    }

    // ------------------------------------------------------------------
    // 手动框选
    // ------------------------------------------------------------------

    pub fn set_redaction_mode(&self, enabled: bool) {
        let was_dragging = {
            let mut state = self.inner.state.borrow_mut();
            let was = state.controller.is_dragging();
            state.controller.set_mode(enabled);
            was && !enabled
        };
        if was_dragging {
            self.emit_all(vec![SessionEvent::PreviewChanged]);
        }
    }

    pub fn redaction_mode(&self) -> bool {
        self.inner.state.borrow().controller.mode_enabled()
    }

    /// 开始拖拽；没有文档、模式关闭或后台操作进行中时返回 `false`
    pub fn pointer_down(&self, point: DisplayPoint) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if state.document.is_none() {
            return false;
        }
        let processing = state.in_flight.any();
        state.controller.pointer_down(point, processing)
    }

    pub fn pointer_move(&self, point: DisplayPoint) -> Option<DisplayRect> {
        let preview = self.inner.state.borrow_mut().controller.pointer_move(point);
        if preview.is_some() {
            self.emit_all(vec![SessionEvent::PreviewChanged]);
        }
        preview
    }

    /// 结束拖拽，足够大的选区写入当前页
    pub fn pointer_up(&self, point: DisplayPoint) -> CaptureOutcome {
        let (outcome, count) = {
            let mut state = self.inner.state.borrow_mut();
            let State {
                document,
                store,
                controller,
                ..
            } = &mut *state;
            let Some(document) = document.as_ref() else {
                controller.cancel();
                return CaptureOutcome::Ignored;
            };
            if !controller.is_dragging() {
                return CaptureOutcome::Ignored;
            }
            let viewport = &document.viewport;
            let outcome = controller.pointer_up(point, viewport.transform(), viewport.page(), store);
            (outcome, store.redactions().len())
        };

        let mut events = vec![SessionEvent::PreviewChanged];
        if matches!(outcome, CaptureOutcome::Committed(_)) {
            events.push(SessionEvent::RedactionsChanged { count });
        }
        self.emit_all(events);
        outcome
    }

    /// 指针离开画布
    pub fn pointer_leave(&self) {
        let cancelled = self.inner.state.borrow_mut().controller.cancel();
        if cancelled {
            self.emit_all(vec![SessionEvent::PreviewChanged]);
        }
    }

    // ------------------------------------------------------------------
    // 区域存储
    // ------------------------------------------------------------------

    /// 直接以文档空间矩形添加手动区域
    pub fn add_redaction(&self, page: u32, rect: DocumentRect) -> Result<Option<RegionId>> {
        let (id, count) = {
            let mut state = self.inner.state.borrow_mut();
            let total = state
                .document
                .as_ref()
                .map(|d| d.info.page_count())
                .ok_or(RedactError::NoDocument)?;
            if page == 0 || page > total {
                return Err(RedactError::PageIndexOutOfRange { page, total });
            }
            let id = state.store.add_redaction(rect, page, RedactionOrigin::Manual);
            (id, state.store.redactions().len())
        };
        if id.is_some() {
            self.emit_all(vec![SessionEvent::RedactionsChanged { count }]);
        }
        Ok(id)
    }

    fn mutate_store<T>(
        &self,
        change: impl FnOnce(&mut RegionStore) -> Option<T>,
        event: impl FnOnce(&RegionStore) -> Vec<SessionEvent>,
    ) -> Option<T> {
        let (result, events) = {
            let mut state = self.inner.state.borrow_mut();
            let result = change(&mut state.store);
            let events = if result.is_some() {
                event(&state.store)
            } else {
                Vec::new()
            };
            (result, events)
        };
        self.emit_all(events);
        result
    }

    pub fn remove_redaction(&self, id: RegionId) -> Option<Redaction> {
        self.mutate_store(|store| store.remove_redaction(id), redactions_changed)
    }

    pub fn undo_last(&self) -> Option<Redaction> {
        self.mutate_store(RegionStore::undo_last, redactions_changed)
    }

    pub fn clear_all(&self) -> usize {
        self.mutate_store(
            |store| Some(store.clear_all()).filter(|removed| *removed > 0),
            redactions_changed,
        )
        .unwrap_or(0)
    }

    /// 接受建议；已经处理过的 id 为空操作
    pub fn accept_suggestion(&self, id: RegionId) -> Option<RegionId> {
        self.mutate_store(
            |store| store.accept_suggestion(id),
            |store| {
                vec![
                    SessionEvent::RedactionsChanged {
                        count: store.redactions().len(),
                    },
                    SessionEvent::SuggestionsChanged {
                        count: store.suggestions().len(),
                    },
                ]
            },
        )
    }

    pub fn reject_suggestion(&self, id: RegionId) -> Option<Suggestion> {
        self.mutate_store(|store| store.reject_suggestion(id), suggestions_changed)
    }

    pub fn set_show_suggestions(&self, visible: bool) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let changed = state.show_suggestions != visible;
            state.show_suggestions = visible;
            changed
        };
        if changed {
            let count = self.inner.state.borrow().store.suggestions().len();
            self.emit_all(vec![SessionEvent::SuggestionsChanged { count }]);
        }
    }

    pub fn show_suggestions(&self) -> bool {
        self.inner.state.borrow().show_suggestions
    }

    pub fn redactions(&self) -> Vec<Redaction> {
        self.inner.state.borrow().store.redactions().to_vec()
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.inner.state.borrow().store.suggestions().to_vec()
    }

    pub fn redactions_for_page(&self, page: u32) -> Vec<Redaction> {
        self.inner
            .state
            .borrow()
            .store
            .redactions_for_page(page)
            .cloned()
            .collect()
    }

    pub fn suggestions_for_page(&self, page: u32) -> Vec<Suggestion> {
        self.inner
            .state
            .borrow()
            .store
            .suggestions_for_page(page)
            .cloned()
            .collect()
    }

    /// 已确认区域列表，尺寸按当前缩放和所在页的旋转换算成显示像素
    pub fn redaction_summaries(&self) -> Vec<RedactionSummary> {
        let state = self.inner.state.borrow();
        let viewport = state.document.as_ref().map(|d| &d.viewport);
        let scale = viewport.map(|v| v.scale()).unwrap_or(1.0);
        state
            .store
            .redactions()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let swapped = viewport
                    .and_then(|v| v.page_size(r.page))
                    .is_some_and(|p| p.rotation.swaps_axes());
                let (width, height) = if swapped {
                    (r.rect.height, r.rect.width)
                } else {
                    (r.rect.width, r.rect.height)
                };
                RedactionSummary {
                    index: i + 1,
                    id: r.id,
                    page: r.page,
                    origin: r.origin.label().to_string(),
                    display_width: width * scale,
                    display_height: height * scale,
                }
            })
            .collect()
    }

    pub fn suggestion_entries(&self) -> Vec<SuggestionEntry> {
        self.inner
            .state
            .borrow()
            .store
            .suggestions()
            .iter()
            .map(|s| SuggestionEntry {
                id: s.id,
                page: s.page,
                category: s.category,
                excerpt: s.excerpt.clone(),
                confidence_percent: (s.confidence * 100.0).round() as u32,
            })
            .collect()
    }
}

fn redactions_changed(store: &RegionStore) -> Vec<SessionEvent> {
    vec![SessionEvent::RedactionsChanged {
        count: store.redactions().len(),
    }]
}

fn suggestions_changed(store: &RegionStore) -> Vec<SessionEvent> {
    vec![SessionEvent::SuggestionsChanged {
        count: store.suggestions().len(),
    }]
}

fn validate_info(info: &DocumentInfo) -> Result<()> {
    if info.pages.is_empty() {
        return Err(RedactError::LoadFailure("document has no pages".to_string()));
    }
    let bad = info
        .pages
        .iter()
        .position(|p| !(p.width.is_finite() && p.height.is_finite() && p.width > 0.0 && p.height > 0.0));
    if let Some(index) = bad {
        return Err(RedactError::LoadFailure(format!(
            "page {} has an empty page box",
            index + 1
        )));
    }
    Ok(())
}

/// 丢弃指向不存在页面的检测结果
fn retain_known_pages(batch: Vec<Detection>, page_count: u32) -> Vec<Detection> {
    batch
        .into_iter()
        .filter(|d| {
            let known = d.page >= 1 && d.page <= page_count;
            if !known {
                log::warn!(
                    "[Detection] 丢弃越界结果: 页 {} (共 {} 页)",
                    d.page,
                    page_count
                );
            }
            known
        })
        .collect()
}
