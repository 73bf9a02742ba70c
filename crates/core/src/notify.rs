//! 会话事件与订阅

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use serde::Serialize;

use crate::store::SessionId;
use crate::viewport::ViewportState;

/// 会话状态变化通知
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    DocumentLoaded {
        session: SessionId,
        name: String,
        page_count: u32,
    },
    DocumentClosed,
    /// 页码或缩放变化，需要重新渲染并重绘覆盖层
    ViewportChanged(ViewportState),
    /// 已确认区域变化，需要重绘覆盖层
    RedactionsChanged { count: usize },
    SuggestionsChanged { count: usize },
    /// 拖拽预览变化，只需重绘覆盖层
    PreviewChanged,
    ProcessingChanged { processing: bool },
    DetectionFailed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// 单线程观察者列表
///
/// 回调里可以再次 `emit`、订阅或退订：
/// - 分发期间产生的事件排队，当前这一批送达所有监听者之后按顺序继续分发；
/// - 新订阅从下一个事件开始生效；
/// - 退订立即生效，被退订的监听者不会再收到任何事件。
#[derive(Default)]
pub struct Notifier {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    queue: RefCell<VecDeque<SessionEvent>>,
    dispatching: Cell<bool>,
    /// 分发期间从 `listeners` 中取出的监听者 id
    detached: RefCell<Vec<SubscriptionId>>,
    /// 分发期间被退订、尚未移除的监听者
    removed: RefCell<Vec<SubscriptionId>>,
}

impl Notifier {
    pub fn subscribe(&self, listener: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        {
            let mut listeners = self.listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|(sid, _)| *sid != id);
            if listeners.len() != before {
                return true;
            }
        }

        let detached = self.detached.borrow().contains(&id);
        let mut removed = self.removed.borrow_mut();
        if detached && !removed.contains(&id) {
            removed.push(id);
            return true;
        }
        false
    }

    pub fn emit(&self, event: SessionEvent) {
        self.emit_all(std::iter::once(event));
    }

    /// 整批入队后再分发，回调里产生的事件排在这一批之后
    pub fn emit_all(&self, events: impl IntoIterator<Item = SessionEvent>) {
        self.queue.borrow_mut().extend(events);
        if self.dispatching.replace(true) {
            return;
        }

        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.dispatch(&event);
        }
        self.dispatching.set(false);
    }

    fn dispatch(&self, event: &SessionEvent) {
        let mut active = std::mem::take(&mut *self.listeners.borrow_mut());
        *self.detached.borrow_mut() = active.iter().map(|(id, _)| *id).collect();

        for (id, listener) in active.iter_mut() {
            if self.removed.borrow().contains(id) {
                continue;
            }
            listener(event);
        }

        self.detached.borrow_mut().clear();
        let removed = std::mem::take(&mut *self.removed.borrow_mut());
        active.retain(|(id, _)| !removed.contains(id));

        let mut listeners = self.listeners.borrow_mut();
        let added = std::mem::take(&mut *listeners);
        *listeners = active;
        listeners.extend(added);
    }

    pub fn len(&self) -> usize {
        let detached = self.detached.borrow().len() - self.removed.borrow().len();
        self.listeners.borrow().len() + detached
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let notifier = Notifier::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        notifier.subscribe(move |e| a.borrow_mut().push(("a", e.clone())));
        let b = seen.clone();
        let id = notifier.subscribe(move |e| b.borrow_mut().push(("b", e.clone())));

        notifier.emit(SessionEvent::PreviewChanged);
        assert_eq!(seen.borrow().len(), 2);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(SessionEvent::DocumentClosed);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(seen.borrow()[2], ("a", SessionEvent::DocumentClosed));
    }

    #[test]
    fn test_nested_emit_is_delivered_after_current_event() {
        let notifier = Rc::new(Notifier::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner = notifier.clone();
        let a = seen.clone();
        notifier.subscribe(move |e| {
            a.borrow_mut().push(("a", e.clone()));
            if *e == SessionEvent::DocumentClosed {
                inner.emit(SessionEvent::PreviewChanged);
            }
        });
        let b = seen.clone();
        notifier.subscribe(move |e| b.borrow_mut().push(("b", e.clone())));

        notifier.emit(SessionEvent::DocumentClosed);
        assert_eq!(
            *seen.borrow(),
            vec![
                ("a", SessionEvent::DocumentClosed),
                ("b", SessionEvent::DocumentClosed),
                ("a", SessionEvent::PreviewChanged),
                ("b", SessionEvent::PreviewChanged),
            ]
        );
        assert_eq!(notifier.len(), 2);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let notifier = Rc::new(Notifier::default());
        let hits = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));
        let unsubscribed = Rc::new(Cell::new(false));

        let inner = notifier.clone();
        let counter = hits.clone();
        let slot = own_id.clone();
        let result = unsubscribed.clone();
        let id = notifier.subscribe(move |_| {
            counter.set(counter.get() + 1);
            if let Some(id) = slot.get() {
                result.set(inner.unsubscribe(id));
            }
        });
        own_id.set(Some(id));

        notifier.emit(SessionEvent::PreviewChanged);
        notifier.emit(SessionEvent::PreviewChanged);
        assert!(unsubscribed.get());
        assert_eq!(hits.get(), 1);
        assert!(notifier.is_empty());
        assert!(!notifier.unsubscribe(id));
    }

    #[test]
    fn test_listener_can_unsubscribe_a_later_listener() {
        let notifier = Rc::new(Notifier::default());
        let later_hits = Rc::new(Cell::new(0));
        let target = Rc::new(Cell::new(None));

        let inner = notifier.clone();
        let slot = target.clone();
        notifier.subscribe(move |_| {
            if let Some(id) = slot.take() {
                inner.unsubscribe(id);
            }
        });
        let counter = later_hits.clone();
        target.set(Some(notifier.subscribe(move |_| counter.set(counter.get() + 1))));

        notifier.emit(SessionEvent::DocumentClosed);
        assert_eq!(later_hits.get(), 0);
        assert_eq!(notifier.len(), 1);
    }
}
