//! Per-frame listener registry.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context::RenderContext;

/// Work that runs once at the start and once at the end of every frame.
pub trait FrameListener {
    fn on_frame_will_render(&self, context: &RenderContext);

    fn on_frame_did_render(&self, context: &RenderContext);
}

/// Registry of [`FrameListener`]s, notified by the renderer.
///
/// Listeners are held weakly: one whose owner has been dropped is skipped and
/// pruned on the next registry change. Registering the same listener twice is
/// rejected.
///
/// Adding or removing listeners from inside a notification is not supported.
/// The registry stays borrowed for the whole notification pass, so such a
/// call panics with a `RefCell` borrow error.
#[derive(Default)]
pub struct FrameSynchronizer {
    listeners: RefCell<Vec<Weak<dyn FrameListener>>>,
}

impl FrameSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Returns `false` if it is already registered.
    pub fn add_frame_listener<L: FrameListener + 'static>(&self, listener: &Rc<L>) -> bool {
        let weak = Rc::downgrade(listener);
        let weak: Weak<dyn FrameListener> = weak;
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|l| l.strong_count() > 0);
        if listeners.iter().any(|l| Weak::ptr_eq(l, &weak)) {
            return false;
        }
        listeners.push(weak);
        true
    }

    /// Unregister `listener`. Returns whether it was registered.
    pub fn remove_frame_listener<L: FrameListener + 'static>(&self, listener: &Rc<L>) -> bool {
        let weak = Rc::downgrade(listener);
        let weak: Weak<dyn FrameListener> = weak;
        let mut listeners = self.listeners.borrow_mut();
        let Some(index) = listeners.iter().position(|l| Weak::ptr_eq(l, &weak)) else {
            return false;
        };
        listeners.remove(index);
        listeners.retain(|l| l.strong_count() > 0);
        true
    }

    /// Number of registered listeners that are still alive.
    pub fn len(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_frame_start(&self, context: &RenderContext) {
        let listeners = self.listeners.borrow();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.on_frame_will_render(context);
        }
    }

    pub fn notify_frame_end(&self, context: &RenderContext) {
        let listeners = self.listeners.borrow();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.on_frame_did_render(context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        starts: Cell<u32>,
        ends: Cell<u32>,
        log: Rc<RefCell<Vec<&'static str>>>,
        tag: &'static str,
    }

    impl Counter {
        fn new(tag: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Rc<Self> {
            Rc::new(Self {
                starts: Cell::new(0),
                ends: Cell::new(0),
                log: Rc::clone(log),
                tag,
            })
        }
    }

    impl FrameListener for Counter {
        fn on_frame_will_render(&self, _context: &RenderContext) {
            self.starts.set(self.starts.get() + 1);
            self.log.borrow_mut().push(self.tag);
        }

        fn on_frame_did_render(&self, _context: &RenderContext) {
            self.ends.set(self.ends.get() + 1);
        }
    }

    fn context(sync: &Rc<FrameSynchronizer>) -> RenderContext {
        RenderContext::new(Rc::clone(sync))
    }

    #[test]
    fn notifies_in_registration_order() {
        let sync = Rc::new(FrameSynchronizer::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Counter::new("a", &log);
        let b = Counter::new("b", &log);
        assert!(sync.add_frame_listener(&a));
        assert!(sync.add_frame_listener(&b));

        let ctx = context(&sync);
        sync.notify_frame_start(&ctx);
        sync.notify_frame_end(&ctx);

        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(a.ends.get(), 1);
        assert_eq!(b.ends.get(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let sync = Rc::new(FrameSynchronizer::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Counter::new("a", &log);
        assert!(sync.add_frame_listener(&a));
        assert!(!sync.add_frame_listener(&a));
        assert_eq!(sync.len(), 1);

        sync.notify_frame_start(&context(&sync));
        assert_eq!(a.starts.get(), 1);
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let sync = Rc::new(FrameSynchronizer::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Counter::new("a", &log);
        sync.add_frame_listener(&a);
        assert!(sync.remove_frame_listener(&a));
        assert!(!sync.remove_frame_listener(&a));

        sync.notify_frame_start(&context(&sync));
        assert_eq!(a.starts.get(), 0);
        assert!(sync.is_empty());
    }

    #[test]
    fn dropped_listener_is_skipped() {
        let sync = Rc::new(FrameSynchronizer::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Counter::new("a", &log);
        let b = Counter::new("b", &log);
        sync.add_frame_listener(&a);
        sync.add_frame_listener(&b);
        drop(a);

        sync.notify_frame_start(&context(&sync));
        assert_eq!(*log.borrow(), vec!["b"]);
        assert_eq!(sync.len(), 1);
    }

    struct Registering {
        other: Rc<Counter>,
    }

    impl FrameListener for Registering {
        fn on_frame_will_render(&self, context: &RenderContext) {
            context.frame_synchronizer().add_frame_listener(&self.other);
        }

        fn on_frame_did_render(&self, _context: &RenderContext) {}
    }

    #[test]
    #[should_panic(expected = "already borrowed")]
    fn registering_during_notification_panics() {
        let sync = Rc::new(FrameSynchronizer::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let listener = Rc::new(Registering {
            other: Counter::new("late", &log),
        });
        sync.add_frame_listener(&listener);

        sync.notify_frame_start(&context(&sync));
    }
}
