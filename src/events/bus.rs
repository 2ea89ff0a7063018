use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Handler<E> = Rc<dyn Fn(&E)>;
type Handlers<E> = Rc<RefCell<Vec<Handler<E>>>>;

/// Single-threaded publish/subscribe channel.
///
/// Cloning the bus yields another handle to the same handler list. Handlers
/// stay registered only as long as the [`Subscription`] returned by
/// [`EventBus::subscribe`] is alive.
pub struct EventBus<E> {
    handlers: Handlers<E>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            handlers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription<E> {
        let handler: Handler<E> = Rc::new(handler);
        self.handlers.borrow_mut().push(Rc::clone(&handler));
        Subscription {
            handler,
            handlers: Rc::clone(&self.handlers),
        }
    }

    /// Deliver `event` to every handler registered when the call starts.
    pub fn emit(&self, event: &E) {
        let handlers = self.handlers.borrow().clone();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: Rc::clone(&self.handlers),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> PartialEq for EventBus<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.handlers, &other.handlers)
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Registration guard; the handler is removed when this is dropped.
pub struct Subscription<E> {
    handler: Handler<E>,
    handlers: Handlers<E>,
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        let mut handlers = self.handlers.borrow_mut();
        handlers.retain(|item| !Rc::ptr_eq(item, &self.handler));
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_subscribers() {
        let bus = EventBus::<u32>::new();
        let total = Rc::new(Cell::new(0));

        let sum = Rc::clone(&total);
        let _sub = bus.subscribe(move |n| sum.set(sum.get() + n));
        bus.emit(&3);
        bus.emit(&4);

        assert_eq!(total.get(), 7);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::<u32>::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let sub = bus.subscribe(move |_| counter.set(counter.get() + 1));
        bus.emit(&0);
        drop(sub);
        bus.emit(&0);

        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_clones_share_handlers() {
        let bus = EventBus::<u32>::new();
        let other = bus.clone();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let _sub = bus.subscribe(move |_| counter.set(counter.get() + 1));
        other.emit(&0);

        assert_eq!(hits.get(), 1);
        assert_eq!(bus, other);
    }

    #[test]
    fn test_subscribe_during_emit_is_deferred() {
        let bus = EventBus::<u32>::new();
        let late: Rc<RefCell<Vec<Subscription<u32>>>> = Rc::default();
        let hits = Rc::new(Cell::new(0));

        let inner_bus = bus.clone();
        let store = Rc::clone(&late);
        let counter = Rc::clone(&hits);
        let _sub = bus.subscribe(move |_| {
            let counter = Rc::clone(&counter);
            store
                .borrow_mut()
                .push(inner_bus.subscribe(move |_| counter.set(counter.get() + 1)));
        });

        bus.emit(&0);
        assert_eq!(hits.get(), 0);
        bus.emit(&0);
        assert_eq!(hits.get(), 1);
    }
}
