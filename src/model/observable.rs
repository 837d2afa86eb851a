//! Observable - Severity-tagged change notification.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. Every registration is notified exactly once per `notify`, even when the
//!    same callback was registered twice (no deduplication).
//! 3. An observer returning `Err` stops the notification; later observers are
//!    not called and the error goes back to the caller of `notify`.
//! 4. Observers added or removed while a notification runs take effect from
//!    the next notification.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::Result;
use crate::types::Severity;

/// Listener signature: `(severity, payload)`.
pub type Observer<P> = Rc<dyn Fn(Severity, &P) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub struct Observable<P> {
    observers: RefCell<Vec<(ObserverId, Observer<P>)>>,
    next_id: Cell<u64>,
}

impl<P> Default for Observable<P> {
    fn default() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<P> Observable<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: impl Fn(Severity, &P) -> Result<()> + 'static) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    pub fn clear(&self) {
        self.observers.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    pub fn notify(&self, severity: Severity, payload: &P) -> Result<()> {
        let snapshot: Vec<Observer<P>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        tracing::debug!(?severity, observers = snapshot.len(), "notify");

        for observer in snapshot {
            observer(severity, payload)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TripError;

    fn recorder(log: &Rc<RefCell<Vec<(usize, Severity)>>>, tag: usize) -> impl Fn(Severity, &u32) -> Result<()> + 'static {
        let log = Rc::clone(log);
        move |severity, _| {
            log.borrow_mut().push((tag, severity));
            Ok(())
        }
    }

    #[test]
    fn test_notify_in_registration_order() {
        let observable = Observable::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            observable.add_observer(recorder(&log, tag));
        }

        observable.notify(Severity::Minor, &1).expect("notify");
        assert_eq!(
            *log.borrow(),
            vec![(0, Severity::Minor), (1, Severity::Minor), (2, Severity::Minor)]
        );
    }

    #[test]
    fn test_same_callback_twice_is_called_twice() {
        let observable = Observable::<u32>::new();
        let count = Rc::new(Cell::new(0));
        let callback: Observer<u32> = {
            let count = Rc::clone(&count);
            Rc::new(move |_, _| {
                count.set(count.get() + 1);
                Ok(())
            })
        };
        for _ in 0..2 {
            let callback = Rc::clone(&callback);
            observable.add_observer(move |severity, payload| callback(severity, payload));
        }

        observable.notify(Severity::Patch, &0).expect("notify");
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_remove_observer() {
        let observable = Observable::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = observable.add_observer(recorder(&log, 0));
        observable.add_observer(recorder(&log, 1));

        assert!(observable.remove_observer(first));
        assert!(!observable.remove_observer(first), "second removal is a no-op");
        observable.notify(Severity::Patch, &0).expect("notify");
        assert_eq!(*log.borrow(), vec![(1, Severity::Patch)]);
    }

    #[test]
    fn test_failing_observer_aborts_remaining() {
        let observable = Observable::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        observable.add_observer(recorder(&log, 0));
        observable.add_observer(|_, _| Err(TripError::validation("observer", "failed")));
        observable.add_observer(recorder(&log, 2));

        assert!(observable.notify(Severity::Medium, &0).is_err());
        assert_eq!(*log.borrow(), vec![(0, Severity::Medium)]);
    }

    #[test]
    fn test_observer_added_during_notify_waits_for_next_round() {
        let observable = Rc::new(Observable::<u32>::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let weak = Rc::downgrade(&observable);
        let log_for_late = Rc::clone(&log);
        observable.add_observer(move |_, _| {
            if let Some(observable) = weak.upgrade() {
                observable.add_observer(recorder(&log_for_late, 9));
            }
            Ok(())
        });

        observable.notify(Severity::Patch, &0).expect("notify");
        assert!(log.borrow().is_empty());
        observable.notify(Severity::Patch, &0).expect("notify");
        assert_eq!(log.borrow().len(), 1);
    }
}
