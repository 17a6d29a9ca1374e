// One-shot "initial world ready" notification.
// Callbacks are FnOnce and dropped after they run, so a subscriber can never
// be notified twice. Subscribing after the signal fired runs the callback at once.

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct WorldReadySignal {
    fired: bool,
    subscribers: Vec<Callback>,
}

impl WorldReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }

    pub fn subscribe(&mut self, callback: impl FnOnce() + 'static) {
        if self.fired {
            callback();
        } else {
            self.subscribers.push(Box::new(callback));
        }
    }

    // Returns false if the signal had already fired
    pub fn fire(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;
        for callback in self.subscribers.drain(..) {
            callback();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::WorldReadySignal;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn fires_exactly_once() {
        let hits = Rc::new(Cell::new(0));
        let mut signal = WorldReadySignal::new();
        let h = hits.clone();
        signal.subscribe(move || h.set(h.get() + 1));

        assert!(signal.fire());
        assert!(!signal.fire());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn late_subscriber_runs_immediately() {
        let hit = Rc::new(Cell::new(false));
        let mut signal = WorldReadySignal::new();
        signal.fire();
        let h = hit.clone();
        signal.subscribe(move || h.set(true));
        assert!(hit.get());
    }
}
