//! State change notification
//!
//! Observers are registered on the [`GovernorContext`](super::GovernorContext)
//! before it is shared and are called synchronously, in registration order,
//! on the thread that performed the transition.

use std::sync::Arc;

use crate::process::{ProcessHandlingState, ProcessRecord};

pub trait StateObserver: Send + Sync {
    /// `record` already carries the new state
    fn state_changed(&self, record: &ProcessRecord, previous: ProcessHandlingState);
}

#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Arc<dyn StateObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn StateObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, record: &ProcessRecord, previous: ProcessHandlingState) {
        for observer in &self.observers {
            observer.state_changed(record, previous);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        tag: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StateObserver for Recorder {
        fn state_changed(&self, record: &ProcessRecord, previous: ProcessHandlingState) {
            self.seen.lock().unwrap().push(format!(
                "{}:{}:{}->{}",
                self.tag,
                record.pid(),
                previous,
                record.state()
            ));
        }
    }

    #[test]
    fn test_notifies_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        for tag in ["first", "second"] {
            list.register(Arc::new(Recorder {
                tag,
                seen: seen.clone(),
            }));
        }

        let mut record = ProcessRecord::new(4, "svc");
        record.set_state(ProcessHandlingState::Modified);
        list.notify(&record, ProcessHandlingState::Invalid);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:4:invalid->modified", "second:4:invalid->modified"]
        );
    }
}
