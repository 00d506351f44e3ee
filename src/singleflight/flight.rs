use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::watch;

/// Completed outcome of one flight. Errors are shared between all coalesced
/// callers, so they travel behind an `Arc`.
type Outcome<T> = Result<T, Arc<anyhow::Error>>;

type OutcomeReceiver<T> = watch::Receiver<Option<Outcome<T>>>;

enum Role<T> {
    /// This caller runs the work and publishes the outcome.
    Originator(watch::Sender<Option<Outcome<T>>>),
    /// This caller waits for the originator's outcome.
    Waiter(OutcomeReceiver<T>),
}

/// Coalesces concurrent calls by key.
///
/// While a call for a key is in flight, every further [`FlightGroup::execute`]
/// for the same key blocks until the first one completes and then returns the
/// same result. The work closure is invoked at most once per flight.
pub struct FlightGroup<T> {
    calls: Mutex<HashMap<String, OutcomeReceiver<T>>>,
}

impl<T: Clone> FlightGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key`, unless a flight for `key` is already in
    /// progress, in which case the in-flight outcome is awaited and returned.
    ///
    /// All callers of one flight observe the same value or an error carrying
    /// the same message. The lock around the flight map is never held while
    /// the work runs.
    pub async fn execute<F, Fut>(&self, key: &str, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let role = self.join_flight(key);

        match role {
            Role::Waiter(mut receiver) => loop {
                let published = receiver.borrow().as_ref().cloned();
                if let Some(outcome) = published {
                    return resolve(outcome);
                }
                if receiver.changed().await.is_err() {
                    anyhow::bail!("in-flight load for {key} was dropped before completing");
                }
            },
            Role::Originator(sender) => {
                let outcome: Outcome<T> = work().await.map_err(Arc::new);

                // Remove the record first so late arrivals start a new
                // flight, then release everyone waiting on this one.
                self.calls
                    .lock()
                    .expect("flight lock poisoned")
                    .remove(key);
                let _ = sender.send(Some(outcome.clone()));

                resolve(outcome)
            }
        }
    }

    /// Subscribes to the flight for `key`, creating it if absent.
    ///
    /// A leftover record whose originator was dropped mid-flight (its sender
    /// is gone without a published outcome) is replaced by a fresh flight.
    fn join_flight(&self, key: &str) -> Role<T> {
        let mut calls = self.calls.lock().expect("flight lock poisoned");

        if let Some(receiver) = calls.get(key) {
            let abandoned = receiver.has_changed().is_err() && receiver.borrow().is_none();
            if !abandoned {
                return Role::Waiter(receiver.clone());
            }
            calls.remove(key);
        }

        let (sender, receiver) = watch::channel(None);
        calls.insert(key.to_owned(), receiver);
        Role::Originator(sender)
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands the shared outcome to one caller. Errors surface with the original
/// message so every coalesced caller sees identical failure text.
fn resolve<T>(outcome: Outcome<T>) -> Result<T> {
    outcome.map_err(|error| anyhow::anyhow!("{error:#}"))
}
