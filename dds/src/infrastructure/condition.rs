use std::{sync::Arc, time::Duration};

use crate::implementation::utils::shared_object::{DdsCondvar, DdsMutex};

use super::error::{DdsError, DdsResult};

/// Trigger of an entity which is consumed by a blocking wait mechanism such as a wait set.
///
/// The trigger becomes ready every time a status enabled on the entity changes, whether or
/// not a listener consumed the change. Successive changes coalesce into a single ready
/// state which stays set until the waiting side calls [`WaitTrigger::reset`].
#[derive(Clone, Default)]
pub struct WaitTrigger(Arc<TriggerState>);

#[derive(Default)]
struct TriggerState {
    ready: DdsMutex<bool>,
    cvar: DdsCondvar,
}

impl WaitTrigger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        *self.0.ready.lock()
    }

    /// Clears the ready state, returning whether it was set.
    pub fn reset(&self) -> bool {
        core::mem::replace(&mut *self.0.ready.lock(), false)
    }

    pub(crate) fn set_ready(&self) {
        let mut ready = self.0.ready.lock();
        *ready = true;
        self.0.cvar.notify_all()
    }

    /// Blocks the calling thread until the trigger is ready or the `timeout` expires.
    /// The ready state is not cleared.
    pub fn wait(&self, timeout: Duration) -> DdsResult<()> {
        let ready = self.0.ready.lock();
        let ready = self
            .0
            .cvar
            .wait_timeout_while(ready, timeout, |ready| !*ready);
        if *ready {
            Ok(())
        } else {
            Err(DdsError::Timeout)
        }
    }

    pub fn ptr_eq(&self, other: &WaitTrigger) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl core::fmt::Debug for WaitTrigger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WaitTrigger")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_times_out_when_not_ready() {
        let trigger = WaitTrigger::new();
        assert_eq!(
            trigger.wait(Duration::from_millis(10)),
            Err(DdsError::Timeout)
        );
    }

    #[test]
    fn signals_coalesce_into_one_ready_state() {
        let trigger = WaitTrigger::new();
        trigger.set_ready();
        trigger.set_ready();
        assert!(trigger.is_ready());
        assert!(trigger.reset());
        assert!(!trigger.is_ready());
        assert!(!trigger.reset());
    }

    #[test]
    fn wait_is_woken_from_another_thread() {
        let trigger = WaitTrigger::new();
        let remote_trigger = trigger.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote_trigger.set_ready();
        });
        assert_eq!(trigger.wait(Duration::from_secs(10)), Ok(()));
        handle.join().unwrap();
    }
}
