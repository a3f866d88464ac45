use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Mutex whose guards are handed out even if a previous holder panicked.
///
/// Listener callbacks are run under `catch_unwind`, so a poisoned lock can only come
/// from a bug inside this crate. The protected data is still consistent in that case
/// because every critical section is a plain field update.
#[derive(Default, Debug)]
pub struct DdsMutex<T>(Mutex<T>);

impl<T> DdsMutex<T> {
    pub fn new(t: T) -> Self {
        Self(Mutex::new(t))
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Condition variable paired with a [`DdsMutex`].
#[derive(Default, Debug)]
pub struct DdsCondvar(Condvar);

impl DdsCondvar {
    pub fn new() -> Self {
        Self(Condvar::new())
    }

    pub fn wait_while<'a, T, F>(&self, guard: MutexGuard<'a, T>, condition: F) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        self.0
            .wait_while(guard, condition)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Same as [`DdsCondvar::wait_while`] but gives up after `timeout`. The caller checks
    /// the condition on the returned guard to know whether it timed out.
    pub fn wait_timeout_while<'a, T, F>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: Duration,
        condition: F,
    ) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        match self.0.wait_timeout_while(guard, timeout, condition) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    pub fn notify_all(&self) {
        self.0.notify_all()
    }
}
