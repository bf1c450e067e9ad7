//! Small shared helpers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if another thread panicked while
/// holding it. The audio pull must keep running regardless.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Convert seconds to a frame position at `sample_rate`.
pub(crate) fn seconds_to_frames(seconds: f32, sample_rate: u32) -> i64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds as f64 * sample_rate as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn lock_recovers_from_poison() {
        let shared = Arc::new(Mutex::new(5));
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        assert!(shared.is_poisoned());
        assert_eq!(*lock(&shared), 5);
    }

    #[test]
    fn seconds_to_frames_rounds_and_clamps() {
        assert_eq!(seconds_to_frames(0.2, 44_100), 8_820);
        assert_eq!(seconds_to_frames(-1.0, 44_100), 0);
        assert_eq!(seconds_to_frames(f32::NAN, 44_100), 0);
    }
}
