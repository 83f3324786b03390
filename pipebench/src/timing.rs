// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Wall-clock timing of a single call.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    elapsed: Duration,
}

impl Measurement {
    #[must_use]
    pub fn new(elapsed: Duration) -> Self {
        Self { elapsed }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in seconds, from whole nanoseconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / 1e9
    }
}

/// The value returned by a measured call along with how long it took.
#[derive(Debug)]
pub struct Timed<T> {
    pub result: T,
    pub measurement: Measurement,
}

/// Run `f`, timing it with a monotonic clock.
///
/// Whatever `f` returns, including an error, is handed back with the
/// measurement.
pub fn measure<T>(f: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let result = f();
    let measurement = Measurement::new(start.elapsed());
    Timed {
        result,
        measurement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_is_fast() {
        let timed = measure(|| ());
        let seconds = timed.measurement.elapsed_seconds();
        assert!(seconds >= 0.0);
        assert!(seconds < 1.0);
    }

    #[test]
    fn sleep_is_measured() {
        let timed = measure(|| {
            std::thread::sleep(Duration::from_millis(20));
            7
        });
        assert_eq!(timed.result, 7);
        assert!(timed.measurement.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn errors_are_timed() {
        let timed = measure(|| -> Result<(), String> { Err("failed".to_string()) });
        assert!(timed.result.is_err());
        assert!(timed.measurement.elapsed_seconds() >= 0.0);
    }

    #[test]
    fn nanosecond_conversion() {
        let m = Measurement::new(Duration::from_nanos(1_500_000_000));
        assert_eq!(m.elapsed_seconds(), 1.5);
    }
}
