use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A flag that lets at most one job of a kind run at a time.
///
/// Acquiring never queues. A second caller is turned away until the [`FlightGuard`] of the first one is dropped.
#[derive(Debug, Default, Clone)]
pub struct SingleFlight {
    flag: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { flag: self.flag.clone() })
    }

    pub fn is_in_flight(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Clears its [`SingleFlight`] when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let flight = SingleFlight::new();

        let guard = flight.try_acquire().unwrap();
        assert!(flight.is_in_flight());
        assert!(flight.try_acquire().is_none());
        assert!(flight.clone().try_acquire().is_none());

        drop(guard);
        assert!(!flight.is_in_flight());
        assert!(flight.try_acquire().is_some());
        assert!(!flight.is_in_flight());
    }
}
