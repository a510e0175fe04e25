use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use hexaxial_data::{
    coord::{AxialCoord, RadialBounds},
    math::UInt,
};
use tokio::{runtime::Handle, sync::oneshot};

use crate::{GridError, flight::SingleFlight};

/// Every coordinate within `radius` rings of the zero cell, in ring order.
pub fn build_coords(radius: UInt) -> Vec<AxialCoord> {
    RadialBounds::new(AxialCoord::ZERO, radius).into_iter().collect()
}

/// The finished product of a [`GridBuilder`] job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridBuild {
    pub radius: UInt,
    pub coords: Vec<AxialCoord>,
}

/// Builds coordinate sets off the calling thread, one at a time.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    runtime: Handle,
    flight: SingleFlight,
}

impl GridBuilder {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            flight: SingleFlight::new(),
        }
    }

    pub fn is_building(&self) -> bool {
        self.flight.is_in_flight()
    }

    /// Starts building the grid of `radius`.
    pub fn spawn(&self, radius: UInt) -> Result<GridBuildHandle, GridError> {
        self.spawn_job(radius, build_coords)
    }

    /// Starts a build that produces its coordinates with `job`.
    pub fn spawn_job<F>(&self, radius: UInt, job: F) -> Result<GridBuildHandle, GridError>
    where
        F: FnOnce(UInt) -> Vec<AxialCoord> + Send + 'static,
    {
        let Some(guard) = self.flight.try_acquire() else {
            log::warn!("Cannot build a grid of radius {radius}, a previous build has not finished.");

            return Err(GridError::BuildInFlight);
        };

        let (tx, rx) = oneshot::channel();
        let built = Arc::new(AtomicBool::new(false));

        log::debug!("Building grid of radius {radius}...");

        self.runtime.spawn_blocking({
            let built = built.clone();

            move || {
                let coords = job(radius);

                built.store(true, Ordering::Release);
                drop(guard);

                if tx.send(coords).is_err() {
                    log::debug!("Grid of radius {radius} was built, but nobody is waiting for it");
                }
            }
        });

        Ok(GridBuildHandle { radius, built, rx })
    }
}

/// The caller's side of a running grid build.
#[derive(Debug)]
pub struct GridBuildHandle {
    radius: UInt,
    built: Arc<AtomicBool>,
    rx: oneshot::Receiver<Vec<AxialCoord>>,
}

impl GridBuildHandle {
    pub fn radius(&self) -> UInt {
        self.radius
    }

    /// Goes from false to true once, when the coordinates are ready.
    pub fn is_built(&self) -> bool {
        self.built.load(Ordering::Acquire)
    }

    /// Waits at most `timeout` for the build.
    ///
    /// Nothing is handed out on timeout, the caller keeps whatever it had before.
    pub async fn wait(self, timeout: Duration) -> Result<GridBuild, GridError> {
        let radius = self.radius;

        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(coords)) => Ok(GridBuild { radius, coords }),
            Ok(Err(_recv_err)) => Err(GridError::BuildAborted),
            Err(_) => Err(GridError::BuildTimedOut(timeout)),
        }
    }
}
