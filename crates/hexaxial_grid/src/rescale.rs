//! Recomputes placed cell geometry after a side length change.
//!
//! A rescale is split into two steps. [`RescalePipeline::begin`] claims the pipeline and snapshots the
//! occupied slots, then [`RescaleTicket::run`] fans the snapshot out over a fixed set of workers. Each worker
//! writes only into its own chunk of the output, and the finished [`PlacementSlots`] are handed back by value
//! in [`RescaleOutput::commit_with`]. The pipeline stays claimed until that commit returns.

use hexaxial_data::{coord::AxialCoord, layout::HexLayout, math::Vec2};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::{
    GridError,
    cache::{PlacedCell, PlacementSlots},
    flight::{FlightGuard, SingleFlight},
};

/// A contiguous range of working set indices handled by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub worker: usize,
    pub start: usize,
    pub len: usize,
}

impl Partition {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Splits `n` items over at most `max_workers` workers.
///
/// Every worker gets `n / workers` items, and the last one also takes the `n % workers` left over.
pub fn partition(n: usize, max_workers: usize) -> Vec<Partition> {
    let workers = max_workers.min(n);
    if workers == 0 {
        return Vec::new();
    }

    let per_worker = n / workers;
    let remainder = n % workers;

    (0..workers)
        .map(|worker| Partition {
            worker,
            start: worker * per_worker,
            len: if worker < workers - 1 {
                per_worker
            } else {
                per_worker + remainder
            },
        })
        .collect()
}

/// The frozen inputs of a rescale, shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct RescaleJob {
    old: HexLayout,
    new: HexLayout,
    anchor_coord: AxialCoord,
    anchor_origin: Vec2,
    entries: Vec<(usize, PlacedCell)>,
    slot_count: usize,
    partitions: Vec<Partition>,
}

impl RescaleJob {
    pub fn new(slots: &PlacementSlots, old: HexLayout, new: HexLayout, max_workers: usize) -> Self {
        let entries = slots.populated().map(|(index, cell)| (index, *cell)).collect::<Vec<_>>();

        let anchor_origin = entries.first().map(|(_, cell)| cell.geometry.origin).unwrap_or(old.offset());
        let anchor_coord = old.from_pixel(anchor_origin);

        Self {
            old,
            new,
            anchor_coord,
            anchor_origin,
            partitions: partition(entries.len(), max_workers),
            entries,
            slot_count: slots.capacity(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn new_layout(&self) -> HexLayout {
        self.new
    }

    /// Where `cell` ends up under the new side length, measured from the anchor.
    pub fn rescale_cell(&self, cell: &PlacedCell) -> PlacedCell {
        let old_coord = self.old.from_pixel(cell.geometry.origin);
        let delta = old_coord - self.anchor_coord;

        let candidate = self.anchor_origin + self.new.at_origin().to_pixel(delta);
        let coord = self.new.from_pixel(candidate);
        let origin = self.new.to_pixel(coord);

        PlacedCell {
            pointer: cell.pointer,
            coord,
            geometry: cell.geometry.rebuilt(origin, self.new.side_length()),
        }
    }

    fn work(&self, partition: Partition, out: &mut [Option<(usize, PlacedCell)>]) {
        debug_assert_eq!(partition.len, out.len());

        for (i, out) in out.iter_mut().enumerate() {
            let (index, cell) = &self.entries[partition.start + i];

            if *index >= self.slot_count {
                log::error!(
                    "Worker {}: {}",
                    partition.worker,
                    GridError::IndexOutOfRange {
                        index: *index,
                        len: self.slot_count,
                    }
                );

                continue;
            }

            *out = Some((*index, self.rescale_cell(cell)));
        }
    }
}

/// Runs rescales on a fixed pool, one at a time.
#[derive(Debug)]
pub struct RescalePipeline {
    pool: ThreadPool,
    max_workers: usize,
    flight: SingleFlight,
}

impl RescalePipeline {
    pub fn new(max_workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let max_workers = max_workers.max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("rescale-worker-{i}"))
            .build()?;

        Ok(Self {
            pool,
            max_workers,
            flight: SingleFlight::new(),
        })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn is_in_flight(&self) -> bool {
        self.flight.is_in_flight()
    }

    /// Claims the pipeline and snapshots `slots`.
    ///
    /// Fails with [`GridError::RescaleInFlight`] if another ticket is still alive.
    pub fn begin(&self, slots: &PlacementSlots, old: HexLayout, new: HexLayout) -> Result<RescaleTicket, GridError> {
        let Some(guard) = self.flight.try_acquire() else {
            log::error!("Cannot rescale from {} to {}, a previous rescale has not finished.", old.side_length(), new.side_length());

            return Err(GridError::RescaleInFlight);
        };

        let job = RescaleJob::new(slots, old, new, self.max_workers);

        log::debug!(
            "Rescaling {} placed cells from {} to {} over {} workers",
            job.len(),
            old.side_length(),
            new.side_length(),
            job.partitions.len()
        );

        Ok(RescaleTicket {
            job,
            target: slots.clone(),
            guard,
        })
    }

    /// [`Self::begin`] and [`RescaleTicket::run`] in one go.
    pub fn rescale(&self, slots: &PlacementSlots, old: HexLayout, new: HexLayout) -> Result<RescaleOutput, GridError> {
        Ok(self.begin(slots, old, new)?.run(self))
    }
}

/// An accepted rescale that hasn't run yet. Holds the pipeline until its output is committed.
#[derive(Debug)]
pub struct RescaleTicket {
    job: RescaleJob,
    target: PlacementSlots,
    guard: FlightGuard,
}

impl RescaleTicket {
    pub fn job(&self) -> &RescaleJob {
        &self.job
    }

    /// Runs every partition on the pipeline's pool and waits for all of them.
    pub fn run(self, pipeline: &RescalePipeline) -> RescaleOutput {
        let RescaleTicket { job, mut target, guard } = self;

        let mut results = vec![None; job.len()];

        {
            let mut rest = results.as_mut_slice();
            let mut chunks = Vec::with_capacity(job.partitions.len());

            for partition in &job.partitions {
                let (chunk, tail) = rest.split_at_mut(partition.len);
                chunks.push((*partition, chunk));
                rest = tail;
            }

            let job = &job;
            pipeline.pool.scope(move |s| {
                for (partition, chunk) in chunks {
                    s.spawn(move |_| job.work(partition, chunk));
                }
            });
        }

        let mut written = 0;
        for (index, cell) in results.into_iter().flatten() {
            match target.set_slot(index, Some(cell)) {
                Ok(()) => written += 1,
                Err(err) => log::error!("{err}"),
            }
        }

        RescaleOutput {
            slots: target,
            layout: job.new,
            written,
            partitions: job.partitions,
            guard,
        }
    }
}

/// The result of a finished rescale, waiting to be swapped in.
#[derive(Debug)]
pub struct RescaleOutput {
    slots: PlacementSlots,
    layout: HexLayout,
    written: usize,
    partitions: Vec<Partition>,
    guard: FlightGuard,
}

impl RescaleOutput {
    pub fn slots(&self) -> &PlacementSlots {
        &self.slots
    }

    pub fn layout(&self) -> HexLayout {
        self.layout
    }

    /// How many cells were rewritten.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Hands the new slots to `swap`, releasing the pipeline once it returns.
    pub fn commit_with<R>(self, swap: impl FnOnce(PlacementSlots) -> R) -> R {
        let RescaleOutput { slots, guard, .. } = self;

        let r = swap(slots);
        drop(guard);

        r
    }

    /// Takes the new slots and releases the pipeline.
    pub fn into_slots(self) -> PlacementSlots {
        self.commit_with(|slots| slots)
    }
}
