//! Parallel frame pass.
//!
//! A fixed rayon pool runs one task per worker. Workers claim frames from a
//! single atomic counter and push chains into a buffer they own; the buffers
//! come back through `broadcast`, which is also the join barrier. Chain ids
//! are assigned after concatenation.

use crate::error::SchedulerError;
use crate::matching::{match_frame, MatchParams};
use crate::types::{Localization, LocalizationSet, OrderChain};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

pub struct FrameScheduler {
    pool: ThreadPool,
}

impl FrameScheduler {
    /// Pool of `threads` workers; 0 uses every available CPU.
    pub fn new(threads: usize) -> Result<Self, SchedulerError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("order-matcher-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Matches every frame of `set` and returns all chains with ids `0..n`.
    pub fn run(&self, set: &LocalizationSet, params: &MatchParams) -> Vec<OrderChain> {
        let t0 = Instant::now();
        let frames = set.group_by_frame();
        let next = AtomicUsize::new(0);

        let buffers: Vec<Vec<OrderChain>> = self.pool.broadcast(|_| {
            let mut own = Vec::new();
            loop {
                let slot = next.fetch_add(1, Ordering::Relaxed);
                let Some((frame, indices)) = frames.get(slot) else {
                    break;
                };
                let points: Vec<(usize, &Localization)> = indices
                    .iter()
                    .filter_map(|&i| set.get(i).map(|loc| (i, loc)))
                    .collect();
                own.extend(match_frame(*frame, &points, params));
            }
            own
        });

        let mut chains: Vec<OrderChain> = buffers.into_iter().flatten().collect();
        for (id, chain) in chains.iter_mut().enumerate() {
            chain.id = id;
        }
        debug!(
            "scheduler: frames={} workers={} chains={} elapsed_ms={:.1}",
            frames.len(),
            self.threads(),
            chains.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        chains
    }
}
