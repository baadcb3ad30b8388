//! Hands rendered blocks from a producer thread to the audio device.
//!
//! The render thread owns the [`Engine`] and keeps a small ring of
//! pre-rendered PCM blocks topped up. The device callback only copies ready
//! blocks out through a [`BlockReader`]; it never renders and never waits.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{info, warn};
use parking_lot::Mutex;

use crate::{
    engine::Engine,
    error::{Result, SynthError},
    synth::channel::ChannelMeters,
};

/// Producer back-off while the ring is full.
const FULL_BACKOFF: Duration = Duration::from_millis(1);
const STOP_POLL: Duration = Duration::from_millis(100);
const STOP_POLLS: u32 = 20;

struct RingSlots {
    slots: Vec<Vec<i16>>,
    write: usize,
    read: usize,
    count: usize,
}

/// Fixed ring of interleaved PCM blocks shared by one producer and one consumer.
pub struct BlockRing {
    state: Mutex<RingSlots>,
    block_samples: usize,
    underruns: AtomicU64,
}

impl BlockRing {
    pub fn new(depth: usize, block_samples: usize) -> Self {
        Self {
            state: Mutex::new(RingSlots {
                slots: vec![vec![0; block_samples]; depth],
                write: 0,
                read: 0,
                count: 0,
            }),
            block_samples,
            underruns: AtomicU64::new(0),
        }
    }

    pub fn depth(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Interleaved samples per block.
    pub fn block_samples(&self) -> usize {
        self.block_samples
    }

    /// Blocks rendered and not yet read.
    pub fn ready(&self) -> usize {
        self.state.lock().count
    }

    pub fn is_full(&self) -> bool {
        let state = self.state.lock();
        state.count == state.slots.len()
    }

    /// Copy `block` into the next free slot. Returns `false` if the ring is full.
    pub fn try_push(&self, block: &[i16]) -> bool {
        let mut state = self.state.lock();
        let depth = state.slots.len();
        if state.count == depth {
            return false;
        }
        let write = state.write;
        let slot = &mut state.slots[write];
        let len = block.len().min(slot.len());
        slot[..len].copy_from_slice(&block[..len]);
        slot[len..].fill(0);

        state.write = (write + 1) % depth;
        state.count += 1;
        true
    }

    /// Copy the oldest ready block into `out`. With nothing ready `out` is
    /// filled with silence and the underrun counter goes up.
    pub fn pop_into(&self, out: &mut [i16]) -> bool {
        let mut state = self.state.lock();
        if state.count == 0 {
            drop(state);
            out.fill(0);
            self.underruns.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        let depth = state.slots.len();
        let read = state.read;
        let slot = &state.slots[read];
        let len = out.len().min(slot.len());
        out[..len].copy_from_slice(&slot[..len]);
        out[len..].fill(0);

        state.read = (read + 1) % depth;
        state.count -= 1;
        true
    }

    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

/// A running render thread.
pub struct Pipeline {
    ring: Arc<BlockRing>,
    stop: Arc<AtomicBool>,
    meters: Arc<Mutex<Vec<ChannelMeters>>>,
    handle: Option<JoinHandle<Engine>>,
}

impl Pipeline {
    /// Move `engine` onto a render thread and return the device-side reader.
    pub fn start(engine: Engine) -> Result<(Self, BlockReader)> {
        let config = engine.config();
        let ring = Arc::new(BlockRing::new(config.ring_depth, config.block_len * 2));
        let stop = Arc::new(AtomicBool::new(false));
        let meters = Arc::new(Mutex::new(Vec::with_capacity(config.channel_count())));
        info!(
            "starting render thread: {} Hz, {} frames x {} blocks",
            config.sample_rate, config.block_len, config.ring_depth
        );

        let handle = thread::Builder::new()
            .name("polytone-render".into())
            .spawn({
                let ring = Arc::clone(&ring);
                let stop = Arc::clone(&stop);
                let meters = Arc::clone(&meters);
                move || render_loop(engine, &ring, &stop, &meters)
            })
            .map_err(SynthError::ThreadSpawn)?;

        let reader = BlockReader::new(Arc::clone(&ring));
        Ok((
            Self {
                ring,
                stop,
                meters,
                handle: Some(handle),
            },
            reader,
        ))
    }

    /// Signal the render thread, wait up to two seconds for it to finish
    /// and hand the engine back.
    pub fn stop(mut self) -> Result<Engine> {
        self.stop.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return Err(SynthError::RenderThreadPanicked);
        };

        let mut polls = 0;
        while !handle.is_finished() && polls < STOP_POLLS {
            thread::sleep(STOP_POLL);
            polls += 1;
        }
        if !handle.is_finished() {
            let waited_ms = (STOP_POLL * STOP_POLLS).as_millis() as u64;
            warn!("render thread did not stop within {waited_ms} ms");
            return Err(SynthError::StopTimeout { waited_ms });
        }

        let engine = handle.join().map_err(|_| SynthError::RenderThreadPanicked)?;
        info!("render thread stopped, {} underruns", self.ring.underruns());
        Ok(engine)
    }

    pub fn ring(&self) -> &Arc<BlockRing> {
        &self.ring
    }

    pub fn underruns(&self) -> u64 {
        self.ring.underruns()
    }

    /// Channel levels as of the last rendered block.
    pub fn meters(&self) -> Vec<ChannelMeters> {
        self.meters.lock().clone()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn render_loop(
    mut engine: Engine,
    ring: &BlockRing,
    stop: &AtomicBool,
    meters: &Mutex<Vec<ChannelMeters>>,
) -> Engine {
    let mut block = vec![0i16; ring.block_samples()];

    while !stop.load(Ordering::Acquire) {
        if ring.is_full() {
            thread::sleep(FULL_BACKOFF);
            continue;
        }
        engine.render_block(&mut block);
        // only this thread pushes, so a slot is still free
        ring.try_push(&block);

        if let Some(mut snapshot) = meters.try_lock() {
            snapshot.clear();
            snapshot.extend(engine.channel_meters());
        }
    }
    engine
}

/// Device-side view of the ring. Serves callbacks of any size from
/// fixed-size blocks.
pub struct BlockReader {
    ring: Arc<BlockRing>,
    block: Vec<i16>,
    pos: usize,
}

impl BlockReader {
    pub fn new(ring: Arc<BlockRing>) -> Self {
        let len = ring.block_samples();
        Self {
            ring,
            block: vec![0; len],
            // start empty so the first read pulls a block
            pos: len,
        }
    }

    fn refill(&mut self) {
        self.ring.pop_into(&mut self.block);
        self.pos = 0;
    }

    /// Next stereo frame.
    #[inline]
    pub fn next_frame(&mut self) -> (i16, i16) {
        if self.pos + 1 >= self.block.len() {
            self.refill();
        }
        let frame = (self.block[self.pos], self.block[self.pos + 1]);
        self.pos += 2;
        frame
    }

    /// Fill an interleaved stereo buffer.
    pub fn fill_interleaved(&mut self, out: &mut [i16]) {
        let mut written = 0;
        while written < out.len() {
            if self.pos >= self.block.len() {
                self.refill();
            }
            let n = (self.block.len() - self.pos).min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.block[self.pos..self.pos + n]);
            self.pos += n;
            written += n;
        }
    }

    pub fn underruns(&self) -> u64 {
        self.ring.underruns()
    }
}
