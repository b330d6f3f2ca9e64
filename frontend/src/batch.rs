//! Chunked marker insertion.
//!
//! A full render is split into chunks of [`CHUNK_SIZE`] devices. The caller
//! runs one chunk, yields to the browser for [`CHUNK_DELAY`] and then asks for
//! the next one, so large device lists never block the UI thread for long.

use std::{rc::Rc, time::Duration};

use common::req::Device;

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Destination of rendered markers, e.g. a map layer.
pub trait MarkerSink {
    fn clear(&mut self);
    fn add(&mut self, dev: &Device);

    /// Called after each chunk.
    fn flush(&mut self) {}
}

/// One full pass over a device list.
#[derive(Debug)]
pub struct RenderPass {
    devices: Rc<[Device]>,
    next: usize,
    chunk_size: usize,
    started: bool,
}

impl RenderPass {
    pub fn new(devices: Rc<[Device]>, chunk_size: usize) -> Self {
        Self {
            devices,
            next: 0,
            chunk_size: chunk_size.max(1),
            started: false,
        }
    }

    /// Adds the next chunk to `sink`, clearing it first on the initial call.
    /// Returns `true` while devices remain.
    pub fn step(&mut self, sink: &mut impl MarkerSink) -> bool {
        if !self.started {
            sink.clear();
            self.started = true;
        }

        let end = (self.next + self.chunk_size).min(self.devices.len());
        for dev in &self.devices[self.next..end] {
            sink.add(dev);
        }
        self.next = end;
        sink.flush();

        !self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.started && self.next >= self.devices.len()
    }
}

/// Owns the current pass. Starting a new pass supersedes the old one, whose
/// pending chunks are then ignored.
#[derive(Debug, Default)]
pub struct Renderer {
    generation: u64,
    pass: Option<RenderPass>,
}

impl Renderer {
    /// Starts a full re-render of `devices` and returns the generation to pass
    /// to [`Renderer::run_chunk`].
    pub fn render_all(&mut self, devices: Rc<[Device]>) -> u64 {
        self.render_all_chunked(devices, CHUNK_SIZE)
    }

    pub fn render_all_chunked(&mut self, devices: Rc<[Device]>, chunk_size: usize) -> u64 {
        self.generation += 1;
        self.pass = Some(RenderPass::new(devices, chunk_size));
        self.generation
    }

    /// Runs one chunk of pass `generation`. Returns `true` if another chunk
    /// should be scheduled.
    pub fn run_chunk(&mut self, generation: u64, sink: &mut impl MarkerSink) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some(pass) = self.pass.as_mut() else {
            return false;
        };

        let more = pass.step(sink);
        if !more {
            self.pass = None;
        }
        more
    }

    /// `true` while a pass still has chunks to run.
    pub fn is_rendering(&self) -> bool {
        self.pass.is_some()
    }

    /// Adds a single marker without touching the others.
    pub fn render_one(&mut self, dev: &Device, sink: &mut impl MarkerSink) {
        sink.add(dev);
        sink.flush();
    }
}
