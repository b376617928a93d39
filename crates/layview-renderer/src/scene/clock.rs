/// Callback run on every frame with the elapsed seconds since the last one.
pub type TickCallback = Box<dyn FnMut(f64)>;

/// Per-frame clock. Callbacks run in registration order.
#[derive(Default)]
pub struct FrameClock {
    callbacks: Vec<TickCallback>,
    elapsed: f64,
    frames: u64,
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("callbacks", &self.callbacks.len())
            .field("elapsed", &self.elapsed)
            .field("frames", &self.frames)
            .finish()
    }
}

impl FrameClock {
    pub fn register(&mut self, callback: TickCallback) {
        self.callbacks.push(callback);
    }

    pub fn tick(&mut self, dt: f64) {
        self.elapsed += dt;
        self.frames += 1;
        for callback in &mut self.callbacks {
            callback(dt);
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
