/// A linear change from `from` to `to` starting at `start` (seconds on the
/// backend clock) and lasting `duration` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    pub from: f32,
    pub to: f32,
    pub start: f64,
    pub duration: f64,
}

impl Ramp {
    pub fn new(from: f32, to: f32, start: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start,
            duration: duration.max(0.0),
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn value_at(&self, t: f64) -> f32 {
        if t <= self.start {
            return self.from;
        }
        if t >= self.end() || self.duration == 0.0 {
            return self.to;
        }
        let k = ((t - self.start) / self.duration) as f32;
        self.from + (self.to - self.from) * k
    }
}

/// Parameter automation: an intrinsic value plus ramps ordered by start time.
#[derive(Clone, Debug, Default)]
pub struct Automation {
    base: f32,
    ramps: Vec<Ramp>,
}

impl Automation {
    pub fn new(value: f32) -> Self {
        Self {
            base: value,
            ramps: Vec::new(),
        }
    }

    pub fn value_at(&self, t: f64) -> f32 {
        match self.ramps.iter().rev().find(|r| r.start <= t) {
            Some(r) => r.value_at(t),
            None => self.base,
        }
    }

    /// Freeze at the value reached at `t` and forget every ramp.
    ///
    /// Only valid for a monotonic clock, which is all the renderer queries.
    pub fn cancel_from(&mut self, t: f64) {
        self.base = self.value_at(t);
        self.ramps.clear();
    }

    /// Add a ramp; ramps starting at or after it are superseded.
    pub fn push(&mut self, ramp: Ramp) {
        self.ramps.retain(|r| r.start < ramp.start);
        self.ramps.push(ramp);
    }

    pub fn ramps(&self) -> &[Ramp] {
        &self.ramps
    }
}
