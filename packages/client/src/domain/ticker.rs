//! Local extrapolation of uptime counters between snapshot updates.

/// Baseline captured at the last snapshot update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Baseline {
    running_seconds: Option<u64>,
    total_running_seconds: Option<u64>,
    captured_at_millis: i64,
}

/// Uptime values projected for a moment in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeReading {
    pub running_seconds: Option<u64>,
    pub total_running_seconds: Option<u64>,
}

/// At most one active ticker; `restart` always cancels the previous one.
///
/// Each restart or stop bumps `generation`, so a driver holding an interval
/// for an older generation knows to replace it.
#[derive(Debug, Default)]
pub struct UptimeTicker {
    baseline: Option<Baseline>,
    generation: u64,
}

impl UptimeTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any running ticker and start a new one from these baselines
    pub fn restart(
        &mut self,
        running_seconds: Option<u64>,
        total_running_seconds: Option<u64>,
        now_millis: i64,
    ) {
        self.generation += 1;
        self.baseline = Some(Baseline {
            running_seconds,
            total_running_seconds,
            captured_at_millis: now_millis,
        });
    }

    pub fn stop(&mut self) {
        if self.baseline.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn is_active(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `baseline + floor(elapsed / 1000)`, or `None` while stopped.
    ///
    /// A clock that moved backwards counts as zero elapsed time.
    pub fn reading(&self, now_millis: i64) -> Option<UptimeReading> {
        let baseline = self.baseline?;
        let elapsed_millis = now_millis.saturating_sub(baseline.captured_at_millis);
        let elapsed_seconds = (elapsed_millis / 1000).max(0) as u64;
        Some(UptimeReading {
            running_seconds: baseline
                .running_seconds
                .map(|s| s.saturating_add(elapsed_seconds)),
            total_running_seconds: baseline
                .total_running_seconds
                .map(|s| s.saturating_add(elapsed_seconds)),
        })
    }
}
