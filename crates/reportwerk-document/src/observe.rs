// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Phase observation — timing hooks invoked at named boundaries of a
// generation call.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

/// Named stages of report generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ImageLayout,
    HeaderLayout,
    ColumnSizing,
    CellWrapping,
    Render,
    Serialize,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageLayout => "image-layout",
            Self::HeaderLayout => "header-layout",
            Self::ColumnSizing => "column-sizing",
            Self::CellWrapping => "cell-wrapping",
            Self::Render => "render",
            Self::Serialize => "serialize",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives phase boundaries. Implementations must be cheap; they run inline.
pub trait PhaseObserver: Send + Sync {
    fn phase_started(&self, _phase: Phase) {}

    fn phase_finished(&self, phase: Phase, elapsed: Duration);
}

/// Emits one `tracing` debug event per finished phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PhaseObserver for TracingObserver {
    fn phase_finished(&self, phase: Phase, elapsed: Duration) {
        debug!(
            phase = phase.as_str(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "phase finished"
        );
    }
}

/// Ignores every phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {
    fn phase_finished(&self, _phase: Phase, _elapsed: Duration) {}
}

/// Run `work` between `phase_started` and `phase_finished`.
///
/// `phase_finished` is reported only when `work` succeeds.
pub fn observe<T, E>(
    observer: &dyn PhaseObserver,
    phase: Phase,
    work: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    observer.phase_started(phase);
    let started = Instant::now();
    let value = work()?;
    observer.phase_finished(phase, started.elapsed());
    Ok(value)
}
