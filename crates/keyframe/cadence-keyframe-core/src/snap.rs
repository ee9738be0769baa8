//! Time snapping collaborators for editing operations.

use serde::{Deserialize, Serialize};

/// Maps an edited time onto an external grid.
pub trait TimeSnap {
    fn snap(&self, time: f32) -> f32;
}

/// Identity snapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnap;

impl TimeSnap for NoSnap {
    #[inline]
    fn snap(&self, time: f32) -> f32 {
        time
    }
}

/// Musical grid: `divisions` steps per beat at `bpm`, shifted by `offset` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatGrid {
    pub bpm: f32,
    pub offset: f32,
    pub divisions: u32,
}

impl BeatGrid {
    pub fn new(bpm: f32, divisions: u32) -> Self {
        Self {
            bpm,
            offset: 0.0,
            divisions,
        }
    }

    /// Grid spacing in seconds, or `None` for a degenerate grid.
    pub fn step(&self) -> Option<f32> {
        if !(self.bpm > 0.0) || self.divisions == 0 {
            return None;
        }
        Some(60.0 / self.bpm / self.divisions as f32)
    }
}

impl TimeSnap for BeatGrid {
    fn snap(&self, time: f32) -> f32 {
        match self.step() {
            Some(step) => ((time - self.offset) / step).round() * step + self.offset,
            None => time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_nearest_subdivision() {
        let grid = BeatGrid::new(120.0, 4); // 0.125 s steps
        assert_eq!(grid.snap(0.3), 0.25);
        assert_eq!(grid.snap(0.32), 0.375);
        assert_eq!(grid.snap(1.0), 1.0);
    }

    #[test]
    fn offset_shifts_the_grid() {
        let grid = BeatGrid {
            bpm: 60.0,
            offset: 0.1,
            divisions: 1,
        };
        assert!((grid.snap(1.0) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn degenerate_grid_passes_time_through() {
        assert_eq!(BeatGrid::new(0.0, 4).snap(0.33), 0.33);
        assert_eq!(BeatGrid::new(120.0, 0).snap(0.33), 0.33);
        assert_eq!(NoSnap.snap(0.33), 0.33);
    }
}
