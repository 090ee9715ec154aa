//! Scroll strip of paginated axis charts.
//!
//! The strip runs along the category axis. A quantize scale over the track maps the handle to a
//! bucket in `0..=len`, and the bucket to the first record of the visible window. On a mirrored
//! track (the category axis is inverted) the handle is tracked by its far edge and the window
//! index mirrors: `len - (bucket(track - position) + window)`.

use crate::scale::QuantizeScale;
use cm_graphs_core::geom::Rect;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollCoordinator {
    len: usize,
    window: usize,
    track: f64,
    mirrored: bool,
    position: f64,
    index: usize,
    buckets: QuantizeScale<usize>,
}

impl ScrollCoordinator {
    /// `None` when the data fits in one window.
    pub fn new(len: usize, window: usize, track: f64, mirrored: bool) -> Option<Self> {
        if window == 0 || len <= window || !(track > 0.0) {
            return None;
        }
        let buckets = QuantizeScale::new([0.0, track], (0..=len).collect());
        let mut scroll = Self {
            len,
            window,
            track,
            mirrored,
            position: 0.0,
            index: 0,
            buckets,
        };
        scroll.position = if mirrored { scroll.handle_length() } else { 0.0 };
        scroll.index = scroll.index_at(scroll.position);
        Some(scroll)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn track_length(&self) -> f64 {
        self.track
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn handle_length(&self) -> f64 {
        self.track * self.window as f64 / self.len as f64
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn visible_range(&self) -> Range<usize> {
        self.index..(self.index + self.window).min(self.len)
    }

    /// Handle rectangle along the track: `x` is the offset, `width` the length.
    pub fn handle(&self) -> Rect {
        let start = if self.mirrored {
            self.position - self.handle_length()
        } else {
            self.position
        };
        Rect::new(start, 0.0, self.handle_length(), 0.0)
    }

    /// First record shown for a handle at `position`.
    pub fn index_at(&self, position: f64) -> usize {
        let max_start = self.len - self.window;
        if self.mirrored {
            let bucket = self.buckets.apply(self.track - position).unwrap_or(0);
            self.len
                .saturating_sub(bucket + self.window)
                .min(max_start)
        } else {
            self.buckets.apply(position).unwrap_or(0).min(max_start)
        }
    }

    /// Moves the handle by `delta` pixels.
    ///
    /// Returns the new window start when it changed. A move that would push the handle past
    /// either end of the track is ignored.
    pub fn drag(&mut self, delta: f64) -> Option<usize> {
        let next = (self.position + delta).floor();
        let (low, high) = if self.mirrored {
            (next - self.handle_length(), next)
        } else {
            (next, next + self.handle_length())
        };
        if low < 0.0 || high > self.track {
            tracing::trace!(position = next, "scroll drag outside the track");
            return None;
        }
        self.position = next;
        let index = self.index_at(next);
        if index == self.index {
            return None;
        }
        self.index = index;
        tracing::debug!(index, "scroll window moved");
        Some(index)
    }

    /// Moves the handle to an absolute position, with the same bounds as [`Self::drag`].
    pub fn drag_to(&mut self, position: f64) -> Option<usize> {
        self.drag(position - self.position)
    }

    pub fn snapshot(&self) -> ScrollState {
        ScrollState {
            len: self.len,
            window: self.window,
            index: self.index,
            track_length: self.track,
            handle_offset: self.handle().x,
            handle_length: self.handle_length(),
            mirrored: self.mirrored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub len: usize,
    pub window: usize,
    pub index: usize,
    pub track_length: f64,
    pub handle_offset: f64,
    pub handle_length: f64,
    pub mirrored: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_paging_when_data_fits() {
        assert!(ScrollCoordinator::new(5, 5, 100.0, false).is_none());
        assert!(ScrollCoordinator::new(5, 10, 100.0, false).is_none());
    }

    #[test]
    fn both_tracks_start_on_the_first_window() {
        let plain = ScrollCoordinator::new(20, 5, 210.0, false).unwrap();
        let mirrored = ScrollCoordinator::new(20, 5, 210.0, true).unwrap();
        assert_eq!(plain.index(), 0);
        assert_eq!(mirrored.index(), 0);
        assert_eq!(mirrored.handle().x, 0.0);
    }
}
