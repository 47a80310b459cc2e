//! Fixed-capacity audio history with an O(1) running average.

use crate::audio::AudioBands;

/// Maximum number of audio frames a particle remembers
pub const HISTORY_CAPACITY: usize = 10;

/// Ring buffer of the most recent audio frames
#[derive(Debug, Clone)]
pub struct AudioHistory {
    slots: [AudioBands; HISTORY_CAPACITY],
    head: usize,
    len: usize,
    sum: AudioBands,
}

impl Default for AudioHistory {
    fn default() -> Self {
        Self {
            slots: [AudioBands::ZERO; HISTORY_CAPACITY],
            head: 0,
            len: 0,
            sum: AudioBands::ZERO,
        }
    }
}

impl AudioHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a frame, evicting the oldest once full
    pub fn push(&mut self, bands: AudioBands) {
        if self.len == HISTORY_CAPACITY {
            self.sum -= self.slots[self.head];
        } else {
            self.len += 1;
        }
        self.slots[self.head] = bands;
        self.sum += bands;
        self.head = (self.head + 1) % HISTORY_CAPACITY;

        // Re-sum once per lap so float drift in the running total stays bounded
        if self.head == 0 {
            self.sum = self.slots[..self.len]
                .iter()
                .fold(AudioBands::ZERO, |acc, &b| acc + b);
        }
    }

    /// Mean over the frames actually held (not a fixed 10)
    pub fn average(&self) -> AudioBands {
        if self.len == 0 {
            return AudioBands::ZERO;
        }
        (self.sum * (1.0 / self.len as f32)).sanitized()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Frames from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &AudioBands> {
        let start = (self.head + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).map(move |i| &self.slots[(start + i) % HISTORY_CAPACITY])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrinking_window_average() {
        let mut history = AudioHistory::new();
        history.push(AudioBands::new(1.0, 0.0, 0.0));
        assert!((history.average().low - 1.0).abs() < 1e-6);

        history.push(AudioBands::new(3.0, 0.0, 0.0));
        assert_eq!(history.len(), 2);
        assert!((history.average().low - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut history = AudioHistory::new();
        for i in 0..35 {
            history.push(AudioBands::new(i as f32, 0.0, 0.0));
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);

        // Holds 25..=34
        let expected = (25..35).sum::<i32>() as f32 / 10.0;
        assert!((history.average().low - expected).abs() < 1e-4);

        let order: Vec<f32> = history.iter().map(|b| b.low).collect();
        assert_eq!(order.first(), Some(&25.0));
        assert_eq!(order.last(), Some(&34.0));
    }

    #[test]
    fn test_empty_average_is_zero() {
        let mut history = AudioHistory::new();
        assert_eq!(history.average(), AudioBands::ZERO);
        history.push(AudioBands::new(1.0, 1.0, 1.0));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.average(), AudioBands::ZERO);
    }
}
