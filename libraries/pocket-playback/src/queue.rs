//! Playback queue with a separate play order
//!
//! The queue keeps tracks in the order they were handed over. Shuffle never
//! reorders them; it replaces the play order, a permutation of queue indices:
//!
//! ```text
//! tracks:     [A, B, C, D]      (fixed once set)
//! play order: [1, 3, 0, 2]      (B, D, A, C)
//! ```

use pocket_core::{Track, TrackId};

/// Ordered tracks plus the traversal order over them
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Tracks in their original order
    tracks: Vec<Track>,

    /// Queue indices in traversal order
    play_order: Vec<usize>,
}

impl Queue {
    /// Create a queue with the identity play order
    pub fn new(tracks: Vec<Track>) -> Self {
        let play_order = (0..tracks.len()).collect();
        Self { tracks, play_order }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in their original order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Current play order
    pub fn play_order(&self) -> &[usize] {
        &self.play_order
    }

    /// Queue index at a play-order position
    pub fn queue_index_at(&self, position: usize) -> Option<usize> {
        self.play_order.get(position).copied()
    }

    /// Track at a play-order position
    pub fn track_at(&self, position: usize) -> Option<&Track> {
        self.queue_index_at(position)
            .and_then(|index| self.tracks.get(index))
    }

    /// Play-order position of a queue index
    pub fn position_of(&self, queue_index: usize) -> Option<usize> {
        self.play_order.iter().position(|&index| index == queue_index)
    }

    /// Play-order position of the track with the given id
    pub fn position_of_id(&self, id: &TrackId) -> Option<usize> {
        self.tracks
            .iter()
            .position(|track| &track.id == id)
            .and_then(|index| self.position_of(index))
    }

    /// Replace the play order
    ///
    /// The new order must be a permutation of `0..len()`.
    pub(crate) fn set_play_order(&mut self, order: Vec<usize>) {
        debug_assert!(is_permutation(&order, self.tracks.len()));
        self.play_order = order;
    }

    /// Restore the identity play order
    pub(crate) fn reset_play_order(&mut self) {
        self.play_order = (0..self.tracks.len()).collect();
    }

    /// Whether the play order is the identity
    pub fn is_linear(&self) -> bool {
        self.play_order
            .iter()
            .enumerate()
            .all(|(position, &index)| position == index)
    }
}

/// Check that `order` holds every index in `0..len` exactly once
pub fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
