//! Segment ring buffer
//!
//! Fixed-capacity circular storage for the live segments of a media
//! playlist. `head` is the slot of the oldest live segment, `tail` the slot
//! the next segment goes into. All index arithmetic is modulo capacity.

use super::types::MediaSegment;
use crate::error::{PlaylistError, Result};

#[derive(Debug, Clone)]
pub(crate) struct SegmentRing {
    slots: Vec<Option<MediaSegment>>,
    head: usize,
    tail: usize,
    count: usize,
}

impl SegmentRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// No free slot left. With capacity > 0 this is exactly `head == tail`
    /// while `count > 0`.
    pub(crate) fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Slot of the most recently appended segment.
    pub(crate) fn last_index(&self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.slots.len();
        Some((self.tail + capacity - 1) % capacity)
    }

    pub(crate) fn last(&self) -> Option<&MediaSegment> {
        self.slots[self.last_index()?].as_ref()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut MediaSegment> {
        let index = self.last_index()?;
        self.slots[index].as_mut()
    }

    /// Append a segment at the tail and number it.
    ///
    /// The segment gets the id following the previous live segment, or
    /// `base_seq` when the ring is empty. Returns the assigned id.
    pub(crate) fn push(&mut self, mut segment: MediaSegment, base_seq: u64) -> Result<u64> {
        if self.is_full() {
            return Err(PlaylistError::PlaylistFull);
        }
        segment.seq_id = match self.last() {
            Some(prev) => prev.seq_id + 1,
            None => base_seq,
        };
        let seq_id = segment.seq_id;
        self.slots[self.tail] = Some(segment);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
        Ok(seq_id)
    }

    /// Drop the oldest live segment.
    pub(crate) fn pop_front(&mut self) -> Result<MediaSegment> {
        if self.count == 0 {
            return Err(PlaylistError::PlaylistEmpty);
        }
        let segment = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        segment.ok_or(PlaylistError::PlaylistEmpty)
    }

    /// Live segments, oldest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &MediaSegment> + '_ {
        let capacity = self.slots.len();
        (0..self.count).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }

    /// Insert `segments` at a position derived from `at_seq_id`.
    ///
    /// The target index is the end of the live list when `at_seq_id` is 0 or
    /// not below the live count, and `at_seq_id - 1` otherwise. Inserted
    /// segments are numbered `index + 1 ..`; every segment after them has its
    /// id moved up by the inserted length (and at least one past its
    /// predecessor). Capacity grows by the inserted length when the new
    /// total does not fit. Returns the target index.
    pub(crate) fn insert(&mut self, segments: Vec<MediaSegment>, at_seq_id: u64) -> Result<usize> {
        if segments.is_empty() {
            return Err(PlaylistError::PlaylistEmpty);
        }

        let len = self.count;
        let index = if at_seq_id == 0 || at_seq_id >= len as u64 {
            len
        } else {
            (at_seq_id - 1) as usize
        };
        let added = segments.len();

        let mut live = self.take_live();
        let following = live.split_off(index);

        let first_id = index as u64 + 1;
        for (i, mut segment) in segments.into_iter().enumerate() {
            segment.seq_id = first_id + i as u64;
            live.push(segment);
        }

        let mut prev = live.last().map(|s| s.seq_id);
        for mut segment in following {
            segment.seq_id += added as u64;
            if let Some(prev_id) = prev {
                if segment.seq_id <= prev_id {
                    segment.seq_id = prev_id + 1;
                }
            }
            prev = Some(segment.seq_id);
            live.push(segment);
        }

        let capacity = if len + added > self.capacity() {
            self.capacity() + added
        } else {
            self.capacity()
        };
        self.fill(live, capacity);
        Ok(index)
    }

    /// Replace the whole buffer with `segments`. Capacity becomes the list
    /// length; the segments keep their ids.
    pub(crate) fn replace(&mut self, segments: Vec<MediaSegment>) {
        let capacity = segments.len();
        self.fill(segments, capacity);
    }

    fn take_live(&mut self) -> Vec<MediaSegment> {
        let capacity = self.slots.len();
        let mut live = Vec::with_capacity(self.count);
        for i in 0..self.count {
            if let Some(segment) = self.slots[(self.head + i) % capacity].take() {
                live.push(segment);
            }
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        live
    }

    /// Lay `segments` out linearly from slot 0 in a buffer of `capacity`
    /// slots.
    fn fill(&mut self, segments: Vec<MediaSegment>, capacity: usize) {
        let count = segments.len();
        let mut slots: Vec<Option<MediaSegment>> = segments.into_iter().map(Some).collect();
        slots.resize_with(capacity, || None);
        self.slots = slots;
        self.head = 0;
        self.count = count;
        self.tail = if capacity == 0 { 0 } else { count % capacity };
    }
}

fn empty_slots(capacity: usize) -> Vec<Option<MediaSegment>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}
