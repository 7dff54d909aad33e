//! Time-ordered queue of scheduled voice triggers.

use alloc::vec::Vec;
use pp_ir::{BeatTime, TimelineEvent};

/// Timeline events sorted by start time.
///
/// Events with equal start times keep the order they were pushed in.
/// During playback, events are consumed via a cursor that advances forward
/// without removing elements, so the realtime drain path never allocates.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<TimelineEvent>,
    /// Next event index to process (advances during playback).
    cursor: usize,
}

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new(), cursor: 0 }
    }

    /// Build a queue from events in any order.
    pub fn from_events(mut events: Vec<TimelineEvent>) -> Self {
        events.sort_by_key(|e| e.start);
        Self { events, cursor: 0 }
    }

    /// Insert an event after every event starting at or before it.
    pub fn push(&mut self, event: TimelineEvent) {
        let pos = self.events.partition_point(|e| e.start <= event.start);
        self.events.insert(pos, event);
    }

    /// Next undispatched event.
    pub fn peek(&self) -> Option<&TimelineEvent> {
        self.events.get(self.cursor)
    }

    /// Return the index range of events at or before `time` (cursor-based, zero allocation).
    ///
    /// Advances the internal cursor past all consumed events. The returned
    /// range can be used with [`EventQueue::get`].
    pub fn drain_until(&mut self, time: BeatTime) -> core::ops::Range<usize> {
        let start = self.cursor;
        while self.cursor < self.events.len() {
            if self.events[self.cursor].start <= time {
                self.cursor += 1;
            } else {
                break;
            }
        }
        start..self.cursor
    }

    /// Get an event by index (for use with `drain_until` ranges).
    pub fn get(&self, index: usize) -> Option<&TimelineEvent> {
        self.events.get(index)
    }

    /// All events in dispatch order.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Reset cursor to the beginning.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Clear all events and reset cursor.
    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }

    /// True once every event has been dispatched.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the number of events in the queue.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Start time of the last event, if any.
    pub fn last_start(&self) -> Option<BeatTime> {
        self.events.last().map(|e| e.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_ir::{Note, PatchId, VoiceParams};

    fn event(track: u8, beat: i64, pitch: f32) -> TimelineEvent {
        TimelineEvent::new(
            track,
            BeatTime::from_beats(beat),
            BeatTime::from_beats(1),
            VoiceParams::new(PatchId(0), Note::Pitch(pitch)),
        )
    }

    fn starts(queue: &EventQueue) -> Vec<i64> {
        queue.events().iter().map(|e| e.start.beat()).collect()
    }

    #[test]
    fn push_keeps_time_order() {
        let mut queue = EventQueue::new();
        queue.push(event(0, 10, 60.0));
        queue.push(event(0, 5, 60.0));
        queue.push(event(0, 15, 60.0));
        assert_eq!(starts(&queue), vec![5, 10, 15]);
    }

    #[test]
    fn equal_times_keep_push_order() {
        let mut queue = EventQueue::new();
        queue.push(event(0, 4, 60.0));
        queue.push(event(1, 4, 64.0));
        queue.push(event(2, 4, 67.0));
        let tracks: Vec<u8> = queue.events().iter().map(|e| e.track).collect();
        assert_eq!(tracks, vec![0, 1, 2]);
    }

    #[test]
    fn from_events_is_stable() {
        let queue = EventQueue::from_events(vec![event(1, 2, 60.0), event(0, 1, 60.0), event(2, 2, 60.0)]);
        let tracks: Vec<u8> = queue.events().iter().map(|e| e.track).collect();
        assert_eq!(tracks, vec![0, 1, 2]);
    }

    #[test]
    fn drain_until_returns_range() {
        let mut queue = EventQueue::from_events(vec![event(0, 5, 60.0), event(0, 10, 60.0), event(0, 15, 60.0)]);
        let range = queue.drain_until(BeatTime::from_beats(12));
        assert_eq!(range, 0..2);
        assert_eq!(queue.get(1).unwrap().start.beat(), 10);
    }

    #[test]
    fn drain_until_advances_cursor() {
        let mut queue = EventQueue::from_events(vec![event(0, 5, 60.0), event(0, 10, 60.0)]);
        assert_eq!(queue.drain_until(BeatTime::from_beats(7)), 0..1);
        assert_eq!(queue.drain_until(BeatTime::from_beats(7)), 1..1);
        assert_eq!(queue.drain_until(BeatTime::from_beats(15)), 1..2);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn negative_times_drain_at_zero() {
        let mut queue = EventQueue::from_events(vec![event(0, -2, 60.0), event(0, 0, 60.0)]);
        assert_eq!(queue.drain_until(BeatTime::zero()), 0..2);
    }

    #[test]
    fn reset_cursor_allows_replay() {
        let mut queue = EventQueue::from_events(vec![event(0, 1, 60.0)]);
        assert_eq!(queue.drain_until(BeatTime::from_beats(5)).len(), 1);
        queue.reset_cursor();
        assert_eq!(queue.drain_until(BeatTime::from_beats(5)).len(), 1);
    }
}
