// gametail - core/backlog.rs
//
// Fixed-size window over the most recent lines, as shown by an overlay.
// The window is always exactly `capacity` slots long; slots not yet filled
// are empty strings at the front, so the newest line stays at the bottom.

use crate::core::format::OutputStyle;
use crate::core::model::TaggedLine;
use std::collections::VecDeque;

/// Rolling window of the last N lines.
#[derive(Debug, Clone)]
pub struct RecentLines {
    slots: VecDeque<TaggedLine>,
}

impl RecentLines {
    /// Create a window of `capacity` empty slots. A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = VecDeque::with_capacity(capacity);
        slots.resize(capacity, TaggedLine::plain(""));
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Push a line at the bottom, evicting the oldest slot.
    pub fn push(&mut self, line: TaggedLine) {
        self.slots.pop_front();
        self.slots.push_back(line);
    }

    /// Change the window size, keeping the newest lines.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        while self.slots.len() > capacity {
            self.slots.pop_front();
        }
        while self.slots.len() < capacity {
            self.slots.push_front(TaggedLine::plain(""));
        }
    }

    /// Iterate oldest to newest, including empty padding slots.
    pub fn iter(&self) -> impl Iterator<Item = &TaggedLine> {
        self.slots.iter()
    }

    /// Render the whole window with the given style.
    pub fn render(&self, style: OutputStyle) -> String {
        self.slots
            .iter()
            .map(|l| style.render(l))
            .collect::<Vec<_>>()
            .join(style.line_separator())
    }
}
