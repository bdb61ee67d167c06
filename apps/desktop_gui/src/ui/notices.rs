//! Short-lived toast notices shown under the list.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use client_core::Notice;

pub const NOTICE_TTL: Duration = Duration::from_secs(3);
const MAX_VISIBLE_NOTICES: usize = 4;

#[derive(Default)]
pub struct NoticeBoard {
    entries: VecDeque<(Notice, Instant)>,
}

impl NoticeBoard {
    pub fn push(&mut self, notice: Notice, now: Instant) {
        self.entries.push_back((notice, now));
        while self.entries.len() > MAX_VISIBLE_NOTICES {
            self.entries.pop_front();
        }
    }

    /// Drops expired notices and returns the ones still visible, oldest first.
    pub fn visible(&mut self, now: Instant) -> impl Iterator<Item = &Notice> {
        self.entries
            .retain(|(_, shown_at)| now.saturating_duration_since(*shown_at) < NOTICE_TTL);
        self.entries.iter().map(|(notice, _)| notice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
