//! Disassembly of the snake after a collision.
//!
//! Body segments are removed one at a time in a shuffled order with a
//! jittered pause after each, then the head goes out with a large effect and
//! one last pause before the simulation reports that it is over. The sequence
//! is a plain state object polled with the frame delta, so it runs inside the
//! same update phase as the simulation and never needs its own task.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::config::DeathConfig;
use super::events::{EffectKind, SimEvent};
use super::state::{SegmentId, Snake};

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Pending,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// Removing body segments; `next` indexes into the drain order
    Draining { next: usize },
    /// Head effect fired, waiting out the final delay
    Finishing,
    Done,
}

#[derive(Debug, Clone)]
pub struct DeathSequencer {
    order: Vec<SegmentId>,
    delays: Vec<f32>,
    final_delay: f32,
    head: SegmentId,
    stage: Stage,
    /// Seconds left before the next action; may go negative to carry time
    wait: f32,
}

impl DeathSequencer {
    /// Shuffle the body handles and draw one jittered delay per segment
    pub fn new<R: Rng + ?Sized>(
        body: Vec<SegmentId>,
        head: SegmentId,
        config: &DeathConfig,
        rng: &mut R,
    ) -> Self {
        let mut order = body;
        order.shuffle(rng);

        let interval = config.segment_interval;
        let spread = interval * config.jitter_fraction;
        let delays = order
            .iter()
            .map(|_| {
                if spread > 0.0 {
                    rng.gen_range(interval - spread..=interval + spread)
                } else {
                    interval
                }
            })
            .collect();

        Self {
            order,
            delays,
            final_delay: config.final_delay,
            head,
            stage: Stage::Draining { next: 0 },
            wait: 0.0,
        }
    }

    /// Body handles in the order they will be removed
    pub fn order(&self) -> &[SegmentId] {
        &self.order
    }

    /// Pause after each removed segment, aligned with `order`
    pub fn delays(&self) -> &[f32] {
        &self.delays
    }

    /// Time from the first poll until `Done`
    pub fn total_duration(&self) -> f32 {
        self.delays.iter().sum::<f32>() + self.final_delay
    }

    /// True once the head effect has fired
    pub fn head_hidden(&self) -> bool {
        !matches!(self.stage, Stage::Draining { .. })
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Advance by `dt` seconds, removing whatever segments came due.
    /// Only one segment is ever between removal and its pause at a time.
    pub fn poll(&mut self, dt: f32, snake: &mut Snake, events: &mut Vec<SimEvent>) -> SequenceStatus {
        self.wait -= dt.max(0.0);

        while self.wait <= 0.0 {
            match self.stage {
                Stage::Draining { next } if next < self.order.len() => {
                    let id = self.order[next];
                    if let Some(seg) = snake.remove_segment(id) {
                        events.push(SimEvent::Effect {
                            kind: EffectKind::Small,
                            position: seg.to,
                        });
                        events.push(SimEvent::SegmentRemoved { id });
                        debug!(segment = id.0, remaining = snake.segment_count(), "drained segment");
                    }
                    self.wait += self.delays[next];
                    self.stage = Stage::Draining { next: next + 1 };
                }
                Stage::Draining { .. } => {
                    events.push(SimEvent::Effect {
                        kind: EffectKind::Large,
                        position: snake.head().to,
                    });
                    events.push(SimEvent::HeadHidden { id: self.head });
                    self.wait += self.final_delay;
                    self.stage = Stage::Finishing;
                }
                Stage::Finishing => {
                    self.stage = Stage::Done;
                    return SequenceStatus::Done;
                }
                Stage::Done => return SequenceStatus::Done,
            }
        }

        SequenceStatus::Pending
    }
}
