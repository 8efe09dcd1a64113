//! Continuous positions between discrete steps.
//!
//! Every segment carries the world position it started the step at and the
//! one it is heading for. On a wrapping board a step across the seam makes the
//! target look like it sits on the far side of the board; the helpers here
//! pick the short way round instead.

use super::grid::{GridSpec, WorldPos};
use super::state::{SegmentId, SegmentRole, Snake};

/// Past this fraction a segment is snapped onto its target
const SNAP_FRACTION: f32 = 0.999;

/// Where a segment should be drawn this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPose {
    pub id: SegmentId,
    pub role: SegmentRole,
    pub position: WorldPos,
    /// Unit facing vector; only the head and the tail carry one
    pub heading: Option<WorldPos>,
}

pub fn lerp(from: WorldPos, to: WorldPos, t: f32) -> WorldPos {
    if t >= SNAP_FRACTION {
        return to;
    }
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Shift `to` by one board span on any axis where the raw delta is longer
/// than half the board
fn unwrap_target(grid: &GridSpec, from: WorldPos, to: WorldPos) -> WorldPos {
    let span = grid.span();
    let mut adjusted = to;
    let delta = to - from;

    if delta.x > span.x * 0.5 {
        adjusted.x -= span.x;
    } else if delta.x < -span.x * 0.5 {
        adjusted.x += span.x;
    }
    if delta.y > span.y * 0.5 {
        adjusted.y -= span.y;
    } else if delta.y < -span.y * 0.5 {
        adjusted.y += span.y;
    }
    adjusted
}

/// Fold a point that left the board back in by one span
fn fold_into_board(grid: &GridSpec, mut p: WorldPos) -> WorldPos {
    let min = grid.origin();
    let max = grid.max();
    let span = grid.span();

    if p.x < min.x {
        p.x += span.x;
    } else if p.x >= max.x {
        p.x -= span.x;
    }
    if p.y < min.y {
        p.y += span.y;
    } else if p.y >= max.y {
        p.y -= span.y;
    }
    p
}

/// Blend from `from` to `to` along the shorter path on the torus
pub fn lerp_across_wrap(grid: &GridSpec, from: WorldPos, to: WorldPos, t: f32) -> WorldPos {
    if t >= SNAP_FRACTION {
        return to;
    }
    let target = unwrap_target(grid, from, to);
    fold_into_board(grid, from + (target - from) * t.clamp(0.0, 1.0))
}

/// Travel vector from `from` to `to` along the shorter path on the torus
pub fn forward_across_wrap(grid: &GridSpec, from: WorldPos, to: WorldPos) -> WorldPos {
    unwrap_target(grid, from, to) - from
}

/// Poses for the head then every body segment in order
pub fn poses(snake: &Snake, grid: &GridSpec, wrap: bool, t: f32) -> Vec<SegmentPose> {
    let place = |from: WorldPos, to: WorldPos| {
        if wrap {
            lerp_across_wrap(grid, from, to, t)
        } else {
            lerp(from, to, t)
        }
    };

    let head = snake.head();
    let delta = snake.direction().delta();
    let mut out = Vec::with_capacity(snake.len());
    out.push(SegmentPose {
        id: head.id,
        role: SegmentRole::Head,
        position: place(head.from, head.to),
        heading: WorldPos::new(delta.x as f32, delta.y as f32).normalized(),
    });

    for seg in snake.body() {
        let heading = match seg.role {
            SegmentRole::Tail => {
                let forward = if wrap {
                    forward_across_wrap(grid, seg.from, seg.to)
                } else {
                    seg.to - seg.from
                };
                forward.normalized()
            }
            _ => None,
        };
        out.push(SegmentPose {
            id: seg.id,
            role: seg.role,
            position: place(seg.from, seg.to),
            heading,
        });
    }
    out
}
