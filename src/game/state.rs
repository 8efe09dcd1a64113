use std::collections::HashSet;

use super::action::Direction;
use super::grid::{CellCoord, GridSpec, WorldPos};

/// Handle for one visual segment, stable for the segment's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u64);

/// Hands out fresh segment handles
#[derive(Debug, Default)]
pub struct SegmentIds {
    next: u64,
}

impl SegmentIds {
    pub fn allocate(&mut self) -> SegmentId {
        let id = SegmentId(self.next);
        self.next += 1;
        id
    }
}

/// What a visual segment represents to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    Head,
    Mid,
    Tail,
}

/// One logical segment: its cell, its visual handle and the interpolation
/// endpoints recorded at the last step. Keeping these in one record means the
/// cell list and the visual list can never drift out of alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub cell: CellCoord,
    pub id: SegmentId,
    pub from: WorldPos,
    pub to: WorldPos,
    pub role: SegmentRole,
}

impl Segment {
    fn resting(cell: CellCoord, id: SegmentId, role: SegmentRole, grid: &GridSpec) -> Self {
        let at = grid.to_world(cell);
        Self {
            cell,
            id,
            from: at,
            to: at,
            role,
        }
    }

    /// Record a move: the old target becomes the start point
    fn advance(&mut self, cell: CellCoord, grid: &GridSpec) {
        self.from = self.to;
        self.cell = cell;
        self.to = grid.to_world(cell);
    }
}

/// The snake: a head plus an ordered body, `body[0]` right behind the head
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    head: Segment,
    body: Vec<Segment>,
    /// Direction applied at the last step
    direction: Direction,
    /// Buffered input, committed at the next step
    pending_direction: Direction,
}

// The head always exists, so a snake is never empty
#[allow(clippy::len_without_is_empty)]
impl Snake {
    /// Lay `length - 1` body cells behind `head` along the reverse of
    /// `direction`. Without wrap the body is cut short at the grid edge; with
    /// wrap it is cut short before any cell would repeat.
    pub fn new(
        head: CellCoord,
        direction: Direction,
        length: usize,
        wrap: bool,
        grid: &GridSpec,
        ids: &mut SegmentIds,
    ) -> Self {
        let back = direction.opposite();
        let mut cells = Vec::new();
        let mut seen = HashSet::from([head]);
        let mut prev = head;

        for _ in 1..length {
            let mut cell = prev.offset(back);
            if wrap {
                cell = grid.wrap(cell);
            } else if !grid.in_bounds(cell) {
                break;
            }
            if !seen.insert(cell) {
                break;
            }
            cells.push(cell);
            prev = cell;
        }

        Self::assemble(head, &cells, direction, grid, ids)
    }

    /// Build a snake from explicit cells, head first. The caller guarantees
    /// the cells are distinct and each is adjacent to the next.
    pub fn from_cells(
        cells: &[CellCoord],
        direction: Direction,
        grid: &GridSpec,
        ids: &mut SegmentIds,
    ) -> Option<Self> {
        let (&head, rest) = cells.split_first()?;
        Some(Self::assemble(head, rest, direction, grid, ids))
    }

    fn assemble(
        head: CellCoord,
        rest: &[CellCoord],
        direction: Direction,
        grid: &GridSpec,
        ids: &mut SegmentIds,
    ) -> Self {
        let head = Segment::resting(head, ids.allocate(), SegmentRole::Head, grid);
        let last = rest.len().saturating_sub(1);
        let body = rest
            .iter()
            .enumerate()
            .map(|(i, &cell)| {
                let role = if i == last {
                    SegmentRole::Tail
                } else {
                    SegmentRole::Mid
                };
                Segment::resting(cell, ids.allocate(), role, grid)
            })
            .collect();

        Self {
            head,
            body,
            direction,
            pending_direction: direction,
        }
    }

    pub fn head(&self) -> &Segment {
        &self.head
    }

    pub fn head_cell(&self) -> CellCoord {
        self.head.cell
    }

    pub fn body(&self) -> &[Segment] {
        &self.body
    }

    pub fn body_cells(&self) -> Vec<CellCoord> {
        self.body.iter().map(|s| s.cell).collect()
    }

    pub fn tail(&self) -> Option<&Segment> {
        self.body.last()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    /// Number of body segments, head excluded
    pub fn segment_count(&self) -> usize {
        self.body.len()
    }

    /// Total length, head included
    pub fn len(&self) -> usize {
        self.body.len() + 1
    }

    /// `{head} ∪ body`
    pub fn occupied_cells(&self) -> HashSet<CellCoord> {
        std::iter::once(self.head.cell)
            .chain(self.body.iter().map(|s| s.cell))
            .collect()
    }

    /// Buffer `direction` for the next step unless it reverses the committed
    /// one. A later proposal overwrites an earlier one.
    pub fn propose_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Make the buffered direction the committed one
    pub(crate) fn commit_direction(&mut self) -> Direction {
        self.direction = self.pending_direction;
        self.direction
    }

    /// Move the head into `next` and have every body segment follow the one
    /// ahead of it. Interpolation starts from the targets frozen at the
    /// previous step. When `grow` is set a new tail is appended on the old
    /// tail's start point (the previous head's if the body was empty).
    /// Returns the new tail and the tail it replaced, if any.
    pub(crate) fn advance(
        &mut self,
        next: CellCoord,
        grow: bool,
        grid: &GridSpec,
        ids: &mut SegmentIds,
    ) -> Option<GrowthRecord> {
        let prev_head = self.head.cell;
        let vacated = self.body.last().map(|s| s.cell).unwrap_or(prev_head);
        let vacated_from = self.body.last().map(|s| s.to).unwrap_or(self.head.to);

        for i in (1..self.body.len()).rev() {
            let leader = self.body[i - 1].cell;
            self.body[i].advance(leader, grid);
        }
        if let Some(first) = self.body.first_mut() {
            first.advance(prev_head, grid);
        }
        self.head.advance(next, grid);

        if !grow {
            return None;
        }

        let old_tail = self.body.last_mut().map(|s| {
            s.role = SegmentRole::Mid;
            s.id
        });
        let tail = Segment {
            cell: vacated,
            id: ids.allocate(),
            from: vacated_from,
            to: vacated_from,
            role: SegmentRole::Tail,
        };
        self.body.push(tail);

        Some(GrowthRecord {
            tail: tail.id,
            position: vacated_from,
            old_tail,
        })
    }

    /// Take a segment out of the body by handle. Roles of the remaining
    /// segments are left alone.
    pub(crate) fn remove_segment(&mut self, id: SegmentId) -> Option<Segment> {
        let index = self.body.iter().position(|s| s.id == id)?;
        Some(self.body.remove(index))
    }

    /// Collapse every interpolation to its target
    pub(crate) fn settle(&mut self) {
        self.head.from = self.head.to;
        for seg in &mut self.body {
            seg.from = seg.to;
        }
    }
}

/// Visual bookkeeping produced by a growing step
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GrowthRecord {
    pub tail: SegmentId,
    pub position: WorldPos,
    pub old_tail: Option<SegmentId>,
}
