use std::collections::VecDeque;

use gridplan_core::Cell;

use crate::SearchSpace;
use crate::space::{PathNode, UNREACHABLE};
use crate::traits::Pather;

impl SearchSpace {
    /// Compute a multi-source breadth-first distance map.
    ///
    /// Every step costs 1 and cells farther than `max_dist` are left
    /// unreached. Sources outside the space are ignored and duplicate
    /// sources count once. Returns the reached cells in discovery order.
    pub fn bfs_map<P: Pather>(&mut self, pather: &P, sources: &[Cell], max_dist: i32) -> &[PathNode] {
        self.bfs_map.fill(UNREACHABLE);
        self.bfs_results.clear();

        let mut frontier: VecDeque<(usize, Cell)> = VecDeque::new();
        for (si, src) in sources
            .iter()
            .filter_map(|&c| self.bounds.index(c).map(|i| (i, c)))
        {
            if self.bfs_map[si] == UNREACHABLE {
                self.bfs_map[si] = 0;
                self.bfs_results.push(PathNode { pos: src, cost: 0 });
                frontier.push_back((si, src));
            }
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);
        while let Some((ci, cc)) = frontier.pop_front() {
            let next = self.bfs_map[ci] + 1;
            if next > max_dist {
                continue;
            }
            nbuf.clear();
            pather.neighbors(cc, &mut nbuf);
            for &nc in &nbuf {
                match self.bounds.index(nc) {
                    Some(ni) if self.bfs_map[ni] == UNREACHABLE => {
                        self.bfs_map[ni] = next;
                        self.bfs_results.push(PathNode { pos: nc, cost: next });
                        frontier.push_back((ni, nc));
                    }
                    _ => {}
                }
            }
        }
        self.nbuf = nbuf;

        &self.bfs_results
    }

    /// Distance recorded for `c` by the last [`SearchSpace::bfs_map`] call,
    /// or [`UNREACHABLE`].
    pub fn bfs_at(&self, c: Cell) -> i32 {
        self.bounds
            .index(c)
            .map_or(UNREACHABLE, |i| self.bfs_map[i])
    }

    /// Unweighted step count from `from` to `to`, or `None` if `to` cannot
    /// be reached.
    pub fn bfs_distance<P: Pather>(&mut self, pather: &P, from: Cell, to: Cell) -> Option<i32> {
        self.bfs_map(pather, &[from], i32::MAX);
        Some(self.bfs_at(to)).filter(|&d| d != UNREACHABLE)
    }
}
