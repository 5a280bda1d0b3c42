use std::collections::BinaryHeap;

use gridplan_core::{Cell, Error, Path, Result};

use crate::SearchSpace;
use crate::space::NodeRef;
use crate::traits::AstarPather;

impl SearchSpace {
    /// Compute the shortest path from `from` to `to` using A*.
    ///
    /// Returns the full path (including both endpoints). When `from == to`
    /// the path is that single cell. Fails with [`Error::NotFound`] if either
    /// endpoint is not passable or once the open queue is exhausted, and
    /// with [`Error::OutOfBounds`] if either endpoint lies outside the space.
    ///
    /// Queue ties are broken by `(f, cell)`, so the result is fully
    /// determined by the pather and the endpoints.
    pub fn astar_path<P: AstarPather>(&mut self, pather: &P, from: Cell, to: Cell) -> Result<Path> {
        let start_idx = self.idx(from)?;
        let goal_idx = self.idx(to)?;

        if !pather.passable(from) || !pather.passable(to) {
            log::debug!("{from} -> {to}: endpoint not passable");
            return Err(Error::NotFound { from, to });
        }

        if start_idx == goal_idx {
            return Ok(Path::single(from));
        }

        let cur_gen = self.next_generation();

        // Initialise the start node.
        let start_f = pather.estimate(from, to);
        {
            let node = &mut self.nodes[start_idx];
            node.g = 0;
            node.f = start_f;
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.open = true;
        }

        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: start_f,
            cell: from,
        });

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expansions = 0;

        let outcome = loop {
            let Some(current) = open.pop() else {
                break Err(Error::NotFound { from, to });
            };

            let ci = current.idx;

            // Skip stale entries: superseded by a cheaper push, or already closed.
            let node = &self.nodes[ci];
            if node.generation != cur_gen || !node.open || current.f != node.f {
                continue;
            }

            if ci == goal_idx {
                break Ok(());
            }

            if let Err(e) = self.check_limits(expansions) {
                break Err(e);
            }
            expansions += 1;

            self.nodes[ci].open = false;
            let current_g = self.nodes[ci].g;
            let current_cell = current.cell;
            log::trace!("expand {current_cell} g={current_g} f={}", current.f);

            nbuf.clear();
            pather.neighbors(current_cell, &mut nbuf);

            for &nc in nbuf.iter() {
                let Some(ni) = self.bounds.index(nc) else {
                    continue;
                };
                let tentative_g = current_g + pather.cost(current_cell, nc);

                let n = &mut self.nodes[ni];
                if n.generation == cur_gen {
                    // Already discovered this generation.
                    if tentative_g >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                }

                n.g = tentative_g;
                n.f = tentative_g + pather.estimate(nc, to);
                n.parent = ci;
                n.open = true;

                open.push(NodeRef {
                    idx: ni,
                    f: n.f,
                    cell: nc,
                });
            }
        };

        self.nbuf = nbuf;
        outcome?;

        // Reconstruct path.
        let mut cells = Vec::new();
        let mut ci = goal_idx;
        while ci != usize::MAX {
            cells.push(self.cell(ci));
            ci = self.nodes[ci].parent;
        }
        cells.reverse();
        log::trace!("{from} -> {to}: {} steps, {expansions} expansions", cells.len() - 1);
        Path::from_cells(cells).ok_or(Error::NotFound { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CancelToken, PlannerConfig, UNREACHABLE};
    use gridplan_core::{Bounds, Grid};

    const MAP: &str = "\
...#.
##.#.
.....
.###.
.....";

    fn grid(s: &str) -> Grid {
        s.parse().unwrap()
    }

    fn cells(cs: &[(i32, i32)]) -> Vec<Cell> {
        cs.iter().map(|&p| Cell::from(p)).collect()
    }

    #[test]
    fn shortest_path_on_sample_map() {
        let g = grid(MAP);
        let mut space = SearchSpace::new(g.bounds());
        let p = space
            .astar_path(&g, Cell::new(0, 0), Cell::new(4, 4))
            .unwrap();
        assert_eq!(p.edges(), 8);
        assert!(p.is_valid_on(&g));
        assert_eq!(
            p.cells(),
            cells(&[
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 2),
                (2, 2),
                (2, 3),
                (2, 4),
                (3, 4),
                (4, 4)
            ])
        );
    }

    #[test]
    fn same_source_and_destination() {
        let g = grid(MAP);
        let mut space = SearchSpace::new(g.bounds());
        let c = Cell::new(2, 2);
        assert_eq!(space.astar_path(&g, c, c).unwrap(), Path::single(c));
    }

    #[test]
    fn walled_off_goal_is_not_found() {
        let g = grid(
            "\
.....
...#.
..#.#
...#.
.....",
        );
        let mut space = SearchSpace::new(g.bounds());
        let from = Cell::new(0, 0);
        let to = Cell::new(2, 3);
        assert_eq!(
            space.astar_path(&g, from, to),
            Err(Error::NotFound { from, to })
        );
    }

    #[test]
    fn blocked_destination_is_not_found() {
        let g = grid(MAP);
        let mut space = SearchSpace::new(g.bounds());
        let err = space
            .astar_path(&g, Cell::new(0, 0), Cell::new(0, 3))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn blocked_source_is_not_found() {
        let g = grid("#..\n...");
        let mut space = SearchSpace::new(g.bounds());
        let from = Cell::new(0, 0);
        let to = Cell::new(1, 2);
        assert_eq!(
            space.astar_path(&g, from, to),
            Err(Error::NotFound { from, to })
        );
        assert_eq!(
            space.astar_path(&g, from, from),
            Err(Error::NotFound { from, to: from })
        );
        // The reverse direction fails the same way.
        assert_eq!(
            space.astar_path(&g, to, from),
            Err(Error::NotFound { from: to, to: from })
        );
    }

    #[test]
    fn out_of_bounds_endpoint() {
        let g = grid(MAP);
        let mut space = SearchSpace::new(g.bounds());
        let err = space
            .astar_path(&g, Cell::new(0, 0), Cell::new(5, 0))
            .unwrap_err();
        assert_eq!(
            err,
            Error::OutOfBounds {
                cell: Cell::new(5, 0),
                bounds: Bounds::new(5, 5)
            }
        );
    }

    #[test]
    fn tie_break_prefers_smaller_cell() {
        // On an open grid many shortest paths exist; with (f, cell)
        // ordering the search runs along the top row before turning down.
        let g = Grid::open(3, 3);
        let mut space = SearchSpace::new(g.bounds());
        let p = space
            .astar_path(&g, Cell::new(0, 0), Cell::new(2, 2))
            .unwrap();
        assert_eq!(p.edges(), 4);
        assert_eq!(p.cells(), cells(&[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let g = grid(MAP);
        let mut space = SearchSpace::new(g.bounds());
        let first = space.astar_path(&g, Cell::new(4, 0), Cell::new(0, 4));
        for _ in 0..5 {
            assert_eq!(
                space.astar_path(&g, Cell::new(4, 0), Cell::new(0, 4)),
                first
            );
        }
        let mut fresh = SearchSpace::new(g.bounds());
        assert_eq!(fresh.astar_path(&g, Cell::new(4, 0), Cell::new(0, 4)), first);
    }

    /// Every 3x3 occupancy pattern, every pair of free cells: A* must agree
    /// with BFS on reachability and distance, and return a valid path.
    #[test]
    fn optimal_on_all_small_grids() {
        for mask in 0u32..(1 << 9) {
            let rows: Vec<Vec<u8>> = (0..3)
                .map(|r| (0..3).map(|c| ((mask >> (r * 3 + c)) & 1) as u8).collect())
                .collect();
            let g = Grid::new(rows).unwrap();
            let mut space = SearchSpace::new(g.bounds());
            let free: Vec<_> = g.free_cells().collect();
            for &s in &free {
                space.bfs_map(&g, &[s], i32::MAX);
                let dists: Vec<_> = free.iter().map(|&d| (d, space.bfs_at(d))).collect();
                for (d, dist) in dists {
                    match space.astar_path(&g, s, d) {
                        Ok(p) => {
                            assert!(p.is_valid_on(&g));
                            assert_eq!(p.source(), s);
                            assert_eq!(p.destination(), d);
                            assert_eq!(p.edges() as i32, dist, "mask {mask:#b} {s}->{d}");
                        }
                        Err(e) => {
                            assert_eq!(e, Error::NotFound { from: s, to: d });
                            assert_eq!(dist, UNREACHABLE, "mask {mask:#b} {s}->{d}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn optimal_on_maze() {
        let g = grid(
            "\
.#.......#
.#.#####.#
.#.#...#..
...#.#.##.
####.#....
.....####.
.###......
...#.####.
.#.#....#.
.#...##...",
        );
        let mut space = SearchSpace::new(g.bounds());
        let s = Cell::new(0, 0);
        space.bfs_map(&g, &[s], i32::MAX);
        let expected: Vec<_> = g.free_cells().map(|d| (d, space.bfs_at(d))).collect();
        for (d, dist) in expected {
            let p = space.astar_path(&g, s, d);
            if dist == UNREACHABLE {
                assert!(p.is_err());
            } else {
                let p = p.unwrap();
                assert!(p.is_valid_on(&g));
                assert_eq!(p.edges() as i32, dist);
            }
        }
    }

    #[test]
    fn expansion_budget_aborts() {
        let g = Grid::open(10, 10);
        let mut space =
            SearchSpace::with_config(g.bounds(), PlannerConfig::default().with_max_expansions(3));
        let err = space
            .astar_path(&g, Cell::new(0, 0), Cell::new(9, 9))
            .unwrap_err();
        assert_eq!(err, Error::BudgetExceeded { expansions: 3 });

        // A budget large enough for the search does not interfere.
        space.set_config(PlannerConfig::default().with_max_expansions(1000));
        assert!(space.astar_path(&g, Cell::new(0, 0), Cell::new(9, 9)).is_ok());
    }

    #[test]
    fn cancelled_before_start() {
        let g = Grid::open(4, 4);
        let token = CancelToken::new();
        token.cancel();
        let mut space = SearchSpace::new(g.bounds()).with_cancel(token);
        assert_eq!(
            space.astar_path(&g, Cell::new(0, 0), Cell::new(3, 3)),
            Err(Error::Cancelled)
        );
    }
}
