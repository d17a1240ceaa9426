//! Movement advisory: reachable-set search and A* pathfinding
//!
//! Neither function is consulted by `BattleState::move_unit`. They exist for
//! callers that want terrain-aware suggestions (highlighting, AI targeting).

use ahash::{AHashMap, AHashSet};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::battle::battle_map::BattleMap;
use crate::battle::hex::HexCoord;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    coord: HexCoord,
    f_cost: u32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.f_cost.cmp(&self.f_cost)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost to step onto `coord`, or None if it cannot be entered
fn entry_cost(map: &BattleMap, coord: HexCoord, blocked: &AHashSet<HexCoord>) -> Option<u32> {
    if blocked.contains(&coord) {
        return None;
    }
    map.get_terrain(coord)?.movement_cost()
}

/// Every hex reachable from `start` with accumulated terrain cost <= `range`.
///
/// The start hex itself is not included. Blocked hexes can be neither
/// entered nor passed through.
pub fn reachable_hexes(
    map: &BattleMap,
    start: HexCoord,
    range: u32,
    blocked: &AHashSet<HexCoord>,
) -> AHashSet<HexCoord> {
    let mut best: AHashMap<HexCoord, u32> = AHashMap::new();
    let mut queue = VecDeque::new();
    best.insert(start, 0);
    queue.push_back((start, 0u32));

    while let Some((coord, cost)) = queue.pop_front() {
        // Stale entry: a cheaper route already expanded this hex
        if best.get(&coord).is_some_and(|&b| b < cost) {
            continue;
        }

        for neighbor in coord.neighbors() {
            let Some(step) = entry_cost(map, neighbor, blocked) else {
                continue;
            };
            let total = cost + step;
            if total > range {
                continue;
            }
            if best.get(&neighbor).map_or(true, |&b| total < b) {
                best.insert(neighbor, total);
                queue.push_back((neighbor, total));
            }
        }
    }

    best.remove(&start);
    best.into_keys().collect()
}

/// Find the cheapest terrain-cost path using A*
///
/// Returns None if no path exists. The returned path includes both ends.
pub fn find_path(
    map: &BattleMap,
    start: HexCoord,
    goal: HexCoord,
    blocked: &AHashSet<HexCoord>,
) -> Option<Vec<HexCoord>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, u32> = AHashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        f_cost: start.distance(&goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, current.coord));
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&u32::MAX);

        for neighbor in current.coord.neighbors() {
            let Some(move_cost) = entry_cost(map, neighbor, blocked) else {
                continue;
            };

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);

                // Cheapest terrain costs 1, so hex distance never overestimates
                let f_cost = tentative_g + neighbor.distance(&goal);
                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost,
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<HexCoord, HexCoord>,
    mut current: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Terrain cost of walking a path (the start hex is free)
pub fn path_cost(map: &BattleMap, path: &[HexCoord]) -> Option<u32> {
    path.iter()
        .skip(1)
        .map(|coord| map.get_terrain(*coord).and_then(|t| t.movement_cost()))
        .sum()
}
