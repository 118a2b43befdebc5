// ═══════════════════════════════════════════════════════════════════════
// Navigation — graph traversal over the country adjacency.
// Used by the map validator and by the strategies to find frontiers.
// ═══════════════════════════════════════════════════════════════════════

use crate::map::{Country, CountryId, MapGraph};
use crate::types::GameState;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// BFS from `start`, only stepping onto countries accepted by `filter`.
/// `start` itself is always part of the result.
pub fn reachable<F>(map: &MapGraph, start: CountryId, filter: F) -> BTreeSet<CountryId>
where
    F: Fn(&Country) -> bool,
{
    let mut visited = BTreeSet::new();
    let mut queue: VecDeque<CountryId> = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let Some(country) = map.country(current) else { continue };
        for &adj in &country.neighbors {
            if visited.contains(&adj) {
                continue;
            }
            match map.country(adj) {
                Some(next) if filter(next) => {
                    visited.insert(adj);
                    queue.push_back(adj);
                }
                _ => {}
            }
        }
    }

    visited
}

/// Neighbors of `country` not owned by `player`.
pub fn enemy_neighbors(state: &GameState, country: CountryId, player: &str) -> Vec<CountryId> {
    let Some(c) = state.map.country(country) else { return Vec::new() };
    c.neighbors
        .iter()
        .copied()
        .filter(|&n| state.map.country(n).is_some_and(|nc| !nc.is_owned_by(player)))
        .collect()
}

/// Neighbors of `country` also owned by `player`.
pub fn friendly_neighbors(state: &GameState, country: CountryId, player: &str) -> Vec<CountryId> {
    let Some(c) = state.map.country(country) else { return Vec::new() };
    c.neighbors
        .iter()
        .copied()
        .filter(|&n| state.map.country(n).is_some_and(|nc| nc.is_owned_by(player)))
        .collect()
}

pub fn is_border(state: &GameState, country: CountryId, player: &str) -> bool {
    !enemy_neighbors(state, country, player).is_empty()
}

/// Distance (in steps through `player`'s own countries) from every owned
/// country to the nearest country bordering an enemy. Owned countries with
/// no route to a frontier are absent.
pub fn frontier_distances(state: &GameState, player: &str) -> BTreeMap<CountryId, u32> {
    let mut dist = BTreeMap::new();
    let mut queue = VecDeque::new();

    for c in state.map.countries() {
        if c.is_owned_by(player) && is_border(state, c.id, player) {
            dist.insert(c.id, 0);
            queue.push_back(c.id);
        }
    }

    while let Some(current) = queue.pop_front() {
        let d = dist[&current];
        for n in friendly_neighbors(state, current, player) {
            if !dist.contains_key(&n) {
                dist.insert(n, d + 1);
                queue.push_back(n);
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::builtin;

    #[test]
    fn test_reachable_whole_map() {
        let map = builtin("classic").unwrap();
        let start = map.countries()[0].id;
        assert_eq!(reachable(&map, start, |_| true).len(), map.country_count());
    }

    #[test]
    fn test_reachable_filtered() {
        let map = builtin("tiny").unwrap();
        let a = map.country_by_name("A").unwrap();
        let west = a.continent;
        let got = reachable(&map, a.id, |c| c.continent == west);
        assert_eq!(got.len(), 3);
    }
}
