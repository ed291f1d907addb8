// Deciding the host of single games so that every team's home and away counts differ by at most one.
//
// The pairs form a graph. Teams with an odd number of single games are joined to an extra vertex,
// which makes every degree even. Walking closed trails through that graph and hosting each game at the
// vertex the walk leaves from gives every vertex as many departures as arrivals. Dropping the extra
// edges again leaves at most one game of imbalance per team.
//
// The walk only depends on which pairs there are, so the parity of the season alone decides the hosts.

use std::collections::HashMap;

use crate::{season::schedule_generator::Matchup, types::TeamId};

// Give every pair a host. Odd seasons flip every host, so single games alternate from season to season.
pub fn orient(pairs: Vec<[TeamId; 2]>, season_index: u32) -> Vec<Matchup> {
    let mut vertices: Vec<TeamId> = pairs.iter().flatten().copied().collect();
    vertices.sort_unstable();
    vertices.dedup();

    let index_of: HashMap<TeamId, usize> = vertices.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let extra = vertices.len();

    // Walk the pairs in sorted order, whatever order they came in.
    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.sort_by_key(|i| {
        let [a, b] = pairs[*i];
        (a.min(b), a.max(b))
    });

    let mut edges: Vec<[usize; 2]> = order.iter().map(|i| {
        let [a, b] = pairs[*i];
        [index_of[&a], index_of[&b]]
    }).collect();
    let real_edges = edges.len();

    let mut degree = vec![0usize; extra + 1];
    for [a, b] in edges.iter() {
        degree[*a] += 1;
        degree[*b] += 1;
    }
    for vertex in 0..extra {
        if degree[vertex] % 2 != 0 { edges.push([vertex, extra]); }
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); extra + 1];
    for (e, [a, b]) in edges.iter().enumerate() {
        adjacency[*a].push(e);
        adjacency[*b].push(e);
    }

    let mut used = vec![false; edges.len()];
    let mut directed = vec![[0usize; 2]; edges.len()];
    let mut cursor = vec![0usize; extra + 1];

    for start in 0..=extra {
        let mut current = start;
        while let Some(e) = next_unused_edge(&adjacency[current], &mut cursor[current], &used) {
            used[e] = true;
            let [a, b] = edges[e];
            let next = if a == current { b } else { a };
            directed[e] = [current, next];
            current = next;
        }
    }

    let flip = season_index % 2 == 1;
    let mut matchups = vec![[0; 2]; real_edges];
    for (e, [from, to]) in directed[..real_edges].iter().enumerate() {
        let (home, away) = if flip { (*to, *from) } else { (*from, *to) };
        matchups[order[e]] = [vertices[home], vertices[away]];
    }
    return matchups;
}

// Get the next edge of a vertex that has not been walked yet.
fn next_unused_edge(edges: &[usize], cursor: &mut usize, used: &[bool]) -> Option<usize> {
    while *cursor < edges.len() {
        let e = edges[*cursor];
        *cursor += 1;
        if !used[e] { return Some(e); }
    }
    return None;
}
