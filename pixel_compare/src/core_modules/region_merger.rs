// THEORY:
// After extraction a single visual change often shows up as several boxes a few
// pixels apart (a word whose letters did not touch, a border broken by a
// gradient). The merger clusters boxes that are within `merge_distance` of each
// other and replaces each cluster by its union box.
//
// Two strategies are offered:
// - `Greedy` takes the first unconsumed box as an accumulator, sweeps the
//   remaining boxes absorbing anything close to the *grown* accumulator, repeats
//   the sweep until nothing more is absorbed, emits it, then moves on. It is
//   order-dependent when several disjoint merge chains compete; that is accepted
//   behaviour, not a defect.
// - `Connected` builds the "closer than merge_distance" graph over the input
//   boxes and emits one union box per connected component (union-find). Its
//   clusters do not depend on input order.
//
// Either pass can leave two output boxes within range of each other, because a
// union box can reach further than any of its members. Passes are therefore
// repeated until the count stops shrinking, which makes merging idempotent.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::core_modules::region::Region;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MergeStrategy {
    /// Accumulate-and-rescan in input order.
    #[default]
    Greedy,
    /// Union-find over all pairs within range.
    Connected,
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(Self::Greedy),
            "connected" | "union-find" => Ok(Self::Connected),
            other => Err(format!("unknown merge strategy: {other} (expected greedy or connected)")),
        }
    }
}

/// Clusters regions closer than `merge_distance` into their union boxes.
pub fn merge_regions(regions: &[Region], merge_distance: u32, strategy: MergeStrategy) -> Vec<Region> {
    let threshold = merge_distance as f64;
    let mut current = regions.to_vec();

    loop {
        let merged = match strategy {
            MergeStrategy::Greedy => greedy_pass(&current, threshold),
            MergeStrategy::Connected => connected_pass(&current, threshold),
        };
        // No absorption means the pass returned its input unchanged.
        if merged.len() == current.len() {
            return merged;
        }
        current = merged;
    }
}

fn greedy_pass(regions: &[Region], threshold: f64) -> Vec<Region> {
    let mut consumed = vec![false; regions.len()];
    let mut merged = Vec::with_capacity(regions.len());

    for start in 0..regions.len() {
        if consumed[start] {
            continue;
        }
        consumed[start] = true;
        let mut accumulator = regions[start];

        loop {
            let mut absorbed_any = false;
            for (candidate, region) in regions.iter().enumerate().skip(start + 1) {
                if !consumed[candidate] && accumulator.distance_to(region) <= threshold {
                    accumulator = accumulator.union(region);
                    consumed[candidate] = true;
                    absorbed_any = true;
                }
            }
            if !absorbed_any {
                break;
            }
        }

        merged.push(accumulator);
    }

    merged
}

fn connected_pass(regions: &[Region], threshold: f64) -> Vec<Region> {
    let mut sets = DisjointSets::new(regions.len());
    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            if regions[i].distance_to(&regions[j]) <= threshold {
                sets.union(i, j);
            }
        }
    }

    // Components are emitted in order of their first member.
    let mut slot_of_root: Vec<Option<usize>> = vec![None; regions.len()];
    let mut merged: Vec<Region> = Vec::new();
    for (i, region) in regions.iter().enumerate() {
        let root = sets.find(i);
        match slot_of_root[root] {
            Some(slot) => merged[slot] = merged[slot].union(region),
            None => {
                slot_of_root[root] = Some(merged.len());
                merged.push(*region);
            }
        }
    }
    merged
}

struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
