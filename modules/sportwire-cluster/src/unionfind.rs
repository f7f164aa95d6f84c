use std::collections::HashMap;

/// Disjoint-set over an arbitrary `i64` id space, path compression plus
/// union-by-rank (spec.md §4.6).
pub struct UnionFind {
    parent: HashMap<i64, i64>,
    rank: HashMap<i64, u32>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self {
            parent: HashMap::new(),
            rank: HashMap::new(),
        }
    }

    pub(crate) fn ensure(&mut self, x: i64) {
        self.parent.entry(x).or_insert(x);
        self.rank.entry(x).or_insert(0);
    }

    pub fn find(&mut self, x: i64) -> i64 {
        self.ensure(x);
        if self.parent[&x] != x {
            let root = self.find(self.parent[&x]);
            self.parent.insert(x, root);
        }
        self.parent[&x]
    }

    pub fn union(&mut self, a: i64, b: i64) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let rank_a = self.rank[&ra];
        let rank_b = self.rank[&rb];
        if rank_a < rank_b {
            self.parent.insert(ra, rb);
        } else if rank_a > rank_b {
            self.parent.insert(rb, ra);
        } else {
            self.parent.insert(rb, ra);
            self.rank.insert(ra, rank_a + 1);
        }
    }

    /// Every id ever touched, grouped by root.
    pub fn groups(&mut self) -> HashMap<i64, Vec<i64>> {
        let ids: Vec<i64> = self.parent.keys().copied().collect();
        let mut groups: HashMap<i64, Vec<i64>> = HashMap::new();
        for id in ids {
            let root = self.find(id);
            groups.entry(root).or_default().push(id);
        }
        groups
    }
}

impl Default for UnionFind {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_stay_apart() {
        let mut uf = UnionFind::new();
        uf.ensure(1);
        uf.ensure(2);
        assert_ne!(uf.find(1), uf.find(2));
    }

    #[test]
    fn union_merges_two_groups() {
        let mut uf = UnionFind::new();
        uf.union(1, 2);
        uf.union(2, 3);
        assert_eq!(uf.find(1), uf.find(3));
    }

    #[test]
    fn transitive_chain_collapses_to_one_root() {
        let mut uf = UnionFind::new();
        uf.union(1, 2);
        uf.union(3, 4);
        uf.union(2, 3);
        let groups = uf.groups();
        assert_eq!(groups.len(), 1);
        let (_, members) = groups.into_iter().next().unwrap();
        let mut members = members;
        members.sort();
        assert_eq!(members, vec![1, 2, 3, 4]);
    }

    #[test]
    fn unrelated_ids_form_separate_groups() {
        let mut uf = UnionFind::new();
        uf.union(1, 2);
        uf.ensure(5);
        let groups = uf.groups();
        assert_eq!(groups.len(), 2);
    }
}
