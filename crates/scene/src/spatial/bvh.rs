use foundation::bounds::Aabb3;
use foundation::math::precision::stable_total_cmp_f64;

/// A deterministic bounding volume hierarchy over per-country bounds.
///
/// Ordering contract:
/// - queries return slots in ascending order, independent of build input order.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        bounds: Aabb3,
        items: Vec<Item>,
    },
    Internal {
        bounds: Aabb3,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Item {
    pub slot: usize,
    pub bounds: Aabb3,
}

impl Bvh {
    pub fn build(items: Vec<Item>) -> Self {
        let mut nodes = Vec::new();
        let mut items = items;
        if !items.is_empty() {
            build_node(&mut nodes, &mut items);
        }
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Slots whose bounds, grown by `margin`, are crossed by the ray within
    /// `[t_min, t_max]`.
    pub fn query_ray(&self, origin: [f64; 3], dir: [f64; 3], t_min: f64, t_max: f64, margin: f64) -> Vec<usize> {
        self.collect(|bounds| {
            let b = if margin > 0.0 { bounds.inflate(margin) } else { *bounds };
            ray_intersects_aabb(origin, dir, &b, t_min, t_max)
        })
    }

    fn collect<F>(&self, mut test: F) -> Vec<usize>
    where
        F: FnMut(&Aabb3) -> bool,
    {
        if self.nodes.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<usize> = Vec::new();
        let mut stack: Vec<usize> = vec![0];

        while let Some(idx) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { bounds, items } => {
                    if !test(bounds) {
                        continue;
                    }
                    hits.extend(items.iter().filter(|item| test(&item.bounds)).map(|item| item.slot));
                }
                Node::Internal { bounds, left, right } => {
                    if !test(bounds) {
                        continue;
                    }
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

const LEAF_MAX: usize = 8;

fn build_node(nodes: &mut Vec<Node>, items: &mut [Item]) -> usize {
    let bounds = bounds_for_items(items);
    if items.len() <= LEAF_MAX {
        let idx = nodes.len();
        nodes.push(Node::Leaf {
            bounds,
            items: items.to_vec(),
        });
        return idx;
    }

    let axis = split_axis(&bounds);
    items.sort_by(|a, b| {
        stable_total_cmp_f64(a.bounds.centroid_axis(axis), b.bounds.centroid_axis(axis))
            .then_with(|| a.slot.cmp(&b.slot))
    });

    let mid = items.len() / 2;
    let (left_items, right_items) = items.split_at_mut(mid);

    let idx = nodes.len();
    // Placeholder; patched once children exist.
    nodes.push(Node::Leaf {
        bounds,
        items: Vec::new(),
    });

    let left = build_node(nodes, left_items);
    let right = build_node(nodes, right_items);

    nodes[idx] = Node::Internal { bounds, left, right };
    idx
}

fn split_axis(bounds: &Aabb3) -> usize {
    let ex = bounds.max[0] - bounds.min[0];
    let ey = bounds.max[1] - bounds.min[1];
    let ez = bounds.max[2] - bounds.min[2];

    // Prefer X, then Y, then Z on ties.
    if ex >= ey && ex >= ez {
        0
    } else if ey >= ez {
        1
    } else {
        2
    }
}

fn bounds_for_items(items: &[Item]) -> Aabb3 {
    items[1..]
        .iter()
        .fold(items[0].bounds, |acc, item| acc.union(&item.bounds))
}

/// Slab test.
pub(crate) fn ray_intersects_aabb(origin: [f64; 3], dir: [f64; 3], aabb: &Aabb3, mut t_min: f64, mut t_max: f64) -> bool {
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let min = aabb.min[axis];
        let max = aabb.max[axis];

        if d.abs() < 1e-12 {
            if o < min || o > max {
                return false;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (min - o) * inv;
        let mut t2 = (max - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::{Bvh, Item};
    use foundation::bounds::Aabb3;

    fn unit_boxes_along_x(n: usize) -> Vec<Item> {
        (0..n)
            .map(|slot| {
                let x = slot as f64 * 2.0;
                Item {
                    slot,
                    bounds: Aabb3::new([x, 0.0, 0.0], [x + 1.0, 1.0, 1.0]),
                }
            })
            .collect()
    }

    #[test]
    fn query_returns_slots_in_order() {
        let items = vec![
            Item { slot: 2, bounds: Aabb3::new([10.0, 0.0, 0.0], [11.0, 1.0, 1.0]) },
            Item { slot: 1, bounds: Aabb3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]) },
            Item { slot: 3, bounds: Aabb3::new([0.5, 0.5, 0.5], [2.0, 2.0, 2.0]) },
        ];
        let bvh = Bvh::build(items);
        // Ray along +Y through the overlap of slots 1 and 3.
        let hits = bvh.query_ray([0.75, -5.0, 0.75], [0.0, 1.0, 0.0], 0.0, 1e30, 0.0);
        assert_eq!(hits, vec![1, 3]);
    }

    #[test]
    fn build_is_input_order_independent() {
        let a = unit_boxes_along_x(20);
        let mut b = a.clone();
        b.reverse();

        // Segment x in [3.5, 8.5].
        let (origin, dir) = ([-1.0, 0.5, 0.5], [1.0, 0.0, 0.0]);
        let ha = Bvh::build(a).query_ray(origin, dir, 4.5, 9.5, 0.0);
        let hb = Bvh::build(b).query_ray(origin, dir, 4.5, 9.5, 0.0);
        assert_eq!(ha, hb);
        assert_eq!(ha, vec![2, 3, 4]);
    }

    #[test]
    fn ray_query_respects_margin() {
        let bvh = Bvh::build(unit_boxes_along_x(12));
        // Ray along +X just above the boxes.
        let origin = [-5.0, 1.2, 0.5];
        let dir = [1.0, 0.0, 0.0];
        assert!(bvh.query_ray(origin, dir, 0.0, 1e30, 0.0).is_empty());
        assert_eq!(bvh.query_ray(origin, dir, 0.0, 1e30, 0.5).len(), 12);
    }
}
