use super::math::{Aabb, Vec3};

const LEAF_SIZE: usize = 4;

#[derive(Clone, Copy, Debug)]
enum NodeKind {
    /// `len` primitives starting at `first` in `Bvh::order`.
    Leaf { first: usize, len: usize },
    /// The left child is stored right after its parent.
    Branch { right: usize },
}

#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Aabb,
    kind: NodeKind,
}

/// Bounding volume hierarchy over primitive boxes, laid out depth first and
/// split at the centroid median of the widest axis.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    order: Vec<usize>,
}

impl Bvh {
    pub fn build(boxes: &[Aabb]) -> Self {
        let mut order: Vec<usize> = (0..boxes.len()).collect();
        let mut nodes = Vec::with_capacity(2 * boxes.len().div_ceil(LEAF_SIZE));
        if !boxes.is_empty() {
            split(&mut nodes, boxes, &mut order, 0);
        }
        Self { nodes, order }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Closest primitive along the ray as `(primitive, t)`.
    ///
    /// `hit` gives the ray parameter where primitive `i` is crossed. Nodes
    /// entered beyond the best hit so far are never visited.
    pub fn nearest(
        &self,
        origin: Vec3,
        dir: Vec3,
        mut hit: impl FnMut(usize) -> Option<f64>,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        let mut stack: Vec<(usize, f64)> = Vec::new();
        if !self.nodes.is_empty() {
            stack.extend(self.entry(0, origin, dir, f64::INFINITY));
        }

        while let Some((index, enter)) = stack.pop() {
            let limit = best.map_or(f64::INFINITY, |(_, t)| t);
            if enter > limit {
                continue;
            }
            match self.nodes[index].kind {
                NodeKind::Leaf { first, len } => {
                    for &prim in &self.order[first..first + len] {
                        let Some(t) = hit(prim) else {
                            continue;
                        };
                        if best.is_none_or(|(_, best_t)| t < best_t) {
                            best = Some((prim, t));
                        }
                    }
                }
                NodeKind::Branch { right } => {
                    let mut children = [
                        self.entry(index + 1, origin, dir, limit),
                        self.entry(right, origin, dir, limit),
                    ];
                    // Farther child goes on the stack first.
                    children.sort_by(|a, b| enter_of(b).total_cmp(&enter_of(a)));
                    stack.extend(children.into_iter().flatten());
                }
            }
        }
        best
    }

    fn entry(&self, index: usize, origin: Vec3, dir: Vec3, limit: f64) -> Option<(usize, f64)> {
        self.nodes[index]
            .bounds
            .ray_interval(origin, dir, limit)
            .map(|(enter, _)| (index, enter))
    }
}

fn enter_of(entry: &Option<(usize, f64)>) -> f64 {
    entry.map_or(f64::INFINITY, |(_, enter)| enter)
}

/// Appends the subtree over `order` and returns its root. `first` is the
/// offset of `order` inside the full ordering.
fn split(nodes: &mut Vec<Node>, boxes: &[Aabb], order: &mut [usize], first: usize) -> usize {
    let index = nodes.len();
    let bounds = order[1..]
        .iter()
        .fold(boxes[order[0]], |acc, &prim| acc.union(boxes[prim]));

    if order.len() <= LEAF_SIZE {
        nodes.push(Node {
            bounds,
            kind: NodeKind::Leaf {
                first,
                len: order.len(),
            },
        });
        return index;
    }

    let axis = Aabb::enclosing(order.iter().map(|&prim| boxes[prim].center()))
        .map_or(0, |centers| centers.longest_axis());
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        boxes[a].center().axis(axis).total_cmp(&boxes[b].center().axis(axis))
    });

    nodes.push(Node {
        bounds,
        kind: NodeKind::Branch { right: index },
    });
    let (left, right) = order.split_at_mut(mid);
    split(nodes, boxes, left, first);
    let right_index = split(nodes, boxes, right, first + mid);
    nodes[index].kind = NodeKind::Branch { right: right_index };
    index
}
