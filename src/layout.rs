// 📐 Tidy tree layout
//
// Reingold-Tilford with Buchheim's linear-time refinements, following the
// d3-hierarchy `tree()` layout with a fixed node size: siblings sit one node
// width apart, cousins two, the root at x = 0 and every depth one row down.
//
// Nodes live in an arena indexed in pre-order; index 0 is a synthetic parent
// of the root so the root can be treated like any other child.

use crate::normalize::DisplayNode;

/// A display node with its assigned position (top-left of its box)
#[derive(Debug, Clone)]
pub struct LayoutNode<'n, 'a> {
    pub node: &'n DisplayNode<'a>,
    /// Index of the parent in the layout vector
    pub parent: Option<usize>,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone)]
struct WalkNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings
    number: usize,
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
}

impl WalkNode {
    fn new(idx: usize, parent: Option<usize>, number: usize) -> Self {
        WalkNode {
            parent,
            children: Vec::new(),
            number,
            default_ancestor: None,
            ancestor: idx,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
        }
    }
}

/// Lay out `root` with boxes `node_size[0]` apart horizontally and
/// `node_size[1]` apart vertically. Output is in pre-order.
pub fn layout_tree<'n, 'a>(root: &'n DisplayNode<'a>, node_size: [f64; 2]) -> Vec<LayoutNode<'n, 'a>> {
    let mut entries = Vec::with_capacity(root.count());
    let mut walk = vec![WalkNode::new(0, None, 0)];
    push_node(&mut entries, &mut walk, root, 0, 0, 0);

    let mut order = Vec::with_capacity(walk.len());
    post_order(&walk, 1, &mut order);
    for v in order {
        first_walk(&mut walk, v);
    }

    walk[0].modifier = -walk[1].prelim;
    // Arena indices are already pre-order, so parents precede children
    for v in 1..walk.len() {
        second_walk(&mut walk, v);
    }

    let [dx, dy] = node_size;
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.x = walk[i + 1].prelim * dx;
        entry.y = entry.depth as f64 * dy;
    }
    entries
}

/// Extent of all boxes of `width` x `height` placed at the layout positions
pub fn bounds(nodes: &[LayoutNode<'_, '_>], width: f64, height: f64) -> Option<Bounds> {
    let first = nodes.first()?;
    let mut b = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x + width,
        max_y: first.y + height,
    };
    for n in nodes {
        b.min_x = b.min_x.min(n.x);
        b.min_y = b.min_y.min(n.y);
        b.max_x = b.max_x.max(n.x + width);
        b.max_y = b.max_y.max(n.y + height);
    }
    Some(b)
}

fn push_node<'n, 'a>(
    entries: &mut Vec<LayoutNode<'n, 'a>>,
    walk: &mut Vec<WalkNode>,
    node: &'n DisplayNode<'a>,
    walk_parent: usize,
    number: usize,
    depth: usize,
) {
    let idx = walk.len();
    walk.push(WalkNode::new(idx, Some(walk_parent), number));
    walk[walk_parent].children.push(idx);
    entries.push(LayoutNode {
        node,
        // The synthetic root (0) is not a layout entry
        parent: if walk_parent == 0 { None } else { Some(walk_parent - 1) },
        depth,
        x: 0.0,
        y: 0.0,
    });

    for (i, child) in node.children.iter().enumerate() {
        push_node(entries, walk, child, idx, i, depth + 1);
    }
}

fn post_order(walk: &[WalkNode], v: usize, out: &mut Vec<usize>) {
    for &c in &walk[v].children {
        post_order(walk, c, out);
    }
    out.push(v);
}

fn separation(walk: &[WalkNode], a: usize, b: usize) -> f64 {
    if walk[a].parent == walk[b].parent {
        1.0
    } else {
        2.0
    }
}

fn next_left(walk: &[WalkNode], v: usize) -> Option<usize> {
    walk[v].children.first().copied().or(walk[v].thread)
}

fn next_right(walk: &[WalkNode], v: usize) -> Option<usize> {
    walk[v].children.last().copied().or(walk[v].thread)
}

fn move_subtree(walk: &mut [WalkNode], wm: usize, wp: usize, shift: f64) {
    let change = shift / (walk[wp].number - walk[wm].number) as f64;
    walk[wp].change -= change;
    walk[wp].shift += shift;
    walk[wm].change += change;
    walk[wp].prelim += shift;
    walk[wp].modifier += shift;
}

fn execute_shifts(walk: &mut [WalkNode], v: usize) {
    let mut shift = 0.0;
    let mut change = 0.0;
    let children = walk[v].children.clone();
    for &w in children.iter().rev() {
        walk[w].prelim += shift;
        walk[w].modifier += shift;
        change += walk[w].change;
        shift += walk[w].shift + change;
    }
}

fn next_ancestor(walk: &[WalkNode], vim: usize, v: usize, ancestor: usize) -> usize {
    let a = walk[vim].ancestor;
    if walk[a].parent == walk[v].parent {
        a
    } else {
        ancestor
    }
}

fn first_walk(walk: &mut [WalkNode], v: usize) {
    let Some(parent) = walk[v].parent else {
        return;
    };
    let number = walk[v].number;
    let left_sibling = if number > 0 {
        Some(walk[parent].children[number - 1])
    } else {
        None
    };

    if let (Some(&first), Some(&last)) = (walk[v].children.first(), walk[v].children.last()) {
        execute_shifts(walk, v);
        let midpoint = (walk[first].prelim + walk[last].prelim) / 2.0;
        match left_sibling {
            Some(w) => {
                walk[v].prelim = walk[w].prelim + separation(walk, v, w);
                walk[v].modifier = walk[v].prelim - midpoint;
            }
            None => walk[v].prelim = midpoint,
        }
    } else if let Some(w) = left_sibling {
        walk[v].prelim = walk[w].prelim + separation(walk, v, w);
    }

    let default_ancestor = walk[parent]
        .default_ancestor
        .unwrap_or(walk[parent].children[0]);
    walk[parent].default_ancestor = Some(apportion(walk, v, left_sibling, default_ancestor));
}

/// Push the subtree at `v` right until its left contour clears the right
/// contour of everything to its left; returns the new default ancestor.
fn apportion(walk: &mut [WalkNode], v: usize, left_sibling: Option<usize>, ancestor: usize) -> usize {
    let Some(w) = left_sibling else {
        return ancestor;
    };
    let Some(parent) = walk[v].parent else {
        return ancestor;
    };

    let mut ancestor = ancestor;
    let mut vip = v;
    let mut vop = v;
    let mut vim = w;
    let mut vom = walk[parent].children[0];
    let mut sip = walk[vip].modifier;
    let mut sop = walk[vop].modifier;
    let mut sim = walk[vim].modifier;
    let mut som = walk[vom].modifier;

    let mut next_vim = next_right(walk, vim);
    let mut next_vip = next_left(walk, vip);

    while let (Some(nvim), Some(nvip)) = (next_vim, next_vip) {
        vim = nvim;
        vip = nvip;
        let (Some(nvom), Some(nvop)) = (next_left(walk, vom), next_right(walk, vop)) else {
            break;
        };
        vom = nvom;
        vop = nvop;
        walk[vop].ancestor = v;

        let shift = walk[vim].prelim + sim - walk[vip].prelim - sip + separation(walk, vim, vip);
        if shift > 0.0 {
            let a = next_ancestor(walk, vim, v, ancestor);
            move_subtree(walk, a, v, shift);
            sip += shift;
            sop += shift;
        }

        sim += walk[vim].modifier;
        sip += walk[vip].modifier;
        som += walk[vom].modifier;
        sop += walk[vop].modifier;

        next_vim = next_right(walk, vim);
        next_vip = next_left(walk, vip);
    }

    if let Some(nvim) = next_vim {
        if next_right(walk, vop).is_none() {
            walk[vop].thread = Some(nvim);
            walk[vop].modifier += sim - sop;
        }
    }

    if let Some(nvip) = next_vip {
        if next_left(walk, vom).is_none() {
            walk[vom].thread = Some(nvip);
            walk[vom].modifier += sip - som;
            ancestor = v;
        }
    }

    ancestor
}

fn second_walk(walk: &mut [WalkNode], v: usize) {
    let Some(parent) = walk[v].parent else {
        return;
    };
    let parent_modifier = walk[parent].modifier;
    walk[v].prelim += parent_modifier;
    walk[v].modifier += parent_modifier;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::normalize::normalize;
    use serde_json::{json, Value};

    const SIZE: [f64; 2] = [100.0, 50.0];

    fn positions(nodes: &[LayoutNode<'_, '_>]) -> Vec<(String, f64, f64)> {
        nodes
            .iter()
            .map(|n| (n.node.name.clone(), n.x, n.y))
            .collect()
    }

    fn assert_no_overlap(nodes: &[LayoutNode<'_, '_>], min_gap: f64) {
        let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        for depth in 0..=max_depth {
            let mut xs: Vec<f64> = nodes.iter().filter(|n| n.depth == depth).map(|n| n.x).collect();
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for pair in xs.windows(2) {
                assert!(
                    pair[1] - pair[0] >= min_gap - 1e-9,
                    "nodes at depth {} overlap: {:?}",
                    depth,
                    xs
                );
            }
        }
    }

    fn wide_customer() -> Value {
        json!({
            "tradingName": "Root",
            "accounts": [
                {
                    "tradingName": "A",
                    "children": [
                        { "tradingName": "A1", "addresses": [{ "city": "x" }, { "city": "y" }, { "city": "z" }] },
                        { "tradingName": "A2" }
                    ]
                },
                { "tradingName": "B" },
                {
                    "tradingName": "C",
                    "contactPersons": [
                        { "lastName": "C1", "commChannels": [{ "value": "p" }, { "value": "q" }] },
                        { "lastName": "C2" }
                    ]
                }
            ],
            "addresses": [{ "city": "last" }]
        })
    }

    #[test]
    fn test_single_node_at_origin() {
        let customer = json!({ "tradingName": "Solo" });
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);
        assert_eq!(positions(&nodes), vec![("Solo".to_string(), 0.0, 0.0)]);
        assert_eq!(nodes[0].parent, None);
    }

    #[test]
    fn test_two_children_centered_under_root() {
        let customer = json!({ "tradingName": "R", "addresses": [{ "city": "a" }, { "city": "b" }] });
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);
        assert_eq!(
            positions(&nodes),
            vec![
                ("R".to_string(), 0.0, 0.0),
                ("a".to_string(), -50.0, 50.0),
                ("b".to_string(), 50.0, 50.0),
            ]
        );
        assert_eq!(nodes[1].parent, Some(0));
        assert_eq!(nodes[2].parent, Some(0));
    }

    #[test]
    fn test_root_stays_at_zero_and_rows_follow_depth() {
        let customer = wide_customer();
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);

        assert_eq!(nodes[0].x, 0.0);
        for n in &nodes {
            assert_eq!(n.y, n.depth as f64 * SIZE[1]);
        }
        assert_eq!(nodes.len(), root.count());
    }

    #[test]
    fn test_no_overlap_within_rows() {
        let customer = wide_customer();
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);
        assert_no_overlap(&nodes, SIZE[0]);
    }

    #[test]
    fn test_children_keep_sibling_order() {
        let customer = wide_customer();
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);

        for (parent_idx, _) in nodes.iter().enumerate() {
            let xs: Vec<f64> = nodes
                .iter()
                .filter(|n| n.parent == Some(parent_idx))
                .map(|n| n.x)
                .collect();
            assert!(xs.windows(2).all(|p| p[0] < p[1]));
        }
    }

    #[test]
    fn test_parent_centered_over_children() {
        let customer = wide_customer();
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);

        for (idx, n) in nodes.iter().enumerate() {
            let xs: Vec<f64> = nodes
                .iter()
                .filter(|c| c.parent == Some(idx))
                .map(|c| c.x)
                .collect();
            if let (Some(first), Some(last)) = (xs.first(), xs.last()) {
                assert!((n.x - (first + last) / 2.0).abs() < 1e-9, "{} not centered", n.node.name);
            }
        }
    }

    #[test]
    fn test_bounds() {
        let customer = json!({ "tradingName": "R", "addresses": [{ "city": "a" }, { "city": "b" }] });
        let root = normalize(&customer, Category::Global);
        let nodes = layout_tree(&root, SIZE);
        let b = bounds(&nodes, 80.0, 40.0).unwrap();
        assert_eq!(b, Bounds { min_x: -50.0, min_y: 0.0, max_x: 130.0, max_y: 90.0 });
        assert!(bounds(&[], 80.0, 40.0).is_none());
    }
}
