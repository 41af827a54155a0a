//! Logical tour nodes and validated picking orders.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Position, Warehouse};
use crate::error::{PickingError, PickingResult};

/// Product identifier as listed in the catalog.
pub type ItemId = u64;

/// A node of the access graph: the worker start, the worker end, or an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    Start,
    End,
    Item(ItemId),
}

impl Node {
    /// Returns the item id, if this node is an item.
    pub fn item(self) -> Option<ItemId> {
        match self {
            Node::Item(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` for the start and end markers.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Node::Item(_))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Start => f.write_str("Start"),
            Node::End => f.write_str("End"),
            Node::Item(id) => write!(f, "item {id}"),
        }
    }
}

/// A validated visiting order: `Start`, the ordered items, then `End`.
///
/// Every item is unique and resolvable to a shelf position in the
/// warehouse the order was validated against.
///
/// # Examples
///
/// ```
/// use u_picking::models::{Node, Order, Position, Warehouse};
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(2, 2)).unwrap();
/// wh.add_product(2, Position::new(3, 3)).unwrap();
///
/// let order = Order::new(&wh, &[2, 1]).unwrap();
/// assert_eq!(order.nodes(), &[Node::Start, Node::Item(2), Node::Item(1), Node::End]);
/// assert!(Order::new(&wh, &[1, 1]).is_err());
/// assert!(Order::new(&wh, &[9]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    nodes: Vec<Node>,
}

impl Order {
    /// Validates `items` against the warehouse catalog.
    pub fn new(warehouse: &Warehouse, items: &[ItemId]) -> PickingResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for &id in items {
            if !seen.insert(id) {
                return Err(PickingError::DuplicateItem(id));
            }
            if warehouse.product_position(id).is_none() {
                return Err(PickingError::UnknownItem(id));
            }
        }

        let mut nodes = Vec::with_capacity(items.len() + 2);
        nodes.push(Node::Start);
        nodes.extend(items.iter().map(|&id| Node::Item(id)));
        nodes.push(Node::End);
        Ok(Self { nodes })
    }

    /// Validates `items` and places items that share a shelf next to each
    /// other, keeping shelves in order of first appearance.
    pub fn grouped(warehouse: &Warehouse, items: &[ItemId]) -> PickingResult<Self> {
        let validated = Self::new(warehouse, items)?;

        let mut shelves: Vec<(Position, Vec<ItemId>)> = Vec::new();
        for id in validated.items() {
            let Some(position) = warehouse.product_position(id) else {
                continue;
            };
            match shelves.iter_mut().find(|(p, _)| *p == position) {
                Some((_, group)) => group.push(id),
                None => shelves.push((position, vec![id])),
            }
        }

        let regrouped: Vec<ItemId> = shelves.into_iter().flat_map(|(_, ids)| ids).collect();
        Self::new(warehouse, &regrouped)
    }

    /// All nodes, starting with `Start` and ending with `End`.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Item ids in visiting order.
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.nodes.iter().filter_map(|n| n.item())
    }

    /// Number of items (excluding `Start` and `End`).
    pub fn num_items(&self) -> usize {
        self.nodes.len() - 2
    }

    /// Number of nodes including `Start` and `End`.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: an order holds at least `Start` and `End`.
    pub fn is_empty(&self) -> bool {
        false
    }
}
