use serde::{Deserialize, Serialize};
use uuid::Uuid;

///
/// Leaf in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub enum LeafLabel {
    /// Non-silent activity leaf
    Activity(String),
    /// Silent activity leaf
    Tau,
}

///
/// Node in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Operator node of a process tree
    Operator(Operator),
    /// Leaf node of a process tree
    Leaf(Leaf),
}

impl Node {
    ///
    /// Returns the identifier of a node in a process tree
    ///
    pub fn get_uuid(&self) -> &Uuid {
        match self {
            Node::Operator(op) => &op.uuid,
            Node::Leaf(leaf) => &leaf.uuid,
        }
    }

    ///
    /// Creates a new [`Node::Operator`] with the given [`OperatorType`]
    ///
    pub fn new_operator(op_type: OperatorType) -> Self {
        Node::Operator(Operator::new(op_type))
    }

    ///
    /// Creates a new non-silent or silent leaf [`Node`]
    ///
    pub fn new_leaf(leaf_label: Option<String>) -> Self {
        Node::Leaf(Leaf::new(leaf_label))
    }

    ///
    /// Adds a node as child if the node is an operator node
    ///
    /// Returns the rejected child if this node is a leaf.
    ///
    pub fn add_child(&mut self, child: Node) -> Result<(), Node> {
        match self {
            Node::Operator(op) => {
                op.children.push(child);
                Ok(())
            }
            Node::Leaf(_) => Err(child),
        }
    }

    ///
    /// Builder variant of [`Node::add_child`]
    ///
    /// Only operators take children. In debug builds, adding a child to a leaf panics; in
    /// release builds the child is dropped. Use [`Node::add_child`] to handle that case.
    ///
    pub fn with_child(mut self, child: Node) -> Self {
        debug_assert!(
            matches!(self, Node::Operator(_)),
            "leaf nodes cannot have children"
        );
        let _ = self.add_child(child);
        self
    }

    ///
    /// Returns `true` if a loop operator has two or three children (do, redo, optional exit)
    /// or if all other operators have at least one child.
    ///
    pub fn check_children_valid(&self) -> bool {
        match self {
            Node::Operator(op) => match op.operator_type {
                OperatorType::Loop => (2..=3).contains(&op.children.len()),
                _ => !op.children.is_empty(),
            },
            Node::Leaf(_) => true,
        }
    }
}

///
/// Operator type enum for [`Operator`]
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorType {
    /// Sequence operator
    Sequence,
    /// Exclusive choice operator
    ExclusiveChoice,
    /// Concurrency operator
    Concurrency,
    /// Loop operator (do, redo and an optional exit child)
    Loop,
}

///
/// Process tree struct that contains [`Node`] as root
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTree {
    /// The root of the process tree
    pub root: Node,
}

impl ProcessTree {
    ///
    /// Initializes the process tree with the given node as root
    ///
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    ///
    /// Returns the first operator (in breadth-first order) with an invalid number of children
    ///
    pub fn find_invalid_operator(&self) -> Option<&Operator> {
        let mut curr_nodes: Vec<&Node> = vec![&self.root];
        while !curr_nodes.is_empty() {
            let mut next_nodes = Vec::new();
            for node in curr_nodes {
                if let Node::Operator(op) = node {
                    if !node.check_children_valid() {
                        return Some(op);
                    }
                    next_nodes.extend(op.children.iter());
                }
            }
            curr_nodes = next_nodes;
        }
        None
    }

    ///
    /// Returns `true` if all operators have the right number of children
    ///
    pub fn is_valid(&self) -> bool {
        self.find_invalid_operator().is_none()
    }

    ///
    /// Returns all descendant [`Leaf`]
    ///
    pub fn find_all_leaves(&self) -> Vec<&Leaf> {
        let mut result: Vec<&Leaf> = Vec::new();

        let mut curr_operators: Vec<&Operator> = Vec::new();
        match &self.root {
            Node::Operator(op) => curr_operators.push(op),
            Node::Leaf(leaf) => result.push(leaf),
        };

        let mut next_operators = Vec::new();

        while !curr_operators.is_empty() {
            curr_operators.iter().for_each(|op| {
                op.children.iter().for_each(|child| match child {
                    Node::Operator(op) => next_operators.push(op),
                    Node::Leaf(leaf) => result.push(leaf),
                })
            });

            curr_operators = next_operators;
            next_operators = Vec::new();
        }

        result
    }
}

///
/// An operator node in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// The node ID
    pub uuid: Uuid,
    /// The [`OperatorType`] of the tree itself
    pub operator_type: OperatorType,
    /// The children nodes of the operator node
    pub children: Vec<Node>,
}

impl Operator {
    ///
    /// A constructor for the struct that initializes with the given [`OperatorType`] and
    /// otherwise a fresh [`Uuid`] and an empty list of children
    ///
    pub fn new(operator_type: OperatorType) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            operator_type,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
///
/// A leaf in a process tree
///
pub struct Leaf {
    /// The identifier of the leaf
    pub uuid: Uuid,
    /// The silent or non-silent activity label [`LeafLabel`]
    pub activity_label: LeafLabel,
}

impl Leaf {
    ///
    /// Creates a new [`Leaf`] either by using a given label or making it silent if a label
    /// is missing
    ///
    pub fn new(leaf_label: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            activity_label: match leaf_label {
                Some(label) => LeafLabel::Activity(label),
                None => LeafLabel::Tau,
            },
        }
    }
}
