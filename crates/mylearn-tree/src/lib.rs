//! Decision tree induction and querying.
//!
//! Two builders share one split evaluator ([`split`]) and one stopping rule
//! ([`TreeParams`]): a correlation/median builder that emits a [`FlatTree`]
//! and an information-gain builder that emits a [`GainTree`]. Both encodings
//! answer queries through [`TreeQuery`].

pub mod decision_tree;
pub mod flat;
pub mod graph;
pub mod params;
pub mod query;
pub mod split;

pub use decision_tree::{DecisionTree, FittedTree};
pub use flat::{CorrelationTreeBuilder, FlatNode, FlatTree, LEAF};
pub use graph::{GainTree, GainTreeBuilder, GraphNode, NodeId};
pub use params::{Criterion, StopReason, TreeParams};
pub use query::TreeQuery;
