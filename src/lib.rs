pub mod aig;
pub mod cnf;
pub mod event;
pub mod fec;
pub mod fraig;
pub mod miter;
pub mod sim;
pub mod simplify;
pub mod strash;

// Re-exporting symbols and modules.
pub use aig::dfs;
pub use aig::{
    Aig, AigError, AigNode, FaninId, FecMembership, Literal, Node, NodeId, ParserError, Result,
};
