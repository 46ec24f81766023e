//! Browser-free game rules: everything here runs (and is tested) natively.

pub mod canvas;
pub mod catalog;
pub mod config;
pub mod evaluator;
pub mod interaction;
pub mod layout;
pub mod report;
pub mod serializer;
pub mod session;
pub mod simulation;

pub use canvas::{NodeId, PlacedNode, Position};
pub use catalog::{Catalog, ComponentDef};
pub use evaluator::{Evaluator, EvaluatorBackend};
pub use interaction::{InteractionController, Modifiers};
pub use report::ReportLine;
pub use session::{LogEntry, Phase, Session};
pub use simulation::{NodeStatus, node_status};
