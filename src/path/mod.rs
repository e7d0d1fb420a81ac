//! Path types returned by searches and queries.

mod generic_path;
pub use generic_path::Path;

mod subgoal_path;
pub use subgoal_path::SubgoalPath;
