//! Traveling salesman relaxation with lazy subtour elimination.
//!
//! # References
//!
//! - Dantzig, Fulkerson & Johnson (1954), "Solution of a Large-Scale
//!   Traveling-Salesman Problem"
//! - Held & Karp (1970), "The Traveling-Salesman Problem and Minimum
//!   Spanning Trees"

mod config;
mod relaxation;

pub use config::TspConfig;
pub use relaxation::{FractionalEdge, TspRelaxation, TspStatus};
