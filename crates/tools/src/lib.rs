//! Data tools for Storewise.
//!
//! Tools give the agents their view of the business and the world outside:
//! store performance and inventory analytics through Genie, the conduct
//! policy function, state census figures and web research.
//!
//! Every backend sits behind a small trait ([`storewise_genie::GenieApi`],
//! [`policy::FunctionRegistry`], [`census::CensusApi`],
//! [`storewise_core::Provider`]) so the tools can be exercised offline.

pub mod census;
pub mod genie_tools;
pub mod policy;
pub mod research;
pub mod toolkit;

pub use census::{CENSUS_TOOL, CensusApi, CensusTool, HttpCensusApi};
pub use genie_tools::{GenieTool, PRODUCT_INVENTORY_TOOL, STORE_PERFORMANCE_TOOL};
pub use policy::{FunctionRegistry, POLICY_TOOL, PolicyTool, SqlFunctionRegistry};
pub use research::{RESEARCH_TOOL, ResearchClient, ResearchOptions, ResearchTool};
pub use toolkit::{Toolkit, UnconfiguredTool};
