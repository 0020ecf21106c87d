//! Command implementations.

mod parse_ls;
mod plan;
mod render;
mod resolve;

pub use parse_ls::ParseLsCommand;
pub use plan::PlanCommand;
pub use render::RenderCommand;
pub use resolve::ResolveCommand;
