mod plan;
mod request;

pub use plan::*;
pub use request::*;
