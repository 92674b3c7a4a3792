pub mod category;
pub mod post;
pub mod slug;
mod validation;

pub use validation::ValidationError;
