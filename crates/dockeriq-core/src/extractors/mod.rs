pub mod json;
pub mod path;
pub mod principal;
pub mod role;

pub use json::Json;
pub use path::Path;
pub use principal::Principal;
pub use role::require_role;
