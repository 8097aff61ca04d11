pub mod shipments;
pub mod users;

pub use shipments::{ShipmentService, UpdateStatus};
pub use users::{CreateUser, UpdateDetails, UserService};
