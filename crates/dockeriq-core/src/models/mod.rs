pub mod shipment;
pub mod user;
pub mod user_details;
