pub mod admin;
pub mod health;
pub mod parcels;
pub mod users;
