pub mod inventory;
pub mod pack;
pub mod shared;
