pub mod cart;
pub mod db;
pub mod edamam;
pub mod error;
pub mod lookup;
pub mod models;
