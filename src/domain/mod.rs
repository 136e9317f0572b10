pub mod export;
pub mod history;
pub mod inventory;
pub mod inventory_service;
pub mod jump_host;
pub mod seed;
pub mod types;
