pub mod error;
pub mod pagination;
pub mod soft_delete;
pub mod update_intent;
