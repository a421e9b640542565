pub mod db;
pub mod partner;

pub use db::DbAdapter;
pub use partner::{HttpPartnerAdapter, PartnerConfig};
