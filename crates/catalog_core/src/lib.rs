pub mod aggregation;
pub mod commands;
pub mod domain;
pub mod field_map;
pub mod memory;
pub mod ports;
pub mod projection;

pub use aggregation::{AggregationService, SearchResults, SearchStats, INTERNAL_ORIGIN};
pub use domain::{Book, BookPatch, NewBook, NewUser, Role, User, UserPatch};
pub use field_map::{resolve_field, FieldMapping};
pub use ports::{CatalogStore, ExternalBookSource, PortError, PortResult, UserStore};
pub use projection::{BookView, UserView};
