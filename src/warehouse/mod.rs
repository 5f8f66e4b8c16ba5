pub mod code;
pub mod error;
pub mod models;
pub mod navigator;
pub mod permission;
pub mod service;

pub use code::validate_code;
pub use error::{WarehouseError, WarehouseResult};
pub use navigator::{EntityRef, HierarchyNavigator};
pub use permission::{Action, PermissionResolver, Role};
pub use service::WarehouseService;
