//! Data models

pub mod analytics;
pub mod customer;
pub mod employee;
pub mod order;
pub mod product;
pub mod production;
pub mod role;
pub mod user;

pub use customer::{Customer, CustomerPayload};
pub use employee::{Employee, EmployeePayload};
pub use order::{CreateOrderRequest, Order};
pub use product::{Product, ProductPayload};
pub use production::{ProductionPayload, ProductionRecord};
pub use role::Role;
pub use user::{CreateUserRequest, LoginRequest, UpdateUserRequest, User};
