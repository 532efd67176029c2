//! Configuration stores for confkit
//!
//! This crate provides the `Configuration` abstraction and its in-memory,
//! environment, properties-file and composite implementations, a figment
//! based loader for YAML documents and environment variables, bean
//! construction helpers, and the settings of the `confctl` tool itself.

pub mod beans;
pub mod composite;
pub mod configuration;
pub mod environment;
pub mod loader;
pub mod map;
pub mod properties;
pub mod schema;
pub mod validation;

pub use beans::{create_bean, BeanDeclaration, BeanFactory, DefaultBeanFactory};
pub use composite::CompositeConfiguration;
pub use configuration::{Configuration, ConfigurationLookup};
pub use environment::EnvironmentConfiguration;
pub use loader::ConfigLoader;
pub use map::MapConfiguration;
pub use properties::PropertiesConfiguration;
pub use schema::*;
pub use validation::*;
