pub mod accessors;
pub mod builtins;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod interpolate;
pub mod inventory;
pub mod menu;
pub mod params;
pub mod persistence;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod scene;
pub mod schedule;
pub mod state;
pub mod story;
pub mod time;
