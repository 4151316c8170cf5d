pub mod content;
pub mod entity;
pub mod instruction;
pub mod schedule;
pub mod value;
