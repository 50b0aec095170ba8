pub mod components;
pub mod gesture;
pub mod layout;
pub mod theme;
