pub mod logs;
pub mod open;
pub mod scaffold;
