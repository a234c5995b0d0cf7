pub mod auto;
pub mod logic;
pub mod maintenance;
pub mod settings;
