// Reactwatch: relay new LinkedIn post reactions to Discord, exactly once.
//
// This is the library root. Each module corresponds to one collaborator
// of the poll -> diff -> notify -> persist pipeline.

pub mod config;
pub mod db;
pub mod linkedin;
pub mod notify;
pub mod pipeline;
pub mod status;
