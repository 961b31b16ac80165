/*!
Core modules: configuration, inactivity resolution and the run orchestrator
*/

pub mod config;
pub mod inactivity;
pub mod pruner;
