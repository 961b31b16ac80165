/*!
Inactive-user pruner for a callosum-based analytics platform
*/

pub mod core;
