#![cfg(test)]

pub mod hook_flow_tests;
pub mod lifecycle_flow_tests;
