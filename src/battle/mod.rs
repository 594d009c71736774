pub mod action;
pub mod controller;
pub mod queue;
pub mod state;
pub mod view;

#[cfg(test)]
mod tests;
