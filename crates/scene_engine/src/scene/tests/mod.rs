//! Cross-module scene graph tests

mod propagation_integration;
mod threaded_queue;
