//! Property-based tests for the walk protocol invariants
