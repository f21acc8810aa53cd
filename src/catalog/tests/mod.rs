//! Unit tests for the catalog backends.
