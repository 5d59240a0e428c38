// trajectory-service-rs/src/tests/mod.rs
// In-crate integration tests exercising the HTTP query surface
