// Feature layout and encodings shared by all model families
pub mod ml;

// Cities, weather, building types, requests
pub mod solar;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
