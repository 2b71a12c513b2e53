/// Name-based classification of mech parts (weapons, cockpit glass, helpers)
pub mod classify;
/// Formats, asset root, manifest discovery and target version
pub mod config;
/// File loading and path text utilities
pub mod data;
/// Error definitions
pub mod error;
/// Script generation: command stream, material, geometry and rig emitters
pub mod export;
/// Character definition (`.cdf`) parsing
pub mod manifest;
/// Material library (`.mtl`) parsing
pub mod materials;
/// Generic wrapper for values that may or may not match a known variant.
pub mod recognized;
