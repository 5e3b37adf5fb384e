#![warn(missing_docs)]
//! # posecheck-contract-tests
//!
//! Loads the frozen JSON schemas and fixtures under the workspace
//! `contracts/` directory for schema and parser conformance tests.

use std::path::PathBuf;

use jsonschema::JSONSchema;
use serde_json::Value;

/// Absolute path of a file under `contracts/`.
pub fn contract_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../contracts")
        .join(relative)
}

/// Raw bytes of a contract file.
///
/// # Panics
/// Panics when the file is missing; contract files are part of the tree.
pub fn load_raw(relative: &str) -> Vec<u8> {
    let path = contract_path(relative);
    std::fs::read(&path).unwrap_or_else(|error| panic!("{} unreadable: {error}", path.display()))
}

/// Contract file parsed as JSON.
///
/// # Panics
/// Panics when the file is missing or is not JSON.
pub fn load_json(relative: &str) -> Value {
    serde_json::from_slice(&load_raw(relative))
        .unwrap_or_else(|error| panic!("{relative} is not valid json: {error}"))
}

/// Compiles a schema file into a validator.
///
/// # Panics
/// Panics when the schema does not compile.
pub fn compile_validator(relative: &str) -> JSONSchema {
    let schema = load_json(relative);
    JSONSchema::compile(&schema)
        .unwrap_or_else(|error| panic!("{relative} does not compile: {error}"))
}
