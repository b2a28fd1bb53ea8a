//! Bakes a fallback directory for `config.json` into the binary.
//!
//! An explicit `GRIDPACK_ROOT_HINT` at build time wins; otherwise the crate
//! directory is used so `cargo run` finds the checked-in configuration.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=GRIDPACK_ROOT_HINT");

    let Some(root) = env::var_os("GRIDPACK_ROOT_HINT")
        .filter(|value| !value.is_empty())
        .or_else(|| env::var_os("CARGO_MANIFEST_DIR"))
        .map(PathBuf::from)
    else {
        return;
    };

    let root = root.canonicalize().unwrap_or(root);
    println!("cargo:rustc-env=GRIDPACK_ROOT_HINT={}", root.display());
}
