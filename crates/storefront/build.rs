//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so it can be served with far-future cache
//! headers: `static/css/main.css` is copied to
//! `static/css/derived/main.<hash>.css` and the hash is exposed to the
//! templates as `CSS_HASH`.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_stylesheet();
}

fn fingerprint_stylesheet() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static/css");
    let css_path = static_dir.join("main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:warning=main.css not found, serving unversioned stylesheet");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash = digest.get(..8).unwrap_or(&digest);
    println!("cargo:rustc-env=CSS_HASH={short_hash}");

    let derived_dir = static_dir.join("derived");
    fs::create_dir_all(&derived_dir).expect("failed to create derived CSS directory");
    fs::copy(&css_path, derived_dir.join(format!("main.{short_hash}.css")))
        .expect("failed to copy fingerprinted stylesheet");
}
