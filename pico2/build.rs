//! Build script for obdeck-pico2
//!
//! Puts memory.x on the linker search path and adds the cortex-m-rt and
//! defmt linker scripts when building for the RP2350.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() != Ok("arm") {
        return;
    }

    let Ok(out_dir) = env::var("OUT_DIR").map(PathBuf::from) else {
        return;
    };
    if let Err(e) = fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")) {
        println!("cargo:warning=Failed to copy memory.x: {}", e);
        return;
    }
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
