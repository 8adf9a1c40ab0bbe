use latte_info::memory;
use std::{env, path::PathBuf};

fn main() {
    // Only the bare-metal payload is linked with our script; host builds
    // (tests, the stub binary) use the default linker setup.
    println!("cargo:rerun-if-changed=build.rs");
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
        return;
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let ld = manifest_dir.join("starbuck.ld");

    let load = memory::ARM_PAYLOAD_ADDR.as_u32();
    let max_size = memory::ARM_PAYLOAD_MAX_SIZE;
    assert_eq!(
        load & 0xfff,
        0,
        "ARM_PAYLOAD_ADDR must be 4 KiB aligned (got {load:#x})"
    );

    println!("cargo:rerun-if-changed={}", ld.display());
    println!("cargo:rustc-link-arg-bins=-T{}", ld.display());
    println!("cargo:rustc-link-arg-bins=--defsym=PAYLOAD_BASE={load:#x}");
    println!("cargo:rustc-link-arg-bins=--defsym=PAYLOAD_MAX_SIZE={max_size:#x}");
}
