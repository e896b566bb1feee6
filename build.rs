//! Build script — Tauri codegen only, no platform-specific steps.

fn main() {
    tauri_build::build();
}
