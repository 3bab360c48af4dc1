fn main() {
    tauri_build::try_build(tauri_build::Attributes::new().app_manifest(
        tauri_build::AppManifest::new().commands(&[
            "flowr_bridge_is_desktop_runtime",
            "flowr_bridge_send",
        ]),
    ))
    .expect("failed to run tauri build script");
}
