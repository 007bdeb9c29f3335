use std::{env, fs, path::PathBuf};

const SETTINGS_FILENAME: &str = "settings.json";

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS_FILENAME}");

    // Place settings.json beside the built binary so `cargo run` and the
    // release artifact both find it in their own directory.
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let Some(target_dir) = out_dir.ancestors().nth(3) else {
        return;
    };

    if fs::metadata(SETTINGS_FILENAME).is_ok() {
        fs::copy(SETTINGS_FILENAME, target_dir.join(SETTINGS_FILENAME))
            .expect("Failed to copy settings.json");
    }
}
