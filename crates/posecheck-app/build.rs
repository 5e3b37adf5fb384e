use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

// Embeds the workspace `VERSION` file as `POSECHECK_VERSION`.
fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let version_path = manifest_dir
        .ancestors()
        .nth(2)
        .ok_or("crate is not nested under <root>/crates")?
        .join("VERSION");

    println!("cargo:rerun-if-changed={}", version_path.display());

    let version = fs::read_to_string(&version_path)?.trim().to_string();
    if version.is_empty() {
        return Err(format!("{} must contain a version", version_path.display()).into());
    }

    println!("cargo:rustc-env=POSECHECK_VERSION={version}");
    Ok(())
}
