use std::env;
use std::fs;
use std::path::Path;

fn read_api_version(manifest_dir: &str) -> i64 {
    let cargo_toml_path = Path::new(manifest_dir).join("Cargo.toml");
    let cargo_toml_content = fs::read_to_string(&cargo_toml_path)
        .expect("Failed to read Cargo.toml");

    let cargo_toml: toml::Value = cargo_toml_content.parse()
        .expect("Failed to parse Cargo.toml");

    cargo_toml
        .get("package")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("plugbase"))
        .and_then(|g| g.get("api_version"))
        .and_then(|v| v.as_integer())
        .expect("Failed to find package.metadata.plugbase.api_version in Cargo.toml")
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let version_api_path = Path::new(&out_dir).join("version_api.rs");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let api_version = read_api_version(&manifest_dir);

    let version_content = format!(
        "// Auto-generated API version from Cargo.toml metadata\n\
         // Source: package.metadata.plugbase.api_version = {}\n\
         pub const BASE_API_VERSION: i64 = {};\n",
        api_version, api_version
    );

    fs::write(&version_api_path, version_content)
        .expect("Failed to write version_api.rs");

    // Tell cargo to rerun if Cargo.toml changes
    println!("cargo:rerun-if-changed=Cargo.toml");
}
