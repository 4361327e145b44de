use std::fs;

const CONFIG_PATH: &str = "src/default_config.toml";
const OFFSET_UNITS: [&str; 3] = ["utf16", "char", "byte"];

fn main() {
    println!("cargo:rerun-if-changed={CONFIG_PATH}");

    let content = fs::read_to_string(CONFIG_PATH).expect("Failed to read default_config.toml");
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {e}"),
    };

    // The bundled config falls back to defaults silently at runtime, so
    // catch bad values here.
    let offsets = table
        .get("format")
        .and_then(|format| format.get("offsets"))
        .and_then(|offsets| offsets.as_str());
    if let Some(offsets) = offsets {
        assert!(
            OFFSET_UNITS.contains(&offsets),
            "default_config.toml: unknown offset unit {offsets:?}"
        );
    }
}
