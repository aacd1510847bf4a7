use super::*;

#[test]
fn test_extension_manifest_new() {
    let manifest = ExtensionManifest::new("tools-browser", "Browser Tools", Version::new(0, 1, 0));
    assert_eq!(manifest.id, "tools-browser");
    assert!(manifest.description.is_empty());
    assert!(manifest.tools.is_empty());
}

#[test]
fn test_with_tools_and_lookup() {
    let manifest = ExtensionManifest::new("ext", "Ext", Version::new(1, 0, 0))
        .with_description("maps pages")
        .with_tools(["browser_navigate", "browser_open"]);
    assert_eq!(manifest.description, "maps pages");
    assert!(manifest.provides_tool("browser_navigate"));
    assert!(!manifest.provides_tool("browser_click"));
}

#[test]
fn test_manifest_deserialize_defaults() {
    let json = serde_json::json!({
        "id": "ext",
        "name": "Ext",
        "version": {"major": 0, "minor": 1, "patch": 0}
    });
    let manifest: ExtensionManifest = serde_json::from_value(json).unwrap();
    assert!(manifest.tools.is_empty());
    assert_eq!(manifest.version.to_string(), "0.1.0");
}
