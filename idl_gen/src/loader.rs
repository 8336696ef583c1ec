/* Input loading: parsed IDL documents and generator config files */

use crate::codegen::GoCodeGeneratorOptions;
use anyhow::Context;
use idl_types::IdlFile;
use std::path::Path;
use tracing::debug;

/* Reads one AST document. `.json` files go through serde_json, anything
 * else is treated as YAML. */
pub fn load_idl_file(path: &Path) -> anyhow::Result<IdlFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let file: IdlFile = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?
    } else {
        serde_yml::from_str(&contents)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?
    };

    debug!(
        path = %path.display(),
        package = file.package.as_deref().unwrap_or(""),
        nodes = file.nodes.len(),
        "loaded IDL document"
    );
    Ok(file)
}

/* Loads several documents into one. The first declared package wins; node
 * order follows file order. */
pub fn load_idl_files(paths: &[impl AsRef<Path>]) -> anyhow::Result<IdlFile> {
    if paths.is_empty() {
        anyhow::bail!("no input files given");
    }

    let mut merged = IdlFile::default();
    for path in paths {
        let file = load_idl_file(path.as_ref())?;
        if merged.package.is_none() {
            merged.package = file.package;
        }
        merged.nodes.extend(file.nodes);
    }
    Ok(merged)
}

pub fn load_options(path: &Path) -> anyhow::Result<GoCodeGeneratorOptions> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let options = serde_yml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idl_types::Node;
    use std::fs;
    use tempfile::tempdir;

    const YAML_DOC: &str = r#"
package: shell
nodes:
  - kind: enum
    name: COLOR
    values:
      - name: RED
        value: ""
      - name: GREEN
        value: ""
"#;

    #[test]
    fn loads_yaml_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shell.yaml");
        fs::write(&path, YAML_DOC).unwrap();

        let file = load_idl_file(&path).unwrap();
        assert_eq!(file.package.as_deref(), Some("shell"));
        assert!(matches!(&file.nodes[0], Node::Enum(e) if e.values.len() == 2));
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(
            &path,
            r#"{"package": "x", "nodes": [{"kind": "typedef", "name": "HANDLE_T", "type": "void", "indirections": 1}]}"#,
        )
        .unwrap();

        let file = load_idl_file(&path).unwrap();
        assert!(matches!(&file.nodes[0], Node::Typedef(t) if t.indirections == 1));
    }

    #[test]
    fn merges_multiple_documents_in_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.yaml");
        let second = dir.path().join("b.yaml");
        fs::write(&first, YAML_DOC).unwrap();
        fs::write(
            &second,
            "package: other\nnodes:\n  - kind: module-constant\n    name: MAX_ITEMS\n    value: \"16\"\n",
        )
        .unwrap();

        let merged = load_idl_files(&[&first, &second]).unwrap();
        assert_eq!(merged.package.as_deref(), Some("shell"));
        assert_eq!(merged.nodes.len(), 2);
        assert_eq!(merged.nodes[1].name(), Some("MAX_ITEMS"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "nodes: [ {kind: interface").unwrap();

        let err = load_idl_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.yaml"));
    }

    #[test]
    fn loads_options_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("idl-gen.yaml");
        fs::write(&path, "root-interface: IDispatch\nemit-banner: false\n").unwrap();

        let options = load_options(&path).unwrap();
        assert_eq!(options.root_interface, "IDispatch");
        assert!(!options.emit_banner);
        assert!(options.emit_guids);
    }
}
