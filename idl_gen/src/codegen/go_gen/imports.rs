/* Go import tracking
 *
 * Each emitter returns the imports its text needs next to the text itself.
 * The orchestrator merges them; a BTreeSet keeps the preamble order stable
 * from run to run.
 */

use std::collections::BTreeSet;
use std::fmt;

pub const OLE_PATH: &str = "github.com/go-ole/go-ole";
pub const WINTYPES_PATH: &str = "github.com/jd3nn1s/gomidl/wintypes";
pub const UNICODE_PATH: &str = "golang.org/x/text/encoding/unicode";

/* Ordered by path first so the preamble reads like goimports output */
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoImport {
    pub path: String,
    pub alias: Option<String>,
}

impl GoImport {
    pub fn std(path: &str) -> Self {
        Self {
            path: path.to_string(),
            alias: None,
        }
    }

    pub fn aliased(alias: &str, path: &str) -> Self {
        Self {
            path: path.to_string(),
            alias: Some(alias.to_string()),
        }
    }

    pub fn unsafe_pkg() -> Self {
        Self::std("unsafe")
    }

    pub fn syscall() -> Self {
        Self::std("syscall")
    }

    pub fn log() -> Self {
        Self::std("log")
    }

    pub fn unicode() -> Self {
        Self::std(UNICODE_PATH)
    }
}

impl fmt::Display for GoImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} \"{}\"", alias, self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports(BTreeSet<GoImport>);

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, import: GoImport) {
        self.0.insert(import);
    }

    pub fn merge(&mut self, other: Imports) {
        self.0.extend(other.0);
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.0.iter().any(|import| import.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoImport> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /* Renders the parenthesised import block */
    pub fn render(&self) -> String {
        let mut out = String::from("import (\n");
        for import in &self.0 {
            out.push_str(&format!("\t{}\n", import));
        }
        out.push_str(")\n");
        out
    }
}

impl FromIterator<GoImport> for Imports {
    fn from_iter<I: IntoIterator<Item = GoImport>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_sorted_by_path_regardless_of_insert_order() {
        let mut a = Imports::new();
        a.insert(GoImport::syscall());
        a.insert(GoImport::aliased("ole", OLE_PATH));
        a.insert(GoImport::unsafe_pkg());

        let mut b = Imports::new();
        b.insert(GoImport::unsafe_pkg());
        b.insert(GoImport::syscall());
        b.insert(GoImport::aliased("ole", OLE_PATH));

        assert_eq!(a.render(), b.render());
        assert_eq!(
            a.render(),
            "import (\n\tole \"github.com/go-ole/go-ole\"\n\t\"syscall\"\n\t\"unsafe\"\n)\n"
        );
    }

    #[test]
    fn merge_deduplicates() {
        let mut a: Imports = [GoImport::log(), GoImport::syscall()].into_iter().collect();
        let b: Imports = [GoImport::syscall(), GoImport::unicode()].into_iter().collect();
        a.merge(b);
        assert_eq!(a.len(), 3);
        assert!(a.contains_path(UNICODE_PATH));
    }
}
