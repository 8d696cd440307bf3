//! Fact documents from a directory of JSON dumps
//!
//! Every `*.json` file under the root is one document, identified by its
//! file stem. A dump with a `values` mapping uses it as the facts and reads
//! `trusted` / `trusted_external` beside it; any other mapping is taken as
//! the facts themselves.

use crate::error::LoadError;
use nodematrix_core::facts::{FactDocument, FactSource, SourceError};
use nodematrix_core::log_warning;
use nodematrix_core::logging::codes;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

type Listing = Vec<(String, PathBuf)>;

/// The directory is scanned once; call [`DirectoryFactSource::refresh`] to
/// pick up files added later
#[derive(Debug, Clone)]
pub struct DirectoryFactSource {
    root: PathBuf,
    listing: OnceLock<Result<Listing, SourceError>>,
}

impl DirectoryFactSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            listing: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drop the cached listing
    pub fn refresh(&mut self) {
        self.listing = OnceLock::new();
    }

    /// `(identity, path)` for every fact file, sorted by file name
    fn files(&self) -> Result<&[(String, PathBuf)], SourceError> {
        self.listing
            .get_or_init(|| self.scan())
            .as_deref()
            .map_err(|error| error.clone())
    }

    fn scan(&self) -> Result<Listing, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::Unavailable {
                reason: format!("fact directory {} does not exist", self.root.display()),
            });
        }

        let mut files: Listing = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_json_file(entry.path()))
            .filter_map(|entry| {
                let identity = entry.path().file_stem()?.to_str()?.to_string();
                Some((identity, entry.into_path()))
            })
            .collect();

        files.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
        Ok(files)
    }

    fn read(identity: &str, path: &Path) -> Result<FactDocument, SourceError> {
        load_document(identity, path).map_err(|error| SourceError::Malformed {
            identity: identity.to_string(),
            reason: error.to_string(),
        })
    }
}

impl FactSource for DirectoryFactSource {
    /// Unreadable documents are skipped with a warning
    fn documents(&self) -> Result<Vec<FactDocument>, SourceError> {
        let mut documents = Vec::new();
        for (identity, path) in self.files()? {
            match Self::read(identity, path) {
                Ok(document) => documents.push(document),
                Err(error) => {
                    log_warning!(code = codes::facts::MALFORMED_DOCUMENT,
                        "Skipping unreadable fact document",
                        "path" => path.display(),
                        "error" => &error
                    );
                }
            }
        }
        Ok(documents)
    }

    fn identities(&self) -> Result<Vec<String>, SourceError> {
        Ok(self
            .files()?
            .iter()
            .map(|(identity, _)| identity.clone())
            .collect())
    }

    fn lookup(&self, identity: &str) -> Result<Option<FactDocument>, SourceError> {
        match self.files()?.iter().find(|(name, _)| name == identity) {
            Some((identity, path)) => Self::read(identity, path).map(Some),
            None => Ok(None),
        }
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Parse one fact dump
pub fn load_document(identity: &str, path: &Path) -> Result<FactDocument, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(document_from_value(identity, value))
}

pub fn document_from_value(identity: &str, value: Value) -> FactDocument {
    match value {
        Value::Object(mut dump) if matches!(dump.get("values"), Some(Value::Object(_))) => {
            let facts = dump.remove("values").unwrap_or(Value::Null);
            let mut document = FactDocument::new(identity, facts);
            if let Some(trusted) = dump.remove("trusted") {
                document = document.with_trusted(trusted);
            }
            if let Some(external) = dump.remove("trusted_external") {
                document = document.with_trusted_external(external);
            }
            document
        }
        other => FactDocument::new(identity, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use nodematrix_core::config::IngestPreferences;
    use nodematrix_core::facts::{ingest, IngestOutcome};
    use serde_json::json;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, value: Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_identities_sorted_by_file_name() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();
        fs::create_dir(temp_path.join("nested")).unwrap();

        write(temp_path, "Debian-8.json", json!({"kernel": "Linux"}));
        write(temp_path, "CentOS-7.0-64.json", json!({"kernel": "Linux"}));
        write(&temp_path.join("nested"), "AIX-7.json", json!({"kernel": "AIX"}));
        fs::write(temp_path.join("README.md"), "not facts").unwrap();

        let source = DirectoryFactSource::new(temp_path);
        assert_eq!(
            source.identities().unwrap(),
            vec!["AIX-7", "CentOS-7.0-64", "Debian-8"]
        );
    }

    #[test]
    fn test_values_layout_with_trust_data() {
        let temp_dir = tempdir().unwrap();
        write(
            temp_dir.path(),
            "web01.json",
            json!({
                "name": "web01.example.com",
                "values": {"os": {"family": "RedHat"}, "environment": "production"},
                "trusted": {"certname": "web01.example.com", "extensions": {"pp_role": "web"}},
                "trusted_external": {"cmdb": {"owner": "ops"}}
            }),
        );

        let source = DirectoryFactSource::new(temp_dir.path());
        let document = source.lookup("web01").unwrap().unwrap();
        assert_eq!(document.facts["os"]["family"], "RedHat");
        assert!(document.facts.get("name").is_none());

        let preferences = IngestPreferences { strip_keys: vec![] };
        let facts = ingest(&source, "web01", &preferences).into_facts();
        assert!(!facts.fact_set.contains_key("environment"));
        assert_eq!(facts.trusted_set["pp_role"], "web");
        assert_eq!(facts.trusted_external_set["cmdb"]["owner"], "ops");
    }

    #[test]
    fn test_plain_mapping_is_the_facts() {
        let document = document_from_value(
            "n",
            json!({"kernel": "Linux", "trusted": {"certname": "n.example.com"}}),
        );
        assert_eq!(document.facts["kernel"], "Linux");
        assert!(document.trusted.is_none());
    }

    #[test]
    fn test_malformed_document() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        write(temp_dir.path(), "good.json", json!({"kernel": "Linux"}));

        let source = DirectoryFactSource::new(temp_dir.path());
        assert_matches!(source.lookup("broken"), Err(SourceError::Malformed { .. }));
        assert_eq!(source.documents().unwrap().len(), 1);

        let outcome = ingest(&source, "broken", &IngestPreferences { strip_keys: vec![] });
        assert_matches!(outcome, IngestOutcome::Empty { .. });
    }

    #[test]
    fn test_listing_is_cached_until_refresh() {
        let temp_dir = tempdir().unwrap();
        write(temp_dir.path(), "Debian-8.json", json!({"kernel": "Linux"}));

        let mut source = DirectoryFactSource::new(temp_dir.path());
        assert_eq!(source.identities().unwrap(), vec!["Debian-8"]);

        write(temp_dir.path(), "AIX-7.json", json!({"kernel": "AIX"}));
        assert_eq!(source.identities().unwrap(), vec!["Debian-8"]);
        assert!(source.lookup("AIX-7").unwrap().is_none());

        source.refresh();
        assert_eq!(source.identities().unwrap(), vec!["AIX-7", "Debian-8"]);
        assert!(source.lookup("AIX-7").unwrap().is_some());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let source = DirectoryFactSource::new("/nonexistent/nodematrix/facts");
        assert_matches!(source.identities(), Err(SourceError::Unavailable { .. }));
    }
}
