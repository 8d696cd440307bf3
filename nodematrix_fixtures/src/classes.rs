//! Class discovery from a module tree
//!
//! `<root>/<module>/manifests/**/*.pp` maps to `module::sub::name`, with the
//! module's top-level `init.pp` naming the module itself.

use nodematrix_core::facts::SourceError;
use nodematrix_core::registry::ClassSource;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ManifestClassSource {
    root: PathBuf,
}

impl ManifestClassSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ClassSource for ManifestClassSource {
    fn classes(&self) -> Result<Vec<String>, SourceError> {
        let modules = std::fs::read_dir(&self.root).map_err(|e| SourceError::Unavailable {
            reason: format!("{}: {}", self.root.display(), e),
        })?;

        let mut classes = Vec::new();
        for module in modules.filter_map(|entry| entry.ok()) {
            let manifests = module.path().join("manifests");
            if !manifests.is_dir() {
                continue;
            }
            let Some(module_name) = module.file_name().to_str().map(str::to_string) else {
                continue;
            };

            for entry in WalkDir::new(&manifests).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(class) = class_name(&module_name, &manifests, entry.path()) {
                    classes.push(class);
                }
            }
        }

        classes.sort();
        classes.dedup();
        Ok(classes)
    }
}

/// Class name for a manifest path, `None` for anything that is not `*.pp`
pub fn class_name(module: &str, manifests: &Path, path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != "pp" {
        return None;
    }

    let relative = path.strip_prefix(manifests).ok()?.with_extension("");
    let mut segments = vec![module.to_string()];
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?.to_string()),
            _ => return None,
        }
    }

    if segments.len() == 2 && segments[1] == "init" {
        segments.pop();
    }
    Some(segments.join("::"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class x {}").unwrap();
    }

    #[test]
    fn test_class_names_from_module_tree() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        touch(&root.join("role/manifests/webserver.pp"));
        touch(&root.join("role/manifests/database.pp"));
        touch(&root.join("profile/manifests/init.pp"));
        touch(&root.join("profile/manifests/base/linux.pp"));
        touch(&root.join("profile/manifests/README.md"));
        touch(&root.join("notamodule/files/thing.pp"));

        let classes = ManifestClassSource::new(root).classes().unwrap();
        assert_eq!(
            classes,
            vec![
                "profile",
                "profile::base::linux",
                "role::database",
                "role::webserver",
            ]
        );
    }

    #[test]
    fn test_nested_init_is_not_the_module() {
        let manifests = Path::new("/m/manifests");
        assert_eq!(
            class_name("m", manifests, &manifests.join("sub/init.pp")).as_deref(),
            Some("m::sub::init")
        );
        assert_eq!(class_name("m", manifests, &manifests.join("x.txt")), None);
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        assert!(ManifestClassSource::new("/nonexistent/nodematrix/site")
            .classes()
            .is_err());
    }
}
