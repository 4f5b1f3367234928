//! Directory of YAML files, one per occurrence
//!
//! Records live at `<dir>/<protocolo>.occ.yaml`. Writes go through a sibling
//! temp file and a rename so readers never see a half-written record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{check_update, normalize_legacy, prepare_insert, OccurrenceStore, StoreError};
use crate::core::identity::Protocolo;
use crate::entities::occurrence::Occurrence;
use crate::yaml::parse_yaml;

pub const FILE_SUFFIX: &str = ".occ.yaml";

/// File-backed store
#[derive(Debug)]
pub struct YamlFileStore {
    dir: PathBuf,
    // Serializes compare-and-swap within this process
    write_lock: Mutex<()>,
}

impl YamlFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, protocolo: &Protocolo) -> PathBuf {
        self.dir.join(format!("{}{}", protocolo, FILE_SUFFIX))
    }

    /// Paths of every record file in the store
    pub fn record_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(FILE_SUFFIX))
            .map(|e| e.into_path())
            .collect();
        paths.sort();
        paths
    }

    /// Read and normalize one record file
    pub fn read_path(&self, path: &Path) -> Result<Occurrence, StoreError> {
        let content = fs::read_to_string(path)?;
        let occurrence: Occurrence = parse_yaml(&content, &path.display().to_string())?;
        Ok(normalize_legacy(occurrence))
    }

    fn write(&self, path: &Path, occurrence: &Occurrence) -> Result<(), StoreError> {
        let yaml = serde_yml::to_string(occurrence)?;
        let tmp = path.with_extension("yaml.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(yaml.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl OccurrenceStore for YamlFileStore {
    fn load(&self, protocolo: &Protocolo) -> Result<Occurrence, StoreError> {
        let path = self.path_for(protocolo);
        if !path.exists() {
            return Err(StoreError::NotFound {
                protocolo: protocolo.clone(),
            });
        }
        self.read_path(&path)
    }

    fn insert(&self, occurrence: Occurrence) -> Result<Occurrence, StoreError> {
        let occurrence = prepare_insert(occurrence);
        let protocolo = occurrence.protocolo.clone().ok_or(StoreError::Unsaved)?;

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let path = self.path_for(&protocolo);
        if path.exists() {
            return Err(StoreError::AlreadyExists { protocolo });
        }
        self.write(&path, &occurrence)?;
        tracing::debug!(path = %path.display(), "Occurrence written");
        Ok(occurrence)
    }

    fn save(&self, mut occurrence: Occurrence) -> Result<Occurrence, StoreError> {
        let protocolo = occurrence.protocolo.clone().ok_or(StoreError::Unsaved)?;

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let stored = self.load(&protocolo)?;
        check_update(&stored, &occurrence)?;

        occurrence.versao += 1;
        let path = self.path_for(&protocolo);
        self.write(&path, &occurrence)?;
        tracing::debug!(path = %path.display(), versao = occurrence.versao, "Occurrence written");
        Ok(occurrence)
    }

    fn list(&self) -> Result<Vec<Occurrence>, StoreError> {
        let mut all = self
            .record_paths()
            .iter()
            .map(|p| self.read_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.protocolo.cmp(&b.protocolo))
        });
        Ok(all)
    }
}
