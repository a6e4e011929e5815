use crate::store::{select, ReelFilter, ReelStore, SortOrder};
use crate::{Reel, ReelError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_reels: u64,
    pub created_at: String,
    pub version: u32,
}

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn db(&self) -> PathBuf { self.root.join("reels.sled") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_meta(paths: &StorePaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta).map_err(|e| ReelError::StorageFailure(e.to_string()))?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &StorePaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    serde_json::from_str(&buf).map_err(|e| ReelError::StorageFailure(format!("corrupt meta.json: {e}")))
}

/// Reels persisted in a sled tree, keyed by reel id, bincode-encoded.
pub struct SledReelStore {
    db: sled::Db,
}

impl SledReelStore {
    pub fn open(paths: &StorePaths) -> Result<Self> {
        create_dir_all(&paths.root)?;
        let db = sled::open(paths.db())?;
        tracing::info!(path = %paths.db().display(), reels = db.len(), "opened reel store");
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Reel> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn scan(&self) -> impl Iterator<Item = Result<Reel>> + '_ {
        self.db.iter().values().map(|v| Self::decode(&v?))
    }
}

impl ReelStore for SledReelStore {
    fn find(&self, filter: &dyn ReelFilter, sort: Option<SortOrder>, limit: usize) -> Result<Vec<Reel>> {
        let reels = self.scan().collect::<Result<Vec<_>>>()?;
        Ok(select(reels, filter, sort, limit))
    }

    fn get(&self, id: &str) -> Result<Option<Reel>> {
        match self.db.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, reel: Reel) -> Result<()> {
        if reel.id.is_empty() {
            return Err(ReelError::InvalidInput("reel id must not be empty".into()));
        }
        let bytes = bincode::serialize(&reel)?;
        self.db.insert(reel.id.as_bytes(), bytes)?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.db.len())
    }
}

/// Read reels from a `.json` (object or array) or `.jsonl` file, or every such
/// file under a directory.
pub fn load_reels_from_path(input: &Path) -> Result<Vec<Reel>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        return Err(ReelError::InvalidInput(format!("{} does not exist", input.display())));
    }

    let mut reels = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            load_jsonl(&file, &mut reels)?;
        } else {
            load_json(&file, &mut reels)?;
        }
    }
    Ok(reels)
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn load_jsonl(file: &Path, reels: &mut Vec<Reel>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        reels.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn load_json(file: &Path, reels: &mut Vec<Reel>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                reels.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => reels.push(serde_json::from_value(json)?),
        other => {
            return Err(ReelError::InvalidInput(format!(
                "{}: expected a reel object or an array of reels, found {}",
                file.display(),
                json_kind(&other)
            )))
        }
    }
    Ok(())
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
