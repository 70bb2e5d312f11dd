use crate::graph::Guid;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading a script's companion identity file
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("failed to read identity file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed identity file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("identity file {} has no `guid`", path.display())]
    MissingGuid { path: PathBuf },
}

impl MetaError {
    pub fn path(&self) -> &Path {
        match self {
            MetaError::Io { path, .. } | MetaError::Yaml { path, .. } | MetaError::MissingGuid { path } => path,
        }
    }
}

/// The part of an identity file the registry needs. Deserializing into
/// `String` keeps plain scalars as written, so an all-digit guid is not
/// turned into a number.
#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    guid: Option<String>,
}

/// Read the `guid` of a companion identity file
pub fn read_meta_guid(path: &Path) -> Result<Guid, MetaError> {
    let contents = std::fs::read_to_string(path).map_err(|source| MetaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_meta_guid(path, &contents)
}

/// Extract the `guid` from identity file contents
pub fn parse_meta_guid(path: &Path, contents: &str) -> Result<Guid, MetaError> {
    let meta: Meta = serde_yaml::from_str(contents).map_err(|source| MetaError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    meta.guid
        .map(Guid::new)
        .filter(|guid| !guid.is_empty())
        .ok_or_else(|| MetaError::MissingGuid {
            path: path.to_path_buf(),
        })
}
