use super::meta::{read_meta_guid, MetaError};
use super::{ScriptRecord, ScriptRegistry};
use crate::discovery::ProjectFile;
use crate::graph::Guid;
use crate::parser::ScriptSymbolProvider;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Registry plus the per-script problems met while building it
#[derive(Debug)]
pub struct RegistryBuild {
    pub registry: ScriptRegistry,

    /// Scripts whose identity file could not be used; they stay in the
    /// registry with an empty identity
    pub meta_failures: Vec<MetaError>,

    /// Scripts left out because they are not behaviour types
    pub skipped: usize,
}

/// Builds the script registry from script files in parallel
pub struct ParallelRegistryBuilder;

impl ParallelRegistryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// One record per behaviour-type script. Runs on the current rayon pool.
    pub fn build(&self, scripts: &[ProjectFile], provider: &dyn ScriptSymbolProvider) -> RegistryBuild {
        info!("Building script registry from {} scripts...", scripts.len());

        let results: Vec<Option<(ScriptRecord, Option<MetaError>)>> = scripts
            .par_iter()
            .map(|script| self.build_record(script, provider))
            .collect();

        let mut records = Vec::new();
        let mut meta_failures = Vec::new();
        let mut skipped = 0;

        for result in results {
            match result {
                Some((record, failure)) => {
                    records.push(record);
                    meta_failures.extend(failure);
                }
                None => skipped += 1,
            }
        }

        let registry = ScriptRegistry::from_records(records);

        info!(
            "Registered {} behaviour scripts ({} skipped, {} without identity)",
            registry.len(),
            skipped,
            meta_failures.len()
        );

        RegistryBuild {
            registry,
            meta_failures,
            skipped,
        }
    }

    fn build_record(
        &self,
        script: &ProjectFile,
        provider: &dyn ScriptSymbolProvider,
    ) -> Option<(ScriptRecord, Option<MetaError>)> {
        let symbols = provider.symbols(&script.path)?;
        if !symbols.is_behaviour_type {
            debug!("Not a behaviour type: {}", script.path.display());
            return None;
        }

        let name = script.name();
        match read_meta_guid(&script.meta_path()) {
            Ok(guid) => {
                let record = ScriptRecord::new(name, &script.path, guid)
                    .with_fields(symbols.serialized_field_names.iter().cloned());
                Some((record, None))
            }
            Err(e) => {
                warn!("{} (script kept without identity)", e);
                Some((ScriptRecord::new(name, &script.path, Guid::empty()), Some(e)))
            }
        }
    }
}

impl Default for ParallelRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
