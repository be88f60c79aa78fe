use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use segmerge::engine::core::compaction::{EncoderRegistry, MergeMetaCreator, SchemaProvider};
use segmerge::engine::core::file_store::{FileStore, LocalFileStore};
use segmerge::engine::core::patch::{MultiPartPatchFinder, PatchType, ShardDirectory};
use segmerge::engine::core::version::{VersionCommitter, VersionLoader};
use segmerge::engine::errors::MergeError;
use segmerge::logging;
use segmerge::shared::config::CONFIG;
use segmerge::shared::path::absolutize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "segmerge")]
#[command(about = "Plan segment merges and collect old index versions", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the merge task planned for the latest version
    Plan {
        /// Index directory; defaults to [index] dir from the config
        index_dir: Option<PathBuf>,

        /// Plan a forced full merge instead of a regular pass
        #[arg(long)]
        optimize: bool,

        /// Persist the bound merge meta next to the version files
        #[arg(long)]
        write: bool,
    },
    /// Remove versions outside the keep window and segments nothing references
    Clean {
        index_dir: Option<PathBuf>,

        /// Number of newest versions to keep
        #[arg(long)]
        keep: Option<usize>,

        /// Versions to keep regardless of age
        #[arg(long, value_delimiter = ',')]
        reserve: Vec<u32>,

        /// Remove this version and every older one instead
        #[arg(long, conflicts_with_all = ["keep", "reserve"])]
        before: Option<u32>,
    },
    /// List patch files of several shards in the unified id space
    Patches {
        #[arg(required = true)]
        shard_dirs: Vec<PathBuf>,

        /// attribute or index
        #[arg(long = "type", default_value = "attribute")]
        patch_type: String,

        #[arg(long)]
        resource: Option<String>,

        /// List deletion data instead of value patches
        #[arg(long, conflicts_with = "resource")]
        deletions: bool,
    },
}

fn open_store(dir: Option<PathBuf>) -> Arc<dyn FileStore> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(&CONFIG.index.dir));
    Arc::new(LocalFileStore::new(absolutize(dir)))
}

fn cmd_plan(index_dir: Option<PathBuf>, optimize: bool, write: bool) -> anyhow::Result<()> {
    let store = open_store(index_dir);
    let version = VersionLoader::load_latest(store.as_ref())?
        .context("index has no committed version")?;

    let config = &CONFIG.merge;
    let encoders = EncoderRegistry::with_pass_through(config.encoders.iter().cloned())?;
    let schema: &dyn SchemaProvider = &CONFIG.schema;
    let creator = MergeMetaCreator::new(store.as_ref(), config, Some(schema), &encoders)?;
    let meta = creator.create(&version, optimize)?;
    if write {
        meta.store(store.as_ref())?;
        info!(version_id = version.version_id, "Merge meta written");
    }
    println!("{}", serde_json::to_string_pretty(&meta.task)?);
    Ok(())
}

fn cmd_clean(
    index_dir: Option<PathBuf>,
    keep: Option<usize>,
    reserve: Vec<u32>,
    before: Option<u32>,
) -> anyhow::Result<()> {
    let committer = VersionCommitter::open(open_store(index_dir))?;
    if let Some(version_id) = before {
        if committer.clean_version_and_before(version_id)? {
            println!("removed version {} and older", version_id);
        } else {
            println!("version {} is not older than the latest version", version_id);
        }
        return Ok(());
    }

    let keep = keep.unwrap_or(CONFIG.gc.keep_version_count);
    let reserved: BTreeSet<u32> = if reserve.is_empty() {
        CONFIG.gc.reserved_versions.iter().copied().collect()
    } else {
        reserve.into_iter().collect()
    };
    let report = committer.clean_versions(keep, &reserved)?;
    println!(
        "removed versions {:?}, segments {:?}, {} failure(s)",
        report.removed_versions, report.removed_segments, report.failures
    );
    Ok(())
}

fn cmd_patches(
    shard_dirs: Vec<PathBuf>,
    patch_type: &str,
    resource: Option<String>,
    deletions: bool,
) -> anyhow::Result<()> {
    let mut shards = Vec::with_capacity(shard_dirs.len());
    for dir in shard_dirs {
        let store = open_store(Some(dir.clone()));
        let version = VersionLoader::load_latest(store.as_ref())?
            .with_context(|| format!("shard {} has no committed version", dir.display()))?;
        shards.push(ShardDirectory { store, version });
    }
    let finder = MultiPartPatchFinder::new(shards);

    let grouped = if deletions {
        finder.find_deletion_patches()?
    } else {
        let Some(patch_type) = PatchType::parse(patch_type) else {
            bail!("unknown patch type '{}', expected attribute or index", patch_type);
        };
        let resource = resource.context("--resource is required for value patches")?;
        finder.find_patches(patch_type, &resource)?
    };
    println!("{}", serde_json::to_string_pretty(&grouped)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init()?;

    let result = match args.command {
        Command::Plan {
            index_dir,
            optimize,
            write,
        } => cmd_plan(index_dir, optimize, write),
        Command::Clean {
            index_dir,
            keep,
            reserve,
            before,
        } => cmd_clean(index_dir, keep, reserve, before),
        Command::Patches {
            shard_dirs,
            patch_type,
            resource,
            deletions,
        } => cmd_patches(shard_dirs, &patch_type, resource, deletions),
    };
    if let Some(e) = result.as_ref().err().and_then(|e| e.downcast_ref::<MergeError>()) {
        e.log_error();
    }
    result
}
