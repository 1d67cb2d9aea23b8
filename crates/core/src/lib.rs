mod config;
mod exif_reader;
mod heic_reader;
mod matcher;
mod metadata;
mod resolver;
mod runner;
mod sequencer;
mod sidecar_sync;

pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use matcher::{sidecar_path_for, split_media_name, split_sidecar_name, MediaName, SidecarName};
pub use metadata::{epoch_to_local, MetadataSource, ResolvedMeta};
pub use resolver::{resolve_metadata, ResolveError};
pub use runner::{run, RunOptions, RunReport};
pub use sequencer::{RunState, TIMESTAMP_FORMAT};
pub use sidecar_sync::sync_live_photo_sidecars;
