mod multi_line_string;

pub mod blocks;
pub mod config;
pub mod inputs;
pub mod ipynb;
pub mod language_tag;
pub mod record;
pub mod store;

pub use blocks::{format_batch, format_file};
pub use config::{
	ConfigFile,
	ConfigParseError,
	Settings,
	app_dirs,
	default_config_path,
	default_data_dir,
};
pub use inputs::UploadedFile;
pub use ipynb::render_notebook;
pub use language_tag::{LanguageTag, classify};
use multi_line_string::MultiLineString;
pub use record::{ConversionRecord, ConversionSummary, extract_original_contents, generate_id};
pub use store::{ConversionStore, FsStore, MemoryStore, StoreError};
