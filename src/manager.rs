//! Pipeline manager: runs operations one after another over a project directory.
//!
//! ## Project layout
//!
//! ```text
//! <project_root>/
//! ├── input/                 # read by the first operation only
//! │   ├── images/0.png …
//! │   └── metadata/0.json …
//! ├── output/                # recreated empty when the manager is built
//! │   ├── images/<tokenId>.png
//! │   └── metadata/<tokenId>
//! └── .input-tmp/            # copy of output/, input of every later operation
//! ```
//!
//! ## Chaining
//!
//! The first operation reads the configured input folder. Before every later operation
//! the current `output/` is copied into `.input-tmp/`, which becomes that operation's
//! input, while the operation writes into `output/` again. The staging copy is deleted
//! when the operation finishes, and the executed-operation counter only moves forward
//! on success: a failed operation leaves its partial output in place and the next one
//! stages from it.
//!
//! ## Records
//!
//! Images and metadata files are listed in numeric filename order and paired by
//! position. Each metadata file may pass through a preprocessor hook before it is
//! parsed, then the pair becomes an [`Nft`]. Any failure aborts loading and the
//! operation with it.

use crate::config::StepConfig;
use crate::error::{AppError, FilesystemError, ValidationError};
use crate::files;
use crate::metadata::{Metadata, MetadataPreprocessor};
use crate::naming::TokenId;
use crate::nft::Nft;
use crate::operation::{self, Operation};
use crate::options::RawOptions;
use crate::output;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Folder every operation writes into, relative to the project root.
pub const OUTPUT_DIR: &str = "output";
/// Copy of the previous output used as input, relative to the project root.
pub const STAGING_DIR: &str = ".input-tmp";
/// OS artifacts removed from the output folders after every operation.
const STRAY_FILES: [&str; 1] = [".DS_Store"];

const OUTPUT_IMAGES: &str = "images";
const OUTPUT_METADATA: &str = "metadata";

/// Where the project lives and where the first operation reads from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    pub project_root: PathBuf,
    /// Input folder, relative to the project root.
    pub input_dir: PathBuf,
    /// Images folder, relative to the input folder.
    pub images_dir: PathBuf,
    /// Metadata folder, relative to the input folder.
    pub metadata_dir: PathBuf,
}

impl ProjectConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            input_dir: PathBuf::from("input"),
            images_dir: PathBuf::from("images"),
            metadata_dir: PathBuf::from("metadata"),
        }
    }
}

/// An images + metadata folder pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderPair {
    pub images: PathBuf,
    pub metadata: PathBuf,
}

/// What one successful operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary {
    /// Number of operations that had completed before this one.
    pub index: usize,
    pub operation: &'static str,
    pub executed: usize,
    pub skipped: usize,
}

/// Output-side primitives handed to operations while they run.
#[derive(Debug)]
pub struct OperationContext {
    output: FolderPair,
}

impl OperationContext {
    pub fn new(output: FolderPair) -> Self {
        Self { output }
    }

    pub fn images_output_dir(&self) -> &Path {
        &self.output.images
    }

    pub fn metadata_output_dir(&self) -> &Path {
        &self.output.metadata
    }

    /// Copy the record's original image to `<tokenId>.png`.
    pub fn clone_source_image(&self, nft: &Nft) -> Result<(), AppError> {
        self.write_image(nft.token_id(), nft.image_path())
    }

    /// Copy the record's original metadata file to `<tokenId>`.
    pub fn clone_source_metadata(&self, nft: &Nft) -> Result<(), AppError> {
        let dest = self.output.metadata.join(nft.token_id().to_string());
        files::copy_file(nft.metadata_path(), &dest)?;
        Ok(())
    }

    /// Copy any file to `<tokenId>.png` in the output images folder.
    pub fn write_image(&self, token_id: TokenId, source: &Path) -> Result<(), AppError> {
        let dest = self.output.images.join(format!("{token_id}.png"));
        files::copy_file(source, &dest)?;
        Ok(())
    }

    pub fn write_metadata(&self, token_id: TokenId, metadata: &Metadata) -> Result<(), AppError> {
        let dest = self.output.metadata.join(token_id.to_string());
        files::write_json(&dest, metadata)?;
        Ok(())
    }
}

pub struct Manager {
    config: ProjectConfig,
    executed_operations: usize,
    preprocessor: Option<MetadataPreprocessor>,
}

impl Manager {
    /// Check the project root and recreate an empty `output/` tree.
    pub fn new(config: ProjectConfig) -> Result<Self, AppError> {
        if !config.project_root.is_dir() {
            return Err(FilesystemError::MissingDirectory(config.project_root).into());
        }
        let project_root = config
            .project_root
            .canonicalize()
            .map_err(|e| FilesystemError::io("resolve project root", &config.project_root, e))?;

        let manager = Self {
            config: ProjectConfig {
                project_root,
                ..config
            },
            executed_operations: 0,
            preprocessor: None,
        };
        manager.init_output_folders()?;
        Ok(manager)
    }

    /// Install a hook applied to each metadata file's text before JSON parsing.
    pub fn with_metadata_preprocessor(mut self, hook: impl Fn(&str) -> String + 'static) -> Self {
        self.preprocessor = Some(Box::new(hook));
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.config.project_root
    }

    pub fn executed_operations(&self) -> usize {
        self.executed_operations
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.project_root.join(OUTPUT_DIR)
    }

    pub fn output_folders(&self) -> FolderPair {
        let output = self.output_dir();
        FolderPair {
            images: output.join(OUTPUT_IMAGES),
            metadata: output.join(OUTPUT_METADATA),
        }
    }

    fn staging_dir(&self) -> PathBuf {
        self.config.project_root.join(STAGING_DIR)
    }

    fn is_before_first_operation(&self) -> bool {
        self.executed_operations == 0
    }

    /// Folders the next operation reads from.
    pub fn input_folders(&self) -> FolderPair {
        if self.is_before_first_operation() {
            let input = self.config.project_root.join(&self.config.input_dir);
            FolderPair {
                images: input.join(&self.config.images_dir),
                metadata: input.join(&self.config.metadata_dir),
            }
        } else {
            let staging = self.staging_dir();
            FolderPair {
                images: staging.join(OUTPUT_IMAGES),
                metadata: staging.join(OUTPUT_METADATA),
            }
        }
    }

    fn init_output_folders(&self) -> Result<(), FilesystemError> {
        let folders = self.output_folders();
        files::delete_and_create_directory(&self.output_dir())?;
        files::create_directory(&folders.images)?;
        files::create_directory(&folders.metadata)
    }

    /// Run one operation, reporting a failure instead of returning it.
    ///
    /// Prints a banner first and a summary or the caught error after. A failed
    /// operation leaves partial output behind; later operations can still run.
    pub fn run(
        &mut self,
        operation: &mut dyn Operation,
        options: RawOptions,
    ) -> Option<OperationSummary> {
        output::print_banner(self.executed_operations, operation.name());

        match self.try_run(operation, options) {
            Ok(summary) => {
                output::print_summary(&summary);
                Some(summary)
            }
            Err(e) => {
                log::error!("operation {} failed: {e}", operation.name());
                output::print_failure(self.executed_operations, operation.name(), &e);
                None
            }
        }
    }

    /// Run one operation and return its error, if any.
    ///
    /// Cleanup (staging folder, stray files) happens whether or not the operation succeeds.
    /// A cleanup failure is logged; it does not undo a completed operation.
    pub fn try_run(
        &mut self,
        operation: &mut dyn Operation,
        options: RawOptions,
    ) -> Result<OperationSummary, AppError> {
        let result = self.perform_operation(operation, &options);
        if let Err(e) = self.post_execute_operation() {
            log::warn!("cleanup after {} failed: {e}", operation.name());
        }
        let summary = result?;
        self.executed_operations += 1;
        Ok(summary)
    }

    /// Run configured steps in order through [`Manager::run`].
    ///
    /// A step whose options cannot be converted is reported like any other failure
    /// and the next step still runs. Returns the number of steps that succeeded.
    pub fn run_steps(&mut self, steps: &[StepConfig]) -> usize {
        let mut succeeded = 0;
        for step in steps {
            let mut operation = step.operation.build();
            let options = match step.raw_options() {
                Ok(options) => options,
                Err(e) => {
                    log::error!("step {} options cannot be converted: {e}", step.operation);
                    output::print_banner(self.executed_operations, operation.name());
                    output::print_failure(self.executed_operations, operation.name(), &e);
                    continue;
                }
            };
            if self.run(operation.as_mut(), options).is_some() {
                succeeded += 1;
            }
        }
        succeeded
    }

    fn perform_operation(
        &self,
        operation: &mut dyn Operation,
        raw: &RawOptions,
    ) -> Result<OperationSummary, AppError> {
        let mut options = operation::resolve_options(operation, raw)?;
        let range = options.range()?;

        self.pre_execute_operation()?;

        let input = self.input_folders();
        let records = self.generate_nfts(&input)?;
        log::info!(
            "{}: loaded {} records from {}",
            operation.name(),
            records.len(),
            input.images.display()
        );

        let mut records = operation.pre_execute(records, &options)?;
        let ctx = OperationContext::new(self.output_folders());
        let mut summary = OperationSummary {
            index: self.executed_operations,
            operation: operation.name(),
            executed: 0,
            skipped: 0,
        };

        for (i, nft) in records.iter_mut().enumerate() {
            options.set_iteration_index(i);

            if !range.contains(nft.token_id()) {
                log::debug!("skipping token {} (outside {:?})", nft.token_id(), range);
                operation.on_skip(&ctx, nft)?;
                summary.skipped += 1;
                continue;
            }

            let original = nft.token_id();
            operation::execute(&*operation, &ctx, nft, &options)?;
            log::debug!("processed token {original} -> {}", nft.token_id());
            summary.executed += 1;
        }

        Ok(summary)
    }

    /// Stage the previous output as this operation's input. No-op for the first operation.
    fn pre_execute_operation(&self) -> Result<(), FilesystemError> {
        if self.is_before_first_operation() {
            let input = self.config.project_root.join(&self.config.input_dir);
            if !input.is_dir() {
                return Err(FilesystemError::MissingDirectory(input));
            }
            return Ok(());
        }

        let staging = self.staging_dir();
        log::debug!("staging {} into {}", self.output_dir().display(), staging.display());
        files::delete_and_create_directory(&staging)?;
        files::deep_copy(&self.output_dir(), &staging)
    }

    fn post_execute_operation(&self) -> Result<(), FilesystemError> {
        let staged = files::delete_directory(&self.staging_dir());

        let folders = self.output_folders();
        for dir in [&folders.images, &folders.metadata] {
            for name in STRAY_FILES {
                match files::delete_file(&dir.join(name)) {
                    Ok(()) | Err(FilesystemError::MissingFile(_)) => {}
                    Err(e) => log::warn!("unable to remove stray file: {e}"),
                }
            }
        }

        staged
    }

    /// Load the record set of `input`, pairing images with metadata by position.
    fn generate_nfts(&self, input: &FolderPair) -> Result<Vec<Nft>, AppError> {
        let images = files::files_in_dir(&input.images)?;
        let metadata_files = files::files_in_dir(&input.metadata)?;

        if metadata_files.len() > images.len() {
            log::warn!(
                "{} metadata files but only {} images in {}",
                metadata_files.len(),
                images.len(),
                input.images.display()
            );
        }

        images
            .iter()
            .enumerate()
            .map(|(k, image)| {
                let metadata_path = metadata_files
                    .get(k)
                    .ok_or_else(|| FilesystemError::MissingMetadata(image.clone()))?;
                let metadata = self.read_metadata(metadata_path)?;
                Nft::new(image, metadata_path, metadata)
            })
            .collect()
    }

    fn read_metadata(&self, path: &Path) -> Result<Metadata, AppError> {
        let mut content = files::read_to_string(path)?;
        if let Some(hook) = &self.preprocessor {
            content = hook(&content);
        }

        let value: Value =
            serde_json::from_str(&content).map_err(|source| ValidationError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ValidationError::NotAnObject(path.to_path_buf()).into()),
        }
    }
}
