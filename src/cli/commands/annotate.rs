//! File annotation commands
//!
//! `annotate-vcf` and `annotate-bed` upload a file as a new data source and
//! start an annotation of it.

use std::path::PathBuf;

use clap::Args;

use crate::cli::commands::{log, QueryArgs};
use crate::import::annotate_file;
use crate::resources::Filetype;
use crate::session::Session;

/// Arguments for annotating a VCF or BED file
#[derive(Args, Debug)]
pub struct AnnotateFileArgs {
    /// File to annotate
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Data file is already uploaded to the server
    #[arg(short = 'u', long)]
    pub data_uploaded: bool,

    #[command(flatten)]
    pub queries: QueryArgs,
}

impl AnnotateFileArgs {
    /// Execute the annotate command for a file of type `filetype`
    pub async fn execute(&self, session: &Session, filetype: Filetype) -> anyhow::Result<()> {
        let (data_source, annotation) = annotate_file(
            session,
            &self.file,
            filetype,
            self.data_uploaded,
            &self.queries.queries(),
        )
        .await?;

        log(format!("Added data source: {}", data_source.uri()));
        log(format!("Started annotation: {}", annotation.uri()));
        Ok(())
    }
}
