//! Multi-step import and annotation workflows.
//!
//! Each workflow is a fixed sequence of create requests, sent one after
//! another. A failure stops the workflow; resources created before the
//! failure are left on the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use manwe::import::{import_sample, ImportFiles, SampleOptions};
//!
//! let sample = SampleOptions::new("Trio");
//! let files = ImportFiles {
//!     vcf_files: vec!["trio.vcf.gz".into()],
//!     bed_files: vec!["trio.bed".into()],
//!     ..ImportFiles::default()
//! };
//! let imported = import_sample(&session, &sample, &files).await?;
//! println!("{}", imported.sample.uri());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::resources::{
    Annotation, AnnotationCreateParams, Coverage, CoverageCreateParams, DataSource,
    DataSourceCreateParams, DataSourceInput, Filetype, Link, Queries, ResourceError, Sample,
    SampleCreateParams, TrackedResource, Variation, VariationCreateParams, VariationListParams,
};
use crate::session::Session;

/// Errors returned by workflows.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The pool size is zero.
    #[error("Pool size should be at least 1")]
    InvalidPoolSize,

    /// A sample with a coverage profile was imported without BED files.
    #[error("Expected at least one BED file")]
    MissingBedFile,

    /// A request failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Settings for a new sample.
#[derive(Clone, Debug)]
pub struct SampleOptions {
    /// Sample name.
    pub name: String,
    /// Groups the sample is part of.
    pub groups: Vec<Link>,
    /// Number of individuals.
    pub pool_size: u32,
    /// Whether the sample is public.
    pub public: bool,
    /// The sample has no coverage profile.
    pub no_coverage_profile: bool,
}

impl SampleOptions {
    /// Creates options for a private single-individual sample with a
    /// coverage profile.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            pool_size: 1,
            public: false,
            no_coverage_profile: false,
        }
    }
}

/// Files to import for a sample.
#[derive(Clone, Debug, Default)]
pub struct ImportFiles {
    /// VCF files with observed variants, imported in order.
    pub vcf_files: Vec<PathBuf>,
    /// BED files with covered regions, imported in order.
    pub bed_files: Vec<PathBuf>,
    /// The files are already on the server; send their paths instead of
    /// uploading them.
    pub data_uploaded: bool,
    /// Derive genotypes from likelihood scores in the VCF files.
    pub prefer_genotype_likelihoods: bool,
}

/// Resources created by [`import_sample`].
#[derive(Debug)]
pub struct ImportedSample {
    pub sample: TrackedResource<Sample>,
    pub variations: Vec<(TrackedResource<DataSource>, TrackedResource<Variation>)>,
    pub coverages: Vec<(TrackedResource<DataSource>, TrackedResource<Coverage>)>,
}

/// Creates a sample.
///
/// # Errors
///
/// Returns [`ImportError::InvalidPoolSize`] for a pool size of zero, or the
/// error of the create request.
pub async fn add_sample(
    session: &Session,
    options: &SampleOptions,
) -> Result<TrackedResource<Sample>, ImportError> {
    if options.pool_size < 1 {
        return Err(ImportError::InvalidPoolSize);
    }

    let params = SampleCreateParams {
        pool_size: options.pool_size,
        coverage_profile: !options.no_coverage_profile,
        public: options.public,
        groups: options.groups.clone(),
        ..SampleCreateParams::new(options.name.clone())
    };

    Ok(session.create(&params).await?)
}

/// Creates a sample and imports its variation and coverage files.
///
/// All files are checked to be readable before the first request. Then the
/// sample is created, followed by a data source and variation per VCF file
/// and a data source and coverage per BED file, in the order given.
///
/// # Errors
///
/// Returns [`ImportError::MissingBedFile`] if the sample has a coverage
/// profile but no BED file is given, [`ResourceError::Upload`] if a file
/// cannot be read, or the error of the first failing request.
pub async fn import_sample(
    session: &Session,
    options: &SampleOptions,
    files: &ImportFiles,
) -> Result<ImportedSample, ImportError> {
    if options.pool_size < 1 {
        return Err(ImportError::InvalidPoolSize);
    }
    if !options.no_coverage_profile && files.bed_files.is_empty() {
        return Err(ImportError::MissingBedFile);
    }

    if !files.data_uploaded {
        for path in files.vcf_files.iter().chain(&files.bed_files) {
            check_readable(path).await?;
        }
    }

    let sample = add_sample(session, options).await?;
    let sample_link = Link::new(sample.uri());

    let mut variations = Vec::with_capacity(files.vcf_files.len());
    for path in &files.vcf_files {
        variations.push(
            create_variation(
                session,
                &sample_link,
                path,
                files.data_uploaded,
                files.prefer_genotype_likelihoods,
            )
            .await?,
        );
    }

    let mut coverages = Vec::with_capacity(files.bed_files.len());
    for path in &files.bed_files {
        coverages.push(create_coverage(session, &sample_link, path, files.data_uploaded).await?);
    }

    Ok(ImportedSample {
        sample,
        variations,
        coverages,
    })
}

/// Imports a VCF file for an existing sample.
///
/// # Errors
///
/// Returns [`ResourceError::NotFound`] if the sample does not exist,
/// [`ResourceError::Upload`] if the file cannot be read, or the error of
/// the first failing request.
pub async fn import_variation(
    session: &Session,
    sample_uri: &str,
    vcf_file: &Path,
    data_uploaded: bool,
    prefer_genotype_likelihoods: bool,
) -> Result<(TrackedResource<DataSource>, TrackedResource<Variation>), ImportError> {
    if !data_uploaded {
        check_readable(vcf_file).await?;
    }
    let sample = session.fetch::<Sample>(sample_uri).await?;

    create_variation(
        session,
        &Link::new(sample.uri()),
        vcf_file,
        data_uploaded,
        prefer_genotype_likelihoods,
    )
    .await
}

/// Imports a BED file for an existing sample.
///
/// # Errors
///
/// Returns [`ResourceError::NotFound`] if the sample does not exist,
/// [`ResourceError::Upload`] if the file cannot be read, or the error of
/// the first failing request.
pub async fn import_coverage(
    session: &Session,
    sample_uri: &str,
    bed_file: &Path,
    data_uploaded: bool,
) -> Result<(TrackedResource<DataSource>, TrackedResource<Coverage>), ImportError> {
    if !data_uploaded {
        check_readable(bed_file).await?;
    }
    let sample = session.fetch::<Sample>(sample_uri).await?;

    create_coverage(session, &Link::new(sample.uri()), bed_file, data_uploaded).await
}

/// Creates a data source from a VCF or BED file and an annotation over it.
///
/// # Errors
///
/// Returns [`ResourceError::Upload`] if the file cannot be read, or the
/// error of the first failing request.
pub async fn annotate_file(
    session: &Session,
    path: &Path,
    filetype: Filetype,
    data_uploaded: bool,
    queries: &Queries,
) -> Result<(TrackedResource<DataSource>, TrackedResource<Annotation>), ImportError> {
    if !data_uploaded {
        check_readable(path).await?;
    }

    let data_source = session
        .create(&data_source_params(path, filetype, data_uploaded))
        .await?;
    let annotation = session
        .create(&AnnotationCreateParams::new(
            Link::new(data_source.uri()),
            queries.clone(),
        ))
        .await?;

    Ok((data_source, annotation))
}

/// Annotates the data source of every variation of a sample.
///
/// # Errors
///
/// Returns [`ResourceError::NotFound`] if the sample does not exist, or the
/// error of the first failing request.
pub async fn annotate_sample_variations(
    session: &Session,
    sample_uri: &str,
    queries: &Queries,
) -> Result<Vec<TrackedResource<Annotation>>, ImportError> {
    let sample = session.fetch::<Sample>(sample_uri).await?;

    let variations = session
        .variations(&VariationListParams {
            sample: Some(Link::new(sample.uri())),
        })
        .try_collect()
        .await?;

    let mut annotations = Vec::with_capacity(variations.len());
    for variation in variations {
        let Some(data_source) = variation.data_source.clone() else {
            tracing::warn!(uri = %variation.uri(), "Variation without data source, skipping");
            continue;
        };
        annotations.push(
            session
                .create(&AnnotationCreateParams::new(data_source, queries.clone()))
                .await?,
        );
    }

    Ok(annotations)
}

async fn create_variation(
    session: &Session,
    sample: &Link,
    path: &Path,
    data_uploaded: bool,
    prefer_genotype_likelihoods: bool,
) -> Result<(TrackedResource<DataSource>, TrackedResource<Variation>), ImportError> {
    let data_source = session
        .create(&data_source_params(path, Filetype::Vcf, data_uploaded))
        .await?;

    let params = VariationCreateParams {
        prefer_genotype_likelihoods,
        ..VariationCreateParams::new(sample.clone(), Link::new(data_source.uri()))
    };
    let variation = session.create(&params).await?;

    Ok((data_source, variation))
}

async fn create_coverage(
    session: &Session,
    sample: &Link,
    path: &Path,
    data_uploaded: bool,
) -> Result<(TrackedResource<DataSource>, TrackedResource<Coverage>), ImportError> {
    let data_source = session
        .create(&data_source_params(path, Filetype::Bed, data_uploaded))
        .await?;

    let coverage = session
        .create(&CoverageCreateParams {
            sample: sample.clone(),
            data_source: Link::new(data_source.uri()),
        })
        .await?;

    Ok((data_source, coverage))
}

/// Builds the data source for a file, named after the file.
fn data_source_params(path: &Path, filetype: Filetype, data_uploaded: bool) -> DataSourceCreateParams {
    let filename = path.display().to_string();
    let name = match filetype {
        Filetype::Bed => format!("Regions from file \"{filename}\""),
        Filetype::Vcf | Filetype::Csv => format!("Variants from file \"{filename}\""),
    };
    let input = if data_uploaded {
        DataSourceInput::LocalFile(filename.clone())
    } else {
        DataSourceInput::Upload(path.to_path_buf())
    };

    DataSourceCreateParams {
        gzipped: filename.ends_with(".gz"),
        ..DataSourceCreateParams::new(name, filetype, input)
    }
}

async fn check_readable(path: &Path) -> Result<(), ResourceError> {
    tokio::fs::File::open(path)
        .await
        .map(drop)
        .map_err(|e| ResourceError::Upload {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}
