//! Sample commands
//!
//! Listing, showing, activating, adding, and importing samples.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::commands::{fetch_or_user_error, log, not_found_as_user_error, QueryArgs, UriArgs};
use crate::cli::output;
use crate::import::{
    add_sample, annotate_sample_variations, import_coverage, import_sample, import_variation,
    ImportFiles, SampleOptions,
};
use crate::resources::{
    CoverageListParams, Group, Link, Sample, SampleListParams, User, VariationListParams,
};
use crate::session::Session;

/// Sample subcommands
#[derive(Subcommand, Debug)]
pub enum SamplesCommand {
    /// List samples
    List(ListSamplesArgs),

    /// Show sample details
    Show(UriArgs),

    /// Activate sample
    Activate(UriArgs),

    /// Annotate sample variations with variant frequencies
    AnnotateVariations(AnnotateVariationsArgs),

    /// Add sample
    Add(AddSampleArgs),

    /// Add sample and import variation and coverage files
    Import(ImportSampleArgs),

    /// Import variation file for existing sample
    ImportVcf(ImportVcfArgs),

    /// Import coverage file for existing sample
    ImportBed(ImportBedArgs),
}

impl SamplesCommand {
    /// Execute the sample subcommand
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::List(args) => args.execute(session).await,
            Self::Show(args) => show_sample(session, &args.uri).await,
            Self::Activate(args) => activate_sample(session, &args.uri).await,
            Self::AnnotateVariations(args) => args.execute(session).await,
            Self::Add(args) => args.execute(session).await,
            Self::Import(args) => args.execute(session).await,
            Self::ImportVcf(args) => args.execute(session).await,
            Self::ImportBed(args) => args.execute(session).await,
        }
    }
}

/// Arguments for listing samples
#[derive(Args, Debug)]
pub struct ListSamplesArgs {
    /// Only public samples
    #[arg(short, long)]
    pub public: bool,

    /// Filter samples by user
    #[arg(short, long, value_name = "URI")]
    pub user: Option<String>,

    /// Filter samples by group (more than one can be given)
    #[arg(short, long = "group", value_name = "URI")]
    pub groups: Vec<String>,
}

impl ListSamplesArgs {
    /// Execute the list command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let params = SampleListParams {
            groups: self.groups.iter().map(Link::new).collect(),
            public: self.public.then_some(true),
            user: self.user.as_deref().map(Link::from),
        };

        let mut samples = session.samples(&params);
        let mut first = true;
        while let Some(sample) = samples.next().await? {
            if !first {
                println!();
            }
            first = false;
            println!("{}", output::sample(&sample));
        }
        Ok(())
    }
}

/// Shows a sample with its owner, groups, variations, and coverages.
pub async fn show_sample(session: &Session, uri: &str) -> anyhow::Result<()> {
    let sample = fetch_or_user_error::<Sample>(session, uri).await?;
    println!("{}", output::sample(&sample));

    let user = match &sample.user {
        Some(link) => Some(session.fetch::<User>(link.uri()).await?),
        None => None,
    };
    println!();
    println!("{}", output::sample_user(user.as_ref()));

    for link in sample.groups.iter().flatten() {
        let group = session.fetch::<Group>(link.uri()).await?;
        println!();
        println!("{}", output::sample_group(&group));
    }

    let sample_link = Some(Link::new(sample.uri()));

    let mut variations = session.variations(&VariationListParams {
        sample: sample_link.clone(),
    });
    while let Some(variation) = variations.next().await? {
        println!();
        println!(
            "{}",
            output::import_task("Variation", variation.uri(), variation.task.as_ref())
        );
    }

    let mut coverages = session.coverages(&CoverageListParams {
        sample: sample_link,
    });
    while let Some(coverage) = coverages.next().await? {
        println!();
        println!(
            "{}",
            output::import_task("Coverage", coverage.uri(), coverage.task.as_ref())
        );
    }

    Ok(())
}

/// Marks a sample active.
pub async fn activate_sample(session: &Session, uri: &str) -> anyhow::Result<()> {
    let mut sample = fetch_or_user_error::<Sample>(session, uri).await?;
    sample.set_active(true);
    sample.save(session).await?;

    log(format!("Activated sample: {}", sample.uri()));
    Ok(())
}

/// Arguments for annotating the variations of a sample
#[derive(Args, Debug)]
pub struct AnnotateVariationsArgs {
    /// Sample URI
    #[arg(value_name = "URI")]
    pub uri: String,

    #[command(flatten)]
    pub queries: QueryArgs,
}

impl AnnotateVariationsArgs {
    /// Execute the annotate-variations command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let annotations =
            annotate_sample_variations(session, &self.uri, &self.queries.queries())
                .await
                .map_err(|e| not_found_as_user_error(e.into(), "Sample", &self.uri))?;

        for annotation in &annotations {
            log(format!("Started annotation: {}", annotation.uri()));
        }
        Ok(())
    }
}

/// Settings shared by the commands that add a sample
#[derive(Args, Debug)]
pub struct SampleSettings {
    /// Sample name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Sample is part of this group (more than one can be given)
    #[arg(short, long = "group", value_name = "URI")]
    pub groups: Vec<String>,

    /// Number of individuals in sample
    #[arg(short = 's', long, default_value_t = 1)]
    pub pool_size: u32,

    /// Sample data is public
    #[arg(short, long)]
    pub public: bool,

    /// Sample has no coverage profile
    #[arg(long)]
    pub no_coverage_profile: bool,
}

impl SampleSettings {
    fn to_options(&self) -> SampleOptions {
        SampleOptions {
            groups: self.groups.iter().map(Link::new).collect(),
            pool_size: self.pool_size,
            public: self.public,
            no_coverage_profile: self.no_coverage_profile,
            ..SampleOptions::new(self.name.clone())
        }
    }
}

/// Arguments for adding a sample
#[derive(Args, Debug)]
pub struct AddSampleArgs {
    #[command(flatten)]
    pub sample: SampleSettings,
}

impl AddSampleArgs {
    /// Execute the add command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let sample = add_sample(session, &self.sample.to_options()).await?;
        log(format!("Added sample: {}", sample.uri()));
        Ok(())
    }
}

/// Arguments for adding a sample and importing its data
#[derive(Args, Debug)]
pub struct ImportSampleArgs {
    #[command(flatten)]
    pub sample: SampleSettings,

    /// File in VCF format to import (more than one can be given)
    #[arg(long = "vcf", value_name = "VCF_FILE", required = true)]
    pub vcf_files: Vec<PathBuf>,

    /// File in BED format to import (more than one can be given)
    #[arg(long = "bed", value_name = "BED_FILE")]
    pub bed_files: Vec<PathBuf>,

    /// Data files are already uploaded to the server
    #[arg(short = 'u', long)]
    pub data_uploaded: bool,

    /// Derive genotypes from likelihood scores instead of using reported
    /// genotypes
    #[arg(short = 'l', long = "prefer_genotype_likelihoods")]
    pub prefer_genotype_likelihoods: bool,
}

impl ImportSampleArgs {
    /// Execute the import command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let files = ImportFiles {
            vcf_files: self.vcf_files.clone(),
            bed_files: self.bed_files.clone(),
            data_uploaded: self.data_uploaded,
            prefer_genotype_likelihoods: self.prefer_genotype_likelihoods,
        };

        let imported = import_sample(session, &self.sample.to_options(), &files).await?;

        log(format!("Added sample: {}", imported.sample.uri()));
        for (data_source, variation) in &imported.variations {
            log(format!("Added data source: {}", data_source.uri()));
            log(format!("Started variation import: {}", variation.uri()));
        }
        for (data_source, coverage) in &imported.coverages {
            log(format!("Added data source: {}", data_source.uri()));
            log(format!("Started coverage import: {}", coverage.uri()));
        }
        Ok(())
    }
}

/// Arguments for importing a VCF file for an existing sample
#[derive(Args, Debug)]
pub struct ImportVcfArgs {
    /// Sample URI
    #[arg(value_name = "URI")]
    pub uri: String,

    /// File in VCF format to import
    #[arg(value_name = "VCF_FILE")]
    pub vcf_file: PathBuf,

    /// Data file is already uploaded to the server
    #[arg(short = 'u', long)]
    pub data_uploaded: bool,

    /// Derive genotypes from likelihood scores instead of using reported
    /// genotypes
    #[arg(short = 'l', long = "prefer_genotype_likelihoods")]
    pub prefer_genotype_likelihoods: bool,
}

impl ImportVcfArgs {
    /// Execute the import-vcf command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let (data_source, variation) = import_variation(
            session,
            &self.uri,
            &self.vcf_file,
            self.data_uploaded,
            self.prefer_genotype_likelihoods,
        )
        .await
        .map_err(|e| not_found_as_user_error(e.into(), "Sample", &self.uri))?;

        log(format!("Added data source: {}", data_source.uri()));
        log(format!("Started variation import: {}", variation.uri()));
        Ok(())
    }
}

/// Arguments for importing a BED file for an existing sample
#[derive(Args, Debug)]
pub struct ImportBedArgs {
    /// Sample URI
    #[arg(value_name = "URI")]
    pub uri: String,

    /// File in BED format to import
    #[arg(value_name = "BED_FILE")]
    pub bed_file: PathBuf,

    /// Data file is already uploaded to the server
    #[arg(short = 'u', long)]
    pub data_uploaded: bool,
}

impl ImportBedArgs {
    /// Execute the import-bed command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let (data_source, coverage) =
            import_coverage(session, &self.uri, &self.bed_file, self.data_uploaded)
                .await
                .map_err(|e| not_found_as_user_error(e.into(), "Sample", &self.uri))?;

        log(format!("Added data source: {}", data_source.uri()));
        log(format!("Started coverage import: {}", coverage.uri()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse_samples(args: &[&str]) -> SamplesCommand {
        let cli = Cli::parse_from(std::iter::once("manwe").chain(args.iter().copied()));
        match cli.command {
            Commands::Samples(command) => command,
            other => panic!("Expected samples command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let command = parse_samples(&[
            "samples", "list", "-p", "-u", "/users/2", "-g", "/groups/1", "-g", "/groups/5",
        ]);
        let SamplesCommand::List(args) = command else {
            panic!("Expected list");
        };
        assert!(args.public);
        assert_eq!(args.user.as_deref(), Some("/users/2"));
        assert_eq!(args.groups, vec!["/groups/1", "/groups/5"]);
    }

    #[test]
    fn test_parse_add_defaults() {
        let SamplesCommand::Add(args) = parse_samples(&["samples", "add", "Trio"]) else {
            panic!("Expected add");
        };
        let options = args.sample.to_options();
        assert_eq!(options.name, "Trio");
        assert_eq!(options.pool_size, 1);
        assert!(!options.public);
        assert!(!options.no_coverage_profile);
    }

    #[test]
    fn test_parse_import() {
        let SamplesCommand::Import(args) = parse_samples(&[
            "samples", "import", "Trio", "--vcf", "a.vcf", "--vcf", "b.vcf.gz", "--bed",
            "a.bed", "-s", "3", "-u", "-l",
        ]) else {
            panic!("Expected import");
        };
        assert_eq!(
            args.vcf_files,
            vec![PathBuf::from("a.vcf"), PathBuf::from("b.vcf.gz")]
        );
        assert_eq!(args.bed_files, vec![PathBuf::from("a.bed")]);
        assert_eq!(args.sample.pool_size, 3);
        assert!(args.data_uploaded);
        assert!(args.prefer_genotype_likelihoods);
    }

    #[test]
    fn test_parse_import_requires_vcf() {
        let result = Cli::try_parse_from(["manwe", "samples", "import", "Trio", "--bed", "a.bed"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_annotate_variations() {
        let SamplesCommand::AnnotateVariations(args) = parse_samples(&[
            "samples",
            "annotate-variations",
            "/samples/3",
            "-q",
            "all",
            "*",
        ]) else {
            panic!("Expected annotate-variations");
        };
        assert_eq!(args.uri, "/samples/3");
        assert_eq!(args.queries.queries()["all"], "*");
    }
}
