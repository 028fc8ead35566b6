//! CLI entry point for localgreat.

use ahash::AHashSet;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use localgreat::config::{Config, DEFAULT_DOWNSTREAM, DEFAULT_UPSTREAM};
use localgreat::great::{AnnotationSource, GeneSetSource, LocalGreat};
use localgreat::output::{table_file_name, write_all, write_associations, write_table};

/// Name of the table holding every category.
const COMBINED_TABLE: &str = "all_categories.tsv";

/// Local genomic region enrichment analysis.
///
/// Associates BED regions with genes through regulatory domains and tests
/// gene-set terms for enrichment with binomial and hypergeometric tests.
#[derive(Parser, Debug)]
#[command(name = "localgreat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GTF annotation file
    #[arg(short = 'g', long = "gtf", required_unless_present = "genes_bed", conflicts_with = "genes_bed")]
    gtf: Option<PathBuf>,

    /// BED6 gene annotation (chrom, start, end, name, score, strand) instead of a GTF
    #[arg(long = "genes-bed")]
    genes_bed: Option<PathBuf>,

    /// Region BED file (required)
    #[arg(short = 'b', long = "bed")]
    bed: PathBuf,

    /// Gene-set GMT file as [CATEGORY=]PATH (repeatable)
    #[arg(short = 's', long = "gene-sets", required_unless_present_any = ["msigdb", "gaf"])]
    gene_sets: Vec<String>,

    /// MSigDB GMT file split into categories by set prefix (repeatable)
    #[arg(long = "msigdb")]
    msigdb: Vec<PathBuf>,

    /// GO annotation file (GAF) split into one category per GO aspect
    #[arg(long = "gaf")]
    gaf: Option<PathBuf>,

    /// GO ontology (OBO) providing term names and namespaces for --gaf
    #[arg(long = "obo", requires = "gaf")]
    obo: Option<PathBuf>,

    /// Output directory (required)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Chromosome sizes file used to clip domains
    #[arg(long = "chrom-sizes")]
    chrom_sizes: Option<PathBuf>,

    /// Association rule: basalPlusExt, twoClosest or oneClosest
    #[arg(short = 'r', long = "rule", default_value = "basalPlusExt")]
    rule: String,

    /// Basal domain upstream of the TSS in bp
    #[arg(long = "upstream", default_value_t = DEFAULT_UPSTREAM, allow_negative_numbers = true)]
    upstream: i64,

    /// Basal domain downstream of the TSS in bp
    #[arg(long = "downstream", default_value_t = DEFAULT_DOWNSTREAM, allow_negative_numbers = true)]
    downstream: i64,

    /// Maximum extension from the TSS in kb
    #[arg(long = "max-extension", default_value = "1000", allow_negative_numbers = true)]
    max_extension: i64,

    /// BED starts are one-based instead of zero-based
    #[arg(long = "one-based")]
    one_based: bool,

    /// Report terms with at least this many observed genes
    #[arg(long = "min-genes", default_value = "1")]
    min_genes: usize,

    /// Report terms with a binomial FDR at most this value
    #[arg(long = "max-fdr", default_value = "1.0")]
    max_fdr: f64,

    /// Smallest annotated term size to test
    #[arg(long = "min-term-size", default_value = "1")]
    min_term_size: usize,

    /// Largest annotated term size to test
    #[arg(long = "max-term-size", default_value = "10000")]
    max_term_size: usize,

    /// Write the region-gene association table to this file
    #[arg(long = "associations")]
    associations: Option<PathBuf>,

    /// GTF tag for gene ID
    #[arg(long = "gene-id-tag", default_value = "gene_id")]
    gene_id_tag: String,

    /// GTF tag for gene name
    #[arg(long = "gene-name-tag", default_value = "gene_name")]
    gene_name_tag: String,

    /// Number of worker threads (0 = auto-detect)
    #[arg(long = "threads", short = 'j', default_value = "0")]
    threads: usize,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::new();
    config
        .set_rule(&args.rule)
        .context("Invalid association rule")?;

    config
        .set_max_extension_kb(args.max_extension)
        .context("Invalid configuration")?;
    config.upstream = args.upstream;
    config.downstream = args.downstream;
    config.zero_based = !args.one_based;
    config.min_genes = args.min_genes;
    config.max_fdr = args.max_fdr;
    config.min_term_size = args.min_term_size;
    config.max_term_size = args.max_term_size;
    config.gene_id_tag = args.gene_id_tag.clone();
    config.gene_name_tag = args.gene_name_tag.clone();

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn gene_set_sources(args: &Args) -> Vec<GeneSetSource> {
    let mut sources: Vec<GeneSetSource> = args.gene_sets.iter().map(|s| GeneSetSource::parse(s)).collect();
    sources.extend(args.msigdb.iter().cloned().map(GeneSetSource::MsigDb));
    if let Some(gaf) = &args.gaf {
        sources.push(GeneSetSource::Gaf {
            path: gaf.clone(),
            obo: args.obo.clone(),
        });
    }
    sources
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Validate inputs
    let annotation = match (&args.gtf, &args.genes_bed) {
        (Some(gtf), _) => AnnotationSource::Gtf(gtf.clone()),
        (None, Some(bed)) => AnnotationSource::Bed(bed.clone()),
        (None, None) => bail!("A gene annotation is required (--gtf or --genes-bed)"),
    };
    if !annotation.path().exists() {
        match &annotation {
            AnnotationSource::Gtf(_) => bail!("GTF file not found: {}", annotation.path().display()),
            AnnotationSource::Bed(_) => bail!("Gene BED file not found: {}", annotation.path().display()),
        }
    }
    if !args.bed.exists() {
        bail!("BED file not found: {}", args.bed.display());
    }
    let sources = gene_set_sources(&args);
    for path in sources.iter().flat_map(|source| source.paths()) {
        if !path.exists() {
            bail!("Gene-set file not found: {}", path.display());
        }
    }

    let config = build_config(&args)?;

    let num_threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("Failed to create thread pool")?;

    let great = LocalGreat::from_files(&annotation, &sources, args.chrom_sizes.as_deref(), config)
        .context("Failed to load annotation inputs")?;
    let result = great
        .analyze_bed(&args.bed)
        .with_context(|| format!("Failed to analyze {}", args.bed.display()))?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;

    let tables = result.reported_tables();
    let mut file_names = AHashSet::new();
    file_names.insert(COMBINED_TABLE.to_string());
    for (category, table) in &tables {
        let file_name = table_file_name(category);
        if !file_names.insert(file_name.clone()) {
            bail!("Category '{}' maps to an output file name already in use: {}", category, file_name);
        }

        let path = args.output.join(&file_name);
        let mut writer = create_output(&path)?;
        write_table(&mut writer, table).with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;
        info!(category = %category, rows = table.len(), path = %path.display(), "Wrote enrichment table");
    }

    let combined = args.output.join(COMBINED_TABLE);
    let mut writer = create_output(&combined)?;
    write_all(&mut writer, tables.values()).with_context(|| format!("Failed to write {}", combined.display()))?;
    writer.flush()?;

    if let Some(path) = &args.associations {
        let mut writer = create_output(path)?;
        write_associations(&mut writer, &result.associations)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;
        info!(rows = result.associations.len(), path = %path.display(), "Wrote region-gene associations");
    }

    let summary = &result.summary;
    info!(
        rule = %summary.rule,
        regions = summary.regions,
        skipped_regions = summary.skipped_regions,
        hit_genes = summary.hit_genes,
        genome_length = summary.genome_length,
        dropped_symbols = summary.dropped_symbols,
        filtered_terms = summary.filtered_terms,
        "Analysis complete"
    );

    Ok(())
}
