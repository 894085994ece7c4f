//! FacetView CLI
//!
//! Project virtual views over a stored content snapshot:
//! - `mirror` / `select`: dereference a reference, with or without facet rules
//! - `node` / `expand`: apply a stored node (or mirror it) and expand lazily
//! - `query`: run a faceted result set
//! - `demo`: write a small sample snapshot to play with

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use facetview_engine::{EngineConfig, MirrorRequest, ProjectionEngine, ResultSetRequest};
use facetview_model::{
    ContextToken, CriteriaTriple, FacetConstraint, NodeId, OrderBy, RangeConstraint, VirtualNode,
};
use facetview_store::{MemorySearchEngine, MemoryStore};

mod demo;
mod render;

#[derive(Parser)]
#[command(name = "facetview")]
#[command(author, version, about = "FacetView: virtual views over a content store")]
struct Cli {
    /// Store snapshot (`.json`, or binary otherwise)
    #[arg(short, long, global = true, default_value = "facetview.json")]
    store: PathBuf,

    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Context token identifying the request
    #[arg(long, global = true, default_value = "cli")]
    context: String,

    #[arg(short, long, global = true, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Log engine decisions (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Tree,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the node a reference points at
    Mirror {
        /// Node id, or `/`-separated path
        reference: String,
        /// Name of the virtual node
        #[arg(short, long, default_value = "mirror")]
        name: String,
        /// Expand this many levels below the mirror
        #[arg(short, long, default_value_t = 0)]
        depth: usize,
    },

    /// Mirror a reference and apply facet rules (`facet=value:mode`)
    Select {
        reference: String,
        #[arg(short, long, default_value = "select")]
        name: String,
        /// Rule, repeatable; modes: stick, select, single, prefer, prefer-single, clear
        #[arg(short, long = "rule")]
        rules: Vec<CriteriaTriple>,
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },

    /// Project a stored node as a root
    Node {
        /// Node id, or `/`-separated path
        node: String,
        #[arg(short, long, default_value_t = 0)]
        depth: usize,
    },

    /// Project a stored node and expand every level below it
    Expand {
        node: String,
        #[arg(short, long, default_value_t = 3)]
        depth: usize,
    },

    /// Run a faceted result set
    Query {
        /// Scope of the search: node id or path
        docbase: String,
        #[arg(short, long, default_value = "results")]
        name: String,
        /// Inherited filter (`facet=value&facet=value`)
        #[arg(long)]
        filter: Option<String>,
        /// Exact constraint (`facet=value`), repeatable
        #[arg(long = "facet")]
        facets: Vec<FacetConstraint>,
        /// Inclusive range (`facet=lower..upper`), repeatable
        #[arg(long = "range")]
        ranges: Vec<RangeConstraint>,
        /// Ordering facet, `-` prefix for descending, repeatable
        #[arg(long = "order", allow_hyphen_values = true)]
        order_by: Vec<OrderBy>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Write a sample snapshot to `--store`
    Demo,
}

/// Global options shared by every command.
struct Options {
    store: PathBuf,
    config: Option<PathBuf>,
    context: ContextToken,
    format: Format,
}

/// A loaded snapshot and an engine over it.
struct Session {
    store: Arc<MemoryStore>,
    engine: ProjectionEngine,
    ctx: ContextToken,
    format: Format,
}

impl Session {
    fn open(opts: &Options) -> Result<Self> {
        let store = Arc::new(MemoryStore::load(&opts.store)?);
        let config = match &opts.config {
            Some(path) => EngineConfig::from_path(path)?,
            None => EngineConfig::default(),
        };
        let search = Arc::new(
            MemorySearchEngine::new(Arc::clone(&store))
                .with_document_types(config.kinds.document_types.clone()),
        );
        let engine = ProjectionEngine::with_config(store.clone(), search, config);
        tracing::debug!(
            store = %opts.store.display(),
            nodes = store.len(),
            context = %opts.context,
            "opened snapshot"
        );
        Ok(Self {
            store,
            engine,
            ctx: opts.context.clone(),
            format: opts.format,
        })
    }

    /// Paths (starting with `/`) are looked up; anything else passes through
    /// as a stored reference for the engine to resolve.
    fn reference(&self, raw: &str) -> Result<String> {
        if raw.starts_with('/') {
            return Ok(self.lookup(raw)?.to_string());
        }
        Ok(raw.to_string())
    }

    fn node_id(&self, raw: &str) -> Result<NodeId> {
        match NodeId::parse(raw) {
            Ok(id) => Ok(id),
            Err(_) => self.lookup(raw),
        }
    }

    fn lookup(&self, path: &str) -> Result<NodeId> {
        self.store
            .resolve_path(path)
            .ok_or_else(|| anyhow!("no node at path `{path}`"))
    }

    fn emit(&self, root: VirtualNode, depth: usize) -> Result<()> {
        let tree = render::expand_tree(&self.engine, root, depth, &self.ctx)?;
        match self.format {
            Format::Tree => render::print_tree(&tree),
            Format::Json => println!("{}", serde_json::to_string_pretty(&render::to_json(&tree)?)?),
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let opts = Options {
        store: cli.store,
        config: cli.config,
        context: ContextToken::new(cli.context),
        format: cli.format,
    };

    match cli.command {
        Commands::Mirror {
            reference,
            name,
            depth,
        } => cmd_mirror(&opts, &reference, name, None, depth),
        Commands::Select {
            reference,
            name,
            rules,
            depth,
        } => cmd_mirror(&opts, &reference, name, Some(rules), depth),
        Commands::Node { node, depth } | Commands::Expand { node, depth } => {
            cmd_node(&opts, &node, depth)
        }
        Commands::Query {
            docbase,
            name,
            filter,
            facets,
            ranges,
            order_by,
            limit,
        } => {
            let request = ResultSetRequest {
                query_name: name,
                inherited_filter: filter,
                facets,
                ranges,
                order_by,
                limit,
                ..ResultSetRequest::default()
            };
            cmd_query(&opts, &docbase, request)
        }
        Commands::Demo => cmd_demo(&opts.store),
    }
}

fn cmd_mirror(
    opts: &Options,
    reference: &str,
    name: String,
    rules: Option<Vec<CriteriaTriple>>,
    depth: usize,
) -> Result<()> {
    let session = Session::open(opts)?;
    let mut request = MirrorRequest::new(session.reference(reference)?, name);
    request.criteria = rules;
    let root = session.engine.project_mirror(&request, &session.ctx)?;
    session.emit(root, depth)
}

fn cmd_node(opts: &Options, node: &str, depth: usize) -> Result<()> {
    let session = Session::open(opts)?;
    let id = session.node_id(node)?;
    let root = session.engine.project_node(id, &session.ctx)?;
    session.emit(root, depth)
}

fn cmd_query(opts: &Options, docbase: &str, mut request: ResultSetRequest) -> Result<()> {
    let session = Session::open(opts)?;
    request.docbase = session.reference(docbase)?;
    let set = session.engine.project_result_set(&request, &session.ctx)?;
    if matches!(session.format, Format::Tree) && set.node.is_populated() {
        eprintln!("{} {}", "matches".green().bold(), set.count);
    }
    session.emit(set.node, 0)
}

fn cmd_demo(out: &Path) -> Result<()> {
    let store = demo::sample_store()?;
    store.save(out)?;
    eprintln!(
        "{} {} ({} nodes)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        store.len()
    );
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "facetview_engine=debug,facetview_store=info,warn",
        _ => "facetview_engine=trace,facetview_store=debug,info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}
