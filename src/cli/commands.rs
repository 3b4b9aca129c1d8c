use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use dir_context::analysis::{affected_directories, resolve_target};
use dir_context::config::OutputFormat;
use dir_context::error::Result;
use dir_context::{
    AgentSettings, AnalysisMode, ChangeWatcher, Collaborators, Configuration, ContextSynthesizer,
    ContextView, DirectoryAnalysisRecord, DirectoryAnalyzer, IgnoreFilter, RefreshPlanner,
    RefreshScope,
};

use super::progress::AnalysisProgress;

const WATCH_POLL: Duration = Duration::from_secs(1);

pub struct InitOptions {
    pub mode: AnalysisMode,
    pub no_git: bool,
    pub ai: bool,
    pub ignore: Vec<String>,
}

pub struct RefreshOptions {
    pub path: Option<PathBuf>,
    pub all: bool,
    pub dry_run: bool,
    pub watch: bool,
}

impl RefreshOptions {
    fn scope(&self) -> RefreshScope {
        match (&self.path, self.all) {
            (Some(path), _) => RefreshScope::Path(path.clone()),
            (None, true) => RefreshScope::All,
            (None, false) => RefreshScope::Changed,
        }
    }
}

/// Write a fresh configuration and analyze every directory.
pub async fn init(root: &Path, options: InitOptions) -> Result<()> {
    let mut config = Configuration {
        mode: options.mode,
        ..Configuration::default()
    };
    config.integrations.git = !options.no_git;
    config.integrations.claude = options.ai;
    for pattern in options.ignore {
        if !config.ignore_patterns.contains(&pattern) {
            config.ignore_patterns.push(pattern);
        }
    }

    if Configuration::exists(root) {
        info!("Replacing existing configuration in {}", root.display());
    }

    // Validate patterns before anything is written
    let filter = IgnoreFilter::new(root, &config.ignore_patterns)?;
    let path = config.save(root)?;
    println!("Wrote {}", path.display());

    let analyzer = build_analyzer(root, config, filter)?;
    let planner = RefreshPlanner::new(
        root,
        analyzer.filter(),
        analyzer.collaborators().vcs.as_ref(),
    );
    let dirs = planner.resolve(&RefreshScope::All).await?;

    let records = analyze_dirs(&analyzer, &dirs).await;
    println!(
        "Documented {} of {} directories ({} mode)",
        records.len(),
        dirs.len(),
        analyzer.config().mode
    );
    Ok(())
}

pub async fn refresh(root: &Path, options: RefreshOptions) -> Result<()> {
    let config = Configuration::load(root)?;
    let filter = IgnoreFilter::new(root, &config.ignore_patterns)?;
    let output_format = config.output_format;
    let analyzer = build_analyzer(root, config, filter)?;

    let scope = options.scope();
    let planner = RefreshPlanner::new(
        root,
        analyzer.filter(),
        analyzer.collaborators().vcs.as_ref(),
    );
    let dirs = planner.resolve(&scope).await?;

    if options.dry_run {
        for dir in &dirs {
            println!("{}", relative_display(root, dir));
        }
        return Ok(());
    }

    if dirs.is_empty() {
        if scope == RefreshScope::Changed {
            println!("No changed directories to refresh");
        }
    } else {
        let records = analyze_dirs(&analyzer, &dirs).await;
        println!("Refreshed {} of {} directories", records.len(), dirs.len());

        if output_format == OutputFormat::Json && matches!(scope, RefreshScope::Path(_)) {
            for record in &records {
                println!("{}", serde_json::to_string_pretty(record)?);
            }
        }
    }

    if options.watch {
        watch(root, &analyzer).await?;
    }

    Ok(())
}

/// Render one context view to stdout or `output`.
pub fn context(
    root: &Path,
    view: ContextView,
    path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    // Context views need an initialized project even though they only read documents
    Configuration::load(root)?;

    let target = match path {
        Some(path) => resolve_target(root, path)?,
        None => root.to_path_buf(),
    };

    let text = ContextSynthesizer::new(root).synthesize(&target, view)?;

    match output {
        Some(output) => {
            fs::write(output, &text)?;
            println!("Wrote {} context to {}", view, output.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn build_analyzer(
    root: &Path,
    config: Configuration,
    filter: IgnoreFilter,
) -> Result<DirectoryAnalyzer> {
    let collaborators = Collaborators::from_config(&config, AgentSettings::from_env())?;
    if config.integrations.claude && collaborators.available_ai().is_none() {
        warn!("AI enrichment is enabled but no API key is set; using heuristics only");
    }
    info!(
        "Analyzing {} in {} mode",
        root.display(),
        config.mode.as_str()
    );
    Ok(DirectoryAnalyzer::new(config, filter, collaborators))
}

/// Analyze each directory in order. A directory that cannot be read is
/// logged and skipped.
async fn analyze_dirs(
    analyzer: &DirectoryAnalyzer,
    dirs: &BTreeSet<PathBuf>,
) -> Vec<DirectoryAnalysisRecord> {
    let mut progress = AnalysisProgress::new(dirs.len());
    let mut records = Vec::with_capacity(dirs.len());

    for dir in dirs {
        progress.start(&relative_display(analyzer.filter().root(), dir));
        match analyzer.analyze(dir).await {
            Ok(record) => {
                records.push(record);
                progress.done();
            }
            Err(e) => {
                warn!("Skipping {}: {}", dir.display(), e);
                progress.failed();
            }
        }
    }

    let failed = progress.finish();
    if failed > 0 {
        warn!("{} directories could not be analyzed", failed);
    }
    records
}

async fn watch(root: &Path, analyzer: &DirectoryAnalyzer) -> Result<()> {
    let watcher = ChangeWatcher::new(root)?;
    println!("Watching {} for changes...", root.display());

    loop {
        let batch = tokio::task::block_in_place(|| watcher.next_batch(WATCH_POLL));
        let paths = match batch {
            Ok(Some(paths)) => paths,
            Ok(None) => break,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if paths.is_empty() {
            continue;
        }

        let dirs = affected_directories(root, analyzer.filter(), paths);
        for dir in &dirs {
            match analyzer.analyze(dir).await {
                Ok(_) => println!("Updated {}", relative_display(root, dir)),
                Err(e) => warn!("Skipping {}: {}", dir.display(), e),
            }
        }
    }

    Ok(())
}

fn relative_display(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => dir.display().to_string(),
    }
}
