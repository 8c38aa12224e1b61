//! Minimal CLI: infer → (schema | graph)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;
use shapegen::{Generation, Generator, GeneratorOptions, Registry, Universe};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer a de-duplicated type schema from JSON/NDJSON samples
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// log engine decisions (universe hits, promotions) to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and print the emitter view: declarations, imports, unique fields
    Schema(Target),
    /// infer and print the raw type graph
    Graph(Target),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct EngineSettings {
    /// root type name (defaults to the file stem of a single input)
    #[arg(long)]
    root_type: Option<String>,

    /// JSON array of existing type nodes to reuse
    #[arg(long)]
    seed: Option<PathBuf>,

    /// RFC 3339 strings become timestamps
    #[arg(long)]
    timestamps: bool,

    /// scheme-prefixed strings become uris
    #[arg(long)]
    uris: bool,

    /// integral numbers become int64 / big numbers
    #[arg(long)]
    integers: bool,

    /// never promote structs to maps
    #[arg(long)]
    no_maps: bool,

    /// skip the cleanup pass entirely
    #[arg(long)]
    no_cleanup: bool,

    /// do not share identical shapes between paths
    #[arg(long)]
    no_dedupe: bool,

    /// skip uniqueness analysis of top-level records
    #[arg(long)]
    no_unique: bool,
}

#[derive(clap::Parser, Debug)]
struct Target {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    engine_settings: EngineSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every document from every input, in input order.
    fn load(&self) -> Result<Vec<Value>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let per_file = source_paths
            .par_iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }

    fn load_file(&self, path: &Path) -> Result<Vec<Value>> {
        let source_path_str = path.to_string_lossy().to_string();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file ({source_path_str})"))?;

        let docs: Vec<Value> = if self.ndjson {
            source
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(ix, line)| {
                    serde_json::from_str(line).with_context(|| {
                        format!("failed to parse NDJSON line {} ({source_path_str})", ix + 1)
                    })
                })
                .collect::<Result<_>>()?
        } else {
            vec![serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?]
        };

        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            let doc = match self.json_pointer.as_deref() {
                None => doc,
                Some(ptr) => match doc.pointer(ptr) {
                    Some(v) => v.clone(),
                    None => bail!("JSON pointer {ptr} matched nothing ({source_path_str})"),
                },
            };
            match self.jq_expr.as_deref() {
                None => out.push(doc),
                Some(jq_expr) => {
                    let results = crate::jq_exec::run_jaq(jq_expr, &doc).with_context(|| {
                        format!("failed to apply jq expression to source file ({source_path_str})")
                    })?;
                    out.extend(results);
                }
            }
        }
        Ok(out)
    }

    fn default_root_name(&self) -> Option<String> {
        match self.input.as_slice() {
            [single] if !has_glob_chars(single) => Path::new(single)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

impl EngineSettings {
    fn options(&self) -> GeneratorOptions {
        let mut options = GeneratorOptions::new()
            .with_cleanup(!self.no_cleanup)
            .with_dedupe(!self.no_dedupe)
            .with_unique_lookup(!self.no_unique);
        if self.timestamps {
            options = options.with_timestamps();
        }
        if self.uris {
            options = options.with_uris();
        }
        if self.integers {
            options = options.with_integers();
        }
        if self.no_maps {
            options = options.without_maps();
        }
        options
    }

    fn generator(&self) -> Result<Generator> {
        let options = self.options();
        match &self.seed {
            None => Ok(Generator::new(options)),
            Some(path) => {
                let src = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read seed file ({})", path.display()))?;
                let seed = Registry::from_seed_json(&src)?;
                tracing::info!(types = seed.len(), "seeded universe");
                Ok(Generator::with_seed(options, seed))
            }
        }
    }
}

impl Target {
    fn generate(&self) -> Result<Generation> {
        let mut docs = self.input_settings.load()?;
        let value = match docs.len() {
            0 => bail!("no documents found in inputs"),
            1 => docs.remove(0),
            _ => Value::Array(docs),
        };
        let name = self
            .engine_settings
            .root_type
            .clone()
            .or_else(|| self.input_settings.default_root_name())
            .unwrap_or_default();
        let mut generator = self.engine_settings.generator()?;
        Ok(generator.generate_value(&name, &value)?)
    }

    fn write(&self, src: &str) -> Result<()> {
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(out, src)
                    .with_context(|| format!("failed to write {}", out.display()))?;
            }
            None => println!("{src}"),
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        let (target, graph) = match &self.cmd {
            Command::Schema(target) => (target, false),
            Command::Graph(target) => (target, true),
        };
        // debug path
        if target.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }
        let generation = target.generate()?;
        let src = if graph {
            serde_json::to_string_pretty(&generation.root)?
        } else {
            serde_json::to_string_pretty(&generation.schema)?
        };
        target.write(&src)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn has_glob_chars(s: &str) -> bool {
    // Minimal glob detection for the `glob` crate syntax.
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }

    Ok(out)
}
