use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use soundnovel_studio::codec;
use soundnovel_studio::export::{read_artifact, DEFAULT_FILE_NAME};
use soundnovel_studio::media::scan_folder;
use soundnovel_studio::model::{CaptionPosition, Document, ImportReport, PlayerSettings};
use soundnovel_studio::player::{format_time, CaptionTicker};
use soundnovel_studio::store::ProjectStore;
use soundnovel_studio::validation::validate_artifact;
use soundnovel_studio::{ExportConfig, Exporter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "soundnovel-studio")]
#[command(
    about = "Bind images, audio and captions into a portable playlist package",
    long_about = None
)]
struct Args {
    /// Project file to read and update
    #[arg(short = 'p', long, default_value = DEFAULT_FILE_NAME)]
    project: String,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty project
    New {
        #[arg(short = 't', long, default_value = "")]
        title: String,
        #[arg(short = 'd', long, default_value = "")]
        description: String,
        /// Replace an existing project file
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Replace the images with a folder's images, one slide per image
    OpenImages { folder: String },

    /// Replace the audio pool with a folder's audio files
    OpenAudio { folder: String },

    /// Bind audio to a slide (1-based). AUDIO is a file name, an id, or "none".
    BindAudio { slide: usize, audio: String },

    /// Set the caption of a slide (1-based). An empty caption unbinds it.
    Caption { slide: usize, text: String },

    /// Set where the caption is drawn (bottom or right)
    Position {
        slide: usize,
        position: CaptionPosition,
    },

    /// Move a slide from one position to another (1-based)
    Move { from: usize, to: usize },

    /// Edit package metadata and player defaults
    Settings {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Milliseconds per caption character (0-10000)
        #[arg(long)]
        text_speed: Option<u32>,
        /// 0.0 to 1.0
        #[arg(long)]
        volume: Option<f32>,
        #[arg(long)]
        autoplay: Option<bool>,
        #[arg(long)]
        autoplay_nextpage: Option<bool>,
    },

    /// Print the playlist, or one slide (1-based) in detail
    Show {
        slide: Option<usize>,
        /// Show the caption as it looks this many ms into the slide
        #[arg(long)]
        elapsed_ms: Option<u64>,
    },

    /// Write the project to another file
    Export {
        output: PathBuf,
        /// Drop pool entries no slide uses
        #[arg(long)]
        prune: bool,
        /// Write single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Check that the project loads and round-trips losslessly
    Validate,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let project = PathBuf::from(shellexpand::tilde(&args.project).as_ref());

    match args.command {
        Command::New {
            title,
            description,
            force,
        } => {
            let document = Document::create(title, description);
            Exporter::new(ExportConfig::for_path(&project).with_overwrite(force))
                .export(&document)
                .with_context(|| {
                    format!("Not creating {:?} (use --force to replace it)", project)
                })?;
            log::info!("Created new project at {:?}", project);
        }

        Command::Validate => {
            validate_artifact(&project)?;
            log::info!("✅ Validation passed!");
        }

        Command::Show { slide, elapsed_ms } => {
            let document = read_artifact(&project)?;
            match slide {
                Some(slide) => show_slide(&document, slide, elapsed_ms)?,
                None => show_playlist(&document),
            }
        }

        Command::Export {
            output,
            prune,
            compact,
        } => {
            let document = read_artifact(&project)?;
            let output = PathBuf::from(shellexpand::tilde(&output.to_string_lossy()).as_ref());
            let config = ExportConfig::for_path(&output)
                .with_pruning(prune)
                .with_compact(compact);
            let path = Exporter::new(config).export(&document)?;
            log::info!("Project exported to {:?}", path);
        }

        command => {
            let mut store = open_store(&project, &command)?;
            store.subscribe(|change| log::debug!("Project change: {:?}", change));
            apply(&mut store, command)?;
            save(store.get(), &project)?;
        }
    }

    Ok(())
}

/// Load the project into a store. Folder imports may start from scratch.
fn open_store(project: &Path, command: &Command) -> Result<ProjectStore> {
    let mut store = ProjectStore::headless();
    let starts_fresh = matches!(command, Command::OpenImages { .. } | Command::OpenAudio { .. });

    if project.exists() {
        store
            .load(read_artifact(project)?)
            .with_context(|| format!("Could not open project {:?}", project))?;
    } else if starts_fresh {
        log::warn!("{:?} does not exist yet, starting a new project", project);
    } else {
        anyhow::bail!(
            "Project file not found: {:?} (create one with `new`)",
            project
        );
    }
    Ok(store)
}

fn apply(store: &mut ProjectStore, command: Command) -> Result<()> {
    match command {
        Command::OpenImages { folder } => {
            let folder = PathBuf::from(shellexpand::tilde(&folder).as_ref());
            let files = scan_folder(&folder)?;
            let report = store.open_image_folder(files);
            log_report("image", &report);
        }

        Command::OpenAudio { folder } => {
            let folder = PathBuf::from(shellexpand::tilde(&folder).as_ref());
            let files = scan_folder(&folder)?;
            let report = store.open_audio_folder(files);
            log_report("audio", &report);
        }

        Command::BindAudio { slide, audio } => {
            let index = slide_index(store.get(), slide)?;
            let audio_id = find_audio(store.get(), &audio)?;
            store.set(|doc| doc.bind_audio(index, audio_id))?;
            match audio_id {
                Some(id) => log::info!("Slide {} now plays {}", slide, id),
                None => log::info!("Slide {} has no audio", slide),
            }
        }

        Command::Caption { slide, text } => {
            let index = slide_index(store.get(), slide)?;
            store.set(|doc| doc.set_caption(index, &text))?;
            log::info!("Caption of slide {} updated", slide);
        }

        Command::Position { slide, position } => {
            let index = slide_index(store.get(), slide)?;
            store.set(|doc| doc.set_caption_position(index, position))?;
        }

        Command::Move { from, to } => {
            let from_index = slide_index(store.get(), from)?;
            let to_index = slide_index(store.get(), to)?;
            store.reorder(from_index, to_index)?;
            log::info!("Moved slide {} to position {}", from, to);
        }

        Command::Settings {
            title,
            description,
            text_speed,
            volume,
            autoplay,
            autoplay_nextpage,
        } => {
            store.set(|doc| {
                if let Some(title) = title {
                    doc.set_package_name(title);
                }
                if let Some(description) = description {
                    doc.set_description(description);
                }
                let current = *doc.player();
                doc.set_player(PlayerSettings {
                    text_speed: text_speed.unwrap_or(current.text_speed),
                    volume: volume.unwrap_or(current.volume),
                    autoplay: autoplay.unwrap_or(current.autoplay),
                    autoplay_nextpage: autoplay_nextpage.unwrap_or(current.autoplay_nextpage),
                })
            })?;
        }

        Command::New { .. } | Command::Show { .. } | Command::Export { .. } | Command::Validate => {
            anyhow::bail!("{:?} does not modify the project", command)
        }
    }
    Ok(())
}

fn save(document: &Document, project: &Path) -> Result<()> {
    Exporter::new(ExportConfig::for_path(project)).export(document)?;
    Ok(())
}

/// Convert a 1-based slide number to an index
fn slide_index(document: &Document, slide: usize) -> Result<usize> {
    let len = document.playlist().len();
    if slide < 1 || slide > len {
        anyhow::bail!("Slide {} does not exist (project has {} slides)", slide, len);
    }
    Ok(slide - 1)
}

fn find_audio(document: &Document, query: &str) -> Result<Option<Uuid>> {
    if query.eq_ignore_ascii_case("none") || query.is_empty() {
        return Ok(None);
    }
    let pool = &document.src().audio;
    if let Ok(id) = Uuid::parse_str(query) {
        if pool.contains(&id) {
            return Ok(Some(id));
        }
    }
    pool.iter()
        .find(|entry| entry.name == query)
        .map(|entry| Some(entry.id))
        .with_context(|| format!("No audio named {:?} in the project", query))
}

fn log_report(kind: &str, report: &ImportReport) {
    log::info!("Loaded {} {} file(s)", report.added.len(), kind);
    for failure in &report.failures {
        log::warn!("Skipped: {}", failure);
    }
    if report.cleared_bindings > 0 {
        log::warn!(
            "{} slide(s) lost their audio and need rebinding",
            report.cleared_bindings
        );
    }
}

fn show_playlist(document: &Document) {
    println!("{} ({})", document.package_name(), document.version());
    if !document.description().is_empty() {
        println!("{}", document.description());
    }
    let player = document.player();
    println!(
        "text speed {} ms, volume {:.2}, autoplay {}, autoplay next page {}",
        player.text_speed, player.volume, player.autoplay, player.autoplay_nextpage
    );

    for index in 0..document.playlist().len() {
        match document.resolve(index) {
            Ok(resolved) => println!(
                "{:>3}. {}  audio: {}  caption: {}",
                index + 1,
                resolved.image.name,
                resolved.audio.map(|a| a.name.as_str()).unwrap_or("-"),
                resolved.text.map(|t| t.name.as_str()).unwrap_or("-"),
            ),
            Err(e) => println!("{:>3}. <{}>", index + 1, e),
        }
    }
}

fn show_slide(document: &Document, slide: usize, elapsed_ms: Option<u64>) -> Result<()> {
    let index = slide_index(document, slide)?;
    let resolved = document.resolve(index)?;

    println!("No. {} ({})", slide, resolved.slide.id);
    println!(
        "  image:    {} ({})",
        resolved.image.name,
        codec::peek_mime_type(&resolved.image.payload).unwrap_or("?")
    );
    match resolved.audio {
        Some(audio) => println!(
            "  audio:    {} ({})",
            audio.name,
            codec::peek_mime_type(&audio.payload).unwrap_or("?")
        ),
        None => println!("  audio:    None"),
    }
    println!("  position: {:?}", resolved.config.caption_position);

    if let Some(text) = resolved.text {
        let ticker = CaptionTicker::new(&text.payload, document.player().text_speed);
        let shown = match elapsed_ms {
            Some(ms) => ticker.visible_at(ms),
            None => text.payload.as_str(),
        };
        println!(
            "  caption ({} to type out):",
            format_time(ticker.duration_ms() as f64 / 1000.0)
        );
        for line in shown.lines() {
            println!("    {}", line);
        }
    }
    Ok(())
}
