//! MILSGen CLI - heightmap to LDraw plate terrain.
//!
//! Generate one LDraw model per terrain tile from a heightmap image, and
//! combine generated tiles into a single model.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use milsgen::color::ColorSource;
use milsgen::combine::combine_dir;
use milsgen::config::{CombineConfig, GenerateConfig};
use milsgen::pipeline::{write_tiles, TileGenerator};
use milsgen::terrain::{AltitudeRange, PixelBuffer};
use milsgen::tile::TileModel;

/// Heightmap to LDraw plate terrain generator.
#[derive(Parser)]
#[command(name = "milsgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log per-layer progress (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one LDraw model per tile of a heightmap image.
    Generate {
        /// Input terrain image.
        #[arg(default_value = "milsgen.png")]
        image: PathBuf,

        /// Output directory for tile files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// JSON run configuration; flags below override its fields.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tile (baseplate) edge length in studs [default: 32].
        #[arg(short, long)]
        tile_size: Option<u32>,

        /// Altitude of the highest point of the image, in plates [default: 24].
        #[arg(short, long)]
        levels: Option<u32>,

        /// Leave out baseplates, corner bricks and technic connectors.
        #[arg(long)]
        no_substructure: bool,

        /// Use one LDraw color for every level.
        #[arg(short, long, conflicts_with = "level_colors")]
        color: Option<u32>,

        /// Per-level logical color list, translated through --color-map.
        #[arg(long)]
        level_colors: Option<PathBuf>,

        /// Logical to LDraw color table (CSV).
        #[arg(long, default_value = "colours.csv")]
        color_map: PathBuf,

        /// Keep existing .ldr files in the output directory.
        #[arg(long)]
        keep_existing: bool,

        /// Generate tiles in parallel (no per-tile progress).
        #[arg(long)]
        parallel: bool,
    },

    /// Combine generated tiles into a single LDraw model.
    Combine {
        /// Directory containing A1.ldr, B1.ldr, ...
        #[arg(short, long, default_value = "./output")]
        input: PathBuf,

        /// Combined model file.
        #[arg(short, long, default_value = "milscombine.ldr")]
        output: PathBuf,

        /// Tile edge length in studs.
        #[arg(long, default_value = "32")]
        tile_studs: u32,
    },

    /// Display the tile grid and altitude quantization of an image.
    Info {
        /// Input terrain image.
        #[arg(default_value = "milsgen.png")]
        image: PathBuf,

        /// Tile edge length in studs.
        #[arg(short, long, default_value = "32")]
        tile_size: u32,

        /// Altitude of the highest point of the image, in plates.
        #[arg(short, long, default_value = "24")]
        levels: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Generate {
            image,
            output,
            config,
            tile_size,
            levels,
            no_substructure,
            color,
            level_colors,
            color_map,
            keep_existing,
            parallel,
        } => {
            let mut run_config = match config {
                Some(path) => GenerateConfig::from_json_file(&path).unwrap_or_else(|e| {
                    eprintln!("Error loading config: {}", e);
                    std::process::exit(1);
                }),
                None => GenerateConfig::default(),
            };
            if let Some(tile_size) = tile_size {
                run_config.tile_size = tile_size;
            }
            if let Some(levels) = levels {
                run_config.levels = levels;
            }
            if no_substructure {
                run_config.include_substructure = false;
            }
            if let Some(color) = color {
                run_config.colors = ColorSource::Constant(color);
            } else if let Some(level_colors) = level_colors {
                run_config.colors = ColorSource::Files { level_colors, color_map };
            }

            run_generate(image, output, run_config, !keep_existing, parallel);
        }
        Commands::Combine { input, output, tile_studs } => {
            run_combine(input, output, tile_studs);
        }
        Commands::Info { image, tile_size, levels } => {
            run_info(image, tile_size, levels);
        }
    }
}

fn run_generate(image: PathBuf, output: PathBuf, config: GenerateConfig, clean: bool, parallel: bool) {
    println!("MILSGen - LDraw Plate Terrain Generator");
    println!("=======================================");
    println!("Input: {}", image.display());
    println!("Output: {}", output.display());
    println!("Tile size: {} studs, {} levels", config.tile_size, config.levels);

    let start = Instant::now();

    let generator = TileGenerator::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    println!("\nLoading input image...");
    let buffer = PixelBuffer::open(&image).unwrap_or_else(|e| {
        eprintln!("Error loading image '{}': {}", image.display(), e);
        std::process::exit(1);
    });
    println!("Image size: {} x {} px", buffer.width(), buffer.height());

    let plan = generator.plan(&buffer).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    println!("Target: {} x {} modules", plan.columns, plan.rows);
    println!("Altitude extents: {} - {}", plan.range.min, plan.range.max);

    println!("\nGenerating tiles...");
    let result = if parallel {
        generator.run(&buffer)
    } else {
        generator.run_with_callbacks(
            &buffer,
            |id, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, id);
            },
            |tile: &TileModel, i, total| {
                println!("  [{}/{}] Completed: {} ({} parts)", i + 1, total, tile.id, tile.part_count());
            },
        )
    };
    let tiles = result.unwrap_or_else(|e| {
        eprintln!("Error during generation: {}", e);
        std::process::exit(1);
    });

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    println!("\nWriting tiles...");
    let written = write_tiles(&tiles, &output, clean).unwrap_or_else(|e| {
        eprintln!("Error writing tiles: {}", e);
        std::process::exit(1);
    });
    println!("  Exported {} tile files to {}", written.len(), output.display());

    let total_parts: usize = tiles.iter().map(TileModel::part_count).sum();
    println!("\n{} total parts used", total_parts);
    println!("Total time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_combine(input: PathBuf, output: PathBuf, tile_studs: u32) {
    println!("MILSCombine - LDraw Tile Combiner");
    println!("=================================");

    let config = CombineConfig::with_tile_studs(tile_studs);
    let start = Instant::now();

    let model = combine_dir(&input, &output, &config).unwrap_or_else(|e| {
        eprintln!("Error combining tiles: {}", e);
        std::process::exit(1);
    });

    println!("Found matrix {} wide x {} high", model.columns, model.rows);
    println!("Combined {} parts into {}", model.parts.len(), output.display());
    println!("Completed in {:.2?}", start.elapsed());
}

fn run_info(image: PathBuf, tile_size: u32, levels: u32) {
    let config = GenerateConfig { tile_size, levels, ..Default::default() };
    let generator = TileGenerator::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let buffer = PixelBuffer::open(&image).unwrap_or_else(|e| {
        eprintln!("Error loading image '{}': {}", image.display(), e);
        std::process::exit(1);
    });

    let (columns, rows) = buffer.tile_grid(tile_size);
    let range = AltitudeRange::observe(&buffer);
    let max_level = generator.config().max_level();

    println!("MILSGen - Image Info");
    println!("====================");
    println!();
    println!("Image: {} ({} x {} px)", image.display(), buffer.width(), buffer.height());
    println!("Tiles: {} x {} of {} studs", columns, rows, tile_size);
    let dropped_x = buffer.width() - columns * tile_size;
    let dropped_y = buffer.height() - rows * tile_size;
    if dropped_x > 0 || dropped_y > 0 {
        println!("  Unused edge: {} px right, {} px bottom", dropped_x, dropped_y);
    }
    println!();
    println!("Altitude extents: {} - {}", range.min, range.max);
    if range.is_degenerate() {
        println!("  Flat image: no relief to quantize");
    } else {
        println!("Bias: {}, Scale: 1 : {}", range.min, range.step(max_level));
        println!("Levels: 0 - {} ({} LDU tall)", max_level, (max_level as i64 + 1) * 8);
    }
    println!();

    let catalog = generator.catalog();
    println!("Plate catalog ({} shapes):", catalog.len());
    for (level, label) in [(0, "even levels"), (1, "odd levels")] {
        let order: Vec<String> = catalog
            .ordered_for_level(level)
            .iter()
            .map(|s| format!("{}x{}", s.width, s.depth))
            .collect();
        println!("  {:<12} {}", label, order.join(" "));
    }
}
