use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lifegrid::config::Args;
use lifegrid::driver::Pacing;
use lifegrid::driver::Seed;
use lifegrid::driver::Simulation;
use lifegrid::gif::GifRecorder;
use lifegrid::render::RawMode;
use lifegrid::render::TerminalRenderer;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    args.validate()?;

    let pattern = match &args.file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read pattern file {}", path.display()))?,
        ),
        None => None,
    };

    let seed = match &pattern {
        Some(text) => Seed::Shape {
            text,
            placement: args.placement(),
        },
        None => Seed::RPentomino,
    };

    let mut sim = Simulation::new(&args.sim_config()).context("Failed to create the grid")?;
    sim.seed(seed).context("Failed to seed the grid")?;

    if let Some(path) = &args.gif {
        // fail before simulating if the output can't be written
        let file = File::create(path)
            .with_context(|| format!("Failed to create GIF file {}", path.display()))?;

        let mut recorder = GifRecorder::new().loops(args.turns);
        let generation = sim.run(&mut recorder, Pacing::Immediate)?;
        println!("Reached generation {generation}");

        print!("Generating GIF ... ");
        recorder
            .finish(BufWriter::new(file))
            .context("Failed to encode GIF")?;
        println!("done.\n[{}]", path.display());

        return Ok(());
    }

    let stdout = io::stdout();
    let interactive = stdout.is_terminal();

    let generation = {
        let _raw = interactive.then(RawMode::enable).transpose()?;

        let mut renderer = TerminalRenderer::new(stdout.lock(), args.glyphs()).interactive(interactive);
        sim.run(&mut renderer, Pacing::from_rate(args.rate))?
    };

    println!("\nReached generation {generation}");

    Ok(())
}
