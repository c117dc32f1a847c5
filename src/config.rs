use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use crate::Coord;
use crate::driver::SimConfig;
use crate::placement::Placement;
use crate::render::Glyphs;

/// Conway's Game of Life on a bounded grid.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about)]
pub struct Args {
    /// Load life pattern from a Life 1.05/1.06 file
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// X translation for the loaded shape (default: auto)
    #[arg(long = "deltax", default_value_t = 0, allow_negative_numbers = true)]
    pub delta_x: Coord,

    /// Y translation for the loaded shape (default: auto)
    #[arg(long = "deltay", default_value_t = 0, allow_negative_numbers = true)]
    pub delta_y: Coord,

    /// Number of rows
    #[arg(long, default_value_t = 22)]
    pub rows: usize,

    /// Number of columns
    #[arg(long, default_value_t = 78)]
    pub cols: usize,

    /// Number of generations to simulate (0 runs until `q` is pressed)
    #[arg(long, default_value_t = 0)]
    pub turns: u64,

    /// Rate of generations per second
    #[arg(
        short = 'r',
        long = "rate",
        default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub rate: u32,

    /// Use color to show cell age
    #[arg(long)]
    pub color: bool,

    /// Use shapes to show cell age
    #[arg(long)]
    pub shape: bool,

    /// Generate a GIF file with the evolution instead of drawing to the terminal
    #[arg(long, value_name = "PATH")]
    pub gif: Option<PathBuf>,
}

impl Args {
    /// Reject flag combinations that parse but make no sense.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gif.is_some() && self.turns == 0 {
            bail!("--gif requires the number of generations to simulate (--turns)");
        }

        Ok(())
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            rows: self.rows,
            cols: self.cols,
            turns: (self.turns > 0).then_some(self.turns),
            rate: self.rate,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::from_deltas(self.delta_x, self.delta_y)
    }

    pub fn glyphs(&self) -> Glyphs {
        Glyphs {
            age_shape: self.shape,
            age_color: self.color,
        }
    }
}
