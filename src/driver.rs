use std::io;
use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use tracing::info;

use crate::grid::Grid;
use crate::grid::GridError;
use crate::grid::Snapshot;
use crate::parse_lif;
use crate::parse_lif::LifError;
use crate::patterns;
use crate::placement;
use crate::placement::Placement;

/// What the simulation is asked to do, independent of how it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub rows: usize,
    pub cols: usize,

    /// Stop once this generation has been rendered. `None` runs until the renderer stops it.
    pub turns: Option<u64>,

    /// Generations per second
    pub rate: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: 22,
            cols: 78,
            turns: None,
            rate: 2,
        }
    }
}

/// Initial contents of the grid.
#[derive(Debug, Clone, Copy)]
pub enum Seed<'a> {
    /// The built-in R-pentomino
    RPentomino,

    /// The text of a Life 1.05/1.06 file
    Shape { text: &'a str, placement: Placement },
}

/// Extra information passed to renderers along with each generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub rate: u32,
    pub turns: Option<u64>,

    /// This is the last generation that will be rendered
    pub last: bool,
}

/// Receives every generation exactly once, in order.
pub trait Renderer {
    /// Show one generation. Returning `Break` stops the simulation.
    fn render(&mut self, snapshot: Snapshot<'_>, status: &Status) -> io::Result<ControlFlow<()>>;
}

/// How long to wait between generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    Interval(Duration),

    /// Back to back, for offline renderers
    Immediate,
}

impl Pacing {
    /// One generation every `1/rate` seconds.
    pub fn from_rate(rate: u32) -> Self {
        Pacing::Interval(Duration::from_secs(1) / rate.max(1))
    }

    fn wait(&self) {
        if let Pacing::Interval(d) = self {
            thread::sleep(*d);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Seeding,
    Running,
    Stopped,
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] LifError),

    #[error("Render error: {0}")]
    Render(#[from] io::Error),

    #[error("Simulation is {state:?}, expected {expected:?}")]
    InvalidState { state: State, expected: State },
}

/// Owns the grid and drives it from seeding to the final generation.
pub struct Simulation {
    grid: Grid,
    state: State,
    turns: Option<u64>,
    rate: u32,
}

impl Simulation {
    /// Create an empty simulation, waiting to be seeded.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let grid = Grid::new(config.rows, config.cols)?;

        Ok(Self {
            grid,
            state: State::Seeding,
            turns: config.turns.filter(|&t| t > 0),
            rate: config.rate,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Fill the grid. Any failure here is final, and a pattern that fails to parse leaves the
    /// grid untouched.
    pub fn seed(&mut self, seed: Seed<'_>) -> Result<(), SimError> {
        self.expect_state(State::Seeding)?;

        match seed {
            Seed::RPentomino => patterns::seed_r_pentomino(&mut self.grid)?,
            Seed::Shape { text, placement } => {
                let shape = parse_lif::read_lif(text)?;

                debug!(
                    format = ?shape.format,
                    cells = shape.cells.len(),
                    offset = ?shape.offset,
                    "Parsed shape"
                );

                let dropped = placement::load_shape(&mut self.grid, &shape, placement)?;
                if dropped > 0 {
                    debug!(dropped, "Cells moved off the grid were dropped");
                }
            }
        }

        info!(alive = self.grid.alive_count(), "Grid seeded");
        self.state = State::Running;

        Ok(())
    }

    /// Render the current generation, then advance unless this was the last one.
    ///
    /// Returns the state after the tick.
    pub fn tick<R: Renderer>(&mut self, renderer: &mut R) -> Result<State, SimError> {
        self.expect_state(State::Running)?;

        let generation = self.grid.generation();
        let status = Status {
            rate: self.rate,
            turns: self.turns,
            last: self.turns.is_some_and(|t| generation >= t),
        };

        let flow = renderer.render(self.grid.snapshot(), &status)?;

        if status.last || flow.is_break() {
            info!(generation, "Simulation stopped");
            self.state = State::Stopped;
        } else {
            self.grid.step();
        }

        Ok(self.state)
    }

    /// Tick until stopped. Returns the last rendered generation.
    pub fn run<R: Renderer>(&mut self, renderer: &mut R, pacing: Pacing) -> Result<u64, SimError> {
        info!(turns = ?self.turns, rate = self.rate, "Simulation running");

        while self.tick(renderer)? == State::Running {
            pacing.wait();
        }

        Ok(self.grid.generation())
    }

    fn expect_state(&self, expected: State) -> Result<(), SimError> {
        if self.state != expected {
            return Err(SimError::InvalidState {
                state: self.state,
                expected,
            });
        }

        Ok(())
    }
}
