// the snake advances one cell per tick, head first; the tail is dropped unless food was eaten
// a turn that would reverse the snake onto its own neck is ignored
use std::collections::VecDeque;

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GameError, Result};

const MIN_BOARD_CELLS: i32 = 10;
pub const DEFAULT_TICK_MS: u64 = 120;
pub const DEFAULT_FOOD_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnakeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SnakeDirection {
    pub fn delta(self) -> (i32, i32) {
        match self {
            SnakeDirection::Up => (0, -1),
            SnakeDirection::Down => (0, 1),
            SnakeDirection::Left => (-1, 0),
            SnakeDirection::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> SnakeDirection {
        match self {
            SnakeDirection::Up => SnakeDirection::Down,
            SnakeDirection::Down => SnakeDirection::Up,
            SnakeDirection::Left => SnakeDirection::Right,
            SnakeDirection::Right => SnakeDirection::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, SnakeDirection::Left | SnakeDirection::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameDifficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
    Impossible,
}

impl GameDifficulty {
    /// Tick period in milliseconds.
    pub fn get_speed(&self) -> u64 {
        match self {
            GameDifficulty::Easy => 500,       // 2 fps
            GameDifficulty::Medium => 250,     // 4 fps
            GameDifficulty::Hard => 166,       // 6 fps
            GameDifficulty::Extreme => 125,    // 8 fps
            GameDifficulty::Impossible => 100, // 10 fps
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    x: i32,
    y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Coordinates {
        Coordinates { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn step(&self, direction: SnakeDirection) -> Coordinates {
        let (dx, dy) = direction.delta();
        Coordinates::new(self.x + dx, self.y + dy)
    }
}

/// Playing field measured in cells, laid over a frame measured in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSize {
    columns: i32,
    rows: i32,
    cell_size: i32,
}

impl BoardSize {
    pub fn new(columns: i32, rows: i32, cell_size: i32) -> Result<BoardSize> {
        if cell_size <= 0 {
            return Err(GameError::invalid_board("cell size must be positive"));
        }
        if columns < MIN_BOARD_CELLS || rows < MIN_BOARD_CELLS {
            return Err(GameError::invalid_board(format!(
                "board must be at least {MIN_BOARD_CELLS}x{MIN_BOARD_CELLS} cells, \
                 got {columns}x{rows}"
            )));
        }
        Ok(BoardSize {
            columns,
            rows,
            cell_size,
        })
    }

    pub fn from_pixels(width: u32, height: u32, cell_size: u32) -> Result<BoardSize> {
        if cell_size == 0 {
            return Err(GameError::invalid_board("cell size must be positive"));
        }
        if width % cell_size != 0 || height % cell_size != 0 {
            return Err(GameError::invalid_board(format!(
                "frame {width}x{height} is not a multiple of the {cell_size}px cell"
            )));
        }
        let to_i32 = |v: u32| {
            i32::try_from(v).map_err(|_| GameError::invalid_board("frame dimension too large"))
        };
        BoardSize::new(
            to_i32(width / cell_size)?,
            to_i32(height / cell_size)?,
            to_i32(cell_size)?,
        )
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn pixel_width(&self) -> u32 {
        (self.columns * self.cell_size) as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (self.rows * self.cell_size) as u32
    }

    pub fn cell_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    pub fn contains(&self, position: &Coordinates) -> bool {
        position.x >= 0 && position.x < self.columns && position.y >= 0 && position.y < self.rows
    }

    /// Top-left pixel of a cell.
    pub fn cell_origin(&self, position: &Coordinates) -> (i32, i32) {
        (position.x * self.cell_size, position.y * self.cell_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Snake,
    Food,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    Ate,
    Died,
    Won,
}

#[derive(Debug, Clone)]
pub struct SnakeGame<R> {
    board_size: BoardSize,
    board: Vec<Vec<Cell>>,
    snake_body: VecDeque<Coordinates>, // The head is the first element
    snake_direction: SnakeDirection,
    last_step: SnakeDirection,
    food_position: Option<Coordinates>,
    points: u32,
    food_score: u32,
    game_over: bool,
    won: bool,
    rng: R,
}

impl<R: Rng> SnakeGame<R> {
    pub fn new(board_size: BoardSize, food_score: u32, rng: R) -> Self {
        let board =
            vec![vec![Cell::Empty; board_size.rows as usize]; board_size.columns as usize];
        let mut game = SnakeGame {
            board_size,
            board,
            snake_body: VecDeque::with_capacity(board_size.cell_count()),
            snake_direction: SnakeDirection::Right,
            last_step: SnakeDirection::Right,
            food_position: None,
            points: 0,
            food_score,
            game_over: false,
            won: false,
            rng,
        };
        game.reset();
        game
    }

    pub fn reset(&mut self) {
        for column in self.board.iter_mut() {
            column.fill(Cell::Empty);
        }
        self.snake_body.clear();
        let head = Coordinates::new(self.board_size.columns / 2, self.board_size.rows / 2);
        self.set_cell(&head, Cell::Snake);
        self.snake_body.push_back(head);
        self.snake_direction = SnakeDirection::Right;
        self.last_step = SnakeDirection::Right;
        self.food_position = None;
        self.points = 0;
        self.game_over = false;
        self.won = false;
        self.generate_food();
    }

    /// Returns true when the direction actually changed.
    ///
    /// Turns that reverse either the pending direction or the last step taken
    /// are refused.
    pub fn set_direction(&mut self, direction: SnakeDirection) -> bool {
        if self.game_over
            || direction == self.snake_direction
            || direction == self.snake_direction.opposite()
            || direction == self.last_step.opposite()
        {
            return false;
        }
        self.snake_direction = direction;
        true
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.game_over {
            return TickOutcome::Idle;
        }
        let new_head = self.head().step(self.snake_direction);
        self.last_step = self.snake_direction;

        // the tail has not moved yet, so stepping onto it is fatal too
        if !self.board_size.contains(&new_head)
            || self.snake_body.iter().skip(1).any(|part| *part == new_head)
        {
            self.game_over = true;
            debug!(x = new_head.x, y = new_head.y, "snake crashed");
            return TickOutcome::Died;
        }

        self.snake_body.push_front(new_head);
        self.set_cell(&new_head, Cell::Snake);

        if self.food_position == Some(new_head) {
            self.points += self.food_score;
            self.food_position = None;
            if !self.generate_food() {
                self.game_over = true;
                self.won = true;
                info!(score = self.points, "board filled");
                return TickOutcome::Won;
            }
            return TickOutcome::Ate;
        }

        if let Some(old_tail) = self.snake_body.pop_back() {
            self.set_cell(&old_tail, Cell::Empty);
        }
        TickOutcome::Moved
    }

    // returns false when no free cell is left
    fn generate_food(&mut self) -> bool {
        let board_size = self.board_size.cell_count();
        let snake_length = self.snake_body.len();
        if snake_length >= board_size {
            return false;
        }

        // when the snake covers most of the board pick among the empty cells,
        // otherwise probe random cells until a free one turns up
        let food_position = if snake_length > (board_size * 4) / 5 {
            let (columns, rows) = (self.board_size.columns, self.board_size.rows);
            let empty_positions: Vec<Coordinates> = (0..columns)
                .flat_map(|x| (0..rows).map(move |y| Coordinates::new(x, y)))
                .filter(|c| self.cell_at(c) == Cell::Empty)
                .collect();
            empty_positions[self.rng.random_range(0..empty_positions.len())]
        } else {
            loop {
                let candidate = Coordinates::new(
                    self.rng.random_range(0..self.board_size.columns),
                    self.rng.random_range(0..self.board_size.rows),
                );
                if self.cell_at(&candidate) == Cell::Empty {
                    break candidate;
                }
            }
        };
        self.add_food(food_position);
        true
    }

    fn add_food(&mut self, position: Coordinates) {
        self.food_position = Some(position);
        self.set_cell(&position, Cell::Food);
    }
}

impl<R> SnakeGame<R> {
    fn set_cell(&mut self, position: &Coordinates, cell: Cell) {
        self.board[position.x as usize][position.y as usize] = cell;
    }

    pub fn cell_at(&self, position: &Coordinates) -> Cell {
        if !self.board_size.contains(position) {
            return Cell::Empty;
        }
        self.board[position.x as usize][position.y as usize]
    }

    pub fn head(&self) -> Coordinates {
        self.snake_body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = &Coordinates> {
        self.snake_body.iter()
    }

    pub fn len(&self) -> usize {
        self.snake_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake_body.is_empty()
    }

    pub fn food(&self) -> Option<Coordinates> {
        self.food_position
    }

    pub fn score(&self) -> u32 {
        self.points
    }

    pub fn direction(&self) -> SnakeDirection {
        self.snake_direction
    }

    pub fn board_size(&self) -> BoardSize {
        self.board_size
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn has_won(&self) -> bool {
        self.won
    }
}
