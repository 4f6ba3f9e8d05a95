use std::fmt::Write;

use colored::Colorize;
use rand::Rng;

use crate::session::Session;
use crate::snake::{Cell, Coordinates, SnakeGame};

pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

pub fn render_board<R>(game: &SnakeGame<R>) -> String {
    let board_size = game.board_size();
    let head = game.head();
    let mut out = String::new();

    //border up
    out.push('▗');
    for _ in 0..board_size.columns() {
        out.push_str("▄▄");
    }
    out.push_str("▖\n");
    for y in 0..board_size.rows() {
        //border left
        out.push('▐');
        for x in 0..board_size.columns() {
            let position = Coordinates::new(x, y);
            match game.cell_at(&position) {
                Cell::Empty => out.push_str("  "),
                Cell::Snake if position == head => {
                    let _ = write!(out, "{}", "Ӫ ".yellow());
                }
                Cell::Snake => {
                    let _ = write!(out, "{}", "⏺ ".green());
                }
                Cell::Food => {
                    let _ = write!(out, "{}", "♦ ".red());
                }
            }
        }
        //border right
        out.push_str("▌\n");
    }
    //border down
    out.push('▝');
    for _ in 0..board_size.columns() {
        out.push_str("▀▀");
    }
    out.push_str("▘\n");
    out
}

pub fn render_hud<R: Rng>(session: &Session<R>) -> String {
    let game = session.game();
    let mut out = format!(
        "Score: {}   High Score: {}   Length: {}\n",
        game.score(),
        session.high_score().max(game.score()),
        game.len()
    );
    if game.is_over() {
        let banner = if game.has_won() { "YOU WIN!" } else { "GAME OVER!" };
        let _ = writeln!(out, "{}", banner.red().bold());
        let _ = writeln!(out, "Final Score: {}", game.score());
        out.push_str("press r to restart, q to quit\n");
    }
    out
}

/// Full screen contents for one frame, starting with the clear sequence.
pub fn render_screen<R: Rng>(session: &Session<R>) -> String {
    let mut out = String::from(CLEAR_SCREEN);
    out.push_str(&render_board(session.game()));
    out.push_str(&render_hud(session));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::{BoardSize, SnakeGame};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session<StdRng> {
        let board = BoardSize::new(10, 10, 20).unwrap();
        Session::new(SnakeGame::new(board, 10, StdRng::seed_from_u64(21)), 40)
    }

    #[test]
    fn board_has_borders_and_pieces() {
        let session = session();
        let board = render_board(session.game());
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines[0].starts_with('▗') && lines[0].ends_with('▖'));
        assert!(lines[11].starts_with('▝') && lines[11].ends_with('▘'));
        assert_eq!(board.matches('Ӫ').count(), 1);
        assert_eq!(board.matches('♦').count(), 1);
        assert_eq!(board.matches('⏺').count(), 0);
    }

    #[test]
    fn hud_reports_scores_and_game_over() {
        let mut session = session();
        let hud = render_hud(&session);
        assert!(hud.contains("Score: 0"));
        assert!(hud.contains("High Score: 40"));
        assert!(hud.contains("Length: 1"));
        assert!(!hud.contains("GAME OVER"));

        while !session.game().is_over() {
            session.game_mut().tick();
        }
        let hud = render_hud(&session);
        assert!(hud.contains("GAME OVER!") || hud.contains("YOU WIN!"));
        assert!(hud.contains("Final Score:"));
    }

    #[test]
    fn screen_starts_with_clear() {
        assert!(render_screen(&session()).starts_with(CLEAR_SCREEN));
    }
}
