use std::fs;
use std::time::{Duration, Instant};

use handsnake::input::Control;
use handsnake::{
    BoardSize, Coordinates, GameConfig, GameLoop, LoopSignal, PointerSample, PointerState,
    ScriptedPointer, Session, SnakeDirection, SnakeGame, TickOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn game_loop(
    config: &GameConfig,
    pointer: Option<ScriptedPointer>,
) -> GameLoop<StdRng, ScriptedPointer> {
    let board: BoardSize = config.board_size().unwrap();
    let game = SnakeGame::new(board, config.game.food_score, StdRng::seed_from_u64(2024));
    GameLoop::new(Session::new(game, 0), config, pointer)
}

fn tracked(x: f32, y: f32) -> PointerState {
    PointerState::Tracked(PointerSample::new(x, y))
}

#[test]
fn pointer_above_the_head_turns_the_snake_up() {
    let config = GameConfig::default();
    let script = ScriptedPointer::new([tracked(0.5, 40.0 / 480.0)]);
    let mut game_loop = game_loop(&config, Some(script));
    assert_eq!(game_loop.game().head(), Coordinates::new(16, 12));

    let turned = game_loop.poll_pointer(Instant::now()).unwrap();
    assert_eq!(turned, Some(SnakeDirection::Up));
    assert_ne!(game_loop.step(), TickOutcome::Died);
    assert_eq!(game_loop.game().head(), Coordinates::new(16, 11));
}

#[test]
fn mirroring_flips_the_horizontal_pull() {
    let start = Instant::now();

    // raw x = 0.9 lands on the left of a mirrored frame
    let config = GameConfig::default();
    let mut mirrored = game_loop(&config, Some(ScriptedPointer::new([tracked(0.9, 0.5)])));
    mirrored.poll_pointer(start).unwrap();
    assert_eq!(mirrored.last_pointer().map(|p| p.x), Some(64));
    assert_eq!(mirrored.game().direction(), SnakeDirection::Right);

    let mut config = GameConfig::default();
    config.steering.mirror = false;
    let mut plain = game_loop(&config, Some(ScriptedPointer::new([tracked(0.9, 0.5)])));
    assert_eq!(plain.poll_pointer(start).unwrap(), None);
    let x = plain.last_pointer().map(|p| p.x).unwrap();
    assert!((575..=576).contains(&x));
}

#[test]
fn lost_hand_stops_steering() {
    let config = GameConfig::default();
    let script = ScriptedPointer::new([tracked(0.5, 0.05), PointerState::Lost]);
    let mut game_loop = game_loop(&config, Some(script));
    let start = Instant::now();

    assert_eq!(game_loop.poll_pointer(start).unwrap(), Some(SnakeDirection::Up));
    game_loop.step();
    assert_eq!(game_loop.poll_pointer(start + Duration::from_secs(1)).unwrap(), None);
    assert_eq!(game_loop.last_pointer(), None);
    assert_eq!(game_loop.poll_pointer(start + Duration::from_secs(2)).unwrap(), None);
    assert_eq!(game_loop.game().direction(), SnakeDirection::Up);
}

#[test]
fn held_pointer_keeps_steering_after_cooldown() {
    let config = GameConfig::default();
    // one feed line at pixel (420, 100), up and to the right of the head
    let script = ScriptedPointer::new([tracked(0.34375, 100.0 / 480.0)]);
    let mut game_loop = game_loop(&config, Some(script));
    let start = Instant::now();

    assert_eq!(game_loop.poll_pointer(start).unwrap(), Some(SnakeDirection::Up));
    for _ in 0..3 {
        game_loop.step();
    }
    assert_eq!(game_loop.game().head(), Coordinates::new(16, 9));
    assert_eq!(game_loop.poll_pointer(start + Duration::from_millis(50)).unwrap(), None);
    let later = start + Duration::from_millis(400);
    assert_eq!(game_loop.poll_pointer(later).unwrap(), Some(SnakeDirection::Right));
}

#[test]
fn keyboard_turns_apply_one_per_tick() {
    let config = GameConfig::default();
    let mut game_loop = game_loop(&config, None);
    assert_eq!(
        game_loop.handle_control(Control::Turn(SnakeDirection::Up)),
        LoopSignal::Continue
    );
    game_loop.handle_control(Control::Turn(SnakeDirection::Left));

    game_loop.step();
    assert_eq!(game_loop.game().head(), Coordinates::new(16, 11));
    game_loop.step();
    assert_eq!(game_loop.game().head(), Coordinates::new(15, 11));
    assert_eq!(game_loop.handle_control(Control::Quit), LoopSignal::Quit);
}

#[test]
fn crash_writes_snapshot_and_restart_keeps_high_score() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GameConfig::default();
    config.output.snapshot_dir = Some(dir.path().to_path_buf());
    let mut game_loop = game_loop(&config, None);

    let mut ticks = 0;
    while !game_loop.game().is_over() {
        game_loop.step();
        ticks += 1;
        assert!(ticks < 100, "snake never reached the wall");
    }
    assert_eq!(game_loop.step(), TickOutcome::Idle);

    let shots: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(shots.len(), 1);
    let name = shots[0].as_ref().unwrap().file_name();
    assert!(name.to_string_lossy().contains("-g1-"));

    let score = game_loop.game().score();
    game_loop.handle_control(Control::Restart);
    assert!(!game_loop.game().is_over());
    assert_eq!(game_loop.session().high_score(), score);

    let summary = game_loop.finish();
    assert_eq!(summary.final_score, 0);
    assert_eq!(summary.high_score, score);
    assert_eq!(summary.games_played, 2);
}

fn crash_into_the_wall(game_loop: &mut GameLoop<StdRng, ScriptedPointer>) {
    let mut ticks = 0;
    while !game_loop.game().is_over() {
        game_loop.step();
        ticks += 1;
        assert!(ticks < 100, "snake never reached the wall");
    }
}

#[test]
fn each_game_over_gets_its_own_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GameConfig::default();
    config.output.snapshot_dir = Some(dir.path().to_path_buf());
    let mut game_loop = game_loop(&config, None);

    crash_into_the_wall(&mut game_loop);
    game_loop.handle_control(Control::Restart);
    crash_into_the_wall(&mut game_loop);

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|name| name.contains("-g1-")));
    assert!(names.iter().any(|name| name.contains("-g2-")));
}

#[test]
fn game_over_exits_once_the_keyboard_is_gone() {
    let config = GameConfig::default();
    let mut game_loop = game_loop(&config, None);
    assert!(!game_loop.should_exit(false));

    crash_into_the_wall(&mut game_loop);
    // an open keyboard can still restart, a closed one never will
    assert!(!game_loop.should_exit(true));
    assert!(game_loop.should_exit(false));

    game_loop.handle_control(Control::Restart);
    assert!(!game_loop.should_exit(false));
}

#[test]
fn exit_on_game_over_ignores_the_keyboard() {
    let mut config = GameConfig::default();
    config.game.exit_on_game_over = true;
    let mut game_loop = game_loop(&config, None);
    assert!(!game_loop.should_exit(true));

    crash_into_the_wall(&mut game_loop);
    assert!(game_loop.should_exit(true));
}
