// a hand tracker writes one line per frame: the normalized fingertip as `x y` or `x,y`,
// `none` when no hand is visible; lines starting with `#` are ignored
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{GameError, Result};
use crate::steering::PixelPoint;

/// Fingertip position normalized to the camera frame, both axes in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    x: f32,
    y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> PointerSample {
        PointerSample {
            x: num::clamp(x, 0.0, 1.0),
            y: num::clamp(y, 0.0, 1.0),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Maps to frame pixels; `mirror` flips horizontally like a selfie view.
    pub fn to_pixels(&self, width: u32, height: u32, mirror: bool) -> PixelPoint {
        let x = if mirror { 1.0 - self.x } else { self.x };
        PixelPoint::new((x * width as f32) as i32, (self.y * height as f32) as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    Tracked(PointerSample),
    Lost,
    Unchanged,
}

pub trait PointerSource {
    fn poll(&mut self) -> Result<PointerState>;
}

/// Parses one feed line. `Ok(None)` means the line carries nothing (a comment).
pub fn parse_pointer_line(line: &str) -> Result<Option<PointerState>> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return Ok(None);
    }
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(Some(PointerState::Lost));
    }

    let malformed = |message: &str| GameError::PointerFeed {
        line: line.to_string(),
        message: message.to_string(),
    };
    let fields: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() != 2 {
        return Err(malformed("expected two coordinates"));
    }
    let mut values = [0.0f32; 2];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field.parse::<f32>().map_err(|e| malformed(&e.to_string()))?;
        if !value.is_finite() {
            return Err(malformed("coordinate is not finite"));
        }
    }
    Ok(Some(PointerState::Tracked(PointerSample::new(values[0], values[1]))))
}

/// Reads a pointer feed on a background thread.
pub struct FeedPointer {
    receiver: Receiver<PointerState>,
    finished: bool,
}

impl FeedPointer {
    pub fn spawn<B>(reader: B, pace: Option<Duration>) -> Self
    where
        B: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PointerState>();
        thread::spawn(move || {
            for (index, line) in reader.lines().enumerate() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "pointer feed read failed");
                        break;
                    }
                };
                match parse_pointer_line(&line) {
                    Ok(Some(state)) => {
                        if tx.send(state).is_err() {
                            break;
                        }
                        if let Some(pace) = pace {
                            thread::sleep(pace);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(line = index + 1, error = %e, "skipping pointer line"),
                }
            }
        });
        FeedPointer {
            receiver: rx,
            finished: false,
        }
    }

    /// Opens a feed file, FIFO, or `-` for stdin.
    pub fn open(path: &Path, pace: Option<Duration>) -> Result<Self> {
        if path == Path::new("-") {
            return Ok(Self::spawn(BufReader::new(io::stdin()), pace));
        }
        let file = File::open(path)?;
        debug!(path = %path.display(), "pointer feed opened");
        Ok(Self::spawn(BufReader::new(file), pace))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl PointerSource for FeedPointer {
    fn poll(&mut self) -> Result<PointerState> {
        let mut latest = PointerState::Unchanged;
        loop {
            match self.receiver.try_recv() {
                Ok(state) => latest = state,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.finished {
                        self.finished = true;
                        debug!("pointer feed ended");
                    }
                    break;
                }
            }
        }
        Ok(latest)
    }
}

/// Replays a fixed list of states, one per poll.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPointer {
    states: VecDeque<PointerState>,
}

impl ScriptedPointer {
    pub fn new(states: impl IntoIterator<Item = PointerState>) -> Self {
        ScriptedPointer {
            states: states.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.states.len()
    }
}

impl PointerSource for ScriptedPointer {
    fn poll(&mut self) -> Result<PointerState> {
        Ok(self.states.pop_front().unwrap_or(PointerState::Unchanged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Instant;

    fn tracked(x: f32, y: f32) -> Option<PointerState> {
        Some(PointerState::Tracked(PointerSample::new(x, y)))
    }

    #[test]
    fn parses_feed_lines() {
        assert_eq!(parse_pointer_line("0.5 0.25").unwrap(), tracked(0.5, 0.25));
        assert_eq!(parse_pointer_line(" 0.1,0.9 ").unwrap(), tracked(0.1, 0.9));
        assert_eq!(parse_pointer_line("0.1, 0.9").unwrap(), tracked(0.1, 0.9));
        assert_eq!(parse_pointer_line("none").unwrap(), Some(PointerState::Lost));
        assert_eq!(parse_pointer_line("").unwrap(), Some(PointerState::Lost));
        assert_eq!(parse_pointer_line("# frame 12").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["0.5", "0.5 0.5 0.5", "left up", "NaN 0.3"] {
            match parse_pointer_line(line) {
                Err(GameError::PointerFeed { line: got, .. }) => assert_eq!(got, line),
                other => panic!("expected a feed error for {line:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn samples_are_clamped_and_mirrored() {
        let sample = PointerSample::new(1.5, -0.2);
        assert_eq!((sample.x(), sample.y()), (1.0, 0.0));

        let sample = PointerSample::new(0.25, 0.5);
        assert_eq!(sample.to_pixels(640, 480, false), PixelPoint::new(160, 240));
        assert_eq!(sample.to_pixels(640, 480, true), PixelPoint::new(480, 240));
    }

    #[test]
    fn feed_reports_latest_state_and_finishes() {
        let input = "0.5 0.5\n# comment\nbogus\nnone\n0.25,0.75\n";
        let mut feed = FeedPointer::spawn(Cursor::new(input.as_bytes().to_vec()), None);
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut last = PointerState::Unchanged;
        while !feed.is_finished() && Instant::now() < deadline {
            let state = feed.poll().unwrap();
            if state != PointerState::Unchanged {
                last = state;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert!(feed.is_finished());
        assert_eq!(last, PointerState::Tracked(PointerSample::new(0.25, 0.75)));
        assert_eq!(feed.poll().unwrap(), PointerState::Unchanged);
    }

    #[test]
    fn paced_feed_releases_one_line_at_a_time() {
        let pace = Duration::from_millis(20);
        let input = "0.1 0.1\n0.2 0.2\n0.3 0.3\n0.4 0.4\n";
        let started = Instant::now();
        let mut feed = FeedPointer::spawn(Cursor::new(input.as_bytes().to_vec()), Some(pace));

        // the reader sleeps after each line, so only the first one is out yet
        let deadline = started + Duration::from_secs(2);
        let mut first = feed.poll().unwrap();
        while first == PointerState::Unchanged && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
            first = feed.poll().unwrap();
        }
        assert_eq!(first, PointerState::Tracked(PointerSample::new(0.1, 0.1)));

        let mut seen = vec![first];
        while !feed.is_finished() && Instant::now() < deadline {
            let state = feed.poll().unwrap();
            if state != PointerState::Unchanged {
                seen.push(state);
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert!(feed.is_finished());
        assert!(started.elapsed() >= pace * 3);
        assert_eq!(
            seen.last(),
            Some(&PointerState::Tracked(PointerSample::new(0.4, 0.4)))
        );
        // polling every 2ms against a 20ms pace sees more than one line arrive
        assert!(seen.len() >= 2);
    }

    #[test]
    fn scripted_pointer_runs_dry() {
        let mut pointer = ScriptedPointer::new([PointerState::Lost]);
        assert_eq!(pointer.poll().unwrap(), PointerState::Lost);
        assert_eq!(pointer.remaining(), 0);
        assert_eq!(pointer.poll().unwrap(), PointerState::Unchanged);
    }
}
