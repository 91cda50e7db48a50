//! Where rendered scenes go.
//!
//! The client is headless, so a surface either summarises frames in the log
//! or streams the full draw lists as JSON lines for an external viewer.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use racer_core::Scene;

pub trait Surface {
    fn present(&mut self, scene: &Scene) -> Result<()>;
    /// Blocking, user-facing notice (failed registration, failed submit).
    fn alert(&mut self, message: &str);
}

pub trait NamePrompt {
    /// `None` when no name is available right now; the driver asks again on a
    /// later frame.
    fn prompt(&mut self) -> Option<String>;
}

/// Logs a one-line summary every `every` frames and the first game-over frame.
pub struct LogSurface {
    every: u64,
    frames: u64,
    overlay_logged: bool,
}

impl LogSurface {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
            overlay_logged: false,
        }
    }
}

impl Surface for LogSurface {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.frames += 1;
        let first_overlay = scene.game_over_overlay && !self.overlay_logged;
        if first_overlay || self.frames % self.every == 0 {
            let hud: Vec<&str> = scene.texts().collect();
            tracing::info!(
                frame = self.frames,
                commands = scene.commands.len(),
                game_over = scene.game_over_overlay,
                "{}",
                hud.join(" | ")
            );
        }
        self.overlay_logged |= scene.game_over_overlay;
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("alert: {message}");
        eprintln!("{message}");
    }
}

/// Writes every scene as one JSON object per line. A buffered writer is
/// flushed when the surface is dropped.
pub struct JsonLinesSurface<W: Write> {
    out: W,
}

impl JsonLinesSurface<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("failed creating {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for JsonLinesSurface<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        serde_json::to_writer(&mut self.out, scene).context("failed encoding scene")?;
        self.out.write_all(b"\n").context("failed writing scene")?;
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("alert: {message}");
        eprintln!("{message}");
    }
}

/// Answers from a fixed list, then stays silent.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new<I, T>(answers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl NamePrompt for ScriptedPrompt {
    fn prompt(&mut self) -> Option<String> {
        self.answers.pop_front()
    }
}

/// Reads a name from standard input. Gives up for good at end of input.
#[derive(Debug, Default)]
pub struct StdinPrompt {
    closed: bool,
}

impl NamePrompt for StdinPrompt {
    fn prompt(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        print!("Player Name: ");
        if io::stdout().flush().is_err() {
            self.closed = true;
            return None;
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.closed = true;
                None
            }
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}
