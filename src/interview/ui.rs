//! Terminal user interface for recording an answer.
//!
//! Shows the active question, a live input level meter, and the countdown to
//! the auto-stop deadline, and turns key presses into recording commands.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Paragraph, Sparkline, Wrap},
};
use std::error::Error;
use std::io::{stdout, Stdout};
use std::time::Duration;

/// User input command while recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    /// Keep recording (no key pressed)
    Continue,
    /// Finalize this answer (Enter key)
    Stop,
    /// Abort the interview (Escape, 'q' or Ctrl+C)
    Cancel,
}

/// Full-screen recording view with level meter and countdown footer.
pub struct InterviewTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    volume_history: Vec<u64>,
    last_sample_time: std::time::Instant,
    sample_interval: Duration,
    terminal_width: usize,
    sample_rate: u32,
    last_peak: u8,
}

/// Reference level in dBFS mapped to 100% on the meter.
const REFERENCE_LEVEL_DB: f32 = -20.0;

impl InterviewTui {
    /// Creates the TUI and enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    /// - If raw mode or the alternate screen cannot be entered
    pub fn new(sample_rate: u32) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let terminal_width = size.width as usize;

        Ok(InterviewTui {
            terminal,
            volume_history: vec![0u64; terminal_width],
            last_sample_time: std::time::Instant::now(),
            sample_interval: Duration::from_millis(50),
            terminal_width,
            sample_rate,
            last_peak: 0,
        })
    }

    /// Renders one frame: question header, level meter, countdown footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(
        &mut self,
        header: &str,
        prompt: &str,
        remaining: Duration,
        samples: &[i16],
    ) -> Result<(), Box<dyn Error>> {
        let current_volume = self.calculate_volume(samples);

        if self.last_sample_time.elapsed() >= self.sample_interval {
            self.volume_history.push(current_volume as u64);
            if self.volume_history.len() > self.terminal_width {
                self.volume_history.remove(0);
            }
            self.last_sample_time = std::time::Instant::now();
        }

        let size = self.terminal.size()?;
        let current_width = size.width as usize;
        if current_width != self.terminal_width {
            self.terminal_width = current_width;
            while self.volume_history.len() > self.terminal_width {
                self.volume_history.remove(0);
            }
            while self.volume_history.len() < self.terminal_width {
                self.volume_history.insert(0, 0);
            }
        }

        let last_peak = self.last_peak;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let header_height = 3u16.min(area.height);
            let footer_height = 1u16;

            let header_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: header_height,
            };

            let header_line = ratatui::text::Line::from(vec![
                ratatui::text::Span::styled("● ", Style::default().fg(Color::Red)),
                ratatui::text::Span::styled(
                    header.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]);
            let question_text = ratatui::text::Text::from(vec![
                header_line,
                ratatui::text::Line::raw(""),
                ratatui::text::Line::raw(prompt.to_string()),
            ]);
            let question = Paragraph::new(question_text)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::Rgb(185, 207, 212)).bg(Color::Rgb(0, 0, 0)));
            frame.render_widget(question, header_area);

            let meter_area = Rect {
                x: area.x,
                y: area.y + header_height,
                width: area.width,
                height: area
                    .height
                    .saturating_sub(header_height)
                    .saturating_sub(footer_height),
            };

            let meter = Sparkline::default().data(&self.volume_history).max(80).style(
                Style::default()
                    .bg(Color::Rgb(0, 0, 0))
                    .fg(Color::Rgb(206, 224, 220)),
            );
            frame.render_widget(meter, meter_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let remaining_secs = remaining.as_secs();
            let countdown_style = if remaining_secs <= 10 {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            let footer_line = ratatui::text::Line::from(vec![
                ratatui::text::Span::styled(
                    format!("{}:{:02} remaining", remaining_secs / 60, remaining_secs % 60),
                    countdown_style,
                ),
                ratatui::text::Span::raw(" / "),
                ratatui::text::Span::raw(format!("{last_peak}%")),
                ratatui::text::Span::raw(" / Enter: stop, Esc: cancel"),
            ]);
            let footer = Paragraph::new(footer_line).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Converts the most recent samples to a 0-100% level via RMS in dBFS.
    fn calculate_volume(&mut self, samples: &[i16]) -> u8 {
        if samples.is_empty() {
            return 0;
        }

        let last_samples_count =
            std::cmp::min(self.sample_rate / 20, samples.len() as u32) as usize;
        let recent_samples = &samples[samples.len() - last_samples_count..];

        let sum_of_squares: i64 = recent_samples.iter().map(|&x| (x as i64).pow(2)).sum();
        let mean_square = sum_of_squares / recent_samples.len() as i64;
        let rms = (mean_square as f32).sqrt();

        let db_fs = if rms > 0.0 {
            20.0 * (rms / 32767.0).log10()
        } else {
            -160.0
        };

        let min_db = REFERENCE_LEVEL_DB - 40.0;
        let normalized = ((db_fs - min_db) / 40.0 * 100.0).clamp(4.0, 100.0) as u8;

        self.last_peak = normalized;
        normalized
    }

    /// Processes user input and returns the appropriate recording command.
    ///
    /// # Returns
    /// - `Continue` if no key or an unrecognized key was pressed
    /// - `Stop` if Enter was pressed
    /// - `Cancel` if Escape, 'q' or Ctrl+C was pressed
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<RecordingCommand, Box<dyn Error>> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter => {
                        tracing::debug!("Enter pressed: stopping answer");
                        RecordingCommand::Stop
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: cancelling interview");
                        RecordingCommand::Cancel
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: cancelling interview");
                        RecordingCommand::Cancel
                    }
                    _ => RecordingCommand::Continue,
                });
            }
        }
        Ok(RecordingCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
