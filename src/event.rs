//! Terminal event handling.
//!
//! A dedicated thread polls crossterm and forwards input, emitting a tick
//! whenever no input arrives within the tick rate.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEvent};

/// Terminal events consumed by the main loop.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
    Resize(u16, u16),
}

/// Owns the input thread and the receiving end of its channel.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Starts the input thread, ticking every `tick_rate` without input.
    pub fn new(tick_rate: Duration) -> Self {
        let tick_rate = tick_rate.max(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());

                let forwarded = match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        // Release/repeat events would double every key press on Windows.
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            tx.send(Event::Key(key))
                        }
                        Ok(event::Event::Mouse(mouse)) => tx.send(Event::Mouse(mouse)),
                        Ok(event::Event::Resize(w, h)) => tx.send(Event::Resize(w, h)),
                        Ok(_) => Ok(()),
                        Err(e) => {
                            crate::log_error!("APP", "Terminal read failed: {e}");
                            break;
                        }
                    },
                    Ok(false) => Ok(()),
                    Err(e) => {
                        crate::log_error!("APP", "Terminal poll failed: {e}");
                        break;
                    }
                };
                if forwarded.is_err() {
                    break;
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx }
    }

    /// Blocks until the next event.
    pub fn next(&self) -> Result<Event> {
        self.rx
            .recv()
            .map_err(|_| eyre!("terminal input thread stopped"))
    }
}
