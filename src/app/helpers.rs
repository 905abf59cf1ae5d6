//! Ein-/Ausschalten der Zeichenhilfen per Taste (kurz = umschalten, lang = temporär).
//!
//! Beim Betreten des Modus werden die Hilfen nach `long_keypress` automatisch
//! eingeschaltet. Das geschieht auf einem eigenen Thread; Generationszähler und
//! Flags liegen unter demselben Mutex, damit ein abgebrochener Timer nie feuert.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Sichtbarkeit der Hilfen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HelperFlags {
    /// Hilfen werden gezeichnet
    pub enabled: bool,
    /// Diagnose auf der unveränderten Geometrie (ohne Vorschau-Ersetzung)
    pub use_original: bool,
}

#[derive(Debug, Default)]
struct SharedState {
    flags: HelperFlags,
    generation: u64,
}

/// Callback, der eine Neuzeichnung anstößt.
pub type RedrawFn = Arc<dyn Fn() + Send + Sync>;

/// Zustand der Hilfen-Taste inklusive Long-Press-Timer.
pub struct HelperToggle {
    shared: Arc<Mutex<SharedState>>,
    redraw: Option<RedrawFn>,
    expert: bool,
    keypress_at: Option<Instant>,
    enabled_before_keypress: bool,
    long_keypress: Duration,
}

impl fmt::Debug for HelperToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperToggle")
            .field("flags", &self.flags())
            .field("expert", &self.expert)
            .field("keypress_at", &self.keypress_at)
            .field("long_keypress", &self.long_keypress)
            .finish()
    }
}

fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HelperToggle {
    /// Erstellt den Toggle; Hilfen sind anfangs aus.
    pub fn new(long_keypress: Duration, expert: bool) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SharedState::default())),
            redraw: None,
            expert,
            keypress_at: None,
            enabled_before_keypress: false,
            long_keypress,
        }
    }

    /// Setzt den Neuzeichnen-Callback (wird auch vom Timer-Thread aufgerufen).
    pub fn with_redraw(mut self, redraw: RedrawFn) -> Self {
        self.redraw = Some(redraw);
        self
    }

    /// Aktuelle Flags
    pub fn flags(&self) -> HelperFlags {
        lock(&self.shared).flags
    }

    /// Experten-Modus aktiv
    pub fn is_expert(&self) -> bool {
        self.expert
    }

    fn set_flags(&self, flags: HelperFlags) {
        let changed = {
            let mut state = lock(&self.shared);
            let changed = state.flags != flags;
            state.flags = flags;
            changed
        };
        if changed {
            self.request_redraw();
        }
    }

    fn request_redraw(&self) {
        if let Some(redraw) = &self.redraw {
            redraw();
        }
    }

    /// Bricht einen laufenden Timer ab (Generation erhöhen).
    pub fn cancel_pending(&self) {
        lock(&self.shared).generation += 1;
    }

    /// Modus betreten: Hilfen aus, nach `long_keypress` automatisch an.
    pub fn on_enter_mode(&mut self) {
        if !self.expert {
            return;
        }
        self.keypress_at = None;
        let generation = {
            let mut state = lock(&self.shared);
            state.flags.enabled = false;
            state.generation += 1;
            state.generation
        };

        let shared = Arc::clone(&self.shared);
        let redraw = self.redraw.clone();
        let delay = self.long_keypress;
        // Der Thread schläft immer die volle Verzögerung und endet danach.
        // Ein abgebrochener Timer ändert nichts mehr, weil die Generation
        // dann nicht mehr übereinstimmt. Pro Eintritt lebt also höchstens
        // ein Thread für `long_keypress`.
        thread::spawn(move || {
            thread::sleep(delay);
            let fired = {
                let mut state = lock(&shared);
                if state.generation == generation {
                    state.flags = HelperFlags {
                        enabled: true,
                        use_original: true,
                    };
                    true
                } else {
                    false
                }
            };
            if fired {
                log::debug!("Hilfen nach langem Tastendruck eingeschaltet");
                if let Some(redraw) = redraw {
                    redraw();
                }
            }
        });
    }

    /// Modus verlassen: ausstehenden Timer verwerfen.
    pub fn on_exit_mode(&mut self) {
        self.cancel_pending();
        self.keypress_at = None;
    }

    /// Hilfen-Taste gedrückt.
    pub fn on_helper_key_pressed(&mut self, now: Instant) {
        if !self.expert {
            return;
        }
        self.keypress_at = Some(now);
        self.enabled_before_keypress = self.flags().enabled;
        self.set_flags(HelperFlags {
            enabled: true,
            use_original: true,
        });
    }

    /// Hilfen-Taste losgelassen.
    ///
    /// Ohne vorherigen Tastendruck (Taste vom Modus-Wechsel gehalten) → aus.
    /// Langer Druck → vorheriger Zustand, kurzer Druck → umgeschaltet.
    pub fn on_helper_key_released(&mut self, now: Instant) {
        if !self.expert {
            return;
        }
        self.cancel_pending();
        let enabled = match self.keypress_at.take() {
            None => false,
            Some(pressed) if now.saturating_duration_since(pressed) > self.long_keypress => {
                self.enabled_before_keypress
            }
            Some(_) => !self.enabled_before_keypress,
        };
        self.set_flags(HelperFlags {
            enabled,
            use_original: false,
        });
    }

    /// Experten-Modus umgeschaltet; ohne Experten-Modus keine Hilfen.
    pub fn set_expert(&mut self, expert: bool) {
        self.expert = expert;
        if !expert {
            self.cancel_pending();
            let flags = self.flags();
            if flags.enabled {
                self.set_flags(HelperFlags {
                    enabled: false,
                    ..flags
                });
            }
        }
    }
}
