use crate::controller::{Confirm, ListView, MapView};
use crate::types::{Coords, Workout, WorkoutId, WorkoutKind};
use crate::utils::format_rate;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

/// A map pin with its always-open popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: WorkoutId,
    pub coords: Coords,
    pub popup: String,
    pub style_class: String,
}

impl Marker {
    pub fn for_workout(w: &Workout) -> Self {
        Self {
            id: w.id().clone(),
            coords: w.coords(),
            popup: popup_text(w),
            style_class: style_class(w.kind()),
        }
    }
}

pub const fn icon(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "🏃",
        WorkoutKind::Cycling => "🚴",
    }
}

pub fn popup_text(w: &Workout) -> String {
    format!("{} {}", icon(w.kind()), w.description())
}

pub fn style_class(kind: WorkoutKind) -> String {
    format!("{kind}-popup")
}

/// Multi-line list entry: title, distance, duration, rate, and the
/// kind-specific field.
pub fn format_entry(w: &Workout) -> String {
    let mut out = format!("{}  [{}]\n", w.description(), w.id());
    let _ = writeln!(out, "  {} {} km", icon(w.kind()), w.distance_km());
    let _ = writeln!(out, "  ⏱ {} min", w.duration_min());
    match (w.pace(), w.speed()) {
        (Some(pace), _) => {
            let _ = writeln!(out, "  ⚡️ {} min/km", format_rate(pace));
        }
        (None, Some(speed)) => {
            let _ = writeln!(out, "  ⚡️ {} km/h", format_rate(speed));
        }
        (None, None) => {}
    }
    if let Some(cadence) = w.cadence() {
        let _ = writeln!(out, "  👣 {cadence} spm");
    }
    if let Some(elevation) = w.elevation_gain() {
        let _ = writeln!(out, "  ⛰ {elevation} m");
    }
    out
}

/// Map and list collaborator that writes to a terminal stream.
pub struct TerminalView<W: Write> {
    out: W,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalView<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::warn!(err = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write> MapView for TerminalView<W> {
    fn set_center(&mut self, coords: Coords, zoom: u8) {
        self.emit(&format!("📍 {coords} (zoom {zoom})"));
    }

    fn add_marker(&mut self, marker: &Marker) {
        tracing::debug!(id = %marker.id, class = %marker.style_class, "marker added");
        self.emit(&format!("📍 {}  {}", marker.coords, marker.popup));
    }

    fn remove_marker(&mut self, id: &WorkoutId) {
        tracing::debug!(id = %id, "marker removed");
    }

    fn clear_markers(&mut self) {}
}

impl<W: Write> ListView for TerminalView<W> {
    fn render_entry(&mut self, workout: &Workout) {
        self.emit(&format_entry(workout));
    }

    fn update_entry(&mut self, workout: &Workout) {
        self.emit(&format_entry(workout));
    }

    fn remove_entry(&mut self, id: &WorkoutId) {
        self.emit(&format!("Deleted workout {id}"));
    }

    fn render_list(&mut self, workouts: &[Workout]) {
        if workouts.is_empty() {
            self.emit("No workouts yet.");
            return;
        }
        for w in workouts {
            self.emit(&format_entry(w));
        }
    }

    fn notify(&mut self, message: &str) {
        self.emit(message);
    }
}

/// Answers every prompt with yes (`--yes`).
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::debug!(prompt, "auto-confirmed");
        true
    }
}

/// Interactive `[y/N]` prompt. Anything but `y`/`yes` declines.
pub struct StdinConfirm<R: BufRead> {
    input: R,
}

impl StdinConfirm<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> StdinConfirm<R> {
    pub const fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Confirm for StdinConfirm<R> {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!(err = %e, "could not read confirmation; treating as no");
                false
            }
        }
    }
}
