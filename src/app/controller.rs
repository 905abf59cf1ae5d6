//! Controller des Improve-Way-Modus: verteilt Intents an Tracker, Planer und Hilfen.

use glam::DVec2;

use super::candidate::{Candidate, CandidateTracker, InteractionSnapshot, Modifiers};
use super::diagnostics::{build_overlay, HelperOverlay};
use super::events::{ImproveIntent, IntentOutcome};
use super::helpers::{HelperFlags, HelperToggle, RedrawFn};
use super::mode::ImproveState;
use super::planner::plan_commit;
use crate::core::{CommandSink, Projection, WayRepository, WorldCheck};
use crate::shared::ImproveWayOptions;

/// Vom Host geliehene Kollaborateure für einen Intent.
#[derive(Clone, Copy)]
pub struct HostContext<'a> {
    pub repo: &'a dyn WayRepository,
    pub projection: &'a dyn Projection,
    pub world: &'a dyn WorldCheck,
}

/// Hält den Modus-Zustand und verarbeitet Intents.
#[derive(Debug)]
pub struct ImproveWayController {
    state: ImproveState,
    tracker: CandidateTracker,
    helpers: HelperToggle,
    options: ImproveWayOptions,
    modifiers: Modifiers,
    pointer_screen: Option<DVec2>,
    active: bool,
}

impl ImproveWayController {
    /// Erstellt einen inaktiven Controller.
    pub fn new(options: ImproveWayOptions) -> Self {
        let helpers = HelperToggle::new(options.long_keypress_time(), options.expert_mode);
        Self {
            state: ImproveState::default(),
            tracker: CandidateTracker::new(),
            helpers,
            options,
            modifiers: Modifiers::default(),
            pointer_screen: None,
            active: false,
        }
    }

    /// Setzt den Neuzeichnen-Callback der Hilfen.
    pub fn with_redraw(mut self, redraw: RedrawFn) -> Self {
        self.helpers = self.helpers.with_redraw(redraw);
        self
    }

    /// Aktueller Zustand
    pub fn state(&self) -> ImproveState {
        self.state
    }

    /// Modus aktiv
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Aktueller Kandidat
    pub fn candidate(&self) -> Option<Candidate> {
        self.tracker.candidate()
    }

    /// Snapshot der aktuellen Interaktion
    pub fn snapshot(&self) -> InteractionSnapshot {
        self.tracker.snapshot()
    }

    /// Sichtbarkeit der Hilfen
    pub fn helper_flags(&self) -> HelperFlags {
        self.helpers.flags()
    }

    /// Aktive Optionen
    pub fn options(&self) -> &ImproveWayOptions {
        &self.options
    }

    /// Hilfen-Overlay für den aktuellen Frame (nur im Zustand `Improving`).
    pub fn overlay(&self, ctx: &HostContext<'_>) -> Option<HelperOverlay> {
        let target = self.state.target()?;
        Some(build_overlay(
            ctx.repo,
            target,
            &self.tracker.snapshot(),
            ctx.projection,
            &self.options.helper_style,
            self.helpers.flags(),
        ))
    }

    /// Verarbeitet einen Intent ohne das Repository zu verändern.
    pub fn handle_intent(&mut self, ctx: &HostContext<'_>, intent: ImproveIntent) -> IntentOutcome {
        match intent {
            ImproveIntent::EnterMode => {
                self.active = true;
                self.reset();
                self.helpers.on_enter_mode();
                log::info!("Improve-Way-Modus aktiviert");
                return IntentOutcome::Idle;
            }
            ImproveIntent::ExitMode => {
                self.active = false;
                self.reset();
                self.helpers.on_exit_mode();
                log::info!("Improve-Way-Modus beendet");
                return IntentOutcome::Idle;
            }
            ImproveIntent::ExpertModeChanged { enabled } => {
                self.helpers.set_expert(enabled);
                return IntentOutcome::Idle;
            }
            _ => {}
        }

        if !self.active {
            log::debug!("Intent bei inaktivem Modus ignoriert: {:?}", intent);
            return IntentOutcome::Idle;
        }

        match intent {
            ImproveIntent::SelectionChanged { polyline_ids } => {
                let previous = self.state;
                self.state = self.state.on_selection_changed(&polyline_ids, ctx.repo);
                if self.state != previous {
                    self.tracker.clear();
                }
                self.refresh_candidate(ctx);
                match self.state.target() {
                    Some(id) if self.state != previous => IntentOutcome::TargetSelected(id),
                    _ => IntentOutcome::Idle,
                }
            }
            ImproveIntent::PointerMoved { screen_pos } => {
                self.pointer_screen = Some(screen_pos);
                self.refresh_candidate(ctx);
                IntentOutcome::Idle
            }
            ImproveIntent::PointerLeft => {
                self.pointer_screen = None;
                self.tracker.clear();
                IntentOutcome::Idle
            }
            ImproveIntent::ModifiersChanged { modifiers } => {
                self.modifiers = modifiers;
                self.refresh_candidate(ctx);
                IntentOutcome::Idle
            }
            ImproveIntent::PointerReleased { screen_pos } => {
                self.pointer_screen = Some(screen_pos);
                self.refresh_candidate(ctx);
                self.commit(ctx, screen_pos)
            }
            ImproveIntent::HelperKeyPressed { at } => {
                self.helpers.on_helper_key_pressed(at);
                IntentOutcome::Idle
            }
            ImproveIntent::HelperKeyReleased { at } => {
                self.helpers.on_helper_key_released(at);
                IntentOutcome::Idle
            }
            ImproveIntent::EnterMode
            | ImproveIntent::ExitMode
            | ImproveIntent::ExpertModeChanged { .. } => IntentOutcome::Idle,
        }
    }

    /// Verarbeitet einen Intent und reicht geplante Batches an den Host weiter.
    ///
    /// Nach dem Anwenden wird der Kandidat neu berechnet; ein gelöschter
    /// Ziel-Weg führt zurück nach `Selecting`.
    pub fn dispatch<H>(
        &mut self,
        host: &mut H,
        projection: &dyn Projection,
        world: &dyn WorldCheck,
        intent: ImproveIntent,
    ) -> anyhow::Result<IntentOutcome>
    where
        H: WayRepository + CommandSink,
    {
        let outcome = {
            let ctx = HostContext {
                repo: &*host,
                projection,
                world,
            };
            self.handle_intent(&ctx, intent)
        };

        if let IntentOutcome::Planned(batch) = &outcome {
            host.submit(batch.clone())?;
            let ctx = HostContext {
                repo: &*host,
                projection,
                world,
            };
            self.state = self.state.revalidate(ctx.repo);
            self.refresh_candidate(&ctx);
        }
        Ok(outcome)
    }

    fn commit(&mut self, ctx: &HostContext<'_>, screen_pos: DVec2) -> IntentOutcome {
        match self.state {
            ImproveState::Selecting => {
                let world_pos = ctx.projection.screen_to_world(screen_pos);
                let radius = ctx
                    .projection
                    .pixels_to_world(screen_pos, self.options.way_pick_radius_px);
                let Some(id) = ctx.repo.nearest_polyline(world_pos, radius) else {
                    log::debug!("Kein Weg unter dem Mauszeiger");
                    return IntentOutcome::Idle;
                };
                self.state = ImproveState::Improving {
                    target_polyline_id: id,
                };
                log::info!("Ziel-Weg {} gewählt", id);
                self.refresh_candidate(ctx);
                IntentOutcome::TargetSelected(id)
            }
            ImproveState::Improving { .. } => {
                match plan_commit(self.state, &self.tracker.snapshot(), ctx.repo, ctx.world) {
                    Ok(Some(batch)) => IntentOutcome::Planned(batch),
                    Ok(None) => IntentOutcome::Idle,
                    Err(refusal) => IntentOutcome::Refused(refusal),
                }
            }
        }
    }

    fn refresh_candidate(&mut self, ctx: &HostContext<'_>) {
        match self.state.target() {
            Some(target) => self.tracker.update(
                self.pointer_screen,
                self.modifiers,
                target,
                ctx.repo,
                ctx.projection,
                &self.options,
            ),
            None => self.tracker.clear(),
        }
    }

    fn reset(&mut self) {
        self.state = ImproveState::Selecting;
        self.tracker.clear();
        self.modifiers = Modifiers::default();
        self.pointer_screen = None;
    }
}
