use glam::Vec3;
use simworld_assets::ModelLibrary;
use simworld_common::{EntityId, Transform};
use simworld_ecs::{AiCharacter, CollideMask, Collider, CollisionSphere, ComponentStore, ModelHandle};
use simworld_input::{Action, Dispatch, Key, KeyEvent, KeyMap, MotionAction, MotionAxis, MotionCommand};
use simworld_kernel::{ActorMotion, ActorSnapshot, Scheduler, SimClock, World};
use simworld_render::{DEFAULT_NAME, Lens, LightKind, OnScreenText, Stage};
use simworld_tools::TraceLogger;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::hooks::{NoHooks, SimHooks};
use crate::providers::{AiWorld, CollisionEventKind, CollisionProvider, NullAi, NullCollision};
use crate::task::SimTask;

/// How long built-in notices stay on screen, in seconds.
pub const NOTICE_SECONDS: f64 = 2.0;

/// Placement of a new actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSpec {
    pub position: Vec3,
    /// Heading, pitch, roll in degrees.
    pub hpr: Vec3,
    /// Scale of the model only; the actor's own frame is unscaled.
    pub scale: Vec3,
    /// When set, the actor gets a physics collider and an event collider
    /// of this shape.
    pub collision_sphere: Option<CollisionSphere>,
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            hpr: Vec3::ZERO,
            scale: Vec3::ONE,
            collision_sphere: None,
        }
    }
}

#[derive(Debug, Clone)]
struct ActorState {
    name: String,
    motion: ActorMotion,
    last_position: Vec3,
    velocity: Vec3,
}

/// The simulation context.
///
/// Owns every subsystem and exposes the operations a scenario uses to build
/// its scene. [`Sandbox::frame`] advances the clock and runs the scheduled
/// tasks; a windowed or headless driver calls it in a loop until it returns
/// false.
pub struct Sandbox {
    config: SandboxConfig,
    clock: SimClock,
    world: World,
    components: ComponentStore,
    models: ModelLibrary,
    stage: Stage,
    keymap: KeyMap,
    scheduler: Scheduler<SimTask>,
    tracer: TraceLogger,
    trace_message: String,
    help: OnScreenText,
    notice: OnScreenText,
    pending_keys: VecDeque<KeyEvent>,
    scene_root: Option<EntityId>,
    actors: BTreeMap<EntityId, ActorState>,
    actor_of_interest: Option<EntityId>,
    collision: Box<dyn CollisionProvider>,
    ai: Box<dyn AiWorld>,
    hooks: Box<dyn SimHooks>,
    running: bool,
}

impl Sandbox {
    /// A sandbox with the `default` camera on the `default` display region
    /// and the stock hotkeys. The default camera starts inactive.
    pub fn new(config: SandboxConfig) -> Result<Self, SandboxError> {
        let mut world = World::new();
        let mut stage = Stage::new(config.window.clone());
        let camera_node = world.spawn(DEFAULT_NAME, Transform::default());
        stage.add_camera(DEFAULT_NAME, camera_node, Lens::default())?;
        stage.attach_camera(DEFAULT_NAME, DEFAULT_NAME)?;

        let mut keymap = KeyMap::with_defaults();
        for (motion, key) in config.keys.bindings() {
            keymap.bind_motion(motion, key);
        }

        let mut scheduler = Scheduler::new();
        add_task(&mut scheduler, SimTask::InputDispatch);

        tracing::info!(
            title = %config.window.title,
            width = config.window.width,
            height = config.window.height,
            models = %config.models_dir.display(),
            "sandbox created"
        );

        Ok(Self {
            models: ModelLibrary::new(config.models_dir.clone()),
            config,
            clock: SimClock::new(),
            world,
            components: ComponentStore::new(),
            stage,
            keymap,
            scheduler,
            tracer: TraceLogger::new(),
            trace_message: String::new(),
            help: OnScreenText::new(),
            notice: OnScreenText::new(),
            pending_keys: VecDeque::new(),
            scene_root: None,
            actors: BTreeMap::new(),
            actor_of_interest: None,
            collision: Box::new(NullCollision::new()),
            ai: Box::new(NullAi::new()),
            hooks: Box::new(NoHooks),
            running: true,
        })
    }

    pub fn with_collision(mut self, collision: impl CollisionProvider + 'static) -> Self {
        self.collision = Box::new(collision);
        self
    }

    pub fn with_ai(mut self, ai: impl AiWorld + 'static) -> Self {
        self.ai = Box::new(ai);
        self
    }

    pub fn with_hooks(mut self, hooks: impl SimHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    // --- Accessors ---

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn models(&self) -> &ModelLibrary {
        &self.models
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn help(&self) -> &OnScreenText {
        &self.help
    }

    /// The transient user notice.
    pub fn notice(&self) -> &OnScreenText {
        &self.notice
    }

    pub fn scene_root(&self) -> Option<EntityId> {
        self.scene_root
    }

    /// Names of the scheduled tasks in execution order.
    pub fn task_names(&self) -> Vec<&str> {
        self.scheduler.names()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.stage.resize(width, height);
    }

    // --- Scene ---

    /// Load `model` as the scene root. Meshes named in the model file become
    /// child nodes so they can be found by name. Calling this again creates
    /// a new root and makes it current.
    pub fn setup_scene(
        &mut self,
        model: &str,
        position: Vec3,
        hpr: Vec3,
        scale: Vec3,
    ) -> Result<EntityId, SandboxError> {
        let model_id = self.models.load(model)?;
        let root = self
            .world
            .spawn(model, Transform::from_pos_hpr(position, hpr).with_scale(scale));
        self.components.set_model(root, ModelHandle(model_id.0));

        let meshes = self
            .models
            .get(model)
            .map(|m| m.meshes.clone())
            .unwrap_or_default();
        for mesh in &meshes {
            self.world.spawn_child(mesh.as_str(), root, Transform::default())?;
        }

        if let Some(previous) = self.scene_root.replace(root) {
            tracing::warn!(previous = %previous.short(), "scene root replaced");
        }
        tracing::info!(model, meshes = meshes.len(), "scene loaded");
        Ok(root)
    }

    /// Every node called `name`, anywhere in the scene.
    pub fn get_object(&self, name: &str) -> Vec<EntityId> {
        self.world.find(name)
    }

    /// Make every node called `name` block actors, or stop it blocking.
    /// Returns how many nodes matched.
    pub fn set_object_solid(&mut self, name: &str, solid: bool) -> usize {
        self.set_object_bits(name, CollideMask::SOLID, solid)
    }

    /// Make every node called `name` raise enter/exit events, or stop it.
    /// Returns how many nodes matched.
    pub fn set_object_goal(&mut self, name: &str, goal: bool) -> usize {
        self.set_object_bits(name, CollideMask::GOAL, goal)
    }

    fn set_object_bits(&mut self, name: &str, bits: CollideMask, on: bool) -> usize {
        let nodes = self.world.find(name);
        for id in &nodes {
            self.components.set_into_bits(*id, bits, on);
        }
        if nodes.is_empty() {
            tracing::warn!(name, "no scene node with that name");
        }
        nodes.len()
    }

    // --- Hotkeys ---

    /// Bind `key` to `action`. Returns the action that previously used the
    /// key, which is now unbound.
    ///
    /// A steering action that changes keys has its axis stopped, since the
    /// release of a key held under the old binding no longer reaches it.
    pub fn add_hot_key(&mut self, key: Key, action: Action) -> Option<Action> {
        tracing::debug!(%key, %action, "hotkey bound");
        let moved = action.as_motion();
        let displaced = self.keymap.bind(action, key);
        let unbound = displaced.as_ref().and_then(Action::as_motion);
        for motion in [moved, unbound].into_iter().flatten() {
            self.apply_motion(motion.on_release());
        }
        displaced
    }

    /// Rebind one of the steering actions.
    pub fn set_actor_action_key(&mut self, action: MotionAction, key: Key) -> Option<Action> {
        self.add_hot_key(key, action.into())
    }

    // --- Actors ---

    /// Load model `name` and spawn it as an actor, which becomes the actor
    /// of interest.
    pub fn add_actor(&mut self, name: &str, spec: ActorSpec) -> Result<EntityId, SandboxError> {
        if self.actors.values().any(|a| a.name == name) {
            return Err(SandboxError::DuplicateActor(name.to_string()));
        }
        let model_id = self.models.load(name)?;

        let actor = self
            .world
            .spawn(name, Transform::from_pos_hpr(spec.position, spec.hpr));
        let model_node = self.world.spawn_child(
            format!("{name}Model"),
            actor,
            Transform::default().with_scale(spec.scale),
        )?;
        self.components.set_model(model_node, ModelHandle(model_id.0));

        if let Some(sphere) = spec.collision_sphere {
            for collider in [Collider::physics(name, sphere), Collider::event(name, sphere)] {
                self.collision.add_collider(actor, &collider);
                self.components.add_collider(actor, collider);
            }
            add_task(&mut self.scheduler, SimTask::CollisionTraverse);
        }

        let character = AiCharacter::default();
        self.ai.add_character(actor, &character);
        self.components.set_ai_character(actor, character);

        let defaults = ActorMotion::default();
        let motion = ActorMotion::with_speeds(
            self.config.actor.move_speed.unwrap_or(defaults.move_speed),
            self.config.actor.turn_speed.unwrap_or(defaults.turn_speed),
        );
        self.actors.insert(
            actor,
            ActorState {
                name: name.to_string(),
                motion,
                last_position: spec.position,
                velocity: Vec3::ZERO,
            },
        );
        tracing::info!(actor = name, id = %actor.short(), "actor added");

        self.set_actor_of_interest(actor)?;
        add_task(&mut self.scheduler, SimTask::ActorStateUpdate);
        Ok(actor)
    }

    pub fn actor_id(&self, name: &str) -> Option<EntityId> {
        self.actors
            .iter()
            .find(|(_, a)| a.name == name)
            .map(|(id, _)| *id)
    }

    pub fn actor_of_interest(&self) -> Option<EntityId> {
        self.actor_of_interest
    }

    /// Make `id` the actor that receives input and is traced.
    pub fn set_actor_of_interest(&mut self, id: EntityId) -> Result<(), SandboxError> {
        let position = self.world.world_transform(id).map(|t| t.position);
        let (Some(state), Some(position)) = (self.actors.get_mut(&id), position) else {
            return Err(SandboxError::UnknownActor(id));
        };
        state.last_position = position;
        state.velocity = Vec3::ZERO;
        self.actor_of_interest = Some(id);
        tracing::info!(actor = %state.name, "actor of interest set");
        Ok(())
    }

    /// Start or stop moving the actor of interest from its direction flags.
    pub fn activate_actor_control(&mut self, on: bool) {
        toggle_task(&mut self.scheduler, SimTask::ActorControl, on);
    }

    /// Direction flags and speeds of the actor of interest.
    pub fn actor_motion(&self) -> Option<ActorMotion> {
        let id = self.actor_of_interest?;
        self.actors.get(&id).map(|a| a.motion)
    }

    /// Write one direction flag on the actor of interest.
    pub fn apply_motion(&mut self, command: MotionCommand) {
        let Some(state) = self
            .actor_of_interest
            .and_then(|id| self.actors.get_mut(&id))
        else {
            tracing::debug!(?command, "no actor of interest; motion ignored");
            return;
        };
        match command.axis {
            MotionAxis::Move => state.motion.move_dir = command.value,
            MotionAxis::Turn => state.motion.turn_dir = command.value,
        }
    }

    /// Set the speeds of the actor of interest. Returns false if there is
    /// no actor yet.
    pub fn set_actor_speeds(&mut self, move_speed: f32, turn_speed: f32) -> bool {
        let Some(state) = self
            .actor_of_interest
            .and_then(|id| self.actors.get_mut(&id))
        else {
            return false;
        };
        state.motion.move_speed = move_speed;
        state.motion.turn_speed = turn_speed;
        true
    }

    /// State of the actor of interest as of the last frame.
    pub fn snapshot(&self) -> Option<ActorSnapshot> {
        let id = self.actor_of_interest?;
        let state = self.actors.get(&id)?;
        let transform = self.world.world_transform(id)?;
        Some(ActorSnapshot {
            id,
            name: state.name.clone(),
            frame_time: self.clock.frame_time(),
            position: transform.position,
            heading: transform.heading(),
            velocity: state.velocity,
            motion: state.motion,
        })
    }

    // --- Lights ---

    /// Register a light, initially off, toggled by `key`.
    pub fn add_light(
        &mut self,
        name: &str,
        key: Key,
        kind: LightKind,
        color: [f32; 4],
    ) -> Result<(), SandboxError> {
        self.stage.add_light(name, kind, color)?;
        self.add_hot_key(key, Action::ToggleLight(name.to_string()));
        Ok(())
    }

    /// Flip a light and tell the user. Returns the new state.
    pub fn toggle_light(&mut self, name: &str) -> Result<bool, SandboxError> {
        let on = self.stage.toggle_light(name)?;
        let state = if on { "on" } else { "off" };
        self.notify_user(&format!("Light [{name}] turned {state}."), NOTICE_SECONDS)?;
        Ok(on)
    }

    pub fn activate_light(&mut self, name: &str, on: bool) -> Result<(), SandboxError> {
        Ok(self.stage.activate_light(name, on)?)
    }

    // --- Cameras ---

    /// Create a camera node under `parent` (or the scene root level when
    /// `None`), activated by `key`.
    pub fn add_camera(
        &mut self,
        name: &str,
        key: Key,
        parent: Option<EntityId>,
        lens: Lens,
        position: Vec3,
        hpr: Vec3,
    ) -> Result<EntityId, SandboxError> {
        if self.stage.camera(name).is_some() {
            return Err(simworld_render::StageError::Duplicate {
                kind: "camera",
                name: name.to_string(),
            }
            .into());
        }
        let transform = Transform::from_pos_hpr(position, hpr);
        let node = match parent {
            Some(parent) => self.world.spawn_child(name, parent, transform)?,
            None => self.world.spawn(name, transform),
        };
        self.stage.add_camera(name, node, lens)?;
        self.add_hot_key(key, Action::ActivateCamera(name.to_string()));
        Ok(node)
    }

    /// Show camera `name` on the display region of interest.
    pub fn activate_camera(&mut self, name: &str) -> Result<(), SandboxError> {
        self.stage.activate_camera(name)?;
        let region = self.stage.region_of_interest().to_string();
        self.notify_user(
            &format!("Camera [{name}] active on display region [{region}]."),
            NOTICE_SECONDS,
        )
    }

    // --- Display regions ---

    /// Add an inactive region over the default one, selected by `key`.
    pub fn add_display_region(
        &mut self,
        name: &str,
        key: Key,
        lrbt: [f32; 4],
    ) -> Result<(), SandboxError> {
        self.stage.add_display_region(name, lrbt)?;
        self.add_hot_key(key, Action::SelectDisplayRegion(name.to_string()));
        Ok(())
    }

    pub fn set_display_region_of_interest(&mut self, name: &str) -> Result<(), SandboxError> {
        self.stage.set_region_of_interest(name)?;
        self.notify_user(&format!("Display region [{name}] selected."), NOTICE_SECONDS)
    }

    pub fn activate_display_region(&mut self, name: &str, active: bool) -> Result<(), SandboxError> {
        Ok(self.stage.activate_region(name, active)?)
    }

    /// Flip a region on or off; `None` targets the region of interest.
    pub fn toggle_display_region(&mut self, name: Option<&str>) -> Result<bool, SandboxError> {
        Ok(self.stage.toggle_region(name)?)
    }

    // --- AI ---

    pub fn start_ai(&mut self) {
        toggle_task(&mut self.scheduler, SimTask::AiUpdate, true);
    }

    pub fn stop_ai(&mut self) {
        toggle_task(&mut self.scheduler, SimTask::AiUpdate, false);
    }

    // --- Tracing ---

    /// Start writing one line per frame to `path`, or stop. Starting while
    /// already tracing keeps the current file; stopping while not tracing
    /// does nothing.
    pub fn set_tracing(&mut self, path: impl AsRef<Path>, on: bool) -> Result<(), SandboxError> {
        if on {
            if self.tracer.enable(path)? {
                add_task(&mut self.scheduler, SimTask::TraceUpdate);
            }
        } else {
            self.scheduler.remove(SimTask::TraceUpdate.name());
            self.tracer.disable()?;
        }
        Ok(())
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_enabled()
    }

    pub fn trace_message(&self) -> &str {
        &self.trace_message
    }

    /// Payload for the next trace lines. Persists until changed.
    pub fn set_trace_message(&mut self, message: impl Into<String>) {
        self.trace_message = message.into();
    }

    // --- On-screen text ---

    /// Refresh the help panel from the current bindings and flip its
    /// visibility. Returns whether it is now shown.
    pub fn toggle_on_screen_help(&mut self) -> bool {
        let text = format!("\n{}", self.keymap.help_lines().join("\n"));
        self.help.set_text(text);
        self.help.toggle()
    }

    /// Show `message` for `delay` seconds when notices are enabled. A newer
    /// notice replaces the text and restarts the timer.
    pub fn notify_user(&mut self, message: &str, delay: f64) -> Result<(), SandboxError> {
        if !self.config.notify_user {
            return Ok(());
        }
        let task = SimTask::HideUserDialog;
        self.scheduler
            .add_delayed(task.name(), delay, self.clock.frame_time(), task)?;
        self.notice.set_text(message);
        self.notice.show();
        tracing::info!(message, "user notified");
        Ok(())
    }

    // --- Frame loop ---

    /// Queue a key event for the next input dispatch.
    pub fn push_key(&mut self, event: KeyEvent) {
        self.pending_keys.push_back(event);
    }

    /// Advance the clock by `dt` seconds and run every due task in sort
    /// order. Returns false once the sandbox has shut down.
    pub fn frame(&mut self, dt: f64) -> bool {
        if !self.running {
            return false;
        }
        self.clock.advance(dt);
        let _span = tracing::debug_span!("frame", n = self.clock.frame_count()).entered();

        let now = self.clock.frame_time();
        for due in self.scheduler.due(now) {
            if !self.scheduler.is_live(&due) {
                continue;
            }
            self.run_task(due.task);
            self.scheduler.finish(&due);
            if !self.running {
                break;
            }
        }
        self.world.step();
        self.running
    }

    /// Close the trace file and stop the frame loop.
    pub fn shutdown(&mut self) {
        if self.tracer.is_enabled() {
            self.scheduler.remove(SimTask::TraceUpdate.name());
            if let Err(error) = self.tracer.disable() {
                tracing::warn!(%error, "trace file not closed cleanly");
            }
        }
        self.running = false;
        tracing::info!(frames = self.clock.frame_count(), "sandbox shut down");
    }

    fn run_task(&mut self, task: SimTask) {
        match task {
            SimTask::InputDispatch => {
                while let Some(event) = self.pending_keys.pop_front() {
                    self.dispatch_key(&event);
                    if !self.running {
                        break;
                    }
                }
            }
            SimTask::ActorControl => self.move_actor(),
            SimTask::AiUpdate => self.ai.update(&mut self.world, self.clock.dt() as f32),
            SimTask::CollisionTraverse => {
                for event in self.collision.traverse(&mut self.world, &self.components) {
                    match event.kind {
                        CollisionEventKind::Enter => self.hooks.on_actor_enter(&event),
                        CollisionEventKind::Exit => self.hooks.on_actor_exit(&event),
                    }
                }
            }
            SimTask::ActorStateUpdate => self.record_actor_state(),
            SimTask::TraceUpdate => self.write_trace(),
            SimTask::HideUserDialog => self.notice.hide(),
        }
    }

    fn dispatch_key(&mut self, event: &KeyEvent) {
        match self.keymap.dispatch(event) {
            Some(Dispatch::Motion(command)) => {
                tracing::debug!(key = %event.key, ?command, "motion key");
                self.apply_motion(command);
            }
            Some(Dispatch::Trigger(action)) => {
                tracing::debug!(key = %event.key, %action, "hotkey");
                self.trigger(action);
            }
            None => {}
        }
    }

    fn trigger(&mut self, action: Action) {
        let result = match &action {
            Action::TogglePip => self.toggle_display_region(None).map(drop),
            Action::Help => {
                self.toggle_on_screen_help();
                Ok(())
            }
            Action::Quit => {
                self.shutdown();
                Ok(())
            }
            Action::SelectDisplayRegion(name) => self.set_display_region_of_interest(name),
            Action::ToggleLight(name) => self.toggle_light(name).map(drop),
            Action::ActivateCamera(name) => self.activate_camera(name),
            // Steering keys arrive as motion commands.
            Action::Forward | Action::Reverse | Action::TurnLeft | Action::TurnRight => Ok(()),
        };
        if let Err(error) = result {
            tracing::warn!(%action, %error, "hotkey action failed");
        }
    }

    fn move_actor(&mut self) {
        let Some(id) = self.actor_of_interest else {
            return;
        };
        let Some(motion) = self.actors.get(&id).map(|a| a.motion) else {
            return;
        };
        if let Some(data) = self.world.get_mut(id) {
            motion.integrate(&mut data.transform, self.clock.dt() as f32);
        }
    }

    fn record_actor_state(&mut self) {
        let Some(id) = self.actor_of_interest else {
            return;
        };
        let Some(position) = self.world.world_transform(id).map(|t| t.position) else {
            return;
        };
        let dt = self.clock.dt() as f32;
        if let Some(state) = self.actors.get_mut(&id) {
            state.velocity = if dt > 0.0 {
                (position - state.last_position) / dt
            } else {
                Vec3::ZERO
            };
            state.last_position = position;
        }
        if let Some(snapshot) = self.snapshot() {
            self.hooks.actor_state_update(&snapshot);
        }
    }

    fn write_trace(&mut self) {
        if let Some(snapshot) = self.snapshot() {
            self.hooks.trace_update(&snapshot, &mut self.trace_message);
        }
        if let Err(error) = self.tracer.write(self.clock.frame_time(), &self.trace_message) {
            tracing::warn!(%error, "trace write failed; tracing disabled");
            self.scheduler.remove(SimTask::TraceUpdate.name());
            if let Err(error) = self.tracer.disable() {
                tracing::warn!(%error, "trace file not closed cleanly");
            }
        }
    }
}

fn add_task(scheduler: &mut Scheduler<SimTask>, task: SimTask) {
    scheduler.add(task.name(), task.sort(), task);
}

fn toggle_task(scheduler: &mut Scheduler<SimTask>, task: SimTask, on: bool) {
    if on {
        add_task(scheduler, task);
    } else {
        scheduler.remove(task.name());
    }
}
