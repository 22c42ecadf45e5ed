//! Application lifecycle sequencing
//!
//! The sequencer decides, on every `prepare` call, which setup phases
//! run: the one-shot phases (console attachment, window creation, the
//! ordered graphics bootstrap) happen exactly once per application,
//! while the re-entrant branch rebuilds only the resolution-dependent
//! resources after a reconfiguration such as a window resize.
//!
//! Failure in any phase is returned as a typed error; the caller owns
//! the policy (in the demo binary: surface the user-facing message and
//! terminate with [`FATAL_EXIT_CODE`]). No rollback is attempted, since
//! bootstrap failures are environment problems rather than transient
//! conditions worth retrying at this layer.

use thiserror::Error;

use crate::core::config::{AppConfig, ConsoleFailurePolicy};
use crate::platform::{AppTitle, MinSize, PlatformError, SurfaceProvider};
use crate::render::{RenderBootstrap, RenderError};

/// Exit status the binary reports after a fatal bootstrap failure.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Bootstrap progress for one application.
///
/// Explicit state instead of a hidden first-run boolean; transitions
/// only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing has been created yet.
    Uninitialized,
    /// Console/window phases are done; the graphics bootstrap has not
    /// completed.
    WindowReady,
    /// Full bootstrap completed; only recreation phases remain.
    FullyPrepared,
}

/// Long-lived application state, mutated only by the sequencer.
///
/// Once `window` is populated, `width`/`height` track the last
/// requested client size, clamped to the `min_size` floor.
pub struct AppState<P: SurfaceProvider> {
    stage: Stage,
    title: AppTitle,
    width: u32,
    height: u32,
    validate: bool,
    minimized: bool,
    console: Option<P::Console>,
    window: Option<P::Window>,
    min_size: Option<MinSize>,
}

impl<P: SurfaceProvider> AppState<P> {
    /// Current bootstrap stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether the full bootstrap has completed without error.
    pub fn prepared(&self) -> bool {
        self.stage == Stage::FullyPrepared
    }

    /// Window/console title.
    pub fn title(&self) -> &AppTitle {
        &self.title
    }

    /// Current logical client size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether validation instrumentation was requested downstream.
    pub fn validate(&self) -> bool {
        self.validate
    }

    /// Whether the window is currently minimized.
    pub fn minimized(&self) -> bool {
        self.minimized
    }

    /// The created window, once the window phase has run.
    pub fn window(&self) -> Option<&P::Window> {
        self.window.as_ref()
    }

    /// Whether a console is attached.
    pub fn has_console(&self) -> bool {
        self.console.is_some()
    }

    /// Platform minimum trackable window size, once the window exists.
    pub fn min_size(&self) -> Option<MinSize> {
        self.min_size
    }
}

/// Errors from the bootstrap sequence.
///
/// Detection is separated from policy: the sequencer reports, the
/// caller decides what the process does about it.
#[derive(Error, Debug)]
pub enum PrepareError {
    /// The console could not be attached and the policy is fatal.
    #[error("console attach failed: {0}")]
    Console(#[source] PlatformError),

    /// The window class could not be registered.
    #[error("window class registration failed: {0}")]
    WindowClassRegistration(#[source] PlatformError),

    /// The window could not be created.
    #[error("window creation failed: {0}")]
    WindowCreation(#[source] PlatformError),

    /// The downstream graphics bootstrap failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PrepareError {
    fn from_window_phase(err: PlatformError) -> Self {
        match err {
            e @ PlatformError::ClassRegistrationFailed(_) => Self::WindowClassRegistration(e),
            e => Self::WindowCreation(e),
        }
    }

    /// User-facing fatal message for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::WindowClassRegistration(_) => {
                "Unexpected error trying to start the application!".to_string()
            }
            Self::WindowCreation(_) => "Cannot create a window in which to draw!".to_string(),
            Self::Console(_) => "Cannot attach a console for diagnostics!".to_string(),
            Self::Render(e) => e.to_string(),
        }
    }
}

/// Owns the surface provider and the application state, and sequences
/// the bootstrap phases.
pub struct Lifecycle<P: SurfaceProvider> {
    provider: P,
    config: AppConfig,
    state: AppState<P>,
}

impl<P: SurfaceProvider> Lifecycle<P> {
    /// Build a lifecycle from configuration and a provider.
    pub fn new(config: AppConfig, provider: P) -> Self {
        let state = AppState {
            stage: Stage::Uninitialized,
            title: AppTitle::new(&config.window.title),
            width: config.window.width,
            height: config.window.height,
            validate: config.validate,
            minimized: false,
            console: None,
            window: None,
            min_size: None,
        };
        Self {
            provider,
            config,
            state,
        }
    }

    /// Read access to the application state.
    pub fn state(&self) -> &AppState<P> {
        &self.state
    }

    /// Run the bootstrap phases appropriate for the current stage.
    ///
    /// The first successful pass performs console attachment, window
    /// creation, and the ordered graphics bootstrap. Later passes only
    /// recreate resolution-dependent resources; console and window
    /// creation are never repeated.
    pub fn prepare<R>(&mut self, render: &mut R) -> Result<(), PrepareError>
    where
        R: RenderBootstrap<P::Window>,
    {
        match self.state.stage {
            Stage::Uninitialized => {
                self.state.validate = self.config.validate;

                if self.config.console.enabled {
                    self.attach_console()?;
                }

                self.state.width = self.config.window.width;
                self.state.height = self.config.window.height;
                self.create_window()?;
                self.state.stage = Stage::WindowReady;

                self.bootstrap_render(render)?;
                self.state.stage = Stage::FullyPrepared;
                log::info!("bootstrap complete");
            }
            Stage::WindowReady => {
                // Only reachable when a caller retries after a graphics
                // failure; the surfaces already exist.
                self.bootstrap_render(render)?;
                self.state.stage = Stage::FullyPrepared;
            }
            Stage::FullyPrepared => {
                if self.state.minimized {
                    log::debug!("window minimized; deferring swapchain recreation");
                } else {
                    render.recreate_sized((self.state.width, self.state.height))?;
                }
            }
        }

        Ok(())
    }

    /// Record a new client size reported by the platform.
    ///
    /// A zero-sized client area means the window is minimized and
    /// recreation is deferred until it is restored; other sizes are
    /// clamped to the platform minimum. The caller re-invokes
    /// [`prepare`](Self::prepare) to run the recreation branch.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.state.minimized = true;
            return;
        }

        self.state.minimized = false;
        if let Some(min) = self.state.min_size {
            self.state.width = width.max(min.x.max(0) as u32);
            self.state.height = height.max(min.y.max(0) as u32);
        } else {
            self.state.width = width;
            self.state.height = height;
        }
    }

    fn attach_console(&mut self) -> Result<(), PrepareError> {
        let title = AppTitle::new(&self.config.console.title);
        match self.provider.create_console(&title) {
            Ok(console) => {
                self.state.console = Some(console);
                Ok(())
            }
            Err(err) => match self.config.console.on_failure {
                ConsoleFailurePolicy::Continue => {
                    log::warn!("continuing without a console: {err}");
                    Ok(())
                }
                ConsoleFailurePolicy::Fatal => Err(PrepareError::Console(err)),
            },
        }
    }

    fn create_window(&mut self) -> Result<(), PrepareError> {
        let (window, min_size) = self
            .provider
            .create_window(&self.state.title, self.state.width, self.state.height)
            .map_err(PrepareError::from_window_phase)?;

        log::info!(
            "window created: {}x{} (minimum {}x{})",
            self.state.width,
            self.state.height,
            min_size.x,
            min_size.y
        );
        self.state.window = Some(window);
        self.state.min_size = Some(min_size);
        Ok(())
    }

    fn bootstrap_render<R>(&mut self, render: &mut R) -> Result<(), PrepareError>
    where
        R: RenderBootstrap<P::Window>,
    {
        let window = self.state.window.as_ref().ok_or_else(|| {
            RenderError::Initialization("window must exist before the render bootstrap".to_string())
        })?;

        render.initialize(
            window,
            self.state.title.as_str(),
            (self.state.width, self.state.height),
            self.state.validate,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeWindow;

    #[derive(Default)]
    struct FakeProvider {
        console_calls: u32,
        class_registrations: u32,
        window_creations: u32,
        fail_console: bool,
        fail_class_registration: bool,
        fail_window: bool,
    }

    impl SurfaceProvider for FakeProvider {
        type Console = ();
        type Window = FakeWindow;

        fn create_console(&mut self, _title: &AppTitle) -> Result<(), PlatformError> {
            self.console_calls += 1;
            if self.fail_console {
                return Err(PlatformError::ConsoleAttachFailed("no console".to_string()));
            }
            Ok(())
        }

        fn create_window(
            &mut self,
            _title: &AppTitle,
            _width: u32,
            _height: u32,
        ) -> Result<(FakeWindow, MinSize), PlatformError> {
            self.class_registrations += 1;
            if self.fail_class_registration {
                return Err(PlatformError::ClassRegistrationFailed("denied".to_string()));
            }
            self.window_creations += 1;
            if self.fail_window {
                return Err(PlatformError::WindowCreationFailed("denied".to_string()));
            }
            Ok((FakeWindow, MinSize { x: 136, y: 40 }))
        }
    }

    #[derive(Default)]
    struct FakeRender {
        init_calls: u32,
        recreate_calls: u32,
        last_extent: Option<(u32, u32)>,
    }

    impl RenderBootstrap<FakeWindow> for FakeRender {
        fn initialize(
            &mut self,
            _window: &FakeWindow,
            _app_name: &str,
            extent: (u32, u32),
            _validate: bool,
        ) -> Result<(), RenderError> {
            self.init_calls += 1;
            self.last_extent = Some(extent);
            Ok(())
        }

        fn recreate_sized(&mut self, extent: (u32, u32)) -> Result<(), RenderError> {
            self.recreate_calls += 1;
            self.last_extent = Some(extent);
            Ok(())
        }

        fn is_initialized(&self) -> bool {
            self.init_calls > 0
        }
    }

    fn lifecycle_with(provider: FakeProvider) -> Lifecycle<FakeProvider> {
        Lifecycle::new(AppConfig::default(), provider)
    }

    #[test]
    fn first_run_creates_surfaces_exactly_once() {
        let mut lifecycle = lifecycle_with(FakeProvider::default());
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("first prepare");
        lifecycle.prepare(&mut render).expect("second prepare");

        assert_eq!(lifecycle.provider.console_calls, 1);
        assert_eq!(lifecycle.provider.window_creations, 1);
        assert_eq!(render.init_calls, 1);
        assert_eq!(render.recreate_calls, 1);
    }

    #[test]
    fn stage_advances_and_stays_prepared() {
        let mut lifecycle = lifecycle_with(FakeProvider::default());
        let mut render = FakeRender::default();

        assert_eq!(lifecycle.state().stage(), Stage::Uninitialized);
        lifecycle.prepare(&mut render).expect("prepare");
        assert!(lifecycle.state().prepared());

        lifecycle.prepare(&mut render).expect("re-entrant prepare");
        assert_eq!(lifecycle.state().stage(), Stage::FullyPrepared);
    }

    #[test]
    fn adopts_configured_defaults_on_first_run() {
        let mut lifecycle = lifecycle_with(FakeProvider::default());
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("prepare");

        assert_eq!(lifecycle.state().size(), (640, 360));
        assert!(lifecycle.state().validate());
        assert!(lifecycle.state().has_console());
        assert_eq!(render.last_extent, Some((640, 360)));
    }

    #[test]
    fn class_registration_failure_stops_the_sequence() {
        let mut lifecycle = lifecycle_with(FakeProvider {
            fail_class_registration: true,
            ..FakeProvider::default()
        });
        let mut render = FakeRender::default();

        let err = lifecycle.prepare(&mut render).expect_err("must fail");
        assert!(matches!(err, PrepareError::WindowClassRegistration(_)));
        assert_eq!(
            err.user_message(),
            "Unexpected error trying to start the application!"
        );

        // Window creation must not have been attempted, and the render
        // bootstrap never runs.
        assert_eq!(lifecycle.provider.window_creations, 0);
        assert_eq!(render.init_calls, 0);
        assert_eq!(lifecycle.state().stage(), Stage::Uninitialized);
        assert_eq!(FATAL_EXIT_CODE, 1);
    }

    #[test]
    fn window_creation_failure_reports_distinctly() {
        let mut lifecycle = lifecycle_with(FakeProvider {
            fail_window: true,
            ..FakeProvider::default()
        });
        let mut render = FakeRender::default();

        let err = lifecycle.prepare(&mut render).expect_err("must fail");
        assert!(matches!(err, PrepareError::WindowCreation(_)));
        assert_eq!(err.user_message(), "Cannot create a window in which to draw!");
        assert_eq!(render.init_calls, 0);
    }

    #[test]
    fn console_failure_continues_by_default() {
        let mut lifecycle = lifecycle_with(FakeProvider {
            fail_console: true,
            ..FakeProvider::default()
        });
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("prepare");
        assert!(!lifecycle.state().has_console());
        assert_eq!(lifecycle.provider.window_creations, 1);
        assert!(lifecycle.state().prepared());
    }

    #[test]
    fn console_failure_fatal_policy_aborts_before_window() {
        let config = {
            let mut config = AppConfig::default();
            config.console.on_failure = ConsoleFailurePolicy::Fatal;
            config
        };
        let mut lifecycle = Lifecycle::new(
            config,
            FakeProvider {
                fail_console: true,
                ..FakeProvider::default()
            },
        );
        let mut render = FakeRender::default();

        let err = lifecycle.prepare(&mut render).expect_err("must fail");
        assert!(matches!(err, PrepareError::Console(_)));
        assert_eq!(lifecycle.provider.class_registrations, 0);
    }

    #[test]
    fn disabled_console_is_never_requested() {
        let mut lifecycle = Lifecycle::new(
            AppConfig::default().with_console(false),
            FakeProvider::default(),
        );
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("prepare");
        assert_eq!(lifecycle.provider.console_calls, 0);
        assert!(lifecycle.state().prepared());
    }

    #[test]
    fn minimized_resize_defers_recreation() {
        let mut lifecycle = lifecycle_with(FakeProvider::default());
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("prepare");

        lifecycle.handle_resize(0, 0);
        lifecycle.prepare(&mut render).expect("minimized prepare");
        assert_eq!(render.recreate_calls, 0);

        lifecycle.handle_resize(800, 600);
        lifecycle.prepare(&mut render).expect("restored prepare");
        assert_eq!(render.recreate_calls, 1);
        assert_eq!(render.last_extent, Some((800, 600)));
    }

    #[test]
    fn resize_clamps_to_minimum_floor() {
        let mut lifecycle = lifecycle_with(FakeProvider::default());
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("prepare");

        lifecycle.handle_resize(10, 10);
        assert_eq!(lifecycle.state().size(), (136, 40));
    }

    #[test]
    fn validation_follows_configuration() {
        let mut lifecycle = Lifecycle::new(
            AppConfig::default().with_validation(false),
            FakeProvider::default(),
        );
        let mut render = FakeRender::default();

        lifecycle.prepare(&mut render).expect("prepare");
        assert!(!lifecycle.state().validate());
    }
}
