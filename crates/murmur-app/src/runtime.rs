//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Translation to and from the chat client
//! - [`Driver`]: Platform-specific I/O

use murmur_client::{ChatState, ClientAction, Environment};

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment supplying wall-clock time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver, environment and App.
    pub fn new(driver: D, env: E, app: App) -> Self {
        Self { driver, app, bridge: Bridge::new(env) }
    }

    /// Run the main event loop until the App quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app, self.bridge.state())?;

        loop {
            if self.step().await? {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// 1. Polls one input event and runs the App's actions
    /// 2. Drains one transport event through the Bridge
    ///
    /// Returns `true` if the application should quit.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event, self.bridge.state());
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        if let Some(event) = self.driver.recv_event().await {
            let events = self.bridge.handle_client_event(event);
            self.flush_outgoing().await;
            if self.process_app_events(events).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                let events = match action {
                    AppAction::Render => {
                        self.driver.render(&self.app, self.bridge.state())?;
                        continue;
                    },
                    AppAction::Quit => return Ok(true),
                    AppAction::SendFile { room, path } => match self.driver.read_file(&path).await
                    {
                        Ok(contents) => self.bridge.send_file(&room, &path, &contents),
                        Err(e) => {
                            tracing::warn!(%path, error = %e, "file read failed");
                            vec![AppEvent::Error { message: format!("/file {path}: {e}") }]
                        },
                    },

                    // Chat operations go through the bridge
                    AppAction::Connect { .. }
                    | AppAction::Disconnect
                    | AppAction::SendMessage { .. }
                    | AppAction::SendPrivateMessage { .. }
                    | AppAction::SetTyping(_)
                    | AppAction::JoinRoom { .. }
                    | AppAction::ReactMessage { .. }
                    | AppAction::ReadMessage { .. } => self.bridge.process_app_action(action),
                };

                self.flush_outgoing().await;
                for event in events {
                    pending_actions.extend(self.app.handle(event, self.bridge.state()));
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_app_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event, self.bridge.state());
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Execute pending client actions through the driver.
    ///
    /// Transport failures are logged, never surfaced to the App.
    async fn flush_outgoing(&mut self) {
        for action in self.bridge.take_outgoing() {
            match action {
                ClientAction::Connect => {
                    if let Err(e) = self.driver.connect().await {
                        tracing::warn!(error = %e, "connect failed");
                    }
                },
                ClientAction::Disconnect => self.driver.disconnect(),
                ClientAction::Send(packet) => {
                    if let Err(e) = self.driver.send_packet(packet).await {
                        tracing::warn!(error = %e, "send failed, dropping packet");
                    }
                },
                ClientAction::Notify(notification) => self.driver.notify(&notification),
            }
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Observable chat state.
    pub fn chat(&self) -> &ChatState {
        self.bridge.state()
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
