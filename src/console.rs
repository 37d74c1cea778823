//! Line-oriented front end: routes, the auth gate, and command dispatch.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::api::SettingsApi;
use crate::auth::{AuthGate, AuthToken, CredentialStore, TokenValidator};
use crate::codec::ValueType;
use crate::error::AppError;
use crate::views::{CreateView, DetailView, ListView, Route, TokenView};

/// Builds a settings client for the credential currently in the store.
pub type ApiFactory = Box<dyn Fn(Option<AuthToken>) -> Arc<dyn SettingsApi> + Send + Sync>;

const HELP: &str = "\
Commands:
  anywhere     help | quit | go <path> | back | refresh | logout
  list         search [text] | next | prev | page <n> | open <row|key> | new
  create       key <text> | type <string|integer|float|boolean|json> | value <text> | save
  detail       edit | value <text> | cancel | update | delete
  token page   type the token and press enter";

enum Screen {
    Token(TokenView),
    List(ListView),
    Create(CreateView),
    Detail(DetailView),
}

/// Result of one console command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Render(String),
    Quit,
}

pub struct Console {
    store: Arc<dyn CredentialStore>,
    validator: Arc<dyn TokenValidator>,
    api_for: ApiFactory,
    gate: AuthGate,
    route: Route,
    screen: Screen,
}

impl Console {
    pub fn new(store: Arc<dyn CredentialStore>, validator: Arc<dyn TokenValidator>, api_for: ApiFactory) -> Self {
        Self {
            store,
            validator,
            api_for,
            gate: AuthGate::new(),
            route: Route::Auth,
            screen: Screen::Token(TokenView::new()),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    fn api(&self) -> Arc<dyn SettingsApi> {
        (self.api_for)(self.store.load())
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run(mut self) -> Result<(), AppError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        let first = self.navigate(Route::List).await;
        write_screen(&mut stdout, &first).await?;

        while let Some(line) = lines.next_line().await? {
            match self.handle(&line).await {
                Step::Render(text) => write_screen(&mut stdout, &text).await?,
                Step::Quit => break,
            }
        }
        tracing::info!("Console closed");
        Ok(())
    }

    /// Enter `route`, running the gate first for protected routes, and
    /// return the rendered screen.
    pub async fn navigate(&mut self, route: Route) -> String {
        let mut route = route;
        let mut notice = None;

        // A mount can bounce to the token page at most once, so this settles
        // in two passes.
        for _ in 0..2 {
            if route.is_protected() {
                self.gate.check(self.store.as_ref(), self.validator.as_ref()).await;
                if let Some(redirect) = self.gate.redirect() {
                    route = redirect;
                }
            }

            match self.mount(&route).await {
                Ok(()) => break,
                Err(e) => {
                    self.gate.revoke(self.store.as_ref());
                    notice = Some(e.to_string());
                    route = Route::Auth;
                }
            }
        }

        tracing::debug!(route = %route, "navigated");
        self.route = route;
        match notice {
            Some(msg) => format!("! {msg}\n\n{}", self.render()),
            None => self.render(),
        }
    }

    /// Build the view for `route` and run its fetch-on-mount. Only auth
    /// failures escape; everything else is rendered by the view itself.
    async fn mount(&mut self, route: &Route) -> Result<(), AppError> {
        let api = self.api();
        let result = match route {
            Route::Auth => {
                self.screen = Screen::Token(TokenView::new());
                Ok(())
            }
            Route::List => {
                let mut view = ListView::new();
                let result = view.load(api.as_ref()).await;
                self.screen = Screen::List(view);
                result
            }
            Route::Create => {
                self.screen = Screen::Create(CreateView::new());
                Ok(())
            }
            Route::Detail(key) => {
                let mut view = DetailView::new(key.clone());
                let result = view.load(api.as_ref()).await;
                self.screen = Screen::Detail(view);
                result
            }
        };
        match result {
            Err(e) if e.is_auth() => Err(e),
            _ => Ok(()),
        }
    }

    pub fn render(&self) -> String {
        if let Some(placeholder) = self.gate.placeholder() {
            if self.route.is_protected() {
                return placeholder.to_string();
            }
        }
        match &self.screen {
            Screen::Token(view) => view.render(),
            Screen::List(view) => view.render(Utc::now()),
            Screen::Create(view) => view.render(),
            Screen::Detail(view) => view.render(),
        }
    }

    /// Dispatch one input line.
    pub async fn handle(&mut self, line: &str) -> Step {
        let line = line.trim_end_matches(['\r', '\n']);
        let (cmd, arg) = split_command(line);

        match cmd {
            "quit" | "exit" => return Step::Quit,
            "help" => return Step::Render(format!("{}\n\n{HELP}", self.render())),
            _ => {}
        }

        // The token page takes free text; only quit/help are commands there.
        if matches!(self.screen, Screen::Token(_)) {
            return Step::Render(self.submit_token(line).await);
        }

        let result = match cmd {
            "go" => match Route::parse(arg) {
                Ok(route) => return Step::Render(self.navigate(route).await),
                Err(e) => Err(e),
            },
            "back" => return Step::Render(self.navigate(Route::List).await),
            "refresh" => return Step::Render(self.navigate(self.route.clone()).await),
            "logout" => {
                self.gate.revoke(self.store.as_ref());
                tracing::info!("Logged out");
                return Step::Render(self.navigate(Route::Auth).await);
            }
            _ => self.screen_command(cmd, arg).await,
        };

        let text = match result {
            Ok(Some(route)) => self.navigate(route).await,
            Ok(None) => self.render(),
            Err(e) if e.is_auth() => {
                self.gate.revoke(self.store.as_ref());
                let next = self.navigate(Route::Auth).await;
                format!("! {e}\n\n{next}")
            }
            // Validation errors are not kept by the views; show them once.
            Err(e @ AppError::Validation(_)) => format!("{}\n\n> {e}", self.render()),
            Err(_) => self.render(),
        };
        Step::Render(text)
    }

    async fn submit_token(&mut self, line: &str) -> String {
        let Screen::Token(view) = &mut self.screen else {
            return self.render();
        };
        view.set_input(line);
        let outcome = view.submit(self.store.as_ref(), self.validator.as_ref()).await;
        match outcome {
            Ok(route) => self.navigate(route).await,
            Err(e @ AppError::Validation(_)) => format!("{}\n\n> {e}", self.render()),
            Err(_) => self.render(),
        }
    }

    /// Commands specific to the current screen. `Ok(Some(route))` navigates.
    async fn screen_command(&mut self, cmd: &str, arg: &str) -> Result<Option<Route>, AppError> {
        let api = self.api();
        match &mut self.screen {
            Screen::Token(_) => Ok(None),
            Screen::List(view) => match cmd {
                "search" => {
                    view.search(arg);
                    Ok(None)
                }
                "next" => {
                    view.next_page();
                    Ok(None)
                }
                "prev" => {
                    view.prev_page();
                    Ok(None)
                }
                "page" => {
                    let n = arg
                        .parse()
                        .map_err(|_| AppError::Validation(format!("Not a page number: '{arg}'")))?;
                    view.go_to_page(n);
                    Ok(None)
                }
                "new" => Ok(Some(Route::Create)),
                "open" => match arg.parse::<usize>() {
                    Ok(row) => view
                        .route_for_row(row)
                        .map(Some)
                        .ok_or_else(|| AppError::Validation(format!("No row {row} on this page"))),
                    Err(_) => Ok(Some(Route::Detail((!arg.is_empty()).then(|| arg.to_string())))),
                },
                _ => Err(unknown(cmd)),
            },
            Screen::Create(view) => match cmd {
                "key" => {
                    view.set_key(arg);
                    Ok(None)
                }
                "type" => {
                    view.set_type(arg.parse::<ValueType>()?);
                    Ok(None)
                }
                "value" => view.set_value(arg).map(|()| None),
                "save" => view.submit(api.as_ref()).await.map(Some),
                _ => Err(unknown(cmd)),
            },
            Screen::Detail(view) => {
                if view.is_confirming_delete() {
                    if matches!(cmd.to_ascii_lowercase().as_str(), "y" | "yes") {
                        return view.confirm_delete(api.as_ref()).await.map(Some);
                    }
                    view.decline_delete();
                    return Ok(None);
                }
                match cmd {
                    "edit" => view.start_edit().map(|()| None),
                    "value" => view.set_value(arg).map(|()| None),
                    "cancel" => {
                        view.cancel_edit();
                        Ok(None)
                    }
                    "update" => view.update(api.as_ref()).await.map(|()| None),
                    "delete" => view.request_delete().map(|()| None),
                    _ => Err(unknown(cmd)),
                }
            }
        }
    }
}

fn unknown(cmd: &str) -> AppError {
    if cmd.is_empty() {
        AppError::Validation("Type `help` for commands".into())
    } else {
        AppError::Validation(format!("Unknown command '{cmd}'. Type `help` for commands"))
    }
}

/// First word is the command; the rest of the line, verbatim, is its argument.
fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line.trim_end(), ""),
    }
}

async fn write_screen(out: &mut tokio::io::Stdout, text: &str) -> Result<(), AppError> {
    out.write_all(format!("\n{text}\n\n> ").as_bytes()).await?;
    out.flush().await?;
    Ok(())
}
