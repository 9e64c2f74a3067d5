//! Keyboard input handling for the TUI.
//!
//! This module translates key events into application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use macroterm_core::cache::Network;
use macroterm_core::state::TabId;

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input<N: Network>(app: &mut App<N>, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => app.toggle_help(),
            KeyCode::Char('q') => {
                app.quit();
                return Ok(true);
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            return Ok(true);
        }
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('r') | KeyCode::Char('u') => app.load(),
        KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => app.view.next_tab(),
        KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => app.view.prev_tab(),
        KeyCode::Char('o') => app.select_tab(TabId::Overview),
        KeyCode::Char('g') => app.select_tab(TabId::Geo),
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            app.select_tab_index(index);
        }
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{test_app, StaticNetwork, SNAPSHOT};
    use macroterm_core::api::Loaded;
    use macroterm_core::cache::ResponseSource;
    use macroterm_core::models::Dashboard;

    fn press(app: &mut App<StaticNetwork>, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::from(code)).expect("handle_input")
    }

    fn loaded_app(dir: &tempfile::TempDir) -> App<StaticNetwork> {
        let mut app = test_app(dir, StaticNetwork::offline());
        let ticket = app.view.begin_load();
        app.view.finish_load(
            ticket,
            Ok(Loaded {
                dashboard: Dashboard::from_slice(SNAPSHOT.as_bytes()).expect("snapshot"),
                source: ResponseSource::Network,
            }),
        );
        app
    }

    #[test]
    fn test_quit_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        assert!(press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = loaded_app(&dir);

        assert!(!press(&mut app, KeyCode::Char('?')));
        assert_eq!(app.state, AppState::ShowingHelp);

        // Navigation is ignored while help is open
        press(&mut app, KeyCode::Right);
        assert_eq!(app.view.selected(), &TabId::Overview);

        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_arrow_keys_cycle_tabs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = loaded_app(&dir);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.view.selected(), &TabId::Region("US".to_string()));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.view.selected(), &TabId::Geo);
    }

    #[test]
    fn test_number_keys_select_tabs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = loaded_app(&dir);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view.selected(), &TabId::Region("EA".to_string()));
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.view.selected(), &TabId::Geo);
        // Out of range: unchanged
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.view.selected(), &TabId::Geo);
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.view.selected(), &TabId::Overview);
    }

    #[tokio::test]
    async fn test_refresh_starts_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());

        assert!(!press(&mut app, KeyCode::Char('r')));
        assert!(app.view.is_loading());
    }
}
