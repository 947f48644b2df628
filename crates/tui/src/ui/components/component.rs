//! Component system for the Flowdeck TUI.
//!
//! Components are self-contained UI elements: they translate keys into
//! application messages, and render themselves into a provided `Rect`.
//! Side effects are reported back as [`Effect`]s rather than performed.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Effect, Msg};

pub(crate) trait Component {
    /// Handle a key while this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle an application-level message. The default forwards it to
    /// [`App::update`].
    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        app.update(msg)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
