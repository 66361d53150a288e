use terminal_size::{terminal_size, Width};

/// Width used when stdout is not a terminal.
const FALLBACK_WIDTH: usize = 100;

/// The width of the terminal, for wrapping help texts.
pub fn get_terminal_width() -> usize {
    if let Some((Width(width), _)) = terminal_size() {
        width.into()
    } else {
        FALLBACK_WIDTH
    }
}
