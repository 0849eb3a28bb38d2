//! Quick start guide text, shown on first startup and on demand.

use crate::dialogs::Dialogs;

pub const GUIDE_TITLE: &str = "Focus Veil - Quick Start";

pub const GUIDE_TEXT: &str = "\
START HERE: press and hold SHIFT to temporarily see through the veil.\n\
This helps you see where to position your focus areas.\n\
\n\
HOW TO USE:\n\
- Click and drag on the dark area to create a focus area\n\
- Drag the violet handle (left side) to move a focus area\n\
- Drag edges or corners to resize\n\
- Right-click the violet handle to delete a focus area\n\
- Right-click the dimmed area to show the menu\n\
- Double-click anywhere to pause/resume\n\
- Scroll the mouse wheel to change opacity\n\
\n\
KEYBOARD SHORTCUTS:\n\
- Shift         : hold to peek through the veil\n\
- Ctrl+Shift+X  : pause (hide veil)\n\
- Escape        : show menu\n\
- Delete        : delete the focus area last grabbed by its handle\n\
\n\
SYSTEM TRAY:\n\
- Double-click the tray icon to show/hide the veil\n\
- Right-click it for the quick menu\n\
\n\
The small violet disc on the left edge of each focus area is its move\n\
handle; it sits at the golden-ratio point of the edge.";

pub fn show(dialogs: &dyn Dialogs) {
    dialogs.info(GUIDE_TITLE, GUIDE_TEXT);
}
