//! Output generation.
//!
//! Rendering is a plain walk over the part tree of a filled [`RenderState`]:
//! text is copied, variables emit their slot, nested templates emit each of
//! their bound child states in order. Values were escaped when they were set,
//! so nothing here transforms text.

use std::fmt::{self, Write};

use crate::part::Part;
use crate::session::RenderState;

/// Renders `state` into a new string.
///
/// Unresolved variables render as nothing; sessions check completeness
/// before calling this.
pub fn render(state: &RenderState) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write(state, &mut out);
    out
}

/// Renders `state` into `out`.
pub fn write<W: Write + ?Sized>(state: &RenderState, out: &mut W) -> fmt::Result {
    for (index, part) in state.template().parts().iter().enumerate() {
        match part {
            Part::Text(text) => out.write_str(text.text())?,
            Part::Variable(_) => {
                if let Some(value) = state.slot(index) {
                    out.write_str(value)?;
                }
            }
            Part::Nested(nested) => {
                for child in state.children(nested.name()) {
                    write(child, out)?;
                }
            }
        }
    }
    Ok(())
}
