use crate::config::ContourStyle;
use crate::error::ConvertResult;
use crate::svg::{Element, SvgDocument};

/// Rewrite engine markup so shapes are drawn as outlines only.
///
/// Every `fill` becomes `none`, every `stroke="none"` is dropped so the root
/// stroke is inherited, and the root `<svg>` receives the stroke attributes
/// from `style`. The element structure is left untouched.
pub fn apply_contour_only(markup: &str, style: &ContourStyle) -> ConvertResult<String> {
    let mut document = SvgDocument::parse(markup)?;
    if !style.stroke_width.is_finite() {
        tracing::warn!(
            width = style.stroke_width,
            "stroke width is not finite, using the default"
        );
    }

    let mut rewritten = 0usize;
    document.root_mut().walk_mut(&mut |element| {
        rewritten += strip_paint(element);
    });

    let root = document.root_mut();
    root.set_attribute("stroke", style.effective_color().to_string());
    root.set_attribute("stroke-width", style.effective_width().to_string());
    root.set_attribute("stroke-linejoin", "round");
    root.set_attribute("stroke-linecap", "round");
    tracing::debug!(rewritten, "applied contour-only styling");

    Ok(document.to_string())
}

/// Returns the number of attributes changed on `element`.
fn strip_paint(element: &mut Element) -> usize {
    let mut changed = 0;
    if element.attribute("fill").is_some_and(|fill| fill != "none") {
        element.set_attribute("fill", "none");
        changed += 1;
    }
    if element
        .attribute("stroke")
        .is_some_and(|stroke| stroke.trim() == "none")
    {
        element.remove_attribute("stroke");
        changed += 1;
    }
    changed
}
