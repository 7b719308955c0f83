//! Output size calculation for aspect-ratio-correct ASCII rendering.

/// Vertical correction for monospace cells.
/// Text cells are roughly twice as tall as they are wide, so rows are
/// squeezed by this factor to keep the rendering from looking stretched.
pub const CHAR_ASPECT_CORRECTION: f64 = 0.55;

/// Calculate the output grid size for a target character width.
///
/// Height is `round(target_width * (img_height / img_width) * 0.55)`, rounding
/// half away from zero.
///
/// Degenerate inputs never produce an empty grid: a target width of 0 is
/// treated as 1, and a height that rounds to 0 is raised to 1.
///
/// # Example
/// ```ignore
/// // A 200x100 image rendered 100 characters wide needs 28 rows
/// assert_eq!(calculate_dimensions(200, 100, 100), (100, 28));
/// ```
pub fn calculate_dimensions(img_width: u32, img_height: u32, target_width: u32) -> (u32, u32) {
    let char_width = target_width.max(1);
    if img_width == 0 || img_height == 0 {
        return (char_width, 1);
    }

    let aspect = img_height as f64 / img_width as f64;
    let char_height = (char_width as f64 * aspect * CHAR_ASPECT_CORRECTION).round();

    // Saturating float-to-int cast, then floor at one row
    (char_width, (char_height as u32).max(1))
}
