use sceneconfig::MediaExtents;

/// Stage geometry derived from expansion progress. Sizes are in page pixels;
/// `text_offset` is how far each flanking title half slides outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaLayout {
    pub width: f32,
    pub height: f32,
    pub text_offset: f32,
}

/// Linear interpolation of the stage size between its collapsed base and the
/// fully expanded extent for the active breakpoint.
pub fn media_layout(progress: f32, is_mobile: bool, extents: &MediaExtents) -> MediaLayout {
    let progress = progress.clamp(0.0, 1.0);
    let (width_growth, height_growth, text_travel) = if is_mobile {
        (
            extents.width_growth_mobile,
            extents.height_growth_mobile,
            extents.text_offset_mobile,
        )
    } else {
        (
            extents.width_growth_desktop,
            extents.height_growth_desktop,
            extents.text_offset_desktop,
        )
    };

    MediaLayout {
        width: extents.base_width + progress * width_growth,
        height: extents.base_height + progress * height_growth,
        text_offset: progress * text_travel,
    }
}
