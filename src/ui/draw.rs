use crate::{dims::Dims, renderer::Surface, settings::theme::Style};

pub fn draw_box(surface: &mut Surface, pos: Dims, size: Dims, style: Style) {
    if size.0 < 2 || size.1 < 2 {
        return;
    }

    surface.add_text(
        pos,
        &format!("╭{}╮", "─".repeat(size.0 as usize - 2)),
        style,
    );

    for y in pos.1 + 1..pos.1 + size.1 - 1 {
        surface.add_char(Dims(pos.0, y), '│', style);
        surface.add_char(Dims(pos.0 + size.0 - 1, y), '│', style);
    }

    surface.add_text(
        Dims(pos.0, pos.1 + size.1 - 1),
        &format!("╰{}╯", "─".repeat(size.0 as usize - 2)),
        style,
    );
}
